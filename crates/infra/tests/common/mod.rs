//! テスト共通ヘルパー
//!
//! 外部 HTTP API（Firestore REST、SendGrid）のスタブサーバーを
//! axum でエフェメラルポートに起動する。

#![allow(dead_code)]

use axum::Router;
use tokio::net::TcpListener;

/// スタブサーバーを起動し、ベース URL（`http://127.0.0.1:{port}`）を返す
pub async fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{addr}")
}
