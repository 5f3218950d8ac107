//! # ヘルスチェックハンドラ
//!
//! Notifier の稼働状態を確認するためのエンドポイント。
//! Cloud Run の startup / liveness probe から呼ばれる。
//!
//! ```text
//! GET /health
//! ```

use apptmail_shared::HealthResponse;
use axum::Json;

/// ヘルスチェックエンドポイント
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}
