//! # HTTP ハンドラ
//!
//! トリガーイベントの受信口とヘルスチェックを提供する。

pub mod health;
pub mod trigger;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
pub use health::health_check;
pub use trigger::{CompletionResponse, TriggerState, handle_appointment_created};

/// ルーターを構築する
///
/// `POST /` は Eventarc / Cloud Functions のプッシュ配信先、
/// `POST /events/appointment-created` は明示的なパスで購読する場合に使う。
pub fn router(state: Arc<TriggerState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", post(handle_appointment_created))
        .route("/events/appointment-created", post(handle_appointment_created))
        .with_state(state)
}
