//! SendGridNotificationSender の統合テスト
//!
//! Mail Send API のスタブに対して、送信リクエストの内容と
//! 失敗ステータスの扱いを検証する。

mod common;

use std::sync::{Arc, Mutex};

use apptmail_domain::notification::{EmailMessage, NotificationError};
use apptmail_infra::notification::{NotificationSender, SendGridNotificationSender};
use axum::{
    Json,
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use common::spawn_stub;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[derive(Clone)]
struct StubState {
    status:   StatusCode,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn mail_send(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.requests.lock().unwrap().push((authorization, body));

    if state.status.is_success() {
        (state.status, Json(json!({})))
    } else {
        (
            state.status,
            Json(json!({ "errors": [{ "message": "The from address does not match a verified Sender Identity." }] })),
        )
    }
}

async fn setup(status: StatusCode) -> (SendGridNotificationSender, StubState) {
    let state = StubState {
        status,
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let base_url = spawn_stub(
        Router::new()
            .route("/v3/mail/send", post(mail_send))
            .with_state(state.clone()),
    )
    .await;

    (SendGridNotificationSender::new(&base_url, "SG.test-key"), state)
}

fn message() -> EmailMessage {
    EmailMessage {
        from:      "clinic@example.com".to_string(),
        to:        "patient@example.com".to_string(),
        subject:   "Appointment Confirmation".to_string(),
        html_body: "<strong>Hello</strong>".to_string(),
        text_body: "Hello".to_string(),
    }
}

#[tokio::test]
async fn test_202の場合は送信成功() {
    let (sender, state) = setup(StatusCode::ACCEPTED).await;

    sender.send_email(&message()).await.unwrap();

    let requests = state.requests.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    let (authorization, body) = &requests[0];
    assert_eq!(authorization.as_deref(), Some("Bearer SG.test-key"));
    assert_eq!(body["personalizations"][0]["to"][0]["email"], "patient@example.com");
    assert_eq!(body["from"]["email"], "clinic@example.com");
    assert_eq!(body["subject"], "Appointment Confirmation");
}

#[tokio::test]
async fn test_エラーステータスの場合はレスポンスボディを含めて失敗する() {
    let (sender, _) = setup(StatusCode::FORBIDDEN).await;

    let err = sender.send_email(&message()).await.unwrap_err();

    let NotificationError::SendFailed(detail) = err else {
        panic!("SendFailed であること: {err:?}");
    };
    assert!(detail.contains("403"), "{detail}");
    assert!(detail.contains("verified Sender Identity"), "{detail}");
}

#[tokio::test]
async fn test_接続できない場合は送信失敗() {
    let sender = SendGridNotificationSender::new("http://127.0.0.1:1", "SG.test-key");

    let err = sender.send_email(&message()).await.unwrap_err();

    assert!(matches!(err, NotificationError::SendFailed(_)));
}
