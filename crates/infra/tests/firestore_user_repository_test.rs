//! FirestoreUserRepository の統合テスト
//!
//! Firestore REST API のスタブに対して、ドキュメント取得・404・
//! エラーステータス・認証ヘッダーの扱いを検証する。

mod common;

use std::sync::{Arc, Mutex};

use apptmail_domain::appointment::PatientId;
use apptmail_infra::{
    InfraErrorKind,
    firestore::{FirestoreClient, TokenSource},
    repository::{FirestoreUserRepository, UserRepository},
};
use axum::{
    Json,
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use common::spawn_stub;
use pretty_assertions::assert_eq;
use serde_json::json;

const DOCUMENT_ROUTE: &str = "/v1/projects/demo/databases/(default)/documents/users/{id}";

#[derive(Clone, Default)]
struct StubState {
    authorization: Arc<Mutex<Vec<String>>>,
}

async fn get_user(
    State(state): State<StubState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(value) = headers.get("authorization") {
        state
            .authorization
            .lock()
            .unwrap()
            .push(value.to_str().unwrap().to_string());
    }

    match id.as_str() {
        "patient-1" => (
            StatusCode::OK,
            Json(json!({
                "name": "projects/demo/databases/(default)/documents/users/patient-1",
                "fields": { "email": { "stringValue": "patient@example.com" } },
                "createTime": "2026-01-01T00:00:00Z",
                "updateTime": "2026-01-01T00:00:00Z"
            })),
        ),
        "no-email" => (
            StatusCode::OK,
            Json(json!({
                "name": "projects/demo/databases/(default)/documents/users/no-email",
                "fields": { "displayName": { "stringValue": "Jane" } }
            })),
        ),
        "broken" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": { "code": 503, "status": "UNAVAILABLE" } })),
        ),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": { "code": 404, "status": "NOT_FOUND" } })),
        ),
    }
}

async fn setup(token_source: TokenSource) -> (FirestoreUserRepository, StubState) {
    let state = StubState::default();
    let base_url = spawn_stub(
        Router::new()
            .route(DOCUMENT_ROUTE, get(get_user))
            .with_state(state.clone()),
    )
    .await;

    let client = FirestoreClient::with_endpoint(base_url, "demo", "(default)", token_source);
    (FirestoreUserRepository::new(client, "users"), state)
}

fn patient_id(id: &str) -> PatientId {
    PatientId::new(id).unwrap()
}

#[tokio::test]
async fn test_存在する患者レコードを取得できる() {
    let (repo, _) = setup(TokenSource::Emulator).await;

    let record = repo.find_by_id(&patient_id("patient-1")).await.unwrap();

    let record = record.expect("患者レコードが返ること");
    assert_eq!(record.id.as_str(), "patient-1");
    assert_eq!(record.contact_address(), Some("patient@example.com"));
}

#[tokio::test]
async fn test_メールアドレスの無い患者レコードを取得できる() {
    let (repo, _) = setup(TokenSource::Emulator).await;

    let record = repo.find_by_id(&patient_id("no-email")).await.unwrap().unwrap();

    assert_eq!(record.contact_address(), None);
}

#[tokio::test]
async fn test_404の場合はnoneを返す() {
    let (repo, _) = setup(TokenSource::Emulator).await;

    let record = repo.find_by_id(&patient_id("unknown")).await.unwrap();

    assert!(record.is_none());
}

#[tokio::test]
async fn test_404以外のエラーステータスはエラーを返す() {
    let (repo, _) = setup(TokenSource::Emulator).await;

    let err = repo.find_by_id(&patient_id("broken")).await.unwrap_err();

    assert!(matches!(
        err.kind(),
        InfraErrorKind::UnexpectedStatus { status: 503, .. }
    ));
}

#[tokio::test]
async fn test_エミュレータではownerトークンを送る() {
    let (repo, state) = setup(TokenSource::Emulator).await;

    repo.find_by_id(&patient_id("patient-1")).await.unwrap();

    assert_eq!(
        state.authorization.lock().unwrap().clone(),
        vec!["Bearer owner".to_string()]
    );
}

#[tokio::test]
async fn test_固定トークンを送る() {
    let (repo, state) = setup(TokenSource::Static("ya29.static".to_string())).await;

    repo.find_by_id(&patient_id("patient-1")).await.unwrap();

    assert_eq!(
        state.authorization.lock().unwrap().clone(),
        vec!["Bearer ya29.static".to_string()]
    );
}

#[tokio::test]
async fn test_メタデータサーバーから取得したトークンを送る() {
    let metadata_url = spawn_stub(Router::new().route(
        "/token",
        get(|headers: HeaderMap| async move {
            if headers.get("metadata-flavor").map(|v| v.as_bytes()) != Some(b"Google") {
                return (StatusCode::FORBIDDEN, Json(json!({})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "access_token": "ya29.metadata",
                    "expires_in": 3599,
                    "token_type": "Bearer"
                })),
            )
        }),
    ))
    .await;

    let (repo, state) = setup(TokenSource::MetadataServer {
        token_url: format!("{metadata_url}/token"),
    })
    .await;

    repo.find_by_id(&patient_id("patient-1")).await.unwrap();

    assert_eq!(
        state.authorization.lock().unwrap().clone(),
        vec!["Bearer ya29.metadata".to_string()]
    );
}

#[tokio::test]
async fn test_メタデータサーバーに接続できない場合は認証エラー() {
    let (repo, _) = setup(TokenSource::MetadataServer {
        token_url: "http://127.0.0.1:1/token".to_string(),
    })
    .await;

    let err = repo.find_by_id(&patient_id("patient-1")).await.unwrap_err();

    assert!(matches!(err.kind(), InfraErrorKind::Auth(_)));
}
