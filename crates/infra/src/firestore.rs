//! # Firestore 接続管理
//!
//! Cloud Firestore の REST API（v1）でドキュメントを読み取る。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: 本サービスは `documents.get` のみ使用する
//! - **ローカル開発**: `FIRESTORE_EMULATOR_HOST` 指定時はエミュレータに接続し、
//!   `Bearer owner` でセキュリティルールをバイパスする
//! - **本番環境**: Cloud Run / Cloud Functions のメタデータサーバーから
//!   サービスアカウントのアクセストークンを取得する
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use apptmail_infra::firestore::{FirestoreClient, FirestoreSettings};
//!
//! let client = FirestoreClient::new(&FirestoreSettings {
//!     project_id:    "demo-project".to_string(),
//!     database_id:   "(default)".to_string(),
//!     emulator_host: Some("localhost:8080".to_string()),
//!     access_token:  None,
//! });
//! let doc = client.get_document("users", "patient-1").await?;
//! ```

mod document;
mod event;

pub use document::{
    APPOINTMENT_DATE_FIELD,
    ArrayValue,
    EMAIL_FIELD,
    FirestoreDocument,
    FirestoreValue,
    LatLng,
    MapValue,
    PATIENT_ID_FIELD,
};
pub use event::{DocumentEventPayload, DocumentMask};
use reqwest::{StatusCode, header::AUTHORIZATION};
use serde::Deserialize;

use crate::error::InfraError;

/// Firestore 本番エンドポイント
pub const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";

/// メタデータサーバーのトークンエンドポイント
pub const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Firestore 接続設定
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    /// GCP プロジェクト ID
    pub project_id:    String,
    /// データベース ID（通常は `(default)`）
    pub database_id:   String,
    /// エミュレータの `host:port`
    pub emulator_host: Option<String>,
    /// 固定のアクセストークン（ローカルからの動作確認用）
    pub access_token:  Option<String>,
}

/// アクセストークンの取得方法
#[derive(Clone)]
pub enum TokenSource {
    /// エミュレータ（`Bearer owner`）
    Emulator,
    /// 固定トークン
    Static(String),
    /// メタデータサーバーから都度取得
    MetadataServer { token_url: String },
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Emulator => f.write_str("Emulator"),
            Self::Static(_) => f.debug_tuple("Static").field(&"[REDACTED]").finish(),
            Self::MetadataServer { token_url } => f
                .debug_struct("MetadataServer")
                .field("token_url", token_url)
                .finish(),
        }
    }
}

#[derive(Deserialize)]
struct MetadataToken {
    access_token: String,
}

/// Firestore REST クライアント
///
/// `reqwest::Client` は内部で接続プールを共有するため、clone は安価。
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client:        reqwest::Client,
    base_url:      String,
    database_path: String,
    token_source:  TokenSource,
}

impl FirestoreClient {
    /// 設定からクライアントを作成する
    ///
    /// エミュレータ > 固定トークン > メタデータサーバーの優先順で接続先と認証を決める。
    pub fn new(settings: &FirestoreSettings) -> Self {
        let (base_url, token_source) = match (&settings.emulator_host, &settings.access_token) {
            (Some(host), _) => (format!("http://{host}"), TokenSource::Emulator),
            (None, Some(token)) => (
                FIRESTORE_BASE_URL.to_string(),
                TokenSource::Static(token.clone()),
            ),
            (None, None) => (
                FIRESTORE_BASE_URL.to_string(),
                TokenSource::MetadataServer {
                    token_url: METADATA_TOKEN_URL.to_string(),
                },
            ),
        };

        Self::with_endpoint(
            base_url,
            &settings.project_id,
            &settings.database_id,
            token_source,
        )
    }

    /// 接続先と認証方法を直接指定してクライアントを作成する
    pub fn with_endpoint(
        base_url: impl Into<String>,
        project_id: &str,
        database_id: &str,
        token_source: TokenSource,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            database_path: format!("projects/{project_id}/databases/{database_id}"),
            token_source,
        }
    }

    /// ドキュメントを 1 件取得する
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(doc))`: ドキュメントが存在する場合
    /// - `Ok(None)`: 404 の場合
    /// - `Err(_)`: 通信エラー、認証エラー、その他のステータス
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<FirestoreDocument>, InfraError> {
        let url = format!(
            "{}/v1/{}/documents/{}/{}",
            self.base_url,
            self.database_path,
            urlencoding::encode(collection),
            urlencoding::encode(document_id),
        );

        let token = self.access_token().await?;
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(InfraError::unexpected_status(status.as_u16(), body))
            }
        }
    }

    async fn access_token(&self) -> Result<String, InfraError> {
        match &self.token_source {
            TokenSource::Emulator => Ok("owner".to_string()),
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::MetadataServer { token_url } => {
                let response = self
                    .client
                    .get(token_url)
                    .header("Metadata-Flavor", "Google")
                    .send()
                    .await
                    .map_err(|e| InfraError::auth(format!("メタデータサーバーに接続できません: {e}")))?;

                if !response.status().is_success() {
                    return Err(InfraError::auth(format!(
                        "メタデータサーバーがトークンを返しませんでした: {}",
                        response.status()
                    )));
                }

                let token: MetadataToken = response
                    .json()
                    .await
                    .map_err(|e| InfraError::auth(format!("トークンレスポンスが不正です: {e}")))?;
                Ok(token.access_token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FirestoreSettings {
        FirestoreSettings {
            project_id:    "demo-project".to_string(),
            database_id:   "(default)".to_string(),
            emulator_host: None,
            access_token:  None,
        }
    }

    #[test]
    fn test_エミュレータ指定時はエミュレータに接続する() {
        let client = FirestoreClient::new(&FirestoreSettings {
            emulator_host: Some("localhost:8081".to_string()),
            access_token: Some("ignored".to_string()),
            ..settings()
        });

        assert_eq!(client.base_url, "http://localhost:8081");
        assert!(matches!(client.token_source, TokenSource::Emulator));
        assert_eq!(
            client.database_path,
            "projects/demo-project/databases/(default)"
        );
    }

    #[test]
    fn test_固定トークン指定時は本番エンドポイントに接続する() {
        let client = FirestoreClient::new(&FirestoreSettings {
            access_token: Some("ya29.token".to_string()),
            ..settings()
        });

        assert_eq!(client.base_url, FIRESTORE_BASE_URL);
        assert!(matches!(client.token_source, TokenSource::Static(ref t) if t == "ya29.token"));
    }

    #[test]
    fn test_指定が無い場合はメタデータサーバーを使う() {
        let client = FirestoreClient::new(&settings());

        assert!(matches!(
            client.token_source,
            TokenSource::MetadataServer { ref token_url } if token_url == METADATA_TOKEN_URL
        ));
    }

    #[test]
    fn test_固定トークンはdebug出力でマスクされる() {
        let source = TokenSource::Static("secret-token".to_string());
        assert!(!format!("{source:?}").contains("secret-token"));
    }
}
