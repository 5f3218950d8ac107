//! # インフラ層エラー定義
//!
//! Firestore REST API とメタデータサーバーの呼び出しで起きる失敗を表す。
//! メール送信の失敗はドメイン層の `NotificationError` で表すので、ここには含めない。
//!
//! [`InfraError`] は種別（[`InfraErrorKind`]）に加えて、生成時点の [`SpanTrace`] を持つ。
//! ユースケースがエラーを `ConfirmationError` に変換してログに出すとき、
//! どのリクエスト・どのドキュメント取得で起きたかを辿れる。

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// `Display` は種別のメッセージのみ。`SpanTrace` は `Debug` と
/// [`span_trace()`](InfraError::span_trace) から参照する。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// HTTP 通信エラー
    ///
    /// 接続失敗、タイムアウト、レスポンスボディの読み取り失敗など。
    #[error("HTTP 通信エラー: {0}")]
    Http(#[source] reqwest::Error),

    /// 想定外の HTTP ステータス
    #[error("想定外のステータス: {status}: {body}")]
    UnexpectedStatus {
        /// HTTP ステータスコード
        status: u16,
        /// レスポンスボディ（診断用）
        body:   String,
    },

    /// シリアライズ/デシリアライズエラー
    #[error("シリアライズエラー: {0}")]
    Serialization(#[source] serde_json::Error),

    /// 認証トークンの取得に失敗
    #[error("認証エラー: {0}")]
    Auth(String),

    /// ドキュメントの内容が想定と異なる
    ///
    /// フィールドの型不一致など。
    #[error("不正なドキュメント: {0}")]
    InvalidDocument(String),

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    fn new(kind: InfraErrorKind) -> Self {
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }

    /// 想定外ステータスのエラーを生成する
    pub fn unexpected_status(status: u16, body: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::UnexpectedStatus {
            status,
            body: body.into(),
        })
    }

    /// 認証エラーを生成する
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Auth(msg.into()))
    }

    /// 不正なドキュメントのエラーを生成する
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::InvalidDocument(msg.into()))
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::new(InfraErrorKind::Unexpected(msg.into()))
    }
}

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl From<reqwest::Error> for InfraError {
    fn from(source: reqwest::Error) -> Self {
        Self::new(InfraErrorKind::Http(source))
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(source: serde_json::Error) -> Self {
        Self::new(InfraErrorKind::Serialization(source))
    }
}
