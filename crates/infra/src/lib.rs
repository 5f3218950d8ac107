//! # apptmail インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **Firestore 接続**: REST API によるドキュメント読み取りと、
//!   ドキュメント作成イベントのペイロード解釈
//! - **リポジトリ実装**: `users` コレクションからの患者レコード取得
//! - **メール送信**: SendGrid / SES / SMTP / Noop の送信実装
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`firestore`] - Firestore REST クライアントとドキュメント表現
//! - [`repository`] - リポジトリ実装
//! - [`notification`] - メール送信実装
//! - [`error`] - インフラ層エラー定義

pub mod error;
pub mod firestore;
pub mod notification;
pub mod repository;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
