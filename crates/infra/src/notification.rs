//! # 通知送信
//!
//! 確認メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **4 つの実装**: SendGrid（既定のトランザクションメール API）、SES、
//!   SMTP（Mailpit 開発用）、Noop（ログ出力のみ）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択

mod noop;
mod sendgrid;
mod ses;
mod smtp;

use apptmail_domain::notification::{EmailMessage, NotificationError};
use async_trait::async_trait;
pub use noop::NoopNotificationSender;
pub use sendgrid::{SENDGRID_BASE_URL, SendGridNotificationSender};
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;

/// メール送信トレイト
///
/// 呼び出しは送信 API の応答（成功または失敗）まで待機する。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
