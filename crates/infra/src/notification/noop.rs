//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 送信バックエンド未設定時の既定値。

use apptmail_domain::notification::{EmailMessage, NotificationError};
use async_trait::async_trait;

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
///
/// 送信したことにして成功を返す。本文は debug レベルでのみ出力する。
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        tracing::info!(
            notification.recipient = %email.to,
            notification.subject = %email.subject,
            "Noop: 確認メールの送信を省略"
        );
        tracing::debug!(body = %email.text_body, "Noop: 本文");
        Ok(())
    }
}
