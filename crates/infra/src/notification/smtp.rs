//! SMTP 通知送信実装
//!
//! ローカル開発で Mailpit に確認メールを送り、Web UI で本文を確認するために使う。

use apptmail_domain::notification::{EmailMessage, NotificationError};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart},
};

use super::NotificationSender;

/// SMTP 通知送信
///
/// 開発環境の Mailpit 向け。TLS も認証も使わない平文接続のみ対応する。
pub struct SmtpNotificationSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotificationSender {
    /// `host:port` の SMTP リレーに接続する送信インスタンスを作成
    pub fn new(host: &str, port: u16) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .build();

        Self { transport }
    }
}

fn mailbox(address: &str, role: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{role} {address:?}: {e}")))
}

/// text/plain と text/html の multipart/alternative メッセージを組み立てる
fn build_message(email: &EmailMessage) -> Result<Message, NotificationError> {
    Message::builder()
        .from(mailbox(&email.from, "送信元")?)
        .to(mailbox(&email.to, "宛先")?)
        .subject(email.subject.as_str())
        .multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ))
        .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let response = self
            .transport
            .send(build_message(email)?)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        tracing::debug!(code = %response.code(), "SMTP リレーが受理");
        Ok(())
    }
}
