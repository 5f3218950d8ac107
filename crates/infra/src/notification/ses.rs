//! SES 通知送信実装
//!
//! AWS SES v2 API を使用してメールを送信する。
//! 送信元アドレスは SES で検証済みであること。

use apptmail_domain::notification::{EmailMessage, NotificationError};
use async_trait::async_trait;
use aws_sdk_sesv2::{
    Client,
    types::{Body, Content, Destination, EmailContent, Message},
};

use super::NotificationSender;

/// SES 通知送信
///
/// `aws_sdk_sesv2::Client` をラップする。
pub struct SesNotificationSender {
    client: Client,
}

impl SesNotificationSender {
    /// 既存の SES v2 クライアントから送信インスタンスを作成
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// 環境（`AWS_REGION`、IAM ロール等）から認証情報を読み込んで作成する
    pub async fn from_env() -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config))
    }
}

fn content(data: &str, part: &str) -> Result<Content, NotificationError> {
    Content::builder()
        .data(data)
        .build()
        .map_err(|e| NotificationError::SendFailed(format!("{part}構築失敗: {e}")))
}

#[async_trait]
impl NotificationSender for SesNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let destination = Destination::builder().to_addresses(&email.to).build();

        let message = Message::builder()
            .subject(content(&email.subject, "件名")?)
            .body(
                Body::builder()
                    .html(content(&email.html_body, "HTML 本文")?)
                    .text(content(&email.text_body, "テキスト本文")?)
                    .build(),
            )
            .build();

        self.client
            .send_email()
            .from_email_address(&email.from)
            .destination(destination)
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SES 送信失敗: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SesNotificationSender>();
    }

    #[test]
    fn 本文パートを構築できる() {
        let part = content("Hello", "テキスト本文").unwrap();
        assert_eq!(part.data(), "Hello");
    }
}
