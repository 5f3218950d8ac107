//! SendGrid 通知送信実装
//!
//! SendGrid v3 Mail Send API（`POST /v3/mail/send`）でメールを送信する。
//! 送信元アドレスは SendGrid 側で Sender Verification 済みであること。
//!
//! 成功時は `202 Accepted` が返る。それ以外のステータスはすべて送信失敗とし、
//! レスポンスボディ（`{"errors": [...]}`）をエラーに含める。

use apptmail_domain::notification::{EmailMessage, NotificationError};
use async_trait::async_trait;
use serde::Serialize;

use super::NotificationSender;

/// SendGrid API のベース URL
pub const SENDGRID_BASE_URL: &str = "https://api.sendgrid.com";

/// SendGrid 通知送信
pub struct SendGridNotificationSender {
    client:   reqwest::Client,
    base_url: String,
    api_key:  String,
}

impl SendGridNotificationSender {
    /// 新しい SendGrid 送信インスタンスを作成
    ///
    /// # 引数
    ///
    /// - `base_url`: API のベース URL（通常は [`SENDGRID_BASE_URL`]）
    /// - `api_key`: `mail.send` 権限を持つ API キー
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client:   reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key:  api_key.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from:             Address<'a>,
    subject:          &'a str,
    content:          [Content<'a>; 2],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'static str,
    value:        &'a str,
}

impl<'a> MailSendRequest<'a> {
    /// text/plain → text/html の順で格納する（SendGrid の要求する順序）
    fn from_message(email: &'a EmailMessage) -> Self {
        Self {
            personalizations: [Personalization {
                to: [Address { email: &email.to }],
            }],
            from:             Address { email: &email.from },
            subject:          &email.subject,
            content:          [
                Content {
                    content_type: "text/plain",
                    value:        &email.text_body,
                },
                Content {
                    content_type: "text/html",
                    value:        &email.html_body,
                },
            ],
        }
    }
}

#[async_trait]
impl NotificationSender for SendGridNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(format!("{}/v3/mail/send", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&MailSendRequest::from_message(email))
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SendGrid 接続失敗: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotificationError::SendFailed(format!(
            "SendGrid 送信失敗: {status}: {body}"
        )))
    }
}
