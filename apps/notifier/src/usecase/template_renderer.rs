//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで予約確認メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれ、
//!   実行時に差し替えることはできない
//! - **件名は固定**: [`CONFIRMATION_SUBJECT`]
//! - **日時の表示**: 予約日時は設定されたタイムゾーンに変換し、
//!   `Monday, October 19, 2026 at 2:30 PM UTC` の形式で埋め込む

use apptmail_domain::notification::{
    AppointmentConfirmation,
    CONFIRMATION_SUBJECT,
    EmailMessage,
    NotificationError,
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "appointment_confirmation";

/// 予約日時の表示形式
const DISPLAY_DATE_FORMAT: &str = "%A, %B %-d, %Y at %-I:%M %p %Z";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`AppointmentConfirmation` から
/// `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine:   Tera,
    timezone: Tz,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new(timezone: Tz) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "appointment_confirmation.html",
                    include_str!("../../templates/appointment_confirmation.html"),
                ),
                (
                    "appointment_confirmation.txt",
                    include_str!("../../templates/appointment_confirmation.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine, timezone })
    }

    /// 予約日時を表示用の文字列に変換する
    pub fn format_date(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.timezone)
            .format(DISPLAY_DATE_FORMAT)
            .to_string()
    }

    /// 予約確認イベントからメールメッセージを生成する
    ///
    /// # 引数
    ///
    /// - `confirmation`: 予約確認通知イベント
    /// - `from_address`: 送信元メールアドレス
    pub fn render(
        &self,
        confirmation: &AppointmentConfirmation,
        from_address: &str,
    ) -> Result<EmailMessage, NotificationError> {
        let mut context = Context::new();
        context.insert(
            "appointment_date",
            &self.format_date(confirmation.appointment_date),
        );

        let html_body = self
            .engine
            .render(&format!("{TEMPLATE_NAME}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{TEMPLATE_NAME}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            from: from_address.to_string(),
            to: confirmation.recipient.as_str().to_string(),
            subject: CONFIRMATION_SUBJECT.to_string(),
            html_body,
            text_body,
        })
    }
}

#[cfg(test)]
mod tests {
    use apptmail_domain::{appointment::PatientId, patient::Email};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn confirmation(date: DateTime<Utc>) -> AppointmentConfirmation {
        AppointmentConfirmation {
            appointment_id:   None,
            patient_id:       PatientId::new("patient-1").unwrap(),
            recipient:        Email::new("patient@example.com").unwrap(),
            appointment_date: date,
        }
    }

    fn date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_確認メールの本文と件名を生成する() {
        let renderer = TemplateRenderer::new(Tz::UTC).unwrap();

        let email = renderer
            .render(&confirmation(date()), "clinic@example.com")
            .unwrap();

        assert_eq!(
            email,
            EmailMessage {
                from:      "clinic@example.com".to_string(),
                to:        "patient@example.com".to_string(),
                subject:   "Appointment Confirmation".to_string(),
                html_body: "<strong>Hello, your appointment is confirmed for Monday, October 19, 2026 at 2:30 PM UTC.</strong>".to_string(),
                text_body: "Hello, your appointment is confirmed for Monday, October 19, 2026 at 2:30 PM UTC.".to_string(),
            }
        );
    }

    #[rstest]
    #[case(Tz::UTC, "Monday, October 19, 2026 at 2:30 PM UTC")]
    #[case(chrono_tz::Asia::Tokyo, "Monday, October 19, 2026 at 11:30 PM JST")]
    #[case(chrono_tz::America::New_York, "Monday, October 19, 2026 at 10:30 AM EDT")]
    fn test_設定したタイムゾーンで日時を表示する(#[case] timezone: Tz, #[case] expected: &str) {
        let renderer = TemplateRenderer::new(timezone).unwrap();

        assert_eq!(renderer.format_date(date()), expected);
    }

    #[test]
    fn test_タイムゾーン変換で日付が変わる場合は変換後の日付を表示する() {
        let renderer = TemplateRenderer::new(chrono_tz::Asia::Tokyo).unwrap();
        let late_night = Utc.with_ymd_and_hms(2026, 10, 19, 16, 5, 0).unwrap();

        assert_eq!(
            renderer.format_date(late_night),
            "Tuesday, October 20, 2026 at 1:05 AM JST"
        );
    }
}
