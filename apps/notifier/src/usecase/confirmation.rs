//! # 予約確認ユースケース
//!
//! 予約ドキュメントの作成を受けて、患者に確認メールを送信する。
//!
//! ## 処理の流れ
//!
//! 1. スナップショットを検証して [`Appointment`] にする
//! 2. 患者 ID で患者レコードを取得する
//! 3. メールアドレスを取り出し、メッセージを組み立てる
//! 4. 送信 API を呼び出し、応答を待つ
//!
//! ## 設計方針
//!
//! - **結果を返すだけ**: ログ出力と完了通知はトリガーハンドラが担う。
//!   ユースケースは [`ConfirmationError`] で終了理由を分類して返す
//! - **依存性注入**: `UserRepository` と `NotificationSender` は trait で抽象化
//! - **再送しない**: 送信失敗はそのまま返し、リトライは行わない

use std::sync::Arc;

use apptmail_domain::{
    appointment::{Appointment, AppointmentSnapshot},
    notification::{
        AppointmentConfirmation,
        ConfirmationError,
        ConfirmationReceipt,
        NotificationError,
    },
    patient::Email,
};
use apptmail_infra::{notification::NotificationSender, repository::UserRepository};

use super::TemplateRenderer;

/// 予約確認ユースケース
pub struct AppointmentConfirmationUseCase {
    user_repository:   Arc<dyn UserRepository>,
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
    from_address:      String,
}

impl AppointmentConfirmationUseCase {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            user_repository,
            sender,
            template_renderer,
            from_address: from_address.into(),
        }
    }

    /// 予約確認メールを送信する
    ///
    /// `snapshot` が `None` の場合はトリガーペイロードが無かったものとして扱う。
    ///
    /// # エラー
    ///
    /// いずれの場合も送信は行われない（`DeliveryFailed` は送信 API が失敗を返した場合）。
    ///
    /// - ペイロードが無い → [`ConfirmationError::MissingPayload`]
    /// - 患者 ID / 予約日時が無い → `MissingPatientId` / `MissingAppointmentDate`
    /// - 患者レコードが無い → `PatientNotFound`
    /// - メールアドレスが無い → `MissingEmail`
    /// - 患者レコードの取得に失敗 → `PatientLookupFailed`
    /// - 宛先が不正、またはメール送信に失敗 → `DeliveryFailed`
    #[tracing::instrument(skip_all)]
    pub async fn confirm(
        &self,
        snapshot: Option<AppointmentSnapshot>,
    ) -> Result<ConfirmationReceipt, ConfirmationError> {
        let snapshot = snapshot.ok_or(ConfirmationError::MissingPayload)?;
        let appointment = Appointment::try_from_snapshot(snapshot)?;
        let patient_id = appointment.patient_id().clone();

        let record = self
            .user_repository
            .find_by_id(&patient_id)
            .await
            .map_err(|e| {
                tracing::debug!(span_trace = %e.span_trace(), "患者レコードの取得に失敗");
                ConfirmationError::PatientLookupFailed {
                    patient_id: patient_id.clone(),
                    reason:     e.to_string(),
                }
            })?
            .ok_or_else(|| ConfirmationError::PatientNotFound {
                patient_id: patient_id.clone(),
            })?;

        let address = record
            .contact_address()
            .ok_or_else(|| ConfirmationError::MissingEmail {
                patient_id: patient_id.clone(),
            })?;
        let recipient = Email::new(address)
            .map_err(|e| NotificationError::InvalidAddress(format!("{address}: {e}")))?;

        let confirmation = AppointmentConfirmation {
            appointment_id: appointment.id().cloned(),
            patient_id,
            recipient,
            appointment_date: appointment.appointment_date(),
        };

        let email = self
            .template_renderer
            .render(&confirmation, &self.from_address)?;
        self.sender.send_email(&email).await?;

        Ok(ConfirmationReceipt {
            appointment_id: confirmation.appointment_id,
            patient_id:     confirmation.patient_id,
            recipient:      confirmation.recipient,
        })
    }
}
