//! # トリガーハンドラ
//!
//! Firestore のドキュメント作成イベント（Eventarc のプッシュ配信）を受け取り、
//! 予約確認ユースケースを実行する。
//!
//! ## エンドポイント
//!
//! ```text
//! POST /
//! POST /events/appointment-created
//! ```
//!
//! ## 設計方針
//!
//! - **常に完了を返す**: どの経路でも `200 {"status": "completed"}` を返し、
//!   配信基盤にリトライさせない
//! - **結果はログで報告**: 成功は `log_business_event!`、
//!   失敗は `error.category` / `error.kind` 付きの `tracing::error!` で出力する
//! - **不正なボディ**: JSON として解析できないボディや、リソース名の無いドキュメントは
//!   「ペイロードが無い」ものとして扱う
//! - **コレクションの判定**: コレクションのフルパスで比較し、
//!   同名のサブコレクションは監視対象外とする

use std::sync::Arc;

use apptmail_domain::notification::{ConfirmationError, ConfirmationReceipt};
use apptmail_infra::firestore::DocumentEventPayload;
use apptmail_shared::{
    event_log::{error, event},
    log_business_event,
};
use axum::{Json, body::Bytes, extract::State};
use serde::Serialize;

use crate::usecase::AppointmentConfirmationUseCase;

/// トリガーハンドラの State
pub struct TriggerState {
    pub usecase:                AppointmentConfirmationUseCase,
    /// 監視対象の予約コレクション
    pub appointment_collection: String,
}

/// 完了通知レスポンス
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub status: &'static str,
}

impl CompletionResponse {
    fn completed() -> Json<Self> {
        Json(Self {
            status: "completed",
        })
    }
}

/// 予約ドキュメント作成イベントを処理する
#[tracing::instrument(skip_all, fields(appointment.id))]
pub async fn handle_appointment_created(
    State(state): State<Arc<TriggerState>>,
    body: Bytes,
) -> Json<CompletionResponse> {
    let document = match DocumentEventPayload::from_slice(&body) {
        Ok(payload) => payload.into_created_document(),
        Err(e) => {
            tracing::warn!(error = %e, "トリガーペイロードを解析できません");
            None
        }
    };

    let appointment_id = document
        .as_ref()
        .and_then(|doc| doc.document_id())
        .unwrap_or_default()
        .to_string();
    tracing::Span::current().record("appointment.id", appointment_id.as_str());

    if let Some(doc) = &document {
        let Some(collection) = doc.collection_path() else {
            tracing::warn!(document = %doc.name, "イベントのドキュメントにリソース名がありません");
            report(&appointment_id, &Err(ConfirmationError::MissingPayload));
            return CompletionResponse::completed();
        };
        if collection != state.appointment_collection {
            log_business_event!(
                event.category = event::category::TRIGGER,
                event.action = event::action::EVENT_IGNORED,
                event.entity_type = event::entity_type::APPOINTMENT,
                event.entity_id = %appointment_id,
                event.result = event::result::SUCCESS,
                trigger.collection = collection,
                "監視対象外のコレクションのイベントを無視"
            );
            tracing::warn!(
                document = %doc.name,
                expected = %state.appointment_collection,
                "監視対象外のコレクションのイベントを受信"
            );
            return CompletionResponse::completed();
        }
    }

    let snapshot = document.map(|doc| doc.to_appointment_snapshot());
    let outcome = state.usecase.confirm(snapshot).await;
    report(&appointment_id, &outcome);

    CompletionResponse::completed()
}

/// 処理結果をログに出力する
fn report(appointment_id: &str, outcome: &Result<ConfirmationReceipt, ConfirmationError>) {
    match outcome {
        Ok(receipt) => {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::CONFIRMATION_SENT,
                event.entity_type = event::entity_type::APPOINTMENT,
                event.entity_id = %appointment_id,
                event.result = event::result::SUCCESS,
                patient.id = %receipt.patient_id,
                notification.recipient = %receipt.recipient,
                "予約確認メール送信成功: {}",
                receipt.recipient
            );
        }
        Err(e) => {
            let (category, kind) = error_context(e);
            let patient_id = e
                .patient_id()
                .map(|id| id.as_str())
                .unwrap_or_default();

            tracing::error!(
                error.category = category,
                error.kind = kind,
                event.entity_id = %appointment_id,
                patient.id = patient_id,
                "予約確認メールを送信できませんでした: {e}"
            );

            let action = if matches!(e, ConfirmationError::DeliveryFailed(_)) {
                event::action::CONFIRMATION_FAILED
            } else {
                event::action::CONFIRMATION_SKIPPED
            };
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = action,
                event.entity_type = event::entity_type::APPOINTMENT,
                event.entity_id = %appointment_id,
                event.result = event::result::FAILURE,
                error.kind = kind,
                "予約確認メール未送信"
            );
        }
    }
}

/// エラーを `error.category` / `error.kind` に分類する
fn error_context(e: &ConfirmationError) -> (&'static str, &'static str) {
    match e {
        ConfirmationError::MissingPayload => {
            (error::category::INVALID_INPUT, error::kind::MISSING_PAYLOAD)
        }
        ConfirmationError::MissingPatientId => {
            (error::category::INVALID_INPUT, error::kind::MISSING_PATIENT_ID)
        }
        ConfirmationError::MissingAppointmentDate => (
            error::category::INVALID_INPUT,
            error::kind::MISSING_APPOINTMENT_DATE,
        ),
        ConfirmationError::PatientNotFound { .. } => (
            error::category::DATA_INTEGRITY,
            error::kind::PATIENT_NOT_FOUND,
        ),
        ConfirmationError::MissingEmail { .. } => {
            (error::category::DATA_INTEGRITY, error::kind::MISSING_EMAIL)
        }
        ConfirmationError::PatientLookupFailed { .. } => {
            (error::category::EXTERNAL_SERVICE, error::kind::USER_LOOKUP)
        }
        ConfirmationError::DeliveryFailed(_) => {
            (error::category::EXTERNAL_SERVICE, error::kind::EMAIL_DELIVERY)
        }
    }
}

#[cfg(test)]
mod tests {
    use apptmail_domain::{appointment::PatientId, notification::NotificationError};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn patient_id() -> PatientId {
        PatientId::new("patient-1").unwrap()
    }

    #[rstest]
    #[case(ConfirmationError::MissingPayload, "invalid_input", "missing_payload")]
    #[case(ConfirmationError::MissingPatientId, "invalid_input", "missing_patient_id")]
    #[case(ConfirmationError::MissingAppointmentDate, "invalid_input", "missing_appointment_date")]
    #[case(ConfirmationError::PatientNotFound { patient_id: patient_id() }, "data_integrity", "patient_not_found")]
    #[case(ConfirmationError::MissingEmail { patient_id: patient_id() }, "data_integrity", "missing_email")]
    #[case(
        ConfirmationError::PatientLookupFailed { patient_id: patient_id(), reason: "timeout".to_string() },
        "external_service",
        "user_lookup"
    )]
    #[case(
        ConfirmationError::DeliveryFailed(NotificationError::SendFailed("503".to_string())),
        "external_service",
        "email_delivery"
    )]
    fn test_エラーをカテゴリと種別に分類する(
        #[case] error: ConfirmationError,
        #[case] category: &str,
        #[case] kind: &str,
    ) {
        assert_eq!(error_context(&error), (category, kind));
    }

    #[test]
    fn test_完了レスポンスのjson形状() {
        let Json(response) = CompletionResponse::completed();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "status": "completed" })
        );
    }
}
