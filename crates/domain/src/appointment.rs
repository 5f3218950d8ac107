//! # 予約
//!
//! トリガーイベントで受け取る予約ドキュメントを表現する。
//!
//! ## 設計方針
//!
//! - **スナップショットと検証済みモデルの分離**: 外部から届く緩い構造は
//!   [`AppointmentSnapshot`] で受け、[`Appointment::try_from_snapshot`] で
//!   型付きの [`Appointment`] か [`ConfirmationError`] に変換する
//! - **読み取り専用**: 予約ドキュメントは上流の予約フローが所有する

use chrono::{DateTime, Utc};

use crate::notification::ConfirmationError;

define_document_id! {
    /// 予約 ID（`BookAppointments` コレクションのドキュメント ID）
    ///
    /// ログの相関付けにのみ使用する。
    pub struct AppointmentId("予約 ID");
}

define_document_id! {
    /// 患者 ID（`users` コレクションのドキュメント ID）
    ///
    /// 予約ドキュメントの `patientId` フィールドの値で、
    /// そのまま `users/{patientId}` の検索に使う。
    pub struct PatientId("患者 ID");
}

/// 予約ドキュメントのスナップショット
///
/// トリガーイベントのドキュメントからフィールドを取り出しただけの、
/// 未検証の状態。存在しないフィールドは `None` になる。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentSnapshot {
    pub appointment_id:   Option<AppointmentId>,
    pub patient_id:       Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
}

/// 検証済みの予約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    id:               Option<AppointmentId>,
    patient_id:       PatientId,
    appointment_date: DateTime<Utc>,
}

impl Appointment {
    /// スナップショットを検証して予約を作成する
    ///
    /// # エラー
    ///
    /// - `patient_id` が無い、空白だけ、またはドキュメント ID として不正 → [`ConfirmationError::MissingPatientId`]
    /// - `appointment_date` が無い → [`ConfirmationError::MissingAppointmentDate`]
    pub fn try_from_snapshot(snapshot: AppointmentSnapshot) -> Result<Self, ConfirmationError> {
        let patient_id = snapshot
            .patient_id
            .and_then(|raw| PatientId::new(raw).ok())
            .ok_or(ConfirmationError::MissingPatientId)?;

        let appointment_date = snapshot
            .appointment_date
            .ok_or(ConfirmationError::MissingAppointmentDate)?;

        Ok(Self {
            id: snapshot.appointment_id,
            patient_id,
            appointment_date,
        })
    }

    pub fn id(&self) -> Option<&AppointmentId> {
        self.id.as_ref()
    }

    pub fn patient_id(&self) -> &PatientId {
        &self.patient_id
    }

    pub fn appointment_date(&self) -> DateTime<Utc> {
        self.appointment_date
    }
}
