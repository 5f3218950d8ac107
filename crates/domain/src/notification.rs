//! # 通知
//!
//! 予約確認メールに関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`EmailMessage`] | 送信メッセージ（1 回の送信呼び出しの間だけ存在する） |
//! | [`AppointmentConfirmation`] | 予約確認通知イベント |
//! | [`ConfirmationError`] | 確認メールを送らずに終了した理由 |
//! | [`ConfirmationReceipt`] | 送信成功の記録（ログ出力用） |
//!
//! ## 設計方針
//!
//! - **結果型による分類**: 処理の失敗はすべて [`ConfirmationError`] のバリアントで表現し、
//!   ログ出力と完了通知への正規化はトリガーアダプタが担う
//! - **送信済みフラグは持たない**: 同一イベントの再配信は重複送信になる

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    appointment::{AppointmentId, PatientId},
    patient::Email,
};

/// 確認メールの件名
pub const CONFIRMATION_SUBJECT: &str = "Appointment Confirmation";

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// 宛先アドレスが不正
    #[error("宛先アドレスが不正: {0}")]
    InvalidAddress(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信元メールアドレス（送信サービスで検証済みであること）
    pub from:      String,
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// 予約確認通知イベント
///
/// 患者レコードの解決まで完了し、あとはメッセージを組み立てて送るだけの状態。
#[derive(Debug, Clone)]
pub struct AppointmentConfirmation {
    pub appointment_id:   Option<AppointmentId>,
    pub patient_id:       PatientId,
    pub recipient:        Email,
    pub appointment_date: DateTime<Utc>,
}

/// 確認メール送信の成功記録
#[derive(Debug, Clone)]
pub struct ConfirmationReceipt {
    pub appointment_id: Option<AppointmentId>,
    pub patient_id:     PatientId,
    pub recipient:      Email,
}

/// 確認メールを送信せずに終了した理由
///
/// いずれもトリガーの呼び出し元には伝播させない。
#[derive(Debug, Error)]
pub enum ConfirmationError {
    /// トリガーペイロードにドキュメントが含まれていない
    #[error("予約データが見つかりません")]
    MissingPayload,

    /// 予約ドキュメントに患者 ID が無い
    #[error("患者 ID が見つかりません")]
    MissingPatientId,

    /// 予約ドキュメントに予約日時が無い
    #[error("予約日時が見つかりません")]
    MissingAppointmentDate,

    /// 患者 ID に対応する患者レコードが存在しない
    #[error("患者 ID に対応するユーザーが見つかりません: {patient_id}")]
    PatientNotFound { patient_id: PatientId },

    /// 患者レコードにメールアドレスが無い
    #[error("患者 ID のメールアドレスが見つかりません: {patient_id}")]
    MissingEmail { patient_id: PatientId },

    /// 患者レコードの取得に失敗
    #[error("患者レコードの取得に失敗: {patient_id}: {reason}")]
    PatientLookupFailed {
        patient_id: PatientId,
        reason:     String,
    },

    /// メール送信 API の呼び出しに失敗
    #[error("確認メールの送信に失敗: {0}")]
    DeliveryFailed(#[from] NotificationError),
}

impl ConfirmationError {
    /// エラーに関係する患者 ID を返す
    pub fn patient_id(&self) -> Option<&PatientId> {
        match self {
            Self::PatientNotFound { patient_id }
            | Self::MissingEmail { patient_id }
            | Self::PatientLookupFailed { patient_id, .. } => Some(patient_id),
            Self::MissingPayload
            | Self::MissingPatientId
            | Self::MissingAppointmentDate
            | Self::DeliveryFailed(_) => None,
        }
    }
}
