//! # apptmail ドメイン層
//!
//! 予約確認メール通知の中核となるドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（Firestore、メール送信 API）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`error`] - 値オブジェクト生成時のバリデーションエラー
//! - [`appointment`] - 予約ドキュメントのスナップショットと検証済み予約
//! - [`patient`] - 患者レコードとメールアドレス
//! - [`notification`] - 送信メッセージと確認メール処理の結果分類
//!
//! ## 使用例
//!
//! ```rust
//! use apptmail_domain::appointment::{Appointment, AppointmentSnapshot};
//! use chrono::{TimeZone, Utc};
//!
//! let snapshot = AppointmentSnapshot {
//!     appointment_id:   None,
//!     patient_id:       Some("patient-1".to_string()),
//!     appointment_date: Some(Utc.with_ymd_and_hms(2026, 10, 19, 14, 30, 0).unwrap()),
//! };
//! let appointment = Appointment::try_from_snapshot(snapshot).unwrap();
//! assert_eq!(appointment.patient_id().as_str(), "patient-1");
//! ```

#[macro_use]
mod macros;

pub mod appointment;
pub mod error;
pub mod notification;
pub mod patient;

pub use error::DomainError;
