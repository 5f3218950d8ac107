//! Firestore ドキュメントの JSON 表現
//!
//! REST API のレスポンスと、ドキュメント作成トリガーのイベントペイロードは
//! 同じ型付き JSON 表現（`{"stringValue": "..."}` 等）を使う。
//!
//! → <https://cloud.google.com/firestore/docs/reference/rest/v1/Value>

use std::collections::HashMap;

use apptmail_domain::{
    appointment::{AppointmentId, AppointmentSnapshot, PatientId},
    patient::PatientRecord,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::InfraError;

/// 予約ドキュメントの患者 ID フィールド
pub const PATIENT_ID_FIELD: &str = "patientId";
/// 予約ドキュメントの予約日時フィールド
pub const APPOINTMENT_DATE_FIELD: &str = "appointmentDate";
/// ユーザードキュメントのメールアドレスフィールド
pub const EMAIL_FIELD: &str = "email";

/// Firestore のフィールド値
///
/// 外部タグ付き enum として `{"<型名>Value": <値>}` の形をそのまま受ける。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FirestoreValue {
    NullValue,
    BooleanValue(bool),
    /// int64 は JSON 上で文字列として表現される
    IntegerValue(String),
    DoubleValue(f64),
    TimestampValue(DateTime<Utc>),
    StringValue(String),
    /// base64 エンコード済み
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(LatLng),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

impl FirestoreValue {
    /// ログ用の型名
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::NullValue => "null",
            Self::BooleanValue(_) => "boolean",
            Self::IntegerValue(_) => "integer",
            Self::DoubleValue(_) => "double",
            Self::TimestampValue(_) => "timestamp",
            Self::StringValue(_) => "string",
            Self::BytesValue(_) => "bytes",
            Self::ReferenceValue(_) => "reference",
            Self::GeoPointValue(_) => "geo_point",
            Self::ArrayValue(_) => "array",
            Self::MapValue(_) => "map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LatLng {
    #[serde(default)]
    pub latitude:  f64,
    #[serde(default)]
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ArrayValue {
    #[serde(default)]
    pub values: Vec<FirestoreValue>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

/// Firestore ドキュメント
///
/// `name` は `projects/{project}/databases/{db}/documents/{collection}/{id}` 形式の
/// リソース名。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    #[serde(default)]
    pub name:        String,
    #[serde(default)]
    pub fields:      HashMap<String, FirestoreValue>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl FirestoreDocument {
    /// 名前もフィールドも持たない（削除イベント等の空オブジェクト）
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.fields.is_empty()
    }

    /// リソース名の末尾（ドキュメント ID）
    pub fn document_id(&self) -> Option<&str> {
        self.path_segments().last().copied()
    }

    /// ドキュメントが属するコレクションのパス（`/documents/` 以降からドキュメント ID を除いたもの）
    ///
    /// トップレベルなら `BookAppointments`、サブコレクションなら
    /// `clinics/c1/BookAppointments` になる。リソース名が無い、または不正なら `None`。
    pub fn collection_path(&self) -> Option<&str> {
        let (_, path) = self.name.split_once("/documents/")?;
        let (collection, id) = path.trim_matches('/').rsplit_once('/')?;
        (!collection.is_empty() && !id.is_empty()).then_some(collection)
    }

    fn path_segments(&self) -> Vec<&str> {
        self.name
            .split_once("/documents/")
            .map(|(_, path)| path.split('/').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    /// 文字列フィールドを取得する
    ///
    /// - フィールドが無い / null → `Ok(None)`
    /// - 文字列以外の型 → `Err`
    pub fn string_field(&self, name: &str) -> Result<Option<&str>, InfraError> {
        match self.fields.get(name) {
            None | Some(FirestoreValue::NullValue) => Ok(None),
            Some(FirestoreValue::StringValue(value)) => Ok(Some(value)),
            Some(other) => Err(InfraError::invalid_document(format!(
                "{name} は string である必要があります（実際: {}）",
                other.type_name()
            ))),
        }
    }

    /// タイムスタンプフィールドを取得する
    pub fn timestamp_field(&self, name: &str) -> Result<Option<DateTime<Utc>>, InfraError> {
        match self.fields.get(name) {
            None | Some(FirestoreValue::NullValue) => Ok(None),
            Some(FirestoreValue::TimestampValue(value)) => Ok(Some(*value)),
            Some(other) => Err(InfraError::invalid_document(format!(
                "{name} は timestamp である必要があります（実際: {}）",
                other.type_name()
            ))),
        }
    }

    /// 予約ドキュメントとしてスナップショットに変換する
    ///
    /// 型が合わないフィールドは警告を出して欠落として扱う。
    /// 欠落の判定はドメイン側の検証に委ねる。
    pub fn to_appointment_snapshot(&self) -> AppointmentSnapshot {
        let patient_id = lenient(self.string_field(PATIENT_ID_FIELD), PATIENT_ID_FIELD)
            .map(str::to_string);
        let appointment_date = lenient(
            self.timestamp_field(APPOINTMENT_DATE_FIELD),
            APPOINTMENT_DATE_FIELD,
        );

        AppointmentSnapshot {
            appointment_id: self
                .document_id()
                .and_then(|id| AppointmentId::new(id).ok()),
            patient_id,
            appointment_date,
        }
    }

    /// ユーザードキュメントとして患者レコードに変換する
    pub fn to_patient_record(&self, id: PatientId) -> PatientRecord {
        let email = lenient(self.string_field(EMAIL_FIELD), EMAIL_FIELD).map(str::to_string);
        PatientRecord::new(id, email)
    }
}

fn lenient<T>(result: Result<Option<T>, InfraError>, field: &str) -> Option<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(field, error = %e, "フィールドの型が不正なため欠落として扱う");
        None
    })
}
