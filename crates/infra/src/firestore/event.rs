//! ドキュメント変更イベントのペイロード
//!
//! イベント配信基盤が push するドキュメント作成イベントの JSON 表現。
//!
//! ```json
//! {
//!   "value":      { "name": ".../documents/BookAppointments/{id}", "fields": { ... } },
//!   "oldValue":   {},
//!   "updateMask": {}
//! }
//! ```

use serde::Deserialize;

use super::FirestoreDocument;
use crate::error::InfraError;

/// 更新されたフィールドパスの一覧（作成イベントでは空）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMask {
    #[serde(default)]
    pub field_paths: Vec<String>,
}

/// ドキュメント変更イベント
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventPayload {
    /// 変更後のドキュメント
    pub value:       Option<FirestoreDocument>,
    /// 変更前のドキュメント（作成イベントでは空）
    pub old_value:   Option<FirestoreDocument>,
    pub update_mask: Option<DocumentMask>,
}

impl DocumentEventPayload {
    /// リクエストボディをパースする
    pub fn from_slice(body: &[u8]) -> Result<Self, InfraError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// 作成されたドキュメントを取り出す
    ///
    /// `value` が無い、または空オブジェクトの場合は `None`。
    pub fn into_created_document(self) -> Option<FirestoreDocument> {
        self.value.filter(|doc| !doc.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_作成イベントからドキュメントを取り出す() {
        let body = br#"{
            "oldValue": {},
            "updateMask": {},
            "value": {
                "name": "projects/p/databases/(default)/documents/BookAppointments/appt-1",
                "fields": { "patientId": { "stringValue": "patient-1" } }
            }
        }"#;

        let payload = DocumentEventPayload::from_slice(body).unwrap();
        let doc = payload.into_created_document().unwrap();

        assert_eq!(doc.document_id(), Some("appt-1"));
    }

    #[test]
    fn test_valueが空オブジェクトの場合はnone() {
        let payload = DocumentEventPayload::from_slice(br#"{"value": {}}"#).unwrap();
        assert!(payload.into_created_document().is_none());
    }

    #[test]
    fn test_valueが無い場合はnone() {
        let payload = DocumentEventPayload::from_slice(b"{}").unwrap();
        assert!(payload.into_created_document().is_none());
    }

    #[test]
    fn test_jsonでないボディはエラー() {
        assert!(DocumentEventPayload::from_slice(b"").is_err());
        assert!(DocumentEventPayload::from_slice(b"not json").is_err());
    }
}
