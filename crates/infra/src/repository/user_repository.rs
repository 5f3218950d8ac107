//! # UserRepository
//!
//! `users` コレクションから患者レコードを取得するリポジトリ。

use apptmail_domain::{appointment::PatientId, patient::PatientRecord};
use async_trait::async_trait;

use crate::{error::InfraError, firestore::FirestoreClient};

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 患者 ID（ドキュメント ID）で患者レコードを検索
    ///
    /// # 戻り値
    ///
    /// - `Ok(Some(record))`: レコードが見つかった場合
    /// - `Ok(None)`: レコードが見つからない場合
    /// - `Err(_)`: 通信エラー等
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<PatientRecord>, InfraError>;
}

/// Firestore 実装の UserRepository
#[derive(Debug, Clone)]
pub struct FirestoreUserRepository {
    client:     FirestoreClient,
    collection: String,
}

impl FirestoreUserRepository {
    /// 新しいリポジトリインスタンスを作成
    ///
    /// # 引数
    ///
    /// - `client`: Firestore クライアント
    /// - `collection`: ユーザーコレクション名（通常は `users`）
    pub fn new(client: FirestoreClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl UserRepository for FirestoreUserRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<PatientRecord>, InfraError> {
        let document = self
            .client
            .get_document(&self.collection, id.as_str())
            .await?;

        Ok(document.map(|doc| doc.to_patient_record(id.clone())))
    }
}
