//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! apptmail-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use apptmail_domain::{
    appointment::PatientId,
    notification::{EmailMessage, NotificationError},
    patient::PatientRecord,
};
use async_trait::async_trait;

use crate::{error::InfraError, notification::NotificationSender, repository::UserRepository};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    records:   Arc<Mutex<Vec<PatientRecord>>>,
    lookups:   Arc<Mutex<Vec<PatientId>>>,
    fail_with: Option<String>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての検索を失敗させるモックを作成する
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn add_patient(&self, id: &str, email: Option<&str>) {
        let record = PatientRecord::new(
            PatientId::new(id).expect("テスト用の患者 ID が不正"),
            email.map(str::to_string),
        );
        self.records.lock().unwrap().push(record);
    }

    /// これまでに検索された患者 ID
    pub fn lookups(&self) -> Vec<PatientId> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<PatientRecord>, InfraError> {
        self.lookups.lock().unwrap().push(id.clone());

        if let Some(message) = &self.fail_with {
            return Err(InfraError::unexpected(message.clone()));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }
}

// ===== MockNotificationSender =====

#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:      Arc<Mutex<Vec<EmailMessage>>>,
    fail_with: Option<String>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// すべての送信を失敗させるモックを作成する
    ///
    /// 失敗した送信も [`sent_emails`](Self::sent_emails) に記録される。
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// 送信要求されたメッセージ
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.sent.lock().unwrap().push(email.clone());

        match &self.fail_with {
            Some(message) => Err(NotificationError::SendFailed(message.clone())),
            None => Ok(()),
        }
    }
}
