//! # 患者
//!
//! `users` コレクションの患者レコードと、その連絡先メールアドレスを表現する。
//!
//! 患者レコードはユーザー管理システムが所有し、本サービスからは読み取りのみ行う。

use serde::{Deserialize, Serialize};

use crate::{DomainError, appointment::PatientId};

/// メールアドレス（値オブジェクト）
///
/// 確認メールの宛先として使えることだけを保証する。RFC 5322 の厳密な検証は
/// 送信サービスに任せ、ここでは明らかに宛先にならない値を弾く。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

/// メールアドレスの上限（RFC 5321 のパス長）
const MAX_EMAIL_LENGTH: usize = 254;

impl Email {
    /// 前後の空白を除去して検証する
    ///
    /// - 空ではない
    /// - `@` がちょうど 1 つで、その前後が空ではない
    /// - 空白を含まない
    /// - 254 バイト以内
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let value = value.trim();

        let invalid = |reason: &str| DomainError::Validation(format!("メールアドレス{reason}: {value:?}"));

        if value.is_empty() {
            return Err(DomainError::Validation("メールアドレスは必須です".to_string()));
        }
        if value.len() > MAX_EMAIL_LENGTH {
            return Err(invalid("が長すぎます"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(invalid("に空白は使用できません"));
        }
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(Self(value.to_string()))
            }
            _ => Err(invalid("の形式が不正です")),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 患者レコード
///
/// `email` はユーザー管理側で未登録の場合があるため `Option` で保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub id:    PatientId,
    pub email: Option<String>,
}

impl PatientRecord {
    pub fn new(id: PatientId, email: Option<String>) -> Self {
        Self { id, email }
    }

    /// 送信に使える連絡先アドレスを返す
    ///
    /// 未登録・空文字列・空白のみの場合は `None`。
    pub fn contact_address(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
