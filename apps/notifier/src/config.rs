//! # Notifier 設定
//!
//! 環境変数から予約確認メール通知サービスの設定を読み込む。
//!
//! 読み込みは [`NotifierConfig::from_lookup`] に集約し、テストでは
//! `HashMap` を渡してプロセスの環境変数に触れずに検証する。

use std::{collections::HashMap, env, str::FromStr};

use apptmail_infra::{firestore::FirestoreSettings, notification::SENDGRID_BASE_URL};
use chrono_tz::Tz;
use strum::{Display, EnumString};
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 環境変数の値が不正
    #[error("{name} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        name:   &'static str,
        value:  String,
        reason: String,
    },
}

/// Notifier サービスの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// 監視対象の予約コレクション
    pub appointment_collection: String,
    /// 患者レコードのコレクション
    pub user_collection: String,
    /// Firestore 接続設定
    pub firestore: FirestoreSettings,
    /// 通知設定
    pub notification: NotificationConfig,
    /// 予約日時の表示タイムゾーン
    pub display_timezone: Tz,
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum NotificationBackend {
    /// SendGrid v3 Mail Send API
    SendGrid,
    /// Amazon SES v2
    Ses,
    /// SMTP（開発環境では Mailpit）
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `sendgrid`: SendGrid 経由で送信（`SENDGRID_API_KEY` 必須）
/// - `ses`: Amazon SES v2 経由で送信
/// - `smtp`: Mailpit（開発）/ SMTP サーバー経由で送信
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Clone)]
pub struct NotificationConfig {
    /// 送信バックエンド
    pub backend:           NotificationBackend,
    /// 送信元メールアドレス（送信サービスで検証済みであること）
    pub from_address:      String,
    /// SendGrid API キー（backend=sendgrid の場合に使用）
    pub sendgrid_api_key:  Option<String>,
    /// SendGrid API のベース URL
    pub sendgrid_base_url: String,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:         String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:         u16,
}

impl std::fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("backend", &self.backend)
            .field("from_address", &self.from_address)
            .field(
                "sendgrid_api_key",
                &self.sendgrid_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sendgrid_base_url", &self.sendgrid_base_url)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の変数ソースから設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        Ok(Self {
            host: vars.or("NOTIFIER_HOST", "0.0.0.0"),
            port: vars.parse_or("PORT", 8080)?,
            appointment_collection: vars.or("APPOINTMENT_COLLECTION", "BookAppointments"),
            user_collection: vars.or("USER_COLLECTION", "users"),
            firestore: FirestoreSettings {
                project_id:    vars.required("FIRESTORE_PROJECT_ID")?,
                database_id:   vars.or("FIRESTORE_DATABASE_ID", "(default)"),
                emulator_host: vars.get("FIRESTORE_EMULATOR_HOST"),
                access_token:  vars.get("FIRESTORE_ACCESS_TOKEN"),
            },
            notification: NotificationConfig::from_vars(&vars)?,
            display_timezone: vars.parse_or("APPOINTMENT_TIMEZONE", Tz::UTC)?,
        })
    }

    /// `HashMap` から設定を読み込む（テスト用）
    pub fn from_map(vars: &HashMap<&str, &str>) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| vars.get(name).map(|v| (*v).to_string()))
    }
}

impl NotificationConfig {
    fn from_vars(vars: &Vars<'_>) -> Result<Self, ConfigError> {
        let backend = vars.parse_or("NOTIFICATION_BACKEND", NotificationBackend::Noop)?;
        let sendgrid_api_key = vars.get("SENDGRID_API_KEY");

        if backend == NotificationBackend::SendGrid && sendgrid_api_key.is_none() {
            return Err(ConfigError::Missing("SENDGRID_API_KEY"));
        }

        Ok(Self {
            backend,
            from_address: vars.or("NOTIFICATION_FROM_ADDRESS", "noreply@example.com"),
            sendgrid_api_key,
            sendgrid_base_url: vars.or("SENDGRID_BASE_URL", SENDGRID_BASE_URL),
            smtp_host: vars.or("SMTP_HOST", "localhost"),
            smtp_port: vars.parse_or("SMTP_PORT", 1025)?,
        })
    }
}

/// 変数ソースの読み取りヘルパー
///
/// 空文字列は未設定として扱う。
struct Vars<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Vars<'_> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.get(name).ok_or(ConfigError::Missing(name))
    }

    fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            }),
        }
    }
}
