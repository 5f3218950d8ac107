//! # 構造化ログのフィールド規約
//!
//! 予約確認の結果は 1 件のイベントにつき 1 行の構造化ログで報告する。
//! JSON 出力では `event.category` などのドット付きフィールドがそのままキーになるので、
//! Cloud Logging のクエリ（`jsonPayload."event.action"="confirmation.sent"`）で絞り込める。
//!
//! - 結果の記録: [`log_business_event!`]（`event.kind = "business_event"` を付与）
//! - 失敗の詳細: `tracing::error!` に [`error::category`] / [`error::kind`] の定数を付ける

/// 結果イベントを info レベルで出力する
///
/// `event.category` / `event.action` / `event.result` は必ず付けること。
/// 対象が特定できる場合は `event.entity_type` / `event.entity_id` も付ける。
///
/// ```ignore
/// log_business_event!(
///     event.category = event::category::NOTIFICATION,
///     event.action = event::action::CONFIRMATION_SENT,
///     event.result = event::result::SUCCESS,
///     "予約確認メール送信成功"
/// );
/// ```
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const NOTIFICATION: &str = "notification";
        pub const TRIGGER: &str = "trigger";
    }

    /// イベントアクション
    pub mod action {
        pub const CONFIRMATION_SENT: &str = "confirmation.sent";
        pub const CONFIRMATION_SKIPPED: &str = "confirmation.skipped";
        pub const CONFIRMATION_FAILED: &str = "confirmation.failed";
        pub const EVENT_IGNORED: &str = "trigger.event_ignored";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const APPOINTMENT: &str = "appointment";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// トリガーペイロード・ドキュメント内容の不備
        pub const INVALID_INPUT: &str = "invalid_input";
        /// コレクション間の参照不整合
        pub const DATA_INTEGRITY: &str = "data_integrity";
        /// 外部サービス呼び出し（Firestore、メール送信 API）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const MISSING_PAYLOAD: &str = "missing_payload";
        pub const MISSING_PATIENT_ID: &str = "missing_patient_id";
        pub const MISSING_APPOINTMENT_DATE: &str = "missing_appointment_date";
        pub const PATIENT_NOT_FOUND: &str = "patient_not_found";
        pub const MISSING_EMAIL: &str = "missing_email";
        pub const USER_LOOKUP: &str = "user_lookup";
        pub const EMAIL_DELIVERY: &str = "email_delivery";
    }
}
