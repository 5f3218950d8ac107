//! # apptmail 共有ユーティリティ
//!
//! 予約確認メール通知サービス全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - domain / infra / notifier のすべてから依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - トレーシング初期化は `observability` feature でのみ有効化する

pub mod event_log;
pub mod health;
pub mod observability;

pub use health::HealthResponse;
