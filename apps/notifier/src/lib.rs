//! # Notifier ライブラリ
//!
//! 予約確認メール通知サービスの設定・ユースケース・ハンドラを公開する。
//! 統合テストからルーターを組み立てるために使う。

pub mod config;
pub mod handler;
pub mod usecase;
