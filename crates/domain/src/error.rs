//! # ドメイン層エラー定義
//!
//! 値オブジェクトの生成時に発生するバリデーションエラー。
//!
//! 確認メール処理の各失敗パターンは
//! [`ConfirmationError`](crate::notification::ConfirmationError) で表現する。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 入力値がルールに違反している場合に使用する。
    ///
    /// # 例
    ///
    /// - 必須フィールドが空
    /// - 文字数制限の超過
    /// - 不正なフォーマット
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
