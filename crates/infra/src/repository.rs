//! # リポジトリ実装
//!
//! 外部コレクションの読み取りを担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: 患者レコードはユーザー管理システムが所有する
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod user_repository;

pub use user_repository::{FirestoreUserRepository, UserRepository};
