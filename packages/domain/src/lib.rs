//! # dxrating ドメイン層
//!
//! ゲートウェイが受け付けるリクエストパラメータの型と、その検証ルールを定義する。
//!
//! ## 設計方針
//!
//! - I/O を一切持たない純粋なクレート（HTTP やネットワークには依存しない）
//! - 検証済みの値は型で表現し、未検証の値と取り違えられないようにする
//! - 検証失敗は例外ではなく `Result` で返し、違反したフィールドをすべて列挙する
//!
//! ## 依存関係の方向
//!
//! ```text
//! gateway → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`auth_params`] - 認証情報・未検証パラメータ・正規化済みパラメータ
//! - [`region`] - サーバーリージョン（`jp` / `intl`）
//! - [`schema`] - パラメータスキーマ（検証ルール本体）
//! - [`validation`] - 検証エラーの構造化表現
//!
//! ## 使用例
//!
//! ```rust
//! use dxrating_domain::{RawAuthParams, Region};
//! use serde_json::json;
//!
//! let raw = RawAuthParams::from_json(&json!({ "id": "a", "password": "b" }));
//! let params = raw.with_path_region(Some("intl")).validate().unwrap();
//!
//! assert_eq!(params.region(), Region::Intl);
//! assert_eq!(params.credentials().id(), "a");
//! ```

pub mod auth_params;
pub mod region;
pub mod schema;
pub mod validation;

pub use auth_params::{Credentials, NormalizedAuthParams, RawAuthParams, RawField};
pub use region::Region;
pub use validation::{IssueCode, ValidationErrors, ValidationIssue};
