//! # dxrating 共有ユーティリティ
//!
//! ゲートウェイと周辺クレートで共通に使うレスポンス型と Observability 基盤。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum には依存しない（HTTP フレームワークへの変換は各アプリの責務）
//! - トレーシング関連は `observability` feature でのみ有効にする

pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorEnvelope;
pub use health::ServiceStatus;
