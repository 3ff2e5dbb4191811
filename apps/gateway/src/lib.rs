//! # dxrating ゲートウェイ
//!
//! 上流サービスのアカウント認証情報とリージョンを受け取り、検証・正規化してから
//! ハンドラ委譲先に渡す HTTP ゲートウェイ。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルートテーブルとミドルウェアの組み立て
//! - `config`: 環境変数からの設定読み込み
//! - `error`: エラー型とレスポンス変換
//! - `handler`: HTTP ハンドラ
//! - `middleware`: パラメータ再構成、エラーバウンダリ
//! - `sse`: ストリーミングアダプタ

pub mod app_builder;
pub mod body;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod sse;

pub use app_builder::{Delegates, build_app};
pub use config::{ConfigError, GatewayConfig, StreamConfig};
pub use error::GatewayError;
