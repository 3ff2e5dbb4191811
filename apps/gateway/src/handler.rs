//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ハンドラは薄く保ち、実際の処理はハンドラ委譲先（`dxrating_infra`）に任せる。
//!
//! ## ハンドラ一覧
//!
//! - `health`: 稼働確認
//! - `net_records`: プレイ記録の取得（v0: 単一 JSON、v1: イベントストリーム）
//! - `render`: 単発レンダリング（デモを含む）

pub mod health;
pub mod net_records;
pub mod render;

pub use health::service_status;
pub use net_records::{NetRecordsState, fetch_net_records_v0, fetch_net_records_v1};
pub use render::{RenderState, render_oneshot, render_oneshot_demo};
