//! # ミドルウェア
//!
//! ゲートウェイ用のミドルウェアを提供する。

mod auth_params;
mod error_boundary;

pub use auth_params::{REGION_PATH_PARAM, reconcile_auth_params};
pub use error_boundary::{error_boundary, method_not_allowed, not_found, panic_response};
pub(crate) use error_boundary::panic_detail;
