//! # エラーレスポンス
//!
//! 2xx 以外のレスポンスで返す唯一のボディ形式 `{ "error": ..., "details"?: ... }` を提供する。
//!
//! ## 設計
//!
//! - `ErrorEnvelope` は純粋なデータ構造（`Serialize` のみ）
//! - axum の `IntoResponse` 変換はゲートウェイの責務（shared に axum 依存を入れない）
//! - `details` は検証エラーのときだけ付く。それ以外のエラーでは省略される

use serde::Serialize;
use serde_json::Value;

/// 検証エラー時の固定メッセージ
pub const INVALID_PARAMETERS: &str = "Invalid parameters";

/// 内部エラー時の固定メッセージ（内部情報を漏らさないため）
pub const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEnvelope {
    pub error:   String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    /// メッセージのみのエラー
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error:   error.into(),
            details: None,
        }
    }

    /// 400 検証エラー
    ///
    /// `details` には違反したフィールドの一覧を格納する。
    pub fn invalid_parameters(details: impl Serialize) -> Self {
        Self {
            error:   INVALID_PARAMETERS.to_string(),
            details: Some(serde_json::to_value(details).unwrap_or(Value::Null)),
        }
    }

    /// 500 内部エラー
    pub fn internal_error() -> Self {
        Self::new(INTERNAL_SERVER_ERROR)
    }
}
