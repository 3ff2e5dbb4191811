//! # ハンドラ委譲先のエラー
//!
//! 上流サービス（functions runtime）との通信で発生するエラーを表現する。
//!
//! | 種別 | 発生条件 |
//! |------|----------|
//! | `Unavailable` | 接続できない、接続タイムアウト、503 |
//! | `Rejected` | 上流が 4xx を返した |
//! | `InvalidResponse` | レスポンスを解釈できない |
//! | `Network` | 上記以外の通信エラー |
//! | `Unexpected` | 想定外のステータス |

use thiserror::Error;

/// ハンドラ委譲先で発生するエラー
#[derive(Debug, Clone, Error)]
pub enum DelegateError {
    #[error("上流サービスに接続できません")]
    Unavailable,

    /// 上流がリクエストを拒否した（4xx）
    ///
    /// `message` は上流が返したエラーメッセージ（なければ空）。
    #[error("上流サービスがリクエストを拒否しました（{status}）: {message}")]
    Rejected { status: u16, message: String },

    #[error("上流サービスのレスポンスを解釈できません: {0}")]
    InvalidResponse(String),

    #[error("ネットワークエラー: {0}")]
    Network(String),

    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl From<reqwest::Error> for DelegateError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            DelegateError::Unavailable
        } else if err.is_decode() {
            DelegateError::InvalidResponse(err.to_string())
        } else {
            DelegateError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DelegateError {
    fn from(err: serde_json::Error) -> Self {
        DelegateError::InvalidResponse(err.to_string())
    }
}
