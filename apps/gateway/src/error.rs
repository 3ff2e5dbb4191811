//! # ゲートウェイのエラー
//!
//! ハンドラとミドルウェアが返す唯一のエラー型 [`GatewayError`] と、HTTP レスポンスへの変換。
//!
//! | 種別 | ステータス | `error` フィールド |
//! |------|-----------|-------------------|
//! | `Validation` | 400 | `Invalid parameters`（`details` 付き） |
//! | `MalformedBody` | 500 | `malformed request body` |
//! | `Delegate` | 500 | 委譲先エラーの種別ごとの固定文言 |
//! | `Timeout` | 504 | `handler timed out` |
//! | `Internal` | 500 | `internal server error` |
//!
//! 検証エラー以外はレスポンス extensions に [`ErrorReport`] を載せ、
//! エラーバウンダリ（[`crate::middleware::error_boundary`]）が 1 度だけログに記録する。
//! クライアントに返す文言は `public_message` の固定文言のみで、内部の詳細は含めない。

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use dxrating_domain::ValidationErrors;
use dxrating_infra::DelegateError;
use dxrating_shared::{
    ErrorEnvelope,
    error_response::{INTERNAL_SERVER_ERROR, INVALID_PARAMETERS},
};
use thiserror::Error;

/// ゲートウェイで発生するエラー
#[derive(Debug, Error)]
pub enum GatewayError {
    /// パラメータ検証エラー（400 Bad Request）
    #[error("パラメータ検証エラー: {0}")]
    Validation(#[from] ValidationErrors),

    /// リクエストボディを JSON として解釈できない
    #[error("リクエストボディを解釈できません: {0}")]
    MalformedBody(String),

    #[error("委譲先の呼び出しに失敗しました: {0}")]
    Delegate(#[from] DelegateError),

    /// 委譲先の呼び出しがタイムアウトした（504 Gateway Timeout）
    #[error("委譲先の呼び出しが {0:?} でタイムアウトしました")]
    Timeout(Duration),

    #[error("内部エラー: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// クライアントに返してよい文言
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Validation(_) => INVALID_PARAMETERS.into(),
            GatewayError::MalformedBody(_) => "malformed request body".into(),
            GatewayError::Delegate(err) => match err {
                DelegateError::Unavailable => "upstream service unavailable".into(),
                DelegateError::Rejected { message, .. } if !message.is_empty() => message.clone(),
                DelegateError::Rejected { .. } => "upstream service rejected the request".into(),
                DelegateError::InvalidResponse(_) => "invalid response from upstream".into(),
                DelegateError::Network(_) | DelegateError::Unexpected(_) => {
                    "upstream request failed".into()
                }
            },
            GatewayError::Timeout(_) => "handler timed out".into(),
            GatewayError::Internal(_) => INTERNAL_SERVER_ERROR.into(),
        }
    }

    /// ログの `error.category` / `error.kind`
    pub fn classify(&self) -> (&'static str, &'static str) {
        match self {
            GatewayError::Validation(_) => ("validation", "invalid_parameters"),
            GatewayError::MalformedBody(_) => ("request", "malformed_body"),
            GatewayError::Delegate(err) => (
                "delegate",
                match err {
                    DelegateError::Unavailable => "unavailable",
                    DelegateError::Rejected { .. } => "rejected",
                    DelegateError::InvalidResponse(_) => "invalid_response",
                    DelegateError::Network(_) => "network",
                    DelegateError::Unexpected(_) => "unexpected",
                },
            ),
            GatewayError::Timeout(_) => ("delegate", "timeout"),
            GatewayError::Internal(_) => ("internal", "unexpected"),
        }
    }

    fn report(&self) -> ErrorReport {
        let (category, kind) = self.classify();
        ErrorReport {
            category,
            kind,
            detail: self.to_string(),
        }
    }
}

/// エラーバウンダリに引き渡すログ用の情報
///
/// クライアントには返さない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub category: &'static str,
    pub kind:     &'static str,
    pub detail:   String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if let GatewayError::Validation(errors) = self {
            // 検証エラーは再構成ミドルウェアの責務。バウンダリには渡さない
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorEnvelope::invalid_parameters(errors)),
            )
                .into_response();
        }

        let mut response = (self.status(), Json(ErrorEnvelope::new(self.public_message())))
            .into_response();
        response.extensions_mut().insert(self.report());
        response
    }
}
