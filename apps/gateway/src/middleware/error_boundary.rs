//! # エラーバウンダリ
//!
//! ルート全体を包み、捕捉されなかった失敗をクライアント向けのレスポンスに変換する唯一の場所。
//!
//! - ハンドラが返した [`GatewayError`](crate::error::GatewayError) は、
//!   レスポンスに添付された [`ErrorReport`] をここで取り出して 1 度だけログに記録する
//! - パニックは [`panic_response`] を `CatchPanicLayer` に渡して 500 に変換する
//! - 未知のパス・メソッドは [`not_found`] / [`method_not_allowed`] で同じ形式の JSON にする
//!
//! 検証エラー（400）は再構成ミドルウェアの責務なので、ここでは扱わない。

use std::any::Any;

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dxrating_shared::ErrorEnvelope;

use crate::error::ErrorReport;

/// 捕捉されなかった失敗をログに記録するミドルウェア
pub async fn error_boundary(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    if let Some(report) = response.extensions_mut().remove::<ErrorReport>() {
        tracing::error!(
            error.category = report.category,
            error.kind = report.kind,
            status = response.status().as_u16(),
            "{}",
            report.detail
        );
    }

    response
}

/// パニックを 500 レスポンスに変換する
///
/// ログは [`error_boundary`] が記録する。
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_detail(payload.as_ref());

    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorEnvelope::internal_error()),
    )
        .into_response();
    response.extensions_mut().insert(ErrorReport {
        category: "internal",
        kind: "panic",
        detail: format!("ハンドラがパニックしました: {detail}"),
    });
    response
}

/// パニックのペイロードからメッセージを取り出す
pub(crate) fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "不明なパニック".to_string()
    }
}

/// 未登録のパス
pub async fn not_found() -> (StatusCode, Json<ErrorEnvelope>) {
    (StatusCode::NOT_FOUND, Json(ErrorEnvelope::new("not found")))
}

/// 登録済みのパスに対する未対応のメソッド
pub async fn method_not_allowed() -> (StatusCode, Json<ErrorEnvelope>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorEnvelope::new("method not allowed")),
    )
}
