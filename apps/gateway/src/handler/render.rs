//! # 単発レンダリングハンドラ
//!
//! - `POST /functions/render-oneshot/v0` - リクエストボディをそのまま委譲先に渡す
//! - `GET /functions/render-oneshot/v0/demo` - 入力なし（`null`）で委譲先を呼ぶ。開発モード時のみ登録される

use std::{sync::Arc, time::Duration};

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use dxrating_infra::OneshotRenderer;
use serde_json::Value;

use crate::{body::parse_json_body, error::GatewayError};

/// 単発レンダリング API の State
pub struct RenderState {
    pub renderer:        Arc<dyn OneshotRenderer>,
    pub handler_timeout: Duration,
}

/// ボディの JSON を入力としてレンダリングする
///
/// 空のボディと JSON 以外のボディは `null` として扱う。
pub async fn render_oneshot(
    State(state): State<Arc<RenderState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let input = parse_json_body(&headers, &body)?.unwrap_or(Value::Null);
    render(&state, input).await
}

/// 入力なしでレンダリングする（開発用）
pub async fn render_oneshot_demo(
    State(state): State<Arc<RenderState>>,
) -> Result<Json<Value>, GatewayError> {
    render(&state, Value::Null).await
}

async fn render(state: &RenderState, input: Value) -> Result<Json<Value>, GatewayError> {
    let rendered = tokio::time::timeout(state.handler_timeout, state.renderer.render(input))
        .await
        .map_err(|_| GatewayError::Timeout(state.handler_timeout))??;

    Ok(Json(rendered))
}
