//! # プレイ記録取得ハンドラ
//!
//! - `POST /functions/fetch-net-records/v0` - 取得結果を単一の JSON で返す
//! - `POST /functions/fetch-net-records/v1/{region}` - 取得状況をイベントストリームで返す
//!
//! どちらもパラメータ再構成ミドルウェアの後段で動き、検証済みの
//! [`NormalizedAuthParams`] を extensions から受け取る。

use std::{sync::Arc, time::Duration};

use axum::{
    Extension,
    Json,
    extract::State,
    response::IntoResponse,
};
use dxrating_domain::NormalizedAuthParams;
use dxrating_infra::NetRecordsFetcher;
use serde_json::Value;

use crate::{config::StreamConfig, error::GatewayError, sse::open_event_stream};

/// プレイ記録取得 API の State
pub struct NetRecordsState {
    pub fetcher:         Arc<dyn NetRecordsFetcher>,
    pub handler_timeout: Duration,
    pub stream:          StreamConfig,
}

/// 記録を取得し、単一の JSON で返す
#[tracing::instrument(skip_all, fields(region = %params.region()))]
pub async fn fetch_net_records_v0(
    State(state): State<Arc<NetRecordsState>>,
    Extension(params): Extension<NormalizedAuthParams>,
) -> Result<Json<Value>, GatewayError> {
    let records = tokio::time::timeout(state.handler_timeout, state.fetcher.fetch(&params))
        .await
        .map_err(|_| GatewayError::Timeout(state.handler_timeout))??;

    Ok(Json(records))
}

/// 記録の取得状況をイベントストリームで返す
///
/// ストリーム開始後のエラーはステータスコードではなく `error` イベントで通知される。
#[tracing::instrument(skip_all, fields(region = %params.region()))]
pub async fn fetch_net_records_v1(
    State(state): State<Arc<NetRecordsState>>,
    Extension(params): Extension<NormalizedAuthParams>,
) -> impl IntoResponse {
    let fetcher = Arc::clone(&state.fetcher);
    open_event_stream(state.stream, move |sink| async move {
        fetcher.stream(params, sink).await
    })
}
