//! # 稼働確認ハンドラ
//!
//! `GET /` で稼働中であることとソースコードの所在を返す。

use axum::Json;
use dxrating_shared::ServiceStatus;

const STATUS_MESSAGE: &str = "みるく is up and running! 🥛";
const SOURCE_URL: &str =
    "https://github.com/gekichumai/dxrating/tree/main/packages/self-hosted-functions";

/// 稼働確認エンドポイント
pub async fn service_status() -> Json<ServiceStatus> {
    Json(ServiceStatus::new(STATUS_MESSAGE, SOURCE_URL))
}
