//! # ルーター構築
//!
//! ルートテーブルとミドルウェアの組み立てを担当する。
//! `main.rs` はインフラ初期化とサーバー起動に集中する。
//!
//! ## ルートテーブル
//!
//! | ルート | メソッド | チェーン | 応答 |
//! |--------|---------|---------|------|
//! | `/` | GET | - | JSON |
//! | `/functions/fetch-net-records/v0` | POST | 再構成 → ハンドラ | JSON |
//! | `/functions/fetch-net-records/v1/{region}` | POST | 再構成 → ストリーミング → ハンドラ | SSE |
//! | `/functions/fetch-net-records/v1` | POST | 同上（リージョンはボディから） | SSE |
//! | `/functions/render-oneshot/v0` | POST | ハンドラ | JSON |
//! | `/functions/render-oneshot/v0/demo` | GET | ハンドラ（開発モード時のみ） | JSON |
//!
//! ルートテーブルは起動時に 1 度だけ構築し、以後変更しない。
//! デモルートの有無もこの時点で決まる。

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{get, post},
};
use dxrating_infra::{NetRecordsFetcher, OneshotRenderer};
use dxrating_shared::observability::{MakeRequestUuidV7, make_request_span};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    config::GatewayConfig,
    handler::{
        NetRecordsState,
        RenderState,
        fetch_net_records_v0,
        fetch_net_records_v1,
        render_oneshot,
        render_oneshot_demo,
        service_status,
    },
    middleware::{
        error_boundary,
        method_not_allowed,
        not_found,
        panic_response,
        reconcile_auth_params,
    },
};

/// ハンドラ委譲先
///
/// テストではスタブに差し替える。
#[derive(Clone)]
pub struct Delegates {
    pub fetcher:  Arc<dyn NetRecordsFetcher>,
    pub renderer: Arc<dyn OneshotRenderer>,
}

/// ルーターを構築する
pub fn build_app(config: &GatewayConfig, delegates: Delegates) -> Router {
    let net_records_state = Arc::new(NetRecordsState {
        fetcher:         delegates.fetcher,
        handler_timeout: config.handler_timeout,
        stream:          config.stream,
    });
    let render_state = Arc::new(RenderState {
        renderer:        delegates.renderer,
        handler_timeout: config.handler_timeout,
    });

    let net_records = Router::new()
        .route(
            "/functions/fetch-net-records/v0",
            post(fetch_net_records_v0),
        )
        .route(
            "/functions/fetch-net-records/v1",
            post(fetch_net_records_v1),
        )
        .route(
            "/functions/fetch-net-records/v1/{region}",
            post(fetch_net_records_v1),
        )
        .route_layer(from_fn(reconcile_auth_params))
        .with_state(net_records_state);

    let mut render = Router::new().route("/functions/render-oneshot/v0", post(render_oneshot));
    if config.dev {
        tracing::info!("開発モード: デモルートを登録します");
        render = render.route(
            "/functions/render-oneshot/v0/demo",
            get(render_oneshot_demo),
        );
    }
    let render = render.with_state(render_state);

    Router::new()
        .route("/", get(service_status))
        .merge(net_records)
        .merge(render)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        // レイヤー順序（下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: request_id を含むリクエストスパン
        // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 4. CorsLayer
        // 5. error_boundary: 捕捉されなかった失敗を 1 度だけ記録
        // 6. CatchPanicLayer（最内）: パニックを 500 に変換
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(error_boundary))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
