//! # dxrating ゲートウェイ サーバー
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │    Client    │────▶│   Gateway    │────▶│ functions runtime  │
//! │              │     │  port: 3000  │     │ (UPSTREAM_URL)     │
//! └──────────────┘     └──────────────┘     └────────────────────┘
//! ```
//!
//! 環境変数は [`dxrating_gateway::config`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用、デモルートを有効化）
//! DEV=true cargo run -p dxrating-gateway
//!
//! # 本番環境
//! PORT=3000 UPSTREAM_URL=http://functions:4000 LOG_FORMAT=json \
//!   cargo run -p dxrating-gateway --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use dxrating_gateway::{Delegates, GatewayConfig, build_app};
use dxrating_infra::UpstreamFunctionsClient;
use dxrating_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

/// ゲートウェイのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. ハンドラ委譲先とルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // RUST_LOG でログレベル、LOG_FORMAT で出力形式を制御する
    init_tracing(&TracingConfig::from_env("dxrating-gateway"));

    let config = GatewayConfig::from_env().context("設定の読み込みに失敗しました")?;

    let upstream = Arc::new(
        UpstreamFunctionsClient::new(&config.upstream_url)
            .context("上流クライアントの初期化に失敗しました")?,
    );
    let app = build_app(
        &config,
        Delegates {
            fetcher:  upstream.clone(),
            renderer: upstream,
        },
    );

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        upstream = %config.upstream_url,
        dev = config.dev,
        "ゲートウェイが起動しました: {}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ゲートウェイを停止しました");
    Ok(())
}

/// Ctrl+C または SIGTERM を待つ
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Ctrl+C ハンドラの登録に失敗しました: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM ハンドラの登録に失敗しました: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("シャットダウンシグナルを受信しました");
}
