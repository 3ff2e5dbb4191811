//! # ハンドラ委譲先
//!
//! 検証済みパラメータを受け取り、実際に上流サービスを呼び出す関数群のインターフェース。
//! ゲートウェイはこのトレイトのシグネチャだけに依存し、実装の中身には関知しない。
//!
//! テスト時にスタブを差し込めるようトレイトで定義する。

use async_trait::async_trait;
use dxrating_domain::NormalizedAuthParams;
use serde_json::Value;

use crate::{DelegateError, EventSink};

/// プレイ記録の取得
#[async_trait]
pub trait NetRecordsFetcher: Send + Sync {
    /// 記録を取得し、単一の JSON として返す
    async fn fetch(&self, params: &NormalizedAuthParams) -> Result<Value, DelegateError>;

    /// 記録の取得状況をイベントとして逐次送り出す
    ///
    /// 送信に失敗した（クライアントが切断した）時点で処理を打ち切り、
    /// 保持している上流接続を解放すること。
    async fn stream(
        &self,
        params: NormalizedAuthParams,
        sink: EventSink,
    ) -> Result<(), DelegateError>;
}

/// 単発レンダリング
#[async_trait]
pub trait OneshotRenderer: Send + Sync {
    /// 入力（リクエストボディ。デモでは `null`）をレンダリングし、結果を JSON で返す
    async fn render(&self, input: Value) -> Result<Value, DelegateError>;
}
