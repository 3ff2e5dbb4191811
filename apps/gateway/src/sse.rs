//! # ストリーミングアダプタ
//!
//! レスポンスを Server-Sent Events のストリームに切り替え、ハンドラ委譲先に
//! [`EventSink`] を渡して任意個のイベントを送らせる。
//!
//! ## ライフサイクル
//!
//! ```text
//! open_event_stream ──spawn──▶ 委譲先タスク ──emit──▶ EventSink
//!        │                        │                    │ mpsc(有界)
//!        ▼                        │                    ▼
//!   Sse<EventStream> ◀───────────────────────── EventReceiver
//! ```
//!
//! - 委譲先の完了（すべての `EventSink` の破棄）でストリームは終端する
//! - 委譲先の失敗・パニック・タイムアウトは `error` イベント（`{ "error": ... }`）で通知する。
//!   ヘッダー送信後なのでステータスコードでは表せない
//! - クライアントが切断すると [`EventStream`] が破棄され、委譲先タスクは中断される
//! - 無通信時は keep-alive コメントを送る

use std::{
    convert::Infallible,
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    task::{Context, Poll},
};

use axum::response::sse::{Event, KeepAlive, Sse};
use dxrating_infra::{
    DelegateError,
    EventReceiver,
    EventSink,
    StreamEvent,
    event_channel,
};
use futures_util::{FutureExt, Stream, StreamExt};
use serde_json::json;
use tokio::task::JoinHandle;

use crate::{config::StreamConfig, error::GatewayError, middleware::panic_detail};

/// ゲートウェイ自身が送るエラーイベントの名前
pub const ERROR_EVENT: &str = "error";

/// 委譲先タスクと結び付いたイベント列
///
/// 破棄されると委譲先タスクを中断する。
pub struct EventStream {
    receiver: EventReceiver,
    task:     JoinHandle<()>,
}

impl Stream for EventStream {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            tracing::debug!("クライアントが切断したためストリームを中断します");
            self.receiver.close();
            self.task.abort();
        }
    }
}

/// 委譲先タスクを起動し、そのイベント列を返す
///
/// `run` は [`EventSink`] を受け取ってイベントを送り、完了したら `Ok(())` を返す。
pub fn spawn_event_stream<F, Fut>(config: StreamConfig, run: F) -> EventStream
where
    F: FnOnce(EventSink) -> Fut,
    Fut: Future<Output = Result<(), DelegateError>> + Send + 'static,
{
    let (sink, receiver) = event_channel(config.capacity);
    let task = tokio::spawn(drive(config, sink.clone(), run(sink)));
    EventStream { receiver, task }
}

/// レスポンスをイベントストリームに切り替える
pub fn open_event_stream<F, Fut>(
    config: StreamConfig,
    run: F,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>>
where
    F: FnOnce(EventSink) -> Fut,
    Fut: Future<Output = Result<(), DelegateError>> + Send + 'static,
{
    tracing::info!("イベントストリームを開始します");
    let stream = spawn_event_stream(config, run).map(|event| Ok(into_sse_event(event)));
    Sse::new(stream).keep_alive(KeepAlive::new().interval(config.keep_alive))
}

/// 委譲先を実行し、失敗・パニック・タイムアウトを `error` イベントに変換する
async fn drive<Fut>(config: StreamConfig, sink: EventSink, run: Fut)
where
    Fut: Future<Output = Result<(), DelegateError>>,
{
    let run = AssertUnwindSafe(run).catch_unwind();
    let outcome = tokio::select! {
        outcome = tokio::time::timeout(config.timeout, run) => outcome,
        () = sink.cancelled() => {
            tracing::debug!("クライアントの切断を検知しました");
            return;
        }
    };

    let err = match outcome {
        Ok(Ok(Ok(()))) => {
            tracing::debug!("イベントストリームが完了しました");
            return;
        }
        Ok(Ok(Err(err))) => GatewayError::Delegate(err),
        Ok(Err(payload)) => GatewayError::Internal(anyhow::anyhow!(
            "委譲先がパニックしました: {}",
            panic_detail(payload.as_ref())
        )),
        Err(_) => GatewayError::Timeout(config.timeout),
    };

    let (category, kind) = err.classify();
    tracing::warn!(
        error.category = category,
        error.kind = kind,
        "イベントストリームを異常終了します: {err}"
    );
    let event = StreamEvent::new(ERROR_EVENT, json!({ "error": err.public_message() }));
    if sink.emit(event).await.is_err() {
        tracing::debug!("エラーイベントの送信前にクライアントが切断しました");
    }
}

/// SSE のイベントに変換する
///
/// イベント名に改行が含まれるとフレームが壊れるため取り除く。
fn into_sse_event(event: StreamEvent) -> Event {
    let name: String = event
        .name
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();
    Event::default().event(name).data(event.data.to_string())
}
