//! # イベントチャネル
//!
//! ストリーミングルートでハンドラがイベントを送り出すための、キャンセル可能な出力チャネル。
//!
//! ## 構成
//!
//! ```text
//! ハンドラ（producer）            トランスポート（consumer）
//! ┌─────────────┐   mpsc(有界)   ┌────────────────┐
//! │  EventSink  │ ─────────────▶ │ EventReceiver  │ ──▶ SSE レスポンス
//! └─────────────┘                └────────────────┘
//!        ▲                               │
//!        └──── cancelled() ◀── drop ─────┘（クライアント切断）
//! ```
//!
//! - チャネルは有界で、consumer が遅い場合 `emit` は空きが出るまで待つ（バックプレッシャー）
//! - consumer が破棄されると `emit` は [`StreamClosed`] を返し、`cancelled()` が完了する
//! - すべての `EventSink` が破棄されるとストリームは終端する
//!
//! HTTP トランスポートに依存しないため、キャンセルとバックプレッシャーを単体でテストできる。

use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::Stream;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

/// チャネルの既定バッファ数
pub const DEFAULT_CAPACITY: usize = 16;

/// 名前付きイベント
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamEvent {
    /// イベント名（SSE の `event:` 行）
    pub name: String,
    /// ペイロード（SSE の `data:` 行に JSON で書き出す）
    pub data: Value,
}

impl StreamEvent {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// consumer 側が既に閉じている
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("イベントストリームは既に閉じられています")]
pub struct StreamClosed;

/// イベントの送信側
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: mpsc::Sender<StreamEvent>,
}

impl EventSink {
    /// イベントを 1 件送る
    ///
    /// バッファが埋まっている間は待機する。consumer が閉じていれば [`StreamClosed`]。
    pub async fn emit(&self, event: StreamEvent) -> Result<(), StreamClosed> {
        self.sender.send(event).await.map_err(|_| StreamClosed)
    }

    /// consumer が閉じられる（クライアントが切断する）まで待つ
    pub async fn cancelled(&self) {
        self.sender.closed().await;
    }
}

/// イベントの受信側
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::Receiver<StreamEvent>,
}

impl EventReceiver {
    /// 受信を打ち切り、送信側にキャンセルを通知する
    pub fn close(&mut self) {
        self.receiver.close();
    }
}

/// 全送信側が破棄されると終端する
impl Stream for EventReceiver {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        self.receiver.poll_recv(cx)
    }
}

/// 有界のイベントチャネルを作る
pub fn event_channel(capacity: usize) -> (EventSink, EventReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (EventSink { sender }, EventReceiver { receiver })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_送信した順にイベントを受信できる() {
        let (sink, mut receiver) = event_channel(DEFAULT_CAPACITY);

        sink.emit(StreamEvent::new("progress", json!({ "step": 1 })))
            .await
            .unwrap();
        sink.emit(StreamEvent::new("result", json!([1, 2])))
            .await
            .unwrap();
        drop(sink);

        assert_eq!(receiver.next().await.unwrap().name, "progress");
        assert_eq!(receiver.next().await.unwrap().data, json!([1, 2]));
        assert_eq!(receiver.next().await, None);
    }

    #[tokio::test]
    async fn test_受信側が破棄されるとemitはstream_closedを返す() {
        let (sink, receiver) = event_channel(DEFAULT_CAPACITY);
        drop(receiver);

        let result = sink.emit(StreamEvent::new("progress", Value::Null)).await;

        assert_eq!(result, Err(StreamClosed));
    }

    #[tokio::test]
    async fn test_受信側が閉じるとcancelledが完了する() {
        let (sink, mut receiver) = event_channel(DEFAULT_CAPACITY);

        let waiter = tokio::spawn(async move { sink.cancelled().await });
        receiver.close();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("cancelled() が完了すること")
            .unwrap();
    }

    #[tokio::test]
    async fn test_バッファが埋まるとemitは待機する() {
        let (sink, mut receiver) = event_channel(1);
        sink.emit(StreamEvent::new("a", Value::Null)).await.unwrap();

        let blocked = tokio::time::timeout(
            Duration::from_millis(50),
            sink.emit(StreamEvent::new("b", Value::Null)),
        )
        .await;
        assert!(blocked.is_err(), "空きがない間は送信できないこと");

        assert_eq!(receiver.next().await.unwrap().name, "a");
        sink.emit(StreamEvent::new("b", Value::Null)).await.unwrap();
        assert_eq!(receiver.next().await.unwrap().name, "b");
    }
}
