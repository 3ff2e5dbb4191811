//! # 上流 functions runtime クライアント
//!
//! [`NetRecordsFetcher`] と [`OneshotRenderer`] を HTTP で実装する。
//!
//! ## エンドポイント
//!
//! - `POST /net-records` - 記録取得（単一 JSON）
//! - `POST /net-records/stream` - 記録取得（改行区切り JSON `{"event", "data"}` を逐次返す）
//! - `POST /render-oneshot` - 単発レンダリング
//!
//! 記録取得のリクエストボディは `{ "credentials": { "id", "password" }, "region" }`。

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use dxrating_domain::NormalizedAuthParams;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    DelegateError,
    EventSink,
    NetRecordsFetcher,
    OneshotRenderer,
    StreamEvent,
};

/// 上流への接続タイムアウト
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// ストリームの 1 行分
#[derive(Debug, Deserialize)]
struct UpstreamEvent {
    event: String,
    #[serde(default)]
    data:  Value,
}

/// エラーレスポンスの `error` フィールドだけを読む
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    error: String,
}

/// 上流 functions runtime クライアント
pub struct UpstreamFunctionsClient {
    base_url: String,
    client:   reqwest::Client,
}

impl UpstreamFunctionsClient {
    /// 新しいクライアントを作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: 上流のベース URL（例: `http://127.0.0.1:4000`）
    pub fn new(base_url: &str) -> Result<Self, DelegateError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post_json(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<reqwest::Response, DelegateError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        check_status(response).await
    }
}

/// ステータスコードを [`DelegateError`] に振り分ける
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DelegateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    match status {
        reqwest::StatusCode::SERVICE_UNAVAILABLE => Err(DelegateError::Unavailable),
        status if status.is_client_error() => Err(DelegateError::Rejected {
            status:  status.as_u16(),
            message: serde_json::from_str::<UpstreamErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or(body),
        }),
        status => Err(DelegateError::Unexpected(format!(
            "予期しないステータス {}: {}",
            status, body
        ))),
    }
}

/// 1 行の上限（1 MiB）
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// 改行区切りのチャンクを行に組み立てるバッファ
///
/// 走査済みの位置を覚えておき、チャンクが届くたびに先頭から探し直さない。
#[derive(Debug, Default)]
struct LineBuffer {
    buffer:  BytesMut,
    scanned: usize,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// 完結した行を 1 行取り出す
    ///
    /// 改行が現れないまま上限を超えたら [`DelegateError::InvalidResponse`]。
    fn next_line(&mut self) -> Result<Option<BytesMut>, DelegateError> {
        match self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let pos = self.scanned + offset;
                self.scanned = 0;
                check_line_length(pos)?;
                let mut line = self.buffer.split_to(pos + 1);
                line.truncate(pos);
                Ok(Some(line))
            }
            None => {
                self.scanned = self.buffer.len();
                check_line_length(self.scanned)?;
                Ok(None)
            }
        }
    }

    /// 末尾に残った改行のない最終行
    fn into_remainder(self) -> BytesMut {
        self.buffer
    }
}

fn check_line_length(len: usize) -> Result<(), DelegateError> {
    if len > MAX_LINE_LENGTH {
        return Err(DelegateError::InvalidResponse(format!(
            "ストリームの 1 行が上限 {MAX_LINE_LENGTH} バイトを超えました"
        )));
    }
    Ok(())
}

/// 1 行をイベントとして送る。空行は読み飛ばす
///
/// 送信できなかった（クライアントが切断した）場合は `false`。
async fn relay_line(line: &[u8], sink: &EventSink) -> Result<bool, DelegateError> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(true);
    }
    let event: UpstreamEvent = serde_json::from_slice(line)?;
    Ok(sink
        .emit(StreamEvent::new(event.event, event.data))
        .await
        .is_ok())
}

#[async_trait]
impl NetRecordsFetcher for UpstreamFunctionsClient {
    async fn fetch(&self, params: &NormalizedAuthParams) -> Result<Value, DelegateError> {
        let response = self.post_json("/net-records", params).await?;
        Ok(response.json::<Value>().await?)
    }

    async fn stream(
        &self,
        params: NormalizedAuthParams,
        sink: EventSink,
    ) -> Result<(), DelegateError> {
        let response = self.post_json("/net-records/stream", &params).await?;
        let mut chunks = response.bytes_stream();
        let mut lines = LineBuffer::default();

        loop {
            let chunk = tokio::select! {
                chunk = chunks.next() => chunk,
                () = sink.cancelled() => {
                    tracing::debug!("クライアント切断により上流ストリームを解放します");
                    return Ok(());
                }
            };

            match chunk {
                Some(bytes) => lines.extend(&bytes?),
                None => break,
            }

            while let Some(line) = lines.next_line()? {
                if !relay_line(&line, &sink).await? {
                    return Ok(());
                }
            }
        }

        let remainder = lines.into_remainder();
        if !remainder.is_empty() {
            relay_line(&remainder, &sink).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl OneshotRenderer for UpstreamFunctionsClient {
    async fn render(&self, input: Value) -> Result<Value, DelegateError> {
        let response = self.post_json("/render-oneshot", &input).await?;
        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::{Json, Router, http::StatusCode, routing::post};
    use dxrating_domain::RawAuthParams;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::net::TcpListener;

    use super::*;
    use crate::{DEFAULT_CAPACITY, event_channel};

    /// テスト用の上流サーバーを起動し、アドレスを返す
    async fn start_upstream(app: Router) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn params() -> NormalizedAuthParams {
        RawAuthParams::from_parts(Some("user"), Some("pass"), Some("jp"))
            .validate()
            .unwrap()
    }

    #[test]
    fn test_line_buffer_チャンクをまたぐ行を組み立てる() {
        let mut lines = LineBuffer::default();

        lines.extend(b"fir");
        assert_eq!(lines.next_line().unwrap(), None);
        lines.extend(b"st\nsecond");

        assert_eq!(lines.next_line().unwrap().unwrap().as_ref(), b"first");
        assert_eq!(lines.next_line().unwrap(), None);
        assert_eq!(lines.into_remainder().as_ref(), b"second");
    }

    #[test]
    fn test_line_buffer_改行のないまま上限を超えるとinvalid_response() {
        let mut lines = LineBuffer::default();

        lines.extend(&vec![b'x'; MAX_LINE_LENGTH]);
        assert_eq!(lines.next_line().unwrap(), None);
        lines.extend(b"x");

        let err = lines.next_line().unwrap_err();

        assert!(matches!(err, DelegateError::InvalidResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_fetch_正規化済みパラメータをそのまま送る() {
        let app = Router::new().route(
            "/net-records",
            post(|Json(body): Json<Value>| async move { Json(json!({ "received": body })) }),
        );
        let addr = start_upstream(app).await;
        let client = UpstreamFunctionsClient::new(&format!("http://{addr}/")).unwrap();

        let result = client.fetch(&params()).await.unwrap();

        assert_eq!(
            result,
            json!({
                "received": {
                    "credentials": { "id": "user", "password": "pass" },
                    "region": "jp",
                }
            })
        );
    }

    #[tokio::test]
    async fn test_fetch_4xxはrejectedに変換される() {
        let app = Router::new().route(
            "/net-records",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": "login failed" })),
                )
            }),
        );
        let addr = start_upstream(app).await;
        let client = UpstreamFunctionsClient::new(&format!("http://{addr}")).unwrap();

        let err = client.fetch(&params()).await.unwrap_err();

        match err {
            DelegateError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "login failed");
            }
            other => panic!("Rejected であること: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_接続できない場合はunavailable() {
        // バインドして即座に閉じたポート
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = UpstreamFunctionsClient::new(&format!("http://{addr}")).unwrap();

        let err = client.fetch(&params()).await.unwrap_err();

        assert!(matches!(err, DelegateError::Unavailable), "{err:?}");
    }

    #[tokio::test]
    async fn test_stream_改行区切りjsonをイベントとして中継する() {
        let app = Router::new().route(
            "/net-records/stream",
            post(|| async {
                "{\"event\":\"progress\",\"data\":{\"step\":\"login\"}}\n\n{\"event\":\"result\",\"data\":[1]}"
            }),
        );
        let addr = start_upstream(app).await;
        let client = UpstreamFunctionsClient::new(&format!("http://{addr}")).unwrap();
        let (sink, mut receiver) = event_channel(DEFAULT_CAPACITY);

        client.stream(params(), sink).await.unwrap();

        assert_eq!(
            receiver.next().await,
            Some(StreamEvent::new("progress", json!({ "step": "login" })))
        );
        assert_eq!(
            receiver.next().await,
            Some(StreamEvent::new("result", json!([1])))
        );
        assert_eq!(receiver.next().await, None);
    }

    #[tokio::test]
    async fn test_stream_不正な行はinvalid_responseになる() {
        let app = Router::new().route("/net-records/stream", post(|| async { "not json\n" }));
        let addr = start_upstream(app).await;
        let client = UpstreamFunctionsClient::new(&format!("http://{addr}")).unwrap();
        let (sink, _receiver) = event_channel(DEFAULT_CAPACITY);

        let err = client.stream(params(), sink).await.unwrap_err();

        assert!(matches!(err, DelegateError::InvalidResponse(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_render_入力をそのまま転送する() {
        let app = Router::new().route(
            "/render-oneshot",
            post(|Json(body): Json<Value>| async move { Json(json!({ "rendered": body })) }),
        );
        let addr = start_upstream(app).await;
        let client = UpstreamFunctionsClient::new(&format!("http://{addr}")).unwrap();

        let result = client.render(json!({ "records": [] })).await.unwrap();

        assert_eq!(result, json!({ "rendered": { "records": [] } }));
    }
}
