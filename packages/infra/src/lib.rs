//! # dxrating インフラ層
//!
//! ハンドラ委譲先（上流サービスを実際に呼び出す関数）のインターフェースと、
//! その HTTP 実装を提供する。
//!
//! ## モジュール構成
//!
//! - [`delegate`] - 委譲先トレイト（[`NetRecordsFetcher`] / [`OneshotRenderer`]）
//! - [`event_stream`] - ストリーミング用のキャンセル可能な出力チャネル
//! - [`upstream`] - 上流 functions runtime への HTTP 実装
//! - [`error`] - 委譲先エラー

pub mod delegate;
pub mod error;
pub mod event_stream;
pub mod upstream;

pub use delegate::{NetRecordsFetcher, OneshotRenderer};
pub use error::DelegateError;
pub use event_stream::{
    DEFAULT_CAPACITY,
    EventReceiver,
    EventSink,
    StreamClosed,
    StreamEvent,
    event_channel,
};
pub use upstream::UpstreamFunctionsClient;
