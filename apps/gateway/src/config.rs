//! # ゲートウェイ設定
//!
//! 環境変数からゲートウェイの設定を読み込む。起動時に 1 度だけ読み込み、以後は変更しない。
//!
//! | 変数名 | 必須 | デフォルト | 説明 |
//! |--------|------|-----------|------|
//! | `HOST` | No | `0.0.0.0` | バインドアドレス |
//! | `PORT` | No | `3000` | ポート番号 |
//! | `DEV` | No | - | `true` のときデモルートを登録する |
//! | `UPSTREAM_URL` | No | `http://127.0.0.1:4000` | 上流 functions runtime の URL |
//! | `HANDLER_TIMEOUT_SECS` | No | `30` | 単一 JSON を返す委譲先呼び出しのタイムアウト |
//! | `STREAM_TIMEOUT_SECS` | No | `300` | イベントストリーム 1 本あたりの最大存続時間 |
//! | `STREAM_KEEP_ALIVE_SECS` | No | `15` | SSE keep-alive コメントの送信間隔 |

use std::{env, str::FromStr, time::Duration};

use dxrating_infra::DEFAULT_CAPACITY;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:4000";
const DEFAULT_HANDLER_TIMEOUT_SECS: u64 = 30;
const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 300;
const DEFAULT_STREAM_KEEP_ALIVE_SECS: u64 = 15;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} の値が不正です: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// イベントストリームの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// ストリーム 1 本あたりの最大存続時間
    pub timeout:    Duration,
    /// keep-alive コメントの送信間隔
    pub keep_alive: Duration,
    /// イベントチャネルのバッファ数
    pub capacity:   usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            timeout:    Duration::from_secs(DEFAULT_STREAM_TIMEOUT_SECS),
            keep_alive: Duration::from_secs(DEFAULT_STREAM_KEEP_ALIVE_SECS),
            capacity:   DEFAULT_CAPACITY,
        }
    }
}

/// ゲートウェイの設定
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// 開発モード（デモルートの登録可否）
    pub dev: bool,
    /// 上流 functions runtime の URL
    pub upstream_url: String,
    /// 単一 JSON を返す委譲先呼び出しのタイムアウト
    pub handler_timeout: Duration,
    pub stream: StreamConfig,
}

impl GatewayConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでプロセスの環境変数を書き換えずに済むよう、参照先を差し替えられる。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let dev = parse_dev(lookup("DEV").as_deref());
        let upstream_url =
            lookup("UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());
        let handler_timeout =
            parse_secs(&lookup, "HANDLER_TIMEOUT_SECS", DEFAULT_HANDLER_TIMEOUT_SECS)?;
        let stream = StreamConfig {
            timeout: parse_secs(&lookup, "STREAM_TIMEOUT_SECS", DEFAULT_STREAM_TIMEOUT_SECS)?,
            keep_alive: parse_secs(
                &lookup,
                "STREAM_KEEP_ALIVE_SECS",
                DEFAULT_STREAM_KEEP_ALIVE_SECS,
            )?,
            ..StreamConfig::default()
        };

        Ok(Self {
            host,
            port,
            dev,
            upstream_url,
            handler_timeout,
            stream,
        })
    }
}

/// `DEV` の値を解釈する
///
/// 大文字小文字を区別し、`true` と完全一致した場合のみ有効とする。
pub fn parse_dev(value: Option<&str>) -> bool {
    value == Some("true")
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    parse_or(lookup, name, default).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_未設定のときデフォルト値を使う() {
        let config = GatewayConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert!(!config.dev);
        assert_eq!(config.upstream_url, "http://127.0.0.1:4000");
        assert_eq!(config.handler_timeout, Duration::from_secs(30));
        assert_eq!(config.stream, StreamConfig::default());
    }

    #[test]
    fn test_環境変数の値で上書きされる() {
        let config = GatewayConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DEV", "true"),
            ("UPSTREAM_URL", "http://functions:4000"),
            ("HANDLER_TIMEOUT_SECS", "5"),
            ("STREAM_TIMEOUT_SECS", "60"),
            ("STREAM_KEEP_ALIVE_SECS", "3"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.dev);
        assert_eq!(config.upstream_url, "http://functions:4000");
        assert_eq!(config.handler_timeout, Duration::from_secs(5));
        assert_eq!(config.stream.timeout, Duration::from_secs(60));
        assert_eq!(config.stream.keep_alive, Duration::from_secs(3));
    }

    #[test]
    fn test_不正なポート番号はエラーになる() {
        let err = GatewayConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();

        match err {
            ConfigError::InvalidValue { name, value } => {
                assert_eq!(name, "PORT");
                assert_eq!(value, "http");
            }
        }
    }

    #[rstest]
    #[case(Some("true"), true)]
    #[case(Some("TRUE"), false)]
    #[case(Some("True"), false)]
    #[case(Some("1"), false)]
    #[case(Some(""), false)]
    #[case(None, false)]
    fn test_parse_dev_trueと完全一致したときのみ有効(
        #[case] value: Option<&str>,
        #[case] expected: bool,
    ) {
        assert_eq!(parse_dev(value), expected);
    }
}
