//! # リクエストボディの読み取り
//!
//! JSON として解釈するのは `Content-Type` が `application/json`（または `+json` 接尾辞）の
//! ボディだけで、それ以外は空のボディと同じく `None` になる。

use axum::{
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, header::CONTENT_TYPE},
};
use serde_json::Value;

use crate::error::GatewayError;

/// 受け付けるボディの上限（1 MiB）
pub const BODY_LIMIT: usize = 1024 * 1024;

/// ボディを最後まで読み込む
pub async fn read_body(body: Body) -> Result<Bytes, GatewayError> {
    to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|e| GatewayError::MalformedBody(e.to_string()))
}

/// JSON として解釈する。空（空白のみを含む）なら `None`
fn parse_json(bytes: &[u8]) -> Result<Option<Value>, GatewayError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| GatewayError::MalformedBody(e.to_string()))
}

/// `Content-Type` が JSON のときだけ解釈する
pub fn parse_json_body(
    headers: &HeaderMap,
    bytes: &[u8],
) -> Result<Option<Value>, GatewayError> {
    if !has_json_content_type(headers) {
        if !bytes.is_empty() {
            tracing::debug!(
                content_type = ?headers.get(CONTENT_TYPE),
                "JSON 以外のボディを無視します"
            );
        }
        return Ok(None);
    }
    parse_json(bytes)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_json_空のボディはnone() {
        assert_eq!(parse_json(b"").unwrap(), None);
        assert_eq!(parse_json(b" \n").unwrap(), None);
    }

    #[test]
    fn test_parse_json_jsonを解釈する() {
        assert_eq!(parse_json(br#"{"id":"a"}"#).unwrap(), Some(json!({ "id": "a" })));
    }

    #[test]
    fn test_parse_json_壊れたjsonはmalformed_body() {
        let err = parse_json(b"{\"id\":").unwrap_err();

        assert!(matches!(err, GatewayError::MalformedBody(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_read_body_上限を超えるとmalformed_body() {
        let err = read_body(Body::from(vec![b' '; BODY_LIMIT + 1]))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::MalformedBody(_)), "{err:?}");
    }

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        headers
    }

    #[rstest]
    #[case(Some("application/json"), true)]
    #[case(Some("application/json; charset=utf-8"), true)]
    #[case(Some("Application/JSON"), true)]
    #[case(Some("application/merge-patch+json"), true)]
    #[case(Some("text/plain"), false)]
    #[case(Some("application/x-www-form-urlencoded"), false)]
    #[case(None, false)]
    fn test_has_json_content_type(
        #[case] content_type: Option<&'static str>,
        #[case] expected: bool,
    ) {
        assert_eq!(has_json_content_type(&headers(content_type)), expected);
    }

    #[test]
    fn test_parse_json_body_json以外のボディは解釈しない() {
        let parsed = parse_json_body(&headers(Some("text/plain")), b"{\"id\":").unwrap();

        assert_eq!(parsed, None);
    }

    #[test]
    fn test_parse_json_body_jsonのボディを解釈する() {
        let parsed =
            parse_json_body(&headers(Some("application/json")), br#"{"id":"a"}"#).unwrap();

        assert_eq!(parsed, Some(json!({ "id": "a" })));
    }
}
