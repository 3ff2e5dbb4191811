//! # パラメータ再構成ミドルウェア
//!
//! パスセグメントとリクエストボディに分かれて届く認証パラメータを 1 つにまとめ、
//! スキーマで検証してからハンドラに渡す。
//!
//! ## 処理の流れ
//!
//! 1. ボディを寛容に読み取る（各フィールドは任意、型違いもここでは失敗させない）
//! 2. 実効リージョンを決める（パスの `{region}` が空でなければ優先、なければボディの値）。
//!    UTF-8 として復号できないパスの値もそのまま優先し、検証で拒否する
//! 3. `id` / `password` / 実効リージョンを全フィールド必須のスキーマで検証する
//! 4. 成功したら [`NormalizedAuthParams`] と、分解した [`Credentials`] / [`Region`] を
//!    リクエスト extensions に格納して次へ進む
//! 5. 失敗したら 400 と違反一覧を返し、ハンドラは実行しない
//!
//! `Content-Type` が JSON でないボディは読まずに空として扱う。
//! ボディが JSON として壊れている場合は検証エラーではないため、
//! [`GatewayError::MalformedBody`] としてエラーバウンダリに任せる。
//!
//! [`Credentials`]: dxrating_domain::Credentials
//! [`Region`]: dxrating_domain::Region

use axum::{
    RequestExt,
    body::Body,
    extract::{RawPathParams, Request, rejection::RawPathParamsRejection},
    middleware::Next,
    response::Response,
};
use dxrating_domain::{NormalizedAuthParams, RawAuthParams};
use serde_json::{Map, Value};

use crate::{
    body::{parse_json_body, read_body},
    error::GatewayError,
};

/// リージョンを運ぶパスパラメータ名
pub const REGION_PATH_PARAM: &str = "region";

/// 認証パラメータを再構成・検証するミドルウェア
pub async fn reconcile_auth_params(
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let path_region = match request.extract_parts::<RawPathParams>().await {
        Ok(params) => params
            .iter()
            .find(|(key, _)| *key == REGION_PATH_PARAM)
            .map(|(_, value)| value.to_string()),
        Err(RawPathParamsRejection::InvalidUtf8InPathParam(rejection)) => {
            // 復号できないセグメントもパスの値として扱い、スキーマで拒否させる
            tracing::debug!(%rejection, "パスパラメータを復号できません");
            last_segment(request.uri().path())
        }
        Err(_) => None,
    };

    let (mut parts, body) = request.into_parts();
    let bytes = read_body(body).await?;
    let body = parse_json_body(&parts.headers, &bytes)?
        .unwrap_or_else(|| Value::Object(Map::new()));

    let params = RawAuthParams::from_json(&body)
        .with_path_region(path_region.as_deref())
        .validate()
        .inspect_err(|errors| {
            tracing::debug!(
                error.category = "validation",
                violations = errors.len(),
                "パラメータ検証に失敗しました"
            );
        })?;

    tracing::debug!(region = %params.region(), "パラメータを検証しました");
    insert_params(&mut parts.extensions, params);

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// パス末尾のセグメント（パーセントエンコードされたまま）
fn last_segment(path: &str) -> Option<String> {
    path.rsplit('/').next().map(str::to_string)
}

fn insert_params(extensions: &mut axum::http::Extensions, params: NormalizedAuthParams) {
    extensions.insert(params.credentials().clone());
    extensions.insert(params.region());
    extensions.insert(params);
}
