//! # 認証パラメータ
//!
//! 上流サービスのアカウント認証情報とリージョンを扱う型を定義する。
//!
//! | 型 | 状態 | 用途 |
//! |---|------|------|
//! | [`RawAuthParams`] | 未検証 | リクエストボディとパスから寛容に読み取った値 |
//! | [`Credentials`] | 検証済み | `id` / `password` の組 |
//! | [`NormalizedAuthParams`] | 検証済み | ハンドラに渡す唯一のパラメータ束 |
//!
//! 検証済みの型はスキーマ（[`crate::schema`]）を通した場合にのみ生成できる。
//! いずれもリクエスト 1 件の間だけ存在し、永続化やキャッシュはしない。

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::{Region, ValidationErrors, schema};

/// 未検証のフィールド値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    /// 指定されていない
    Missing,
    /// 文字列が指定された（空文字を含む）
    Text(String),
    /// 文字列以外が指定された（値は受け取った JSON 型名）
    NotText(&'static str),
}

impl RawField {
    fn from_json(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(other) => Self::NotText(json_type_name(other)),
        }
    }
}

/// 未検証の認証パラメータ
///
/// リクエストボディを「すべてのフィールドが任意」として読み取った結果。
/// 型が違うフィールドがあってもここでは失敗させず、リージョンの優先順位を
/// 解決した後にスキーマ検証でまとめて報告する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAuthParams {
    pub(crate) id:        RawField,
    pub(crate) password:  RawField,
    pub(crate) region:    RawField,
    /// ボディがオブジェクトでなかった場合、受け取った JSON 型名
    pub(crate) body_kind: Option<&'static str>,
}

impl RawAuthParams {
    /// JSON ボディから読み取る
    ///
    /// オブジェクト以外（配列・文字列など）を受け取った場合は全フィールドを
    /// 未指定とみなし、ボディ全体の違反として記録する。
    pub fn from_json(body: &Value) -> Self {
        match body {
            Value::Object(map) => Self {
                id:        RawField::from_json(map.get("id")),
                password:  RawField::from_json(map.get("password")),
                region:    RawField::from_json(map.get("region")),
                body_kind: None,
            },
            other => Self {
                id:        RawField::Missing,
                password:  RawField::Missing,
                region:    RawField::Missing,
                body_kind: Some(json_type_name(other)),
            },
        }
    }

    /// 文字列値から直接作成する（`None` は未指定）
    pub fn from_parts(id: Option<&str>, password: Option<&str>, region: Option<&str>) -> Self {
        let text = |v: Option<&str>| v.map_or(RawField::Missing, |s| RawField::Text(s.to_string()));
        Self {
            id:        text(id),
            password:  text(password),
            region:    text(region),
            body_kind: None,
        }
    }

    /// パスセグメントのリージョンを優先して実効リージョンを決める
    ///
    /// パスの値が存在し空でなければそれを採用し、そうでなければボディの値を残す。
    #[must_use]
    pub fn with_path_region(mut self, path_region: Option<&str>) -> Self {
        if let Some(region) = path_region.filter(|r| !r.is_empty()) {
            self.region = RawField::Text(region.to_string());
        }
        self
    }

    /// パラメータスキーマで検証し、正規化済みパラメータに変換する
    pub fn validate(self) -> Result<NormalizedAuthParams, ValidationErrors> {
        schema::validate(self)
    }
}

/// 上流サービスのアカウント認証情報
///
/// `Debug` 出力ではパスワードを伏せる。
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    id:       String,
    password: String,
}

impl Credentials {
    pub(crate) fn new(id: String, password: String) -> Self {
        Self { id, password }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 検証済みの認証パラメータ束
///
/// # 不変条件
///
/// - `credentials` の `id` / `password` はいずれも 1 文字以上
/// - `region` は [`Region`] のいずれか
/// - 生成後は変更できない
///
/// JSON では `{ "credentials": { "id", "password" }, "region" }` の形になり、
/// これ以外のフィールドは持たない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedAuthParams {
    credentials: Credentials,
    region:      Region,
}

impl NormalizedAuthParams {
    pub(crate) fn new(credentials: Credentials, region: Region) -> Self {
        Self {
            credentials,
            region,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// ハンドラ向けに `credentials` と `region` へ分解する
    pub fn into_parts(self) -> (Credentials, Region) {
        (self.credentials, self.region)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
