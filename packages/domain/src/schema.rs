//! # パラメータスキーマ
//!
//! 認証パラメータの検証ルール。
//!
//! | フィールド | ルール |
//! |-----------|--------|
//! | `id` | 必須、1 文字以上 |
//! | `password` | 必須、1 文字以上 |
//! | `region` | 必須、`jp` / `intl` のいずれかと完全一致 |
//!
//! 各フィールドは独立に評価し、違反をすべて集めてから返す。
//! 副作用のない純粋関数で、検証の成否は `Result` のタグで表す。

use std::str::FromStr;

use crate::{
    Credentials,
    NormalizedAuthParams,
    RawAuthParams,
    RawField,
    Region,
    ValidationErrors,
    ValidationIssue,
};

/// 文字列フィールドの最小長
const MIN_LENGTH: usize = 1;

/// 未検証パラメータを検証し、正規化済みパラメータを返す
///
/// 違反が 1 件でもあれば、全違反を列挙した [`ValidationErrors`] を返す。
pub fn validate(raw: RawAuthParams) -> Result<NormalizedAuthParams, ValidationErrors> {
    let body = raw.body_kind.map(ValidationIssue::expected_object);
    let id = check_non_empty("id", raw.id);
    let password = check_non_empty("password", raw.password);
    let region = check_region(raw.region);

    match (body, id, password, region) {
        (None, Ok(id), Ok(password), Ok(region)) => Ok(NormalizedAuthParams::new(
            Credentials::new(id, password),
            region,
        )),
        (body, id, password, region) => {
            let issues = body
                .into_iter()
                .chain(id.err())
                .chain(password.err())
                .chain(region.err())
                .collect();
            Err(ValidationErrors::from_violations(issues))
        }
    }
}

fn check_non_empty(field: &str, value: RawField) -> Result<String, ValidationIssue> {
    match value {
        RawField::Missing => Err(ValidationIssue::required(field)),
        RawField::NotText(kind) => Err(ValidationIssue::expected_string(field, kind)),
        RawField::Text(s) if s.chars().count() < MIN_LENGTH => {
            Err(ValidationIssue::too_small(field, MIN_LENGTH))
        }
        RawField::Text(s) => Ok(s),
    }
}

fn check_region(value: RawField) -> Result<Region, ValidationIssue> {
    match value {
        RawField::Missing => Err(ValidationIssue::required("region")),
        RawField::NotText(kind) => Err(ValidationIssue::expected_string("region", kind)),
        RawField::Text(s) => Region::from_str(&s)
            .map_err(|_| ValidationIssue::invalid_enum_value("region", &s, Region::tokens())),
    }
}
