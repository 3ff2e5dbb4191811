//! # 検証エラー
//!
//! パラメータスキーマが返す違反情報の構造化表現。
//!
//! 1 件の違反を [`ValidationIssue`]、違反の一覧を [`ValidationErrors`] で表す。
//! `ValidationErrors` はそのまま JSON 配列としてシリアライズされ、
//! 400 レスポンスの `details` フィールドに格納される。
//!
//! ## JSON 形式
//!
//! ```json
//! [
//!   {
//!     "code": "too_small",
//!     "path": ["id"],
//!     "message": "String must contain at least 1 character(s)",
//!     "minimum": 1,
//!     "type": "string",
//!     "inclusive": true
//!   }
//! ]
//! ```

use serde::Serialize;
use thiserror::Error;

/// 違反の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// 型が違う（未指定を含む）
    InvalidType,
    /// 最小長に満たない
    TooSmall,
    /// 列挙値のいずれにも一致しない
    InvalidEnumValue,
}

/// 1 フィールド分の違反情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub code:      IssueCode,
    /// 違反したフィールドへのパス（ボディ全体の違反では空）
    pub path:      Vec<String>,
    pub message:   String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected:  Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received:  Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum:   Option<usize>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options:   Option<Vec<String>>,
}

impl ValidationIssue {
    fn base(code: IssueCode, path: Vec<String>, message: String) -> Self {
        Self {
            code,
            path,
            message,
            expected: None,
            received: None,
            minimum: None,
            value_type: None,
            inclusive: None,
            options: None,
        }
    }

    /// 必須フィールドが存在しない
    pub fn required(field: &str) -> Self {
        Self {
            expected: Some("string".to_string()),
            received: Some("undefined".to_string()),
            ..Self::base(
                IssueCode::InvalidType,
                vec![field.to_string()],
                "Required".to_string(),
            )
        }
    }

    /// 文字列であるべきフィールドに別の型が指定された
    pub fn expected_string(field: &str, received: &str) -> Self {
        Self {
            expected: Some("string".to_string()),
            received: Some(received.to_string()),
            ..Self::base(
                IssueCode::InvalidType,
                vec![field.to_string()],
                format!("Expected string, received {received}"),
            )
        }
    }

    /// リクエストボディがオブジェクトではない
    pub fn expected_object(received: &str) -> Self {
        Self {
            expected: Some("object".to_string()),
            received: Some(received.to_string()),
            ..Self::base(
                IssueCode::InvalidType,
                Vec::new(),
                format!("Expected object, received {received}"),
            )
        }
    }

    /// 文字列が最小長に満たない
    pub fn too_small(field: &str, minimum: usize) -> Self {
        Self {
            minimum: Some(minimum),
            value_type: Some("string".to_string()),
            inclusive: Some(true),
            ..Self::base(
                IssueCode::TooSmall,
                vec![field.to_string()],
                format!("String must contain at least {minimum} character(s)"),
            )
        }
    }

    /// 列挙値のいずれにも一致しない
    pub fn invalid_enum_value(field: &str, received: &str, options: &[&str]) -> Self {
        let expected = options
            .iter()
            .map(|o| format!("'{o}'"))
            .collect::<Vec<_>>()
            .join(" | ");
        Self {
            received: Some(received.to_string()),
            options: Some(options.iter().map(|o| (*o).to_string()).collect()),
            ..Self::base(
                IssueCode::InvalidEnumValue,
                vec![field.to_string()],
                format!("Invalid enum value. Expected {expected}, received '{received}'"),
            )
        }
    }

    /// 違反したフィールド名（ボディ全体の違反では `None`）
    pub fn field(&self) -> Option<&str> {
        self.path.first().map(String::as_str)
    }
}

/// 検証失敗（違反の一覧）
///
/// 最初の違反で打ち切らず、検出したすべての違反を保持する。
/// 空の `ValidationErrors` は作られない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(transparent)]
#[error("パラメータが不正です（{} 件の違反）", .0.len())]
pub struct ValidationErrors(Vec<ValidationIssue>);

impl ValidationErrors {
    /// 違反が 1 件以上あることが分かっている一覧から作成する
    pub(crate) fn from_violations(issues: Vec<ValidationIssue>) -> Self {
        debug_assert!(!issues.is_empty(), "違反のない ValidationErrors は作らない");
        Self(issues)
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.0
    }

    /// 指定フィールドの違反を含むか
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|issue| issue.field() == Some(field))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
