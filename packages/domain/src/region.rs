//! # サーバーリージョン
//!
//! 上流サービスのどのリージョン（日本版 / 国際版）に問い合わせるかを表す。
//!
//! 文字列との相互変換は strum で導出する。比較は大文字小文字を区別する完全一致で、
//! `"JP"` や `" jp"` のような表記ゆれは正規化せずに不正値として扱う。

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};

/// サーバーリージョン
///
/// # 使用例
///
/// ```rust
/// use std::str::FromStr;
///
/// use dxrating_domain::Region;
///
/// assert_eq!(Region::from_str("jp").unwrap(), Region::Jp);
/// assert!(Region::from_str("JP").is_err());
/// assert_eq!(Region::Intl.as_str(), "intl");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    /// 日本版
    Jp,
    /// 国際版
    Intl,
}

impl Region {
    /// リージョンのトークン文字列を返す
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// 受け付けるトークンの一覧（宣言順）
    pub fn tokens() -> &'static [&'static str] {
        Self::VARIANTS
    }
}
