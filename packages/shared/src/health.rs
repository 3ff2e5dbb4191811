//! # 稼働確認レスポンス
//!
//! ルート `/` が返す稼働確認用のレスポンス型。

use serde::{Deserialize, Serialize};

/// 稼働確認レスポンス
///
/// ## 使用例
///
/// ```
/// use dxrating_shared::ServiceStatus;
///
/// let status = ServiceStatus::new("up", "https://example.com/repo");
/// assert_eq!(status.self_link, "https://example.com/repo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub message:   String,
    /// このサービスのソースコードの所在
    #[serde(rename = "_self")]
    pub self_link: String,
}

impl ServiceStatus {
    pub fn new(message: impl Into<String>, self_link: impl Into<String>) -> Self {
        Self {
            message:   message.into(),
            self_link: self_link.into(),
        }
    }
}
