//! # 候选打分
//!
//! 分数 = 协议基础分 + 自然分辨率分（封顶）+ 屏幕显示面积分（封顶）。
//!
//! | 协议 | 基础分 |
//! |------|--------|
//! | `blob:` | 10000 |
//! | `http:` / `https:` | 5000 |
//! | `data:` | 1000 |
//! | 其他 | 0 |

use crate::geometry::Size;

pub const BLOB_SCHEME_SCORE: f64 = 10_000.0;
pub const NETWORK_SCHEME_SCORE: f64 = 5_000.0;
pub const DATA_SCHEME_SCORE: f64 = 1_000.0;

pub const RESOLUTION_DIVISOR: f64 = 100.0;
pub const RESOLUTION_CAP: f64 = 5_000.0;
pub const PROMINENCE_DIVISOR: f64 = 10.0;
pub const PROMINENCE_CAP: f64 = 3_000.0;

/// URL 协议分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlScheme {
    Blob,
    Network,
    InlineData,
    Other,
}

impl UrlScheme {
    pub fn of(url: &str) -> Self {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "blob" => Self::Blob,
            "http" | "https" => Self::Network,
            "data" => Self::InlineData,
            _ => Self::Other,
        }
    }

    pub fn base_score(self) -> f64 {
        match self {
            Self::Blob => BLOB_SCHEME_SCORE,
            Self::Network => NETWORK_SCHEME_SCORE,
            Self::InlineData => DATA_SCHEME_SCORE,
            Self::Other => 0.0,
        }
    }
}

pub fn resolution_score(natural: Option<Size>) -> f64 {
    natural
        .map(|size| (size.area() / RESOLUTION_DIVISOR).min(RESOLUTION_CAP))
        .unwrap_or(0.0)
}

pub fn prominence_score(rendered: Size) -> f64 {
    (rendered.area() / PROMINENCE_DIVISOR).min(PROMINENCE_CAP)
}

/// 元素候选：三项全计。
pub fn element_score(url: &str, natural: Option<Size>, rendered: Size) -> f64 {
    UrlScheme::of(url).base_score() + resolution_score(natural) + prominence_score(rendered)
}

/// 背景图候选：自然尺寸不可知，只计显示面积。
pub fn background_score(url: &str, rendered: Size) -> f64 {
    UrlScheme::of(url).base_score() + prominence_score(rendered)
}
