//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“放大层正在显示的图片”与“流水线中间结果”解耦：
//! - `DisplayedImage` 表示渲染层已经解码好的图片句柄
//! - `RawImageData` 表示重新获取到、但尚未解码的字节
//!
//! ## 前置条件
//!
//! 导出第一步依赖“图片已由渲染层解码到可读取的像素缓冲”。
//! 非浏览器宿主需要提供等价的“解码后再采样”能力，否则只能跳过第一步。

use image::RgbaImage;

/// 放大层当前显示的图片。
#[derive(Debug, Clone)]
pub struct DisplayedImage {
    url: String,
    pixels: Option<RgbaImage>,
    /// 渲染层是否允许读回像素（同源或 CORS 放行）。
    origin_clean: bool,
}

impl DisplayedImage {
    /// 已解码、可读回像素的图片。
    pub fn decoded(url: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            url: url.into(),
            pixels: Some(pixels),
            origin_clean: true,
        }
    }

    /// 已解码但跨域未授权的图片：能显示，不能读回。
    pub fn decoded_cross_origin(url: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            url: url.into(),
            pixels: Some(pixels),
            origin_clean: false,
        }
    }

    /// 仍在加载/解码中的图片。
    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pixels: None,
            origin_clean: true,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 自然像素尺寸；未解码时为空。
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.pixels
            .as_ref()
            .map(|pixels| pixels.dimensions())
            .filter(|(width, height)| *width > 0 && *height > 0)
    }

    pub fn is_ready(&self) -> bool {
        self.natural_size().is_some()
    }

    pub fn is_origin_clean(&self) -> bool {
        self.origin_clean
    }

    pub(crate) fn pixels(&self) -> Option<&RgbaImage> {
        self.pixels.as_ref()
    }
}

/// 重新获取阶段输出：原始字节与来源标识。
pub struct RawImageData {
    pub bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub source_hint: &'static str,
}
