//! # 离屏位图表面
//!
//! ## 设计思路
//!
//! 模拟渲染层的离屏画布：按图片自然尺寸分配 RGBA 缓冲，把已解码像素绘制上去，
//! 再无损编码为 PNG。绘制跨域未授权的图片会把表面标记为“已污染”，
//! 之后任何读回操作都返回 `SurfaceTainted`。

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, ImageFormat, RgbaImage, imageops};
use std::io::Cursor;

use super::ExportError;
use super::source::DisplayedImage;

pub const PNG_MIME: &str = "image/png";

#[derive(Debug, Clone)]
pub struct OffscreenSurface {
    buffer: RgbaImage,
    origin_clean: bool,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, ExportError> {
        if width == 0 || height == 0 {
            return Err(ExportError::ExtractionFailed(format!(
                "离屏表面尺寸无效：{}x{}",
                width, height
            )));
        }

        Ok(Self {
            buffer: RgbaImage::new(width, height),
            origin_clean: true,
        })
    }

    /// 按显示图片的自然尺寸创建表面并绘制。
    pub fn from_displayed(image: &DisplayedImage) -> Result<Self, ExportError> {
        let (width, height) = image
            .natural_size()
            .ok_or_else(|| ExportError::ImageNotReady(image.url().to_string()))?;

        let mut surface = Self::new(width, height)?;
        surface.draw_displayed(image)?;
        Ok(surface)
    }

    /// 按解码结果的尺寸创建表面并绘制。
    pub fn from_decoded(image: &DynamicImage) -> Result<Self, ExportError> {
        let mut surface = Self::new(image.width(), image.height())?;
        surface.draw_decoded(image);
        Ok(surface)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    pub fn is_tainted(&self) -> bool {
        !self.origin_clean
    }

    pub fn draw_displayed(&mut self, image: &DisplayedImage) -> Result<(), ExportError> {
        let pixels = image
            .pixels()
            .filter(|_| image.is_ready())
            .ok_or_else(|| ExportError::ImageNotReady(image.url().to_string()))?;

        if !image.is_origin_clean() {
            self.origin_clean = false;
        }

        imageops::replace(&mut self.buffer, pixels, 0, 0);
        Ok(())
    }

    /// 绘制重新获取并解码的图片，来源已通过获取校验，不污染表面。
    pub fn draw_decoded(&mut self, image: &DynamicImage) {
        let rgba = image.to_rgba8();
        imageops::replace(&mut self.buffer, &rgba, 0, 0);
    }

    /// 无损导出为 PNG 字节。
    pub fn to_png(&self) -> Result<Vec<u8>, ExportError> {
        if self.is_tainted() {
            return Err(ExportError::SurfaceTainted(
                "表面包含跨域未授权像素".to_string(),
            ));
        }

        let mut bytes = Vec::new();
        self.buffer
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| ExportError::ExtractionFailed(format!("PNG 编码失败：{}", e)))?;

        if bytes.is_empty() {
            return Err(ExportError::ExtractionFailed("PNG 编码结果为空".to_string()));
        }

        Ok(bytes)
    }

    pub fn to_data_url(&self) -> Result<String, ExportError> {
        let png = self.to_png()?;
        Ok(png_data_url(&png))
    }
}

pub fn png_data_url(png: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        PNG_MIME,
        general_purpose::STANDARD.encode(png)
    )
}
