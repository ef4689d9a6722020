//! # 解码流水线模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像”的过程集中管理，并在关键节点增加资源上限控制。
//! 优先读取 header 尺寸做像素检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 猜测格式并读取 header 尺寸
//! 2. 按像素上限快速拒绝
//! 3. 完整解码，并对真实尺寸再校验一次
//!
//! SVG 文本不经过 `image`：用 `usvg` 解析出固有尺寸，校验像素上限后由 `resvg`
//! 按固有尺寸栅格化，再把预乘 alpha 还原成普通 RGBA。

use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;

use super::source::RawImageData;
use super::{ExportConfig, ExportError};

const SVG_SNIFF_LIMIT: usize = 1024;

/// 将重新获取的原始字节解码为图像。
pub(crate) fn decode_raw_image(
    raw: &RawImageData,
    config: &ExportConfig,
) -> Result<DynamicImage, ExportError> {
    if is_svg_markup(&raw.bytes) {
        return rasterize_svg(raw, config);
    }

    image::guess_format(&raw.bytes)
        .map_err(|e| ExportError::InvalidFormat(format!("不支持的图片格式：{}", e)))?;

    let (header_width, header_height) = inspect_dimensions_from_memory(&raw.bytes)?;
    validate_pixel_limits(config, header_width, header_height)?;

    let decoded = image::load_from_memory(&raw.bytes)
        .map_err(|e| ExportError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    validate_pixel_limits(config, width, height)?;

    log::info!(
        "✅ 图片解码成功 - 来源: {} 尺寸: {}x{}",
        raw.source_hint,
        width,
        height
    );

    Ok(decoded)
}

/// 字节开头（跳过 BOM、空白与 XML 声明/注释）是否为 `<svg` 根元素。
pub(crate) fn is_svg_markup(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LIMIT)];
    let text = String::from_utf8_lossy(head);
    let mut rest = text.trim_start_matches('\u{feff}').trim_start();

    loop {
        let terminator = if rest.starts_with("<?") {
            "?>"
        } else if rest.starts_with("<!--") {
            "-->"
        } else if rest.starts_with("<!") {
            ">"
        } else {
            break;
        };
        match rest.find(terminator) {
            Some(end) => rest = rest[end + terminator.len()..].trim_start(),
            None => return false,
        }
    }

    rest.starts_with("<svg")
}

fn rasterize_svg(raw: &RawImageData, config: &ExportConfig) -> Result<DynamicImage, ExportError> {
    let markup = std::str::from_utf8(&raw.bytes)
        .map_err(|e| ExportError::Decode(format!("SVG 不是合法的 UTF-8：{}", e)))?;
    let tree = usvg::Tree::from_str(markup, &usvg::Options::default())
        .map_err(|e| ExportError::Decode(format!("SVG 解析失败：{}", e)))?;

    let size = tree.size();
    let (source_width, source_height) = (size.width(), size.height());
    let width = source_width.ceil().max(1.0) as u32;
    let height = source_height.ceil().max(1.0) as u32;
    validate_pixel_limits(config, width, height)?;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        ExportError::ResourceLimit(format!("无法创建 {}x{} 的栅格画布", width, height))
    })?;
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / source_width,
        height as f32 / source_height,
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    let image = RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| ExportError::Decode("SVG 栅格结果尺寸不一致".to_string()))?;

    log::info!(
        "✅ SVG 栅格化成功 - 来源: {} 尺寸: {}x{}",
        raw.source_hint,
        width,
        height
    );

    Ok(DynamicImage::ImageRgba8(image))
}

/// 仅通过内存中的图片头信息读取宽高。
fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), ExportError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ExportError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| ExportError::InvalidFormat(format!("无法读取图片尺寸：{}", e)))
}

fn validate_pixel_limits(config: &ExportConfig, width: u32, height: u32) -> Result<(), ExportError> {
    let pixels = (width as u64)
        .checked_mul(height as u64)
        .ok_or_else(|| ExportError::ResourceLimit("图片像素数溢出".to_string()))?;

    if pixels == 0 {
        return Err(ExportError::Decode("图片尺寸为 0".to_string()));
    }

    if pixels > config.max_decoded_pixels {
        return Err(ExportError::ResourceLimit(format!(
            "图片像素过大：{} 像素（限制：{} 像素）",
            pixels, config.max_decoded_pixels
        )));
    }

    Ok(())
}
