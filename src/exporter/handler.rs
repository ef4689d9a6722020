use std::sync::Arc;
use std::time::Instant;

use super::clipboard_writer::ClipboardSink;
use super::loader::{Fetcher, redact_url_for_log};
use super::pipeline::decode_raw_image;
use super::save::{
    DownloadRequest, ExportSink, SaveOutcome, SavedUrlKind, derive_filename,
    normalize_png_extension,
};
use super::source::DisplayedImage;
use super::surface::OffscreenSurface;
use super::{ExportConfig, ExportError};
use crate::resolver::UrlScheme;

/// 导出编排器：持有配置与三个外部边界（获取、剪贴板、下载器）。
pub struct PixelExporter {
    config: ExportConfig,
    fetcher: Arc<dyn Fetcher>,
    clipboard: Arc<dyn ClipboardSink>,
    sink: Arc<dyn ExportSink>,
}

impl PixelExporter {
    pub fn new(
        config: ExportConfig,
        fetcher: Arc<dyn Fetcher>,
        clipboard: Arc<dyn ClipboardSink>,
        sink: Arc<dyn ExportSink>,
    ) -> Result<Self, ExportError> {
        config.validate()?;
        Ok(Self {
            config,
            fetcher,
            clipboard,
            sink,
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// 在没有渲染层的宿主上模拟“图片已解码显示”。
    ///
    /// 获取或解码失败时返回未就绪的句柄，后续导出会得到 `ImageNotReady`。
    pub async fn decode_for_display(&self, url: &str, origin_clean: bool) -> DisplayedImage {
        let decoded = match self.fetcher.fetch(url).await {
            Ok(raw) => decode_raw_image(&raw, &self.config),
            Err(err) => Err(err),
        };

        match decoded {
            Ok(image) if origin_clean => DisplayedImage::decoded(url, image.to_rgba8()),
            Ok(image) => DisplayedImage::decoded_cross_origin(url, image.to_rgba8()),
            Err(err) => {
                log::warn!("⚠️ 图片未能解码显示：{} - {}", redact_url_for_log(url), err);
                DisplayedImage::pending(url)
            }
        }
    }

    /// 把当前显示的图片导出为 PNG 字节。
    ///
    /// 1. 离屏表面绘制已解码像素并编码
    /// 2. 第一步被污染或无输出时，直接重新获取原始 URL，解码后在新表面上重画
    /// 3. 两步都失败则返回 `FetchBlocked`
    pub async fn export_pixels(&self, image: &DisplayedImage) -> Result<Vec<u8>, ExportError> {
        let total_start = Instant::now();
        let redacted = redact_url_for_log(image.url());

        if !image.is_ready() {
            log::warn!("⏳ 图片尚未解码完成，放弃本次导出：{}", redacted);
            return Err(ExportError::ImageNotReady(image.url().to_string()));
        }

        let surface_start = Instant::now();
        let first_error = match OffscreenSurface::from_displayed(image).and_then(|s| s.to_png()) {
            Ok(png) => {
                log::info!(
                    "✅ 像素导出完成 - surface={}ms total={}ms size={} bytes",
                    surface_start.elapsed().as_millis(),
                    total_start.elapsed().as_millis(),
                    png.len()
                );
                return Ok(png);
            }
            Err(err) if err.allows_refetch() => err,
            Err(err) => return Err(err),
        };

        log::warn!(
            "⚠️ 离屏导出失败（{}），改为重新获取：{}",
            first_error.code(),
            redacted
        );

        let fetch_start = Instant::now();
        let raw = self
            .fetcher
            .fetch(image.url())
            .await
            .map_err(|e| Self::blocked(&redacted, e))?;
        let fetch_ms = fetch_start.elapsed().as_millis();

        let decode_start = Instant::now();
        let decoded = decode_raw_image(&raw, &self.config).map_err(|e| Self::blocked(&redacted, e))?;
        let decode_ms = decode_start.elapsed().as_millis();

        let encode_start = Instant::now();
        let png = OffscreenSurface::from_decoded(&decoded)
            .and_then(|surface| surface.to_png())
            .map_err(|e| Self::blocked(&redacted, e))?;

        log::info!(
            "✅ 像素导出完成（重新获取）- fetch={}ms decode={}ms encode={}ms total={}ms size={} bytes",
            fetch_ms,
            decode_ms,
            encode_start.elapsed().as_millis(),
            total_start.elapsed().as_millis(),
            png.len()
        );
        Ok(png)
    }

    /// 导出并写入剪贴板。
    pub async fn copy(&self, image: &DisplayedImage) -> Result<(), ExportError> {
        let png = self.export_pixels(image).await?;
        let copy_start = Instant::now();
        self.clipboard.write_png(&png).await?;
        log::info!("📋 已复制图片 - copy={}ms", copy_start.elapsed().as_millis());
        Ok(())
    }

    /// 交给下载器保存。
    pub async fn save(&self, image: &DisplayedImage) -> Result<SaveOutcome, ExportError> {
        let filename = derive_filename(image.url(), &self.config.default_filename);

        let (request, url_kind) = match UrlScheme::of(image.url()) {
            UrlScheme::Blob => {
                let png = self.export_pixels(image).await?;
                let request = DownloadRequest {
                    url: super::surface::png_data_url(&png),
                    filename: normalize_png_extension(&filename),
                };
                (request, SavedUrlKind::ConvertedDataUrl)
            }
            _ => {
                let request = DownloadRequest {
                    url: image.url().to_string(),
                    filename,
                };
                (request, SavedUrlKind::PassThrough)
            }
        };

        let filename = request.filename.clone();
        let location = self.sink.save(request).await?;
        log::info!("💾 保存请求已确认：{}", filename);

        Ok(SaveOutcome {
            filename,
            url_kind,
            location,
        })
    }

    fn blocked(redacted: &str, err: ExportError) -> ExportError {
        log::warn!("🛑 重新获取失败（{}）：{} - {}", err.code(), redacted, err);
        match err {
            ExportError::FetchBlocked(_) => err,
            other => ExportError::FetchBlocked(other.to_string()),
        }
    }
}
