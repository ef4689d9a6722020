//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 剪贴板只接收一份无损图片载荷。`ClipboardSink` 抽象写入边界，
//! 默认实现 `ArboardClipboard` 在阻塞线程上完成解码与写入，
//! 剪贴板被其他进程占用时按指数退避重试。

use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;

use super::{ExportConfig, ExportError};

#[async_trait]
pub trait ClipboardSink: Send + Sync {
    async fn write_png(&self, png: &[u8]) -> Result<(), ExportError>;
}

#[derive(Debug, Clone)]
pub struct ArboardClipboard {
    retries: u32,
    retry_delay_ms: u64,
}

impl ArboardClipboard {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            retries: config.clipboard_retries,
            retry_delay_ms: config.clipboard_retry_delay_ms,
        }
    }

    fn write_with_retry(
        width: usize,
        height: usize,
        bytes: &[u8],
        retries: u32,
        retry_delay_ms: u64,
    ) -> Result<(), ExportError> {
        let retry_count = retries.max(1);
        let mut last_error = None;

        for attempt in 1..=retry_count {
            if attempt > 1 {
                let wait_ms = backoff_delay(retry_delay_ms, attempt - 1);
                log::debug!("🔄 重试 {}/{}，等待 {}ms", attempt, retry_count, wait_ms);
                std::thread::sleep(Duration::from_millis(wait_ms));
            }

            let result = arboard::Clipboard::new().and_then(|mut clipboard| {
                clipboard.set_image(arboard::ImageData {
                    width,
                    height,
                    bytes: Cow::Borrowed(bytes),
                })
            });

            match result {
                Ok(()) => {
                    log::info!("✅ 复制成功 (尝试 {})", attempt);
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("❌ 尝试 {} 失败: {}", attempt, err);
                    let retryable = matches!(err, arboard::Error::ClipboardOccupied);
                    last_error = Some(err.to_string());
                    if !retryable {
                        break;
                    }
                }
            }
        }

        Err(ExportError::Clipboard(
            last_error.unwrap_or_else(|| "未知错误".to_string()),
        ))
    }
}

#[async_trait]
impl ClipboardSink for ArboardClipboard {
    async fn write_png(&self, png: &[u8]) -> Result<(), ExportError> {
        let rgba = image::load_from_memory(png)
            .map_err(|e| ExportError::Decode(format!("PNG 解码失败：{}", e)))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let bytes = rgba.into_raw();
        let retries = self.retries;
        let retry_delay_ms = self.retry_delay_ms;

        tokio::task::spawn_blocking(move || {
            Self::write_with_retry(width as usize, height as usize, &bytes, retries, retry_delay_ms)
        })
        .await
        .map_err(|e| ExportError::Clipboard(format!("剪贴板任务异常：{}", e)))?
    }
}

fn backoff_delay(base_delay_ms: u64, attempt: u32) -> u64 {
    let factor = 1u64 << attempt.min(6);
    base_delay_ms.max(1).saturating_mul(factor).min(2_000)
}
