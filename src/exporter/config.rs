//! # 导出配置
//!
//! 将下载、解码、剪贴板重试的可调参数集中到 `ExportConfig`，
//! 单次导出使用同一份配置快照。

use serde::{Deserialize, Serialize};

use super::ExportError;

pub const DEFAULT_EXPORT_FILENAME: &str = "image.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 重新获取时允许的最大原始体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 重新获取的超时时间（秒）。
    pub fetch_timeout_secs: u64,
    /// 写入剪贴板失败时最大尝试次数。
    pub clipboard_retries: u32,
    /// 剪贴板重试间隔（毫秒）。
    pub clipboard_retry_delay_ms: u64,
    /// URL 无法推导文件名时使用的默认名。
    pub default_filename: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            fetch_timeout_secs: 30,
            clipboard_retries: 3,
            clipboard_retry_delay_ms: 100,
            default_filename: DEFAULT_EXPORT_FILENAME.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.max_file_size < 1024 {
            return Err(ExportError::InvalidFormat("max_file_size 不能小于 1KB".to_string()));
        }
        if self.max_decoded_pixels == 0 {
            return Err(ExportError::InvalidFormat("max_decoded_pixels 不能为 0".to_string()));
        }
        if !(1..=120).contains(&self.fetch_timeout_secs) {
            return Err(ExportError::InvalidFormat(
                "fetch_timeout_secs 必须在 1~120 秒之间".to_string(),
            ));
        }
        if !(10..=5_000).contains(&self.clipboard_retry_delay_ms) {
            return Err(ExportError::InvalidFormat(
                "clipboard_retry_delay_ms 必须在 10~5000 毫秒之间".to_string(),
            ));
        }
        if !self.default_filename.contains('.') {
            return Err(ExportError::InvalidFormat(format!(
                "默认文件名缺少扩展名：{}",
                self.default_filename
            )));
        }
        Ok(())
    }
}
