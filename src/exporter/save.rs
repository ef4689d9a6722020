//! # 保存（下载）模块
//!
//! ## 设计思路
//!
//! 保存由进程外的下载器完成，放大层只交出“URL + 建议文件名”。
//! - 文件名取 URL 最后一个路径段（需包含 `.`），否则使用默认名 `image.png`
//! - `blob:` URL 只在本页面内存中有效，交出前必须先转为自包含的 data URL，
//!   并把扩展名规范为 `.png`
//!
//! `ExportSink` 是下载器边界；`DirectorySink` 把请求落盘到指定目录，供 CLI 与测试使用。

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::loader::{Fetcher, decode_data_url, redact_url_for_log};
use super::{ExportConfig, ExportError};
use crate::resolver::UrlScheme;

/// 交给下载器的请求。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub filename: String,
}

/// 一次保存的结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub filename: String,
    pub url_kind: SavedUrlKind,
    /// 下载器确认后的落盘位置。
    pub location: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavedUrlKind {
    /// 原始 URL 原样交出。
    PassThrough,
    /// 由 blob 转换出的 PNG data URL。
    ConvertedDataUrl,
}

#[async_trait]
pub trait ExportSink: Send + Sync {
    /// 只返回一次成功/失败确认。
    async fn save(&self, request: DownloadRequest) -> Result<Option<PathBuf>, ExportError>;
}

/// 从 URL 推导文件名。
pub fn derive_filename(url: &str, default_name: &str) -> String {
    let last_segment = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back().map(str::to_string)),
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .map(str::to_string),
    };

    last_segment
        .map(|segment| sanitize_filename(&segment))
        .filter(|segment| has_extension(segment))
        .unwrap_or_else(|| default_name.to_string())
}

/// 将扩展名替换为 `.png`。
pub fn normalize_png_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => format!("{}.png", stem),
        _ => format!("{}.png", filename.trim_end_matches('.')),
    }
}

fn has_extension(name: &str) -> bool {
    name.contains('.')
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// 把下载请求写入本地目录。
pub struct DirectorySink {
    dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    max_file_size: u64,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>, fetcher: Arc<dyn Fetcher>, config: &ExportConfig) -> Self {
        Self {
            dir: dir.into(),
            fetcher,
            max_file_size: config.max_file_size,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 重名时追加时间戳后缀。
    fn unique_path(&self, filename: &str) -> PathBuf {
        let candidate = self.dir.join(filename);
        if !candidate.exists() {
            return candidate;
        }

        let timestamp = Local::now().format("%Y%m%d%H%M%S%f");
        let renamed = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => format!("{}_{}.{}", stem, timestamp, ext),
            _ => format!("{}_{}", filename, timestamp),
        };
        self.dir.join(renamed)
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn save(&self, request: DownloadRequest) -> Result<Option<PathBuf>, ExportError> {
        let bytes = match UrlScheme::of(&request.url) {
            UrlScheme::InlineData => decode_data_url(&request.url, self.max_file_size)?.1,
            UrlScheme::Blob => {
                return Err(ExportError::Sink(
                    "下载器无法解引用页面内存中的 blob URL".to_string(),
                ));
            }
            _ => self.fetcher.fetch(&request.url).await?.bytes,
        };

        fs::create_dir_all(&self.dir)
            .map_err(|e| ExportError::Sink(format!("创建保存目录失败：{}", e)))?;

        let path = self.unique_path(&sanitize_filename(&request.filename));
        fs::write(&path, &bytes)
            .map_err(|e| ExportError::Sink(format!("写入文件失败：{}", e)))?;

        log::info!(
            "💾 已保存 {} -> {}（{} bytes）",
            redact_url_for_log(&request.url),
            path.display(),
            bytes.len()
        );
        Ok(Some(path))
    }
}
