//! # 重新获取模块
//!
//! ## 设计思路
//!
//! 导出第二步需要绕过渲染层，直接按原始 URL 取回字节。
//! 三类来源统一收敛为 `RawImageData`：
//! - `http/https`：`reqwest` 流式下载，带超时、体积上限与签名嗅探
//! - `data:`：本地 base64 解码，不发请求
//! - `blob:`：查询页面内存中的 `BlobRegistry`
//!
//! 获取失败一律归为 `FetchBlocked`，由编排层决定是否终止。

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use super::pipeline::is_svg_markup;
use super::source::RawImageData;
use super::{ExportConfig, ExportError};
use crate::resolver::UrlScheme;

const BUFFER_INITIAL_CAPACITY: usize = 256 * 1024;

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawImageData, ExportError>;
}

/// 页面内存中的 blob 存储，`blob:` URL 只在注册期间有效。
#[derive(Debug, Clone, Default)]
pub struct BlobRegistry {
    entries: Arc<RwLock<HashMap<String, Arc<Vec<u8>>>>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, url: impl Into<String>, bytes: Vec<u8>) -> Result<(), ExportError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| ExportError::FetchBlocked("blob 存储锁已损坏".to_string()))?;
        entries.insert(url.into(), Arc::new(bytes));
        Ok(())
    }

    /// 撤销后该 URL 不可再解引用。
    pub fn revoke(&self, url: &str) -> bool {
        match self.entries.write() {
            Ok(mut entries) => entries.remove(url).is_some(),
            Err(_) => false,
        }
    }

    pub fn get(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.entries.read().ok()?.get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct NetworkFetcher {
    client: reqwest::Client,
    blobs: BlobRegistry,
    max_file_size: u64,
    read_timeout: Duration,
}

impl NetworkFetcher {
    pub fn new(config: &ExportConfig, blobs: BlobRegistry) -> Result<Self, ExportError> {
        let read_timeout = Duration::from_secs(config.fetch_timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(read_timeout)
            .connect_timeout(read_timeout)
            .build()
            .map_err(|e| ExportError::FetchBlocked(format!("创建 HTTP 客户端失败：{}", e)))?;

        Ok(Self {
            client,
            blobs,
            max_file_size: config.max_file_size,
            read_timeout,
        })
    }

    pub fn blobs(&self) -> &BlobRegistry {
        &self.blobs
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ExportError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ExportError::FetchBlocked(format!("URL 无效：{}", e)))?;

        let response = self
            .client
            .get(parsed)
            .header(
                reqwest::header::ACCEPT,
                "image/avif,image/webp,image/apng,image/*,*/*;q=0.8",
            )
            .send()
            .await
            .map_err(|e| ExportError::FetchBlocked(format!("请求失败：{}", e)))?;

        if !response.status().is_success() {
            return Err(ExportError::FetchBlocked(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        let total_len = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|cl| cl.to_str().ok())
            .and_then(|cl| cl.parse::<u64>().ok());

        if let Some(size) = total_len {
            if size > self.max_file_size {
                return Err(self.size_limit_error(size));
            }
        }

        let initial_capacity = total_len
            .map(|len| len.min(self.max_file_size).min(usize::MAX as u64) as usize)
            .filter(|len| *len > 0)
            .unwrap_or(BUFFER_INITIAL_CAPACITY);
        let mut buffer = Vec::with_capacity(initial_capacity);
        let mut response = response;
        let mut total: u64 = 0;

        loop {
            let next_chunk = tokio::time::timeout(self.read_timeout, response.chunk())
                .await
                .map_err(|_| ExportError::FetchBlocked("下载数据流读取超时".to_string()))?;

            let Some(chunk) = next_chunk
                .map_err(|e| ExportError::FetchBlocked(format!("下载失败：{}", e)))?
            else {
                break;
            };

            total = total.saturating_add(chunk.len() as u64);
            if total > self.max_file_size {
                return Err(self.size_limit_error(total));
            }
            buffer.extend_from_slice(&chunk);
        }

        log::debug!("✅ 下载完成 - {} bytes", total);
        Ok(buffer)
    }

    fn size_limit_error(&self, size: u64) -> ExportError {
        ExportError::ResourceLimit(format!(
            "文件过大：{:.2} MB（限制：{:.2} MB）",
            size as f64 / 1024.0 / 1024.0,
            self.max_file_size as f64 / 1024.0 / 1024.0
        ))
    }
}

#[async_trait]
impl Fetcher for NetworkFetcher {
    async fn fetch(&self, url: &str) -> Result<RawImageData, ExportError> {
        log::debug!("🌐 重新获取图片：{}", redact_url_for_log(url));

        let (bytes, source_hint) = match UrlScheme::of(url) {
            UrlScheme::Network => (self.download(url).await?, "network"),
            UrlScheme::InlineData => (decode_data_url(url, self.max_file_size)?.1, "data_url"),
            UrlScheme::Blob => {
                let bytes = self
                    .blobs
                    .get(url)
                    .ok_or_else(|| ExportError::FetchBlocked("blob URL 已失效或未注册".to_string()))?;
                (bytes.as_ref().clone(), "blob")
            }
            UrlScheme::Other => {
                return Err(ExportError::FetchBlocked(format!(
                    "不支持的 URL 协议：{}",
                    redact_url_for_log(url)
                )));
            }
        };

        validate_image_signature(&bytes)?;
        Ok(RawImageData { bytes, source_hint })
    }
}

/// 解析 base64 形式的 data URL，返回 `(mime, bytes)`。
pub(crate) fn decode_data_url(url: &str, max_size: u64) -> Result<(String, Vec<u8>), ExportError> {
    let rest = url
        .get(..5)
        .filter(|prefix| prefix.eq_ignore_ascii_case("data:"))
        .map(|_| &url[5..])
        .ok_or_else(|| ExportError::InvalidFormat("不是 data URL".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| ExportError::InvalidFormat("data URL 缺少数据段".to_string()))?;

    let Some(mime) = header
        .strip_suffix(";base64")
        .or_else(|| header.strip_suffix(";BASE64"))
    else {
        return Err(ExportError::InvalidFormat(
            "仅支持 base64 编码的 data URL".to_string(),
        ));
    };

    let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let estimated_size = (payload.len() as u64).saturating_mul(3) / 4;
    if estimated_size > max_size {
        return Err(ExportError::ResourceLimit(format!(
            "图片数据过大：{:.2} MB（限制：{:.2} MB）",
            estimated_size as f64 / 1024.0 / 1024.0,
            max_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| ExportError::Decode(format!("Base64 解码失败：{}", e)))?;

    let mime = if mime.is_empty() { "text/plain" } else { mime };
    Ok((mime.to_ascii_lowercase(), bytes))
}

pub(crate) fn validate_image_signature(bytes: &[u8]) -> Result<(), ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::InvalidFormat("图片内容为空".to_string()));
    }
    if is_svg_markup(bytes) {
        return Ok(());
    }

    match infer::get(bytes) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(()),
        Some(kind) => Err(ExportError::InvalidFormat(format!(
            "文件不是图片（检测到：{}）",
            kind.mime_type()
        ))),
        None => Err(ExportError::InvalidFormat("无法识别图片类型".to_string())),
    }
}

/// 日志中只保留 `scheme://host:port/path`，data URL 只保留 mime 头。
pub(crate) fn redact_url_for_log(url: &str) -> String {
    match UrlScheme::of(url) {
        UrlScheme::InlineData => {
            let header = url.split(',').next().unwrap_or_default();
            format!("{},<{} bytes>", header, url.len())
        }
        UrlScheme::Blob => url.to_string(),
        _ => {
            let Ok(parsed) = reqwest::Url::parse(url) else {
                return "<invalid-url>".to_string();
            };

            let host = parsed.host_str().unwrap_or("<unknown-host>");
            let port = parsed.port().map(|p| format!(":{}", p)).unwrap_or_default();
            format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, 128, 255])
        });
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    fn fetcher(blobs: BlobRegistry) -> NetworkFetcher {
        NetworkFetcher::new(&ExportConfig::default(), blobs).expect("fetcher")
    }

    #[test]
    fn decodes_base64_data_url() {
        let png = create_png_bytes(3, 2);
        let url = format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(&png));

        let (mime, bytes) = decode_data_url(&url, 1024 * 1024).expect("decode");
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, png);
    }

    #[test]
    fn rejects_percent_encoded_data_url() {
        let result = decode_data_url("data:image/svg+xml,%3Csvg%3E", 1024);
        assert!(matches!(result, Err(ExportError::InvalidFormat(_))));
    }

    #[test]
    fn rejects_oversized_data_url() {
        let url = format!("data:image/png;base64,{}", "A".repeat(8192));
        assert!(matches!(
            decode_data_url(&url, 1024),
            Err(ExportError::ResourceLimit(_))
        ));
    }

    #[test]
    fn signature_check_rejects_text() {
        assert!(validate_image_signature(b"<html></html>").is_err());
        assert!(validate_image_signature(&[]).is_err());
        assert!(validate_image_signature(&create_png_bytes(1, 1)).is_ok());
    }

    #[tokio::test]
    async fn inline_svg_data_url_passes_signature_check() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4"/>"#;
        let url = format!(
            "data:image/svg+xml;base64,{}",
            general_purpose::STANDARD.encode(svg)
        );

        let raw = fetcher(BlobRegistry::new()).fetch(&url).await.expect("fetch svg");
        assert_eq!(raw.bytes, svg.as_bytes());
        assert_eq!(raw.source_hint, "data_url");
    }

    #[test]
    fn redacts_query_and_data_payload() {
        assert_eq!(
            redact_url_for_log("https://cdn.example.com:8443/a/b.png?token=secret#x"),
            "https://cdn.example.com:8443/a/b.png"
        );
        let redacted = redact_url_for_log("data:image/png;base64,AAAA");
        assert!(redacted.starts_with("data:image/png;base64,<"));
        assert!(!redacted.contains("AAAA"));
    }

    #[test]
    fn registry_revocation_removes_entry() {
        let blobs = BlobRegistry::new();
        blobs.register("blob:abc", vec![1, 2, 3]).expect("register");
        assert_eq!(blobs.len(), 1);
        assert!(blobs.revoke("blob:abc"));
        assert!(blobs.get("blob:abc").is_none());
        assert!(!blobs.revoke("blob:abc"));
    }

    #[tokio::test]
    async fn fetches_registered_blob() {
        let blobs = BlobRegistry::new();
        let png = create_png_bytes(4, 4);
        blobs.register("blob:https://chat.example/1", png.clone()).expect("register");

        let raw = fetcher(blobs)
            .fetch("blob:https://chat.example/1")
            .await
            .expect("fetch");
        assert_eq!(raw.bytes, png);
        assert_eq!(raw.source_hint, "blob");
    }

    #[tokio::test]
    async fn unknown_blob_is_blocked() {
        let result = fetcher(BlobRegistry::new()).fetch("blob:https://chat.example/gone").await;
        assert!(matches!(result, Err(ExportError::FetchBlocked(_))));
    }

    #[tokio::test]
    async fn unsupported_scheme_is_blocked() {
        let result = fetcher(BlobRegistry::new()).fetch("chrome-extension://abc/x.png").await;
        assert!(matches!(result, Err(ExportError::FetchBlocked(_))));
    }
}
