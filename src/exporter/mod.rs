//! # 像素导出模块（PixelExporter）
//!
//! ## 设计思路
//!
//! 把放大层当前显示的图片导出为无损 PNG，供“复制”和“保存”两个入口使用。
//! 导出是一条短小的线性流水线，每一步都是返回 `Result` 的可失败步骤，
//! 只有整条回退链耗尽才把错误交给用户。
//!
//! - `source`：显示中的图片句柄与中间数据模型
//! - `surface`：离屏位图表面（绘制、污染标记、PNG 编码）
//! - `loader`：重新获取（http/https、data、blob）
//! - `pipeline`：解码与像素上限
//! - `clipboard_writer`：写入剪贴板与重试
//! - `save`：文件名推导、blob 转换、下载器边界
//! - `handler`：统一编排 + 阶段耗时日志
//! - `config/error`：配置与错误
//!
//! ## 调用链
//!
//! ```text
//! copy / save
//!    ↓
//! handler.rs::export_pixels
//!    ├─ surface.rs（第一步：离屏绘制 → PNG）
//!    └─ loader.rs → pipeline.rs → surface.rs（第二步：重新获取 → 解码 → 新表面 → PNG）
//!    ↓
//! clipboard_writer.rs / save.rs
//! ```

mod clipboard_writer;
mod config;
mod error;
mod handler;
mod loader;
mod pipeline;
mod save;
mod source;
mod surface;

pub use clipboard_writer::{ArboardClipboard, ClipboardSink};
pub use config::{DEFAULT_EXPORT_FILENAME, ExportConfig};
pub use error::ExportError;
pub use handler::PixelExporter;
pub use loader::{BlobRegistry, Fetcher, NetworkFetcher};
pub use save::{
    DirectorySink, DownloadRequest, ExportSink, SaveOutcome, SavedUrlKind, derive_filename,
    normalize_png_extension,
};
pub use source::{DisplayedImage, RawImageData};
pub use surface::{OffscreenSurface, PNG_MIME, png_data_url};
