//! # 导出错误模型
//!
//! ## 设计思路
//!
//! 导出链路每一步都是返回 `Result` 的可失败步骤，失败种类决定是否继续回退：
//! - `SurfaceTainted` / `ExtractionFailed`（第一步）：静默进入第二步重新获取
//! - `FetchBlocked`：第二步也失败，终止并提示“被跨域策略阻止”
//! - `ImageNotReady`：图片尚未解码完成，本次尝试直接终止
//!
//! 只有整条链路耗尽才向用户展示短暂提示，不弹阻塞对话框。

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("图片尚未加载完成：{0}")]
    ImageNotReady(String),

    #[error("画布被跨域内容污染，无法读取像素：{0}")]
    SurfaceTainted(String),

    #[error("位图编码未产生数据：{0}")]
    ExtractionFailed(String),

    #[error("重新获取图片失败：{0}")]
    FetchBlocked(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("剪贴板错误：{0}")]
    Clipboard(String),

    #[error("下载保存失败：{0}")]
    Sink(String),
}

impl ExportError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ImageNotReady(_) => "image_not_ready",
            Self::SurfaceTainted(_) => "surface_tainted",
            Self::ExtractionFailed(_) => "extraction_failed",
            Self::FetchBlocked(_) => "fetch_blocked",
            Self::Decode(_) => "decode",
            Self::InvalidFormat(_) => "invalid_format",
            Self::ResourceLimit(_) => "resource_limit",
            Self::Clipboard(_) => "clipboard",
            Self::Sink(_) => "sink",
        }
    }

    /// 错误所处阶段，供日志聚合。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ImageNotReady(_) | Self::SurfaceTainted(_) | Self::ExtractionFailed(_) => "surface",
            Self::FetchBlocked(_) => "fetch",
            Self::Decode(_) | Self::InvalidFormat(_) | Self::ResourceLimit(_) => "decode",
            Self::Clipboard(_) => "clipboard",
            Self::Sink(_) => "save",
        }
    }

    /// 第一步失败后是否允许进入“重新获取”回退。
    pub fn allows_refetch(&self) -> bool {
        matches!(self, Self::SurfaceTainted(_) | Self::ExtractionFailed(_))
    }

    /// 面向用户的短提示。
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ImageNotReady(_) => "图片还在加载，请稍后再试",
            Self::SurfaceTainted(_) | Self::ExtractionFailed(_) | Self::FetchBlocked(_) => {
                "图片被跨域策略阻止，无法导出"
            }
            Self::Decode(_) | Self::InvalidFormat(_) => "图片格式无法识别",
            Self::ResourceLimit(_) => "图片过大，无法导出",
            Self::Clipboard(_) => "复制到剪贴板失败",
            Self::Sink(_) => "保存图片失败",
        }
    }
}

impl From<ExportError> for String {
    fn from(error: ExportError) -> Self {
        error.to_string()
    }
}
