//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子系统保留自己的错误枚举（`ResolveError` / `MagnifierError` / `ExportError` / `ConfigError`），
//! 对外入口（CLI、宿主集成）统一返回 `Result<T, AppError>`，
//! 调用方只需要处理一种错误类型。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息，`#[from]` 免去手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，方便宿主以 JSON 传递。
//! - `code()` 透传子系统错误码，供日志与宿主侧区分处理。

use serde::Serialize;

use crate::config::ConfigError;
use crate::exporter::ExportError;
use crate::magnifier::MagnifierError;
use crate::resolver::ResolveError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 光标下的候选解析失败
    #[error("{0}")]
    Resolve(#[from] ResolveError),

    /// 放大层状态迁移被拒绝
    #[error("{0}")]
    Magnifier(#[from] MagnifierError),

    /// 像素导出链路失败（表面 / 重新获取 / 剪贴板 / 保存）
    #[error("{0}")]
    Export(#[from] ExportError),

    /// 设置文件读取或校验失败
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// 场景文件格式错误
    #[error("场景文件无效: {0}")]
    Scene(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Resolve(err) => err.code(),
            Self::Magnifier(err) => err.code(),
            Self::Export(err) => err.code(),
            Self::Config(err) => err.code(),
            Self::Scene(_) => "scene",
            Self::Io(_) => "io",
        }
    }

    /// 解析不到候选属于静默无操作，不需要提示用户。
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::Resolve(ResolveError::NoCandidateFound))
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
