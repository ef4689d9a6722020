//! # 设置模块
//!
//! ## 设计思路
//!
//! 三个子系统各自维护配置结构（`ResolverConfig` / `ZoomConfig` / `ExportConfig`），
//! 这里把它们聚合为一份 `MagnifierSettings`，以 JSON 文件持久化。
//! 缺失字段回落到默认值，读取后统一校验，避免非法档位或阈值流入运行时。
//!
//! ## 文件示例
//!
//! ```json
//! {
//!   "resolver": { "min_width": 32, "min_height": 32 },
//!   "zoom": { "ladder": [0.5, 1, 2, 4, 8], "wheel_sensitivity": 0.002 },
//!   "export": { "default_filename": "image.png" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::exporter::ExportConfig;
use crate::magnifier::ZoomConfig;
use crate::resolver::ResolverConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取设置文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("解析设置文件失败: {0}")]
    Parse(String),

    #[error("设置项无效（{section}）: {message}")]
    Invalid {
        section: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "config_io",
            Self::Parse(_) => "config_parse",
            Self::Invalid { .. } => "config_invalid",
        }
    }

    fn invalid(section: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Invalid {
            section,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MagnifierSettings {
    pub resolver: ResolverConfig,
    pub zoom: ZoomConfig,
    pub export: ExportConfig,
}

impl MagnifierSettings {
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// 读取设置文件；文件不存在时返回默认设置。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("⚙️ 未找到设置文件，使用默认设置：{}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&content)?;
        log::info!("⚙️ 已加载设置：{}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = self.to_json_pretty()?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver
            .validate()
            .map_err(|e| ConfigError::invalid("resolver", e))?;
        self.zoom
            .validate()
            .map_err(|e| ConfigError::invalid("zoom", e))?;
        self.export
            .validate()
            .map_err(|e| ConfigError::invalid("export", e))?;
        Ok(())
    }
}
