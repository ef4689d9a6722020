//! 候选解析配置

use serde::{Deserialize, Serialize};

use super::error::ResolveError;

pub const DEFAULT_MIN_CANDIDATE_SIZE: f64 = 20.0;

/// 解析器配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// 候选节点渲染宽度下限（像素），用于过滤图标、占位符、追踪像素。
    pub min_width: f64,
    /// 候选节点渲染高度下限（像素）。
    pub min_height: f64,
    /// `src` / `srcset` 都不可用时依次尝试的懒加载属性。
    pub lazy_attributes: Vec<String>,
    /// 相对 URL 的解析基准（页面地址）。
    pub base_url: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_CANDIDATE_SIZE,
            min_height: DEFAULT_MIN_CANDIDATE_SIZE,
            lazy_attributes: vec![
                "data-src".to_string(),
                "data-lazy-src".to_string(),
                "data-original".to_string(),
            ],
            base_url: None,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ResolveError> {
        if !(self.min_width.is_finite() && self.min_width >= 0.0)
            || !(self.min_height.is_finite() && self.min_height >= 0.0)
        {
            return Err(ResolveError::InvalidConfig(format!(
                "尺寸下限必须是非负有限数：{}x{}",
                self.min_width, self.min_height
            )));
        }

        if let Some(base) = &self.base_url {
            reqwest::Url::parse(base).map_err(|e| {
                ResolveError::InvalidConfig(format!("base_url 无法解析：{}", e))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.min_width, 20.0);
        assert_eq!(config.lazy_attributes.len(), 3);
    }

    #[test]
    fn rejects_negative_threshold_and_bad_base() {
        let mut config = ResolverConfig::default();
        config.min_height = -1.0;
        assert!(matches!(config.validate(), Err(ResolveError::InvalidConfig(_))));

        let mut config = ResolverConfig::default();
        config.base_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(ResolveError::InvalidConfig(_))));
    }
}
