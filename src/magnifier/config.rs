//! 放大层配置

use serde::{Deserialize, Serialize};

use super::error::MagnifierError;
use super::ladder::ZoomLadder;

/// 滚轮每单位增量对应的缩放比例变化。
pub const DEFAULT_WHEEL_SENSITIVITY: f64 = 0.002;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub ladder: ZoomLadder,
    pub wheel_sensitivity: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            ladder: ZoomLadder::default(),
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
        }
    }
}

impl ZoomConfig {
    pub fn validate(&self) -> Result<(), MagnifierError> {
        if !self.wheel_sensitivity.is_finite() || self.wheel_sensitivity <= 0.0 {
            return Err(MagnifierError::InvalidConfig(format!(
                "wheel_sensitivity 必须为正数：{}",
                self.wheel_sensitivity
            )));
        }
        // 打开时缩放重置为 1.0，必须落在上下限之内。
        if !(self.ladder.min()..=self.ladder.max()).contains(&1.0) {
            return Err(MagnifierError::InvalidConfig(format!(
                "缩放档位范围必须包含 1.0：{:?}",
                self.ladder.levels()
            )));
        }
        Ok(())
    }
}
