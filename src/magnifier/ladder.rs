//! # 缩放档位
//!
//! 固定升序档位 `[0.5, 1, 2, 4, 8]` 只服务于按钮/键盘的离散步进；
//! 滚轮/捏合的连续缩放不吸附档位，只用档位的首尾做上下限。

use serde::{Deserialize, Serialize};

use super::error::MagnifierError;
use super::input::ZoomDirection;

pub const DEFAULT_ZOOM_LEVELS: [f64; 5] = [0.5, 1.0, 2.0, 4.0, 8.0];

/// 离散缩放档位表。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ZoomLadder {
    levels: Vec<f64>,
}

impl Default for ZoomLadder {
    fn default() -> Self {
        Self {
            levels: DEFAULT_ZOOM_LEVELS.to_vec(),
        }
    }
}

impl TryFrom<Vec<f64>> for ZoomLadder {
    type Error = MagnifierError;

    fn try_from(levels: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<ZoomLadder> for Vec<f64> {
    fn from(ladder: ZoomLadder) -> Self {
        ladder.levels
    }
}

impl ZoomLadder {
    /// 档位必须非空、为正的有限数且严格递增。
    pub fn new(levels: Vec<f64>) -> Result<Self, MagnifierError> {
        if levels.is_empty() {
            return Err(MagnifierError::InvalidConfig("缩放档位不能为空".to_string()));
        }
        if levels.iter().any(|z| !z.is_finite() || *z <= 0.0) {
            return Err(MagnifierError::InvalidConfig(format!(
                "缩放档位必须是正数：{:?}",
                levels
            )));
        }
        if levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(MagnifierError::InvalidConfig(format!(
                "缩放档位必须严格递增：{:?}",
                levels
            )));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn min(&self) -> f64 {
        self.levels[0]
    }

    pub fn max(&self) -> f64 {
        self.levels[self.levels.len() - 1]
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min(), self.max())
    }

    /// 离散步进。
    ///
    /// 先找第一个 `>= current` 的档位下标 `idx`（都小于则取末位）：
    /// 放大取 `idx + 1`，缩小取 `idx - 1`，两端夹紧。
    /// 当前值落在两档之间（如连续缩放得到的 3.0）时，两个方向并不对称：
    /// 3.0 放大到 8，缩小到 2。
    pub fn step(&self, current: f64, direction: ZoomDirection) -> f64 {
        let last = self.levels.len() - 1;
        let idx = self
            .levels
            .iter()
            .position(|&level| level >= current)
            .unwrap_or(last);

        let target = match direction {
            ZoomDirection::In => (idx + 1).min(last),
            ZoomDirection::Out => idx.saturating_sub(1),
        };
        self.levels[target]
    }
}
