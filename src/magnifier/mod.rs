//! # 放大层模块（MagnifierController）
//!
//! ## 设计思路
//!
//! 一个小型交互状态机，独占缩放倍数、平移量，以及“缩放时保持光标下内容不动”的坐标变换。
//! 全局只有一个放大层实例，由控制器持有状态，不使用全局可变量。
//!
//! - `ladder`：离散缩放档位与步进算法
//! - `state`：打开期间的状态与最终变换
//! - `controller`：状态迁移、滚轮锚点缩放、拖拽平移
//! - `host`：外层页面边界（挂载、滚动锁、拖拽监听、变换应用）
//! - `input`：输入消息与按键映射
//!
//! ```text
//! Closed ──Open(url)──▶ Open ──Close──▶ Closed
//!                      │  ▲
//!                      └──┘ StepZoom / Wheel / PanStart / PanMove / PanEnd / PointerLost
//! ```

mod config;
mod controller;
mod error;
mod host;
mod input;
mod ladder;
mod state;

pub use config::{DEFAULT_WHEEL_SENSITIVITY, ZoomConfig};
pub use controller::MagnifierController;
pub use error::MagnifierError;
pub use host::{NullHost, OverlayHost};
pub use input::{MagnifierInput, ZoomDirection};
pub use ladder::{DEFAULT_ZOOM_LEVELS, ZoomLadder};
pub use state::{MagnifierState, Transform};
