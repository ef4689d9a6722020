//! # 放大层输入消息
//!
//! 拖拽被拆成 `PanStart` / `PanMove` / `PanEnd` 三条消息，
//! `PointerLost` 表示指针离开窗口等异常结束，处理方式与 `PanEnd` 相同。

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MagnifierInput {
    Open(String),
    /// Esc / 点击背景 / 关闭按钮。
    Close,
    StepZoom(ZoomDirection),
    /// 滚轮增量与相对图片中心的光标位置。
    Wheel { delta: f64, cursor: Point },
    PanStart(Point),
    PanMove(Point),
    PanEnd,
    PointerLost,
}

impl MagnifierInput {
    /// 键盘按键映射（`KeyboardEvent.key` 取值）。
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Self::Close),
            "+" | "=" => Some(Self::StepZoom(ZoomDirection::In)),
            "-" | "_" => Some(Self::StepZoom(ZoomDirection::Out)),
            _ => None,
        }
    }
}
