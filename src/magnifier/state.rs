//! # 放大层状态与变换
//!
//! `MagnifierState` 只在打开期间存在，由控制器独占修改；关闭时整体丢弃，
//! 下次打开从干净状态开始。
//!
//! 屏幕摆放为 `translate(panX, panY) scale(zoom)`：先平移后缩放，
//! 平移量以未缩放的放大层像素计，与缩放倍数无关。
//! 内容点 `q` 映射到相对放大层中心的屏幕偏移 `p = pan + zoom * q`。

use serde::Serialize;

use crate::geometry::Point;

/// 打开期间的放大层状态。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MagnifierState {
    pub(super) image_url: String,
    pub(super) zoom: f64,
    pub(super) pan: Point,
    /// 拖拽开始时“指针位置 - 平移量”；非空即正在拖拽。
    #[serde(skip)]
    pub(super) drag_offset: Option<Point>,
}

impl MagnifierState {
    pub(super) fn opened(image_url: String) -> Self {
        Self {
            image_url,
            zoom: 1.0,
            pan: Point::ORIGIN,
            drag_offset: None,
        }
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_panning(&self) -> bool {
        self.drag_offset.is_some()
    }

    pub fn transform(&self) -> Transform {
        Transform {
            translate_x: self.pan.x,
            translate_y: self.pan.y,
            scale: self.zoom,
        }
    }
}

/// 最终施加到图片上的变换。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate_x: 0.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    /// CSS `transform` 取值。
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({})",
            self.translate_x, self.translate_y, self.scale
        )
    }

    /// 内容坐标 → 屏幕坐标（均相对图片静止时的中心）。
    pub fn apply(&self, content: Point) -> Point {
        Point::new(
            self.translate_x + self.scale * content.x,
            self.translate_y + self.scale * content.y,
        )
    }

    /// 屏幕坐标 → 内容坐标。
    pub fn invert(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.translate_x) / self.scale,
            (screen.y - self.translate_y) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_is_translate_then_scale() {
        let transform = Transform {
            translate_x: 12.5,
            translate_y: -4.0,
            scale: 2.0,
        };
        assert_eq!(transform.to_css(), "translate(12.5px, -4px) scale(2)");
    }

    #[test]
    fn translation_is_independent_of_scale() {
        let transform = Transform {
            translate_x: 10.0,
            translate_y: 20.0,
            scale: 4.0,
        };
        assert_eq!(transform.apply(Point::ORIGIN), Point::new(10.0, 20.0));
        assert_eq!(transform.apply(Point::new(1.0, 1.0)), Point::new(14.0, 24.0));
    }

    #[test]
    fn invert_round_trips_a_point() {
        let transform = Transform {
            translate_x: -30.0,
            translate_y: 7.0,
            scale: 2.5,
        };
        let screen = Point::new(100.0, -40.0);
        let back = transform.apply(transform.invert(screen));
        assert!((back.x - screen.x).abs() < 1e-9);
        assert!((back.y - screen.y).abs() < 1e-9);
    }
}
