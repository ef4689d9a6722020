//! # 可视节点模型
//!
//! ## 设计思路
//!
//! 页面上的可视节点按类别建模为封闭的标签枚举 `NodeKind`，
//! 每个分支只携带它自己提取 URL 时需要的字段：
//! - `Raster`：`src` / `srcset` / 懒加载属性 / 自然尺寸
//! - `Picture`：容器本身不带字段，靠子节点提供来源
//! - `Source`：`srcset` 与 `src`
//! - `Vector`：矢量元素的标签、属性、文本，用于序列化成独立文档
//! - `Generic`：普通容器，只可能贡献背景图
//!
//! 解析器按标签分派，不做开放式类型探测。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Rect, Size};

/// 节点在 `VisualTree` 中的索引。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// 位图节点（`<img>`）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterImage {
    pub src: Option<String>,
    pub srcset: Option<String>,
    /// 懒加载框架写入的 `data-*` 属性。
    pub lazy_attributes: BTreeMap<String, String>,
    /// 解码后的自然像素尺寸；未解码时为空。
    pub natural_size: Option<Size>,
}

/// 响应式来源节点（`<source>`，通常位于 `<picture>` 内）。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceVariant {
    pub srcset: Option<String>,
    pub src: Option<String>,
}

/// 矢量图元素（`<svg>` 及其内部元素）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorElement {
    pub tag: String,
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    #[serde(default)]
    pub text: Option<String>,
}

impl VectorElement {
    pub const ROOT_TAG: &'static str = "svg";

    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// 是否为矢量文档根（`<svg>`）。
    pub fn is_root(&self) -> bool {
        self.tag.eq_ignore_ascii_case(Self::ROOT_TAG)
    }
}

/// 节点类别。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Raster(RasterImage),
    Picture,
    Source(SourceVariant),
    Vector(VectorElement),
    Generic,
}

impl NodeKind {
    /// 能否作为直接图片候选（仍需通过尺寸过滤）。
    pub fn is_image_like(&self) -> bool {
        !matches!(self, NodeKind::Generic)
    }

    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Raster(_) => "raster",
            NodeKind::Picture => "picture",
            NodeKind::Source(_) => "source",
            NodeKind::Vector(_) => "vector",
            NodeKind::Generic => "generic",
        }
    }
}

/// 可视节点：类别 + 渲染包围盒 + 计算后的背景图。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualNode {
    pub kind: NodeKind,
    #[serde(default)]
    pub rect: Rect,
    /// 计算样式 `background-image` 的原始值，例如 `url("a.png")` 或 `none`。
    #[serde(default)]
    pub background_image: Option<String>,
    /// 层叠顺序，数值越大越靠上。
    #[serde(default)]
    pub z_index: i32,
}

impl VisualNode {
    pub fn new(kind: NodeKind, rect: Rect) -> Self {
        Self {
            kind,
            rect,
            background_image: None,
            z_index: 0,
        }
    }

    pub fn generic(rect: Rect) -> Self {
        Self::new(NodeKind::Generic, rect)
    }

    pub fn raster(image: RasterImage, rect: Rect) -> Self {
        Self::new(NodeKind::Raster(image), rect)
    }

    pub fn with_background(mut self, value: impl Into<String>) -> Self {
        self.background_image = Some(value.into());
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// 位图节点的自然尺寸；其余类别没有。
    pub fn natural_size(&self) -> Option<Size> {
        match &self.kind {
            NodeKind::Raster(image) => image.natural_size,
            _ => None,
        }
    }
}

impl RasterImage {
    pub fn with_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn natural(mut self, width: f64, height: f64) -> Self {
        self.natural_size = Some(Size::new(width, height));
        self
    }

    pub fn srcset(mut self, srcset: impl Into<String>) -> Self {
        self.srcset = Some(srcset.into());
        self
    }

    pub fn lazy(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.lazy_attributes.insert(attribute.into(), value.into());
        self
    }
}
