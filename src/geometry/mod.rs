//! # 几何查询模块（GeometryProbe）
//!
//! ## 设计思路
//!
//! 回答两个问题：“这个点下面叠着哪些节点”“某个节点的包围盒 / 背景图 / 自然尺寸是多少”。
//! 该层是纯查询层，不做任何打分与决策。
//!
//! - `types`：点、尺寸、矩形
//! - `node`：封闭的节点类别枚举与节点数据
//! - `probe`：`GeometryProbe` 查询 trait
//! - `tree`：arena 形式的 `VisualTree`，默认实现
//! - `vector`：矢量子树序列化边界与 Data URL 编码

mod node;
mod probe;
mod tree;
mod types;
mod vector;

pub use node::{NodeId, NodeKind, RasterImage, SourceVariant, VectorElement, VisualNode};
pub use probe::GeometryProbe;
pub use tree::VisualTree;
pub use types::{Point, Rect, Size};
pub use vector::{MarkupSerializer, SVG_NAMESPACE, VectorSerializer, svg_data_url};
