//! # GeometryProbe 查询边界
//!
//! 解析器只通过该 trait 读取页面几何信息，不关心节点如何存储。
//! 浏览器侧实现对应 `elementsFromPoint` / `getBoundingClientRect` /
//! `getComputedStyle` / `querySelectorAll('img, svg')` / `closest('svg')`。

use super::node::{NodeId, NodeKind, VisualNode};
use super::types::{Point, Rect, Size};

/// 纯查询层：点命中栈与节点属性读取。
pub trait GeometryProbe {
    /// 覆盖该点的全部节点，最上层在前。
    fn stack_at(&self, point: Point) -> Vec<NodeId>;

    fn node(&self, id: NodeId) -> Option<&VisualNode>;

    fn parent(&self, id: NodeId) -> Option<NodeId>;

    /// 直接子节点，按文档顺序。
    fn children(&self, id: NodeId) -> Vec<NodeId>;

    /// 任意深度的位图与矢量根后代，按文档顺序，不含自身。
    fn image_descendants(&self, id: NodeId) -> Vec<NodeId>;

    fn bounding_box(&self, id: NodeId) -> Option<Rect> {
        self.node(id).map(|node| node.rect)
    }

    fn background_image(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(|node| node.background_image.as_deref())
    }

    fn natural_size(&self, id: NodeId) -> Option<Size> {
        self.node(id).and_then(VisualNode::natural_size)
    }

    /// 最近的矢量根（含自身），`closest('svg')` 语义。
    fn vector_root(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(candidate) = current {
            if let Some(NodeKind::Vector(element)) = self.node(candidate).map(|n| &n.kind) {
                if element.is_root() {
                    return Some(candidate);
                }
            }
            current = self.parent(candidate);
        }
        None
    }
}
