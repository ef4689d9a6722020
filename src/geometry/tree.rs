//! # 内存节点树
//!
//! ## 设计思路
//!
//! `VisualTree` 是 `GeometryProbe` 的 arena 实现：节点平铺在 `Vec` 中，
//! 父子关系用 `NodeId` 索引表示，避免自引用结构。
//! 宿主页面、测试夹具与 CLI 场景文件都通过它构造节点栈。
//!
//! ## 命中栈排序
//!
//! 1. `z_index` 大者在上
//! 2. 同层时文档先序靠后者在上（后代绘制在祖先之上，后续兄弟覆盖前面的兄弟）

use super::node::{NodeId, NodeKind, VisualNode};
use super::probe::GeometryProbe;
use super::types::Point;

#[derive(Debug, Clone)]
struct TreeEntry {
    node: VisualNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// 以 arena 方式存储的可视节点树。
#[derive(Debug, Clone, Default)]
pub struct VisualTree {
    entries: Vec<TreeEntry>,
    roots: Vec<NodeId>,
}

impl VisualTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 添加顶层节点。
    pub fn add_root(&mut self, node: VisualNode) -> NodeId {
        let id = self.push(node, None);
        self.roots.push(id);
        id
    }

    /// 在 `parent` 末尾追加子节点；`parent` 不存在时作为顶层节点。
    pub fn append_child(&mut self, parent: NodeId, node: VisualNode) -> NodeId {
        if parent.0 >= self.entries.len() {
            log::warn!("⚠️ 父节点 {:?} 不存在，按顶层节点插入", parent);
            return self.add_root(node);
        }
        let id = self.push(node, Some(parent));
        self.entries[parent.0].children.push(id);
        id
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    fn push(&mut self, node: VisualNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.entries.len());
        self.entries.push(TreeEntry {
            node,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// 从 `start` 开始的文档先序遍历（含自身）。
    fn preorder_from(&self, start: &[NodeId]) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.entries.len());
        let mut pending: Vec<NodeId> = start.iter().rev().copied().collect();
        while let Some(id) = pending.pop() {
            order.push(id);
            if let Some(entry) = self.entries.get(id.0) {
                pending.extend(entry.children.iter().rev().copied());
            }
        }
        order
    }
}

impl GeometryProbe for VisualTree {
    fn stack_at(&self, point: Point) -> Vec<NodeId> {
        let order = self.preorder_from(&self.roots);
        let mut hits: Vec<(usize, NodeId)> = order
            .into_iter()
            .enumerate()
            .filter(|(_, id)| self.entries[id.0].node.rect.contains(point))
            .collect();

        hits.sort_by(|(pos_a, a), (pos_b, b)| {
            let z_a = self.entries[a.0].node.z_index;
            let z_b = self.entries[b.0].node.z_index;
            z_b.cmp(&z_a).then(pos_b.cmp(pos_a))
        });

        hits.into_iter().map(|(_, id)| id).collect()
    }

    fn node(&self, id: NodeId) -> Option<&VisualNode> {
        self.entries.get(id.0).map(|entry| &entry.node)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(id.0).and_then(|entry| entry.parent)
    }

    fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.entries
            .get(id.0)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn image_descendants(&self, id: NodeId) -> Vec<NodeId> {
        let Some(entry) = self.entries.get(id.0) else {
            return Vec::new();
        };

        self.preorder_from(&entry.children)
            .into_iter()
            .filter(|descendant| match &self.entries[descendant.0].node.kind {
                NodeKind::Raster(_) => true,
                NodeKind::Vector(element) => element.is_root(),
                _ => false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::node::{RasterImage, VectorElement};
    use crate::geometry::types::Rect;

    fn full_rect() -> Rect {
        Rect::new(0.0, 0.0, 500.0, 500.0)
    }

    #[test]
    fn stack_orders_descendants_above_ancestors() {
        let mut tree = VisualTree::new();
        let root = tree.add_root(VisualNode::generic(full_rect()));
        let first = tree.append_child(root, VisualNode::generic(full_rect()));
        let second = tree.append_child(root, VisualNode::generic(full_rect()));
        let nested = tree.append_child(first, VisualNode::generic(full_rect()));

        let stack = tree.stack_at(Point::new(10.0, 10.0));
        assert_eq!(stack, vec![second, nested, first, root]);
    }

    #[test]
    fn stack_respects_z_index_before_document_order() {
        let mut tree = VisualTree::new();
        let raised = tree.add_root(VisualNode::generic(full_rect()).with_z_index(10));
        let later = tree.add_root(VisualNode::generic(full_rect()));

        let stack = tree.stack_at(Point::new(1.0, 1.0));
        assert_eq!(stack, vec![raised, later]);
    }

    #[test]
    fn stack_skips_nodes_outside_point() {
        let mut tree = VisualTree::new();
        let inside = tree.add_root(VisualNode::generic(Rect::new(0.0, 0.0, 50.0, 50.0)));
        tree.add_root(VisualNode::generic(Rect::new(100.0, 100.0, 50.0, 50.0)));

        assert_eq!(tree.stack_at(Point::new(25.0, 25.0)), vec![inside]);
    }

    #[test]
    fn image_descendants_reach_any_depth() {
        let mut tree = VisualTree::new();
        let overlay = tree.add_root(VisualNode::generic(full_rect()));
        let wrapper = tree.append_child(overlay, VisualNode::generic(full_rect()));
        let inner = tree.append_child(wrapper, VisualNode::generic(full_rect()));
        let photo = tree.append_child(
            inner,
            VisualNode::raster(RasterImage::with_src("a.png"), full_rect()),
        );
        let svg = tree.append_child(
            overlay,
            VisualNode::new(NodeKind::Vector(VectorElement::new("svg")), full_rect()),
        );
        tree.append_child(
            svg,
            VisualNode::new(NodeKind::Vector(VectorElement::new("path")), full_rect()),
        );

        assert_eq!(tree.image_descendants(overlay), vec![photo, svg]);
        assert!(tree.image_descendants(photo).is_empty());
    }

    #[test]
    fn vector_root_walks_up_to_nearest_svg() {
        let mut tree = VisualTree::new();
        let svg = tree.add_root(VisualNode::new(
            NodeKind::Vector(VectorElement::new("svg")),
            full_rect(),
        ));
        let group = tree.append_child(
            svg,
            VisualNode::new(NodeKind::Vector(VectorElement::new("g")), full_rect()),
        );
        let path = tree.append_child(
            group,
            VisualNode::new(NodeKind::Vector(VectorElement::new("path")), full_rect()),
        );

        assert_eq!(tree.vector_root(path), Some(svg));
        assert_eq!(tree.vector_root(svg), Some(svg));

        let plain = tree.add_root(VisualNode::generic(full_rect()));
        assert_eq!(tree.vector_root(plain), None);
    }

    #[test]
    fn append_to_missing_parent_becomes_root() {
        let mut tree = VisualTree::new();
        let id = tree.append_child(NodeId(42), VisualNode::generic(full_rect()));
        assert_eq!(tree.roots(), &[id]);
        assert_eq!(tree.parent(id), None);
    }
}
