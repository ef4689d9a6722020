//! # 矢量序列化边界
//!
//! ## 设计思路
//!
//! 矢量图没有可下载的 URL，因此把最近的 `<svg>` 根序列化成独立文本文档，
//! 再编码为内联 Data URL。这样不需要网络请求，也不受来源限制。
//!
//! ## 实现思路
//!
//! - `VectorSerializer` 是外部协作者边界（浏览器里对应 `XMLSerializer`）。
//! - `MarkupSerializer` 是基于 `VisualTree` 节点的默认实现：
//!   递归输出标签/属性/文本，做 XML 转义，根节点缺少命名空间时补上。

use base64::{Engine as _, engine::general_purpose};

use super::node::{NodeId, NodeKind};
use super::probe::GeometryProbe;

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

/// 把矢量子树转换成自包含的文本文档。
pub trait VectorSerializer {
    fn serialize(&self, probe: &dyn GeometryProbe, root: NodeId) -> Option<String>;
}

/// 基于节点树的标记序列化器。
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupSerializer;

impl MarkupSerializer {
    fn write_element(
        probe: &dyn GeometryProbe,
        id: NodeId,
        is_root: bool,
        out: &mut String,
    ) {
        let Some(NodeKind::Vector(element)) = probe.node(id).map(|node| &node.kind) else {
            return;
        };

        out.push('<');
        out.push_str(&element.tag);

        let has_namespace = element.attributes.iter().any(|(name, _)| name == "xmlns");
        if is_root && !has_namespace {
            out.push_str(" xmlns=\"");
            out.push_str(SVG_NAMESPACE);
            out.push('"');
        }

        for (name, value) in &element.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_xml(value));
            out.push('"');
        }

        let children = probe.children(id);
        if children.is_empty() && element.text.is_none() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape_xml(text));
        }
        for child in children {
            Self::write_element(probe, child, false, out);
        }
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }
}

impl VectorSerializer for MarkupSerializer {
    fn serialize(&self, probe: &dyn GeometryProbe, root: NodeId) -> Option<String> {
        if !matches!(probe.node(root).map(|node| &node.kind), Some(NodeKind::Vector(_))) {
            return None;
        }

        let mut out = String::new();
        Self::write_element(probe, root, true, &mut out);
        Some(out)
    }
}

/// 将序列化后的矢量文档编码为 Data URL。
pub fn svg_data_url(markup: &str) -> String {
    format!(
        "{}{}",
        SVG_DATA_URL_PREFIX,
        general_purpose::STANDARD.encode(markup.as_bytes())
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
