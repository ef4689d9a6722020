//! # 按类别提取 URL
//!
//! ## 实现思路
//!
//! - 位图：`srcset` 最优项 → `src` → 懒加载属性链
//! - `<picture>`：按文档顺序找第一个可用的 `<source>`，否则回退到内嵌 `<img>`（同样过尺寸过滤）
//! - `<source>`：`srcset` 最优项 → `src`
//! - 矢量：序列化最近的 `<svg>` 根并编码为 Data URL

use crate::geometry::{
    GeometryProbe, NodeId, NodeKind, RasterImage, Size, SourceVariant, svg_data_url,
};
use crate::srcset::select_best;

use super::CandidateResolver;

fn usable(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl CandidateResolver {
    /// 节点渲染尺寸是否达到候选下限。
    pub(super) fn passes_size_filter(&self, rendered: Size) -> bool {
        rendered.at_least(self.config.min_width, self.config.min_height)
    }

    /// 按节点类别提取候选 URL（已做相对地址补全）。
    pub(super) fn extract_url(&self, probe: &dyn GeometryProbe, id: NodeId) -> Option<String> {
        let node = probe.node(id)?;
        let raw = match &node.kind {
            NodeKind::Raster(image) => self.raster_url(image),
            NodeKind::Picture => self.picture_url(probe, id),
            NodeKind::Source(source) => Self::source_url(source),
            NodeKind::Vector(_) => self.vector_url(probe, id),
            NodeKind::Generic => None,
        }?;
        Some(self.absolutize(&raw))
    }

    /// 用于打分的自然尺寸：`<picture>` 取内嵌位图的尺寸。
    pub(super) fn natural_size_for(&self, probe: &dyn GeometryProbe, id: NodeId) -> Option<Size> {
        match probe.node(id).map(|node| &node.kind) {
            Some(NodeKind::Picture) => probe
                .children(id)
                .into_iter()
                .find(|child| matches!(probe.node(*child).map(|n| &n.kind), Some(NodeKind::Raster(_))))
                .and_then(|child| probe.natural_size(child)),
            _ => probe.natural_size(id),
        }
    }

    fn raster_url(&self, image: &RasterImage) -> Option<String> {
        if let Some(best) = select_best(image.srcset.as_deref()) {
            return Some(best);
        }
        if let Some(src) = usable(image.src.as_ref()) {
            return Some(src.to_string());
        }

        self.config.lazy_attributes.iter().find_map(|attribute| {
            let value = usable(image.lazy_attributes.get(attribute))?;
            log::debug!("🔎 使用懒加载属性 {} 作为图片来源", attribute);
            Some(value.to_string())
        })
    }

    fn source_url(source: &SourceVariant) -> Option<String> {
        select_best(source.srcset.as_deref())
            .or_else(|| usable(source.src.as_ref()).map(str::to_string))
    }

    fn picture_url(&self, probe: &dyn GeometryProbe, id: NodeId) -> Option<String> {
        let children = probe.children(id);

        let from_sources = children.iter().find_map(|child| match &probe.node(*child)?.kind {
            NodeKind::Source(source) => Self::source_url(source),
            _ => None,
        });
        if from_sources.is_some() {
            return from_sources;
        }

        children.iter().find_map(|child| {
            let node = probe.node(*child)?;
            let NodeKind::Raster(image) = &node.kind else {
                return None;
            };
            let rendered = probe.bounding_box(*child).unwrap_or(node.rect).size();
            if !self.passes_size_filter(rendered) {
                return None;
            }
            self.raster_url(image)
        })
    }

    fn vector_url(&self, probe: &dyn GeometryProbe, id: NodeId) -> Option<String> {
        let root = probe.vector_root(id)?;
        let markup = self.serializer.serialize(probe, root)?;
        Some(svg_data_url(&markup))
    }

    /// 相对地址按 `base_url` 补全；未配置或解析失败时原样返回。
    pub(super) fn absolutize(&self, url: &str) -> String {
        let Some(base) = self.base_url.as_ref() else {
            return url.to_string();
        };
        if reqwest::Url::parse(url).is_ok() {
            return url.to_string();
        }
        match base.join(url) {
            Ok(joined) => joined.to_string(),
            Err(err) => {
                log::debug!("相对地址补全失败（{}）：{}", err, url);
                url.to_string()
            }
        }
    }
}
