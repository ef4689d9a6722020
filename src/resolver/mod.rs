//! # 候选解析模块（CandidateResolver）
//!
//! ## 设计思路
//!
//! 给定一个点和覆盖它的节点栈，找出所有“可能是那张图”的节点并排序，
//! 最优者胜出；同时避免把图标、追踪像素误判为图片。
//!
//! 聊天类应用常把真实图片埋在多层透明遮罩下面，所以对栈中每个节点都要看三处：
//! 1. 节点本身
//! 2. 节点的背景图
//! 3. 节点下**任意深度**的位图/矢量后代
//!
//! ## 实现思路
//!
//! - `extract`：按类别提取 URL（`srcset` / 懒加载 / `<picture>` / 矢量序列化）
//! - `css`：解析背景图 `url(...)`
//! - `score`：协议分 + 分辨率分 + 显示面积分
//! - 本文件：遍历顺序、尺寸过滤、按 URL 去重（先到先得）、稳定排序
//!
//! ```text
//! 节点栈（最上层在前）
//!    ↓  每个节点：自身 → 背景图 → 图片后代
//! 尺寸过滤（默认 20×20）
//!    ↓
//! URL 去重（seen 集合，后出现的重复项不参与打分）
//!    ↓
//! 打分 + 稳定降序排序 → 最高分 URL
//! ```

mod candidate;
mod config;
mod css;
mod error;
mod extract;
mod score;

use std::collections::HashSet;
use std::time::Instant;

pub use candidate::{Candidate, CandidateOrigin};
pub use config::{DEFAULT_MIN_CANDIDATE_SIZE, ResolverConfig};
pub use css::parse_css_url;
pub use error::ResolveError;
pub use score::{UrlScheme, background_score, element_score};

use crate::geometry::{GeometryProbe, MarkupSerializer, NodeId, Point, VectorSerializer};

/// 候选解析器。
pub struct CandidateResolver {
    config: ResolverConfig,
    base_url: Option<reqwest::Url>,
    serializer: Box<dyn VectorSerializer + Send + Sync>,
}

/// 单次解析过程的累积状态。
struct ResolutionPass {
    seen: HashSet<String>,
    candidates: Vec<Candidate>,
}

impl ResolutionPass {
    fn new() -> Self {
        Self {
            seen: HashSet::new(),
            candidates: Vec::new(),
        }
    }

    /// 同一 URL 只保留第一次出现的候选。
    fn claim(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        true
    }
}

impl CandidateResolver {
    pub fn new(config: ResolverConfig) -> Result<Self, ResolveError> {
        Self::with_serializer(config, Box::new(MarkupSerializer))
    }

    /// 指定矢量序列化实现（浏览器宿主传入 `XMLSerializer` 桥接）。
    pub fn with_serializer(
        config: ResolverConfig,
        serializer: Box<dyn VectorSerializer + Send + Sync>,
    ) -> Result<Self, ResolveError> {
        config.validate()?;
        let base_url = config
            .base_url
            .as_deref()
            .map(reqwest::Url::parse)
            .transpose()
            .map_err(|e| ResolveError::InvalidConfig(format!("base_url 无法解析：{}", e)))?;

        Ok(Self {
            config,
            base_url,
            serializer,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// 收集、去重、打分并按分数降序返回全部候选（并列保持插入顺序）。
    pub fn rank(&self, probe: &dyn GeometryProbe, stack: &[NodeId]) -> Vec<Candidate> {
        let started = Instant::now();
        let mut pass = ResolutionPass::new();

        for &id in stack {
            self.collect_element(probe, id, CandidateOrigin::Element, &mut pass);
            self.collect_background(probe, id, &mut pass);
            for descendant in probe.image_descendants(id) {
                self.collect_element(probe, descendant, CandidateOrigin::Descendant, &mut pass);
            }
        }

        let mut candidates = pass.candidates;
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        log::debug!(
            "🧮 候选解析完成 - 节点栈: {} 候选数: {} 耗时: {}µs",
            stack.len(),
            candidates.len(),
            started.elapsed().as_micros()
        );

        candidates
    }

    /// 返回最高分候选的 URL；没有候选时返回 `None`。
    pub fn resolve(&self, probe: &dyn GeometryProbe, stack: &[NodeId]) -> Option<String> {
        self.rank(probe, stack)
            .into_iter()
            .next()
            .map(|candidate| candidate.url)
    }

    /// 从视口坐标出发完成一次解析。
    pub fn resolve_at(
        &self,
        probe: &dyn GeometryProbe,
        point: Point,
    ) -> Result<Candidate, ResolveError> {
        let stack = probe.stack_at(point);
        let best = self.rank(probe, &stack).into_iter().next();

        match best {
            Some(candidate) => {
                log::info!(
                    "🎯 选中图片 - 来源: {:?} 节点: {:?} 分数: {:.1}",
                    candidate.origin,
                    candidate.source_node,
                    candidate.score
                );
                Ok(candidate)
            }
            None => {
                log::debug!("({:.1}, {:.1}) 下没有图片候选", point.x, point.y);
                Err(ResolveError::NoCandidateFound)
            }
        }
    }

    fn collect_element(
        &self,
        probe: &dyn GeometryProbe,
        id: NodeId,
        origin: CandidateOrigin,
        pass: &mut ResolutionPass,
    ) {
        let Some(node) = probe.node(id) else {
            return;
        };
        if !node.kind.is_image_like() {
            return;
        }

        let rendered = probe.bounding_box(id).unwrap_or(node.rect).size();
        if !self.passes_size_filter(rendered) {
            log::debug!(
                "🚫 {} 节点 {:?} 太小 ({}x{})，跳过",
                node.kind.label(),
                id,
                rendered.width,
                rendered.height
            );
            return;
        }

        let Some(url) = self.extract_url(probe, id) else {
            return;
        };
        if !pass.claim(&url) {
            return;
        }

        let score = element_score(&url, self.natural_size_for(probe, id), rendered);
        pass.candidates.push(Candidate {
            url,
            score,
            source_node: id,
            origin,
        });
    }

    fn collect_background(&self, probe: &dyn GeometryProbe, id: NodeId, pass: &mut ResolutionPass) {
        let Some(url) = probe.background_image(id).and_then(parse_css_url) else {
            return;
        };
        let Some(rendered) = probe.bounding_box(id).map(|rect| rect.size()) else {
            return;
        };
        if !self.passes_size_filter(rendered) {
            return;
        }

        let url = self.absolutize(&url);
        if !pass.claim(&url) {
            return;
        }

        pass.candidates.push(Candidate {
            score: background_score(&url, rendered),
            url,
            source_node: id,
            origin: CandidateOrigin::Background,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{
        NodeKind, RasterImage, Rect, SourceVariant, VectorElement, VisualNode, VisualTree,
    };

    fn resolver() -> CandidateResolver {
        CandidateResolver::new(ResolverConfig::default()).expect("default config is valid")
    }

    fn rect(width: f64, height: f64) -> Rect {
        Rect::new(0.0, 0.0, width, height)
    }

    #[test]
    fn blob_photo_under_overlay_wins() {
        let mut tree = VisualTree::new();
        let overlay = tree.add_root(VisualNode::generic(rect(300.0, 200.0)));
        let photo = tree.add_root(VisualNode::raster(
            RasterImage::with_src("blob:abc").natural(2000.0, 1500.0),
            rect(300.0, 200.0),
        ));
        let thumb = tree.add_root(VisualNode::raster(
            RasterImage::with_src("data:image/png;base64,AAAA"),
            rect(40.0, 40.0),
        ));

        let url = resolver().resolve(&tree, &[overlay, photo, thumb]);
        assert_eq!(url.as_deref(), Some("blob:abc"));
    }

    #[test]
    fn empty_stack_resolves_to_none() {
        let tree = VisualTree::new();
        assert_eq!(resolver().resolve(&tree, &[]), None);
        assert!(matches!(
            resolver().resolve_at(&tree, Point::new(1.0, 1.0)),
            Err(ResolveError::NoCandidateFound)
        ));
    }

    #[test]
    fn small_images_are_filtered() {
        let mut tree = VisualTree::new();
        let pixel = tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://t.example/pixel.gif"),
            rect(1.0, 1.0),
        ));
        let icon = tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://t.example/icon.png"),
            rect(300.0, 19.0),
        ));

        assert!(resolver().rank(&tree, &[pixel, icon]).is_empty());
    }

    #[test]
    fn descendant_search_finds_deeply_nested_photo() {
        let mut tree = VisualTree::new();
        let overlay = tree.add_root(VisualNode::generic(rect(400.0, 400.0)));
        let mut parent = overlay;
        for _ in 0..5 {
            parent = tree.append_child(parent, VisualNode::generic(rect(400.0, 400.0)));
        }
        let photo = tree.append_child(
            parent,
            VisualNode::raster(
                RasterImage::with_src("https://cdn.example/photo.jpg").natural(1200.0, 900.0),
                rect(400.0, 300.0),
            ),
        );

        let ranked = resolver().rank(&tree, &[overlay]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source_node, photo);
        assert_eq!(ranked[0].origin, CandidateOrigin::Descendant);
    }

    #[test]
    fn duplicate_urls_contribute_one_candidate() {
        let mut tree = VisualTree::new();
        let first = tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://x/a.png"),
            rect(100.0, 100.0),
        ));
        let second = tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://x/a.png").natural(4000.0, 4000.0),
            rect(500.0, 500.0),
        ));

        let ranked = resolver().rank(&tree, &[first, second]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].source_node, first);
        assert_eq!(ranked[0].score, 5_000.0 + 1_000.0);
    }

    #[test]
    fn srcset_beats_plain_src() {
        let mut tree = VisualTree::new();
        let img = tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://x/small.jpg").srcset("https://x/1x.jpg 1x, https://x/2x.jpg 2x"),
            rect(100.0, 100.0),
        ));

        assert_eq!(resolver().resolve(&tree, &[img]).as_deref(), Some("https://x/2x.jpg"));
    }

    #[test]
    fn lazy_attributes_follow_configured_order() {
        let mut tree = VisualTree::new();
        let img = tree.add_root(VisualNode::raster(
            RasterImage::default()
                .lazy("data-original", "https://x/original.jpg")
                .lazy("data-lazy-src", "https://x/lazy.jpg"),
            rect(100.0, 100.0),
        ));

        assert_eq!(resolver().resolve(&tree, &[img]).as_deref(), Some("https://x/lazy.jpg"));
    }

    #[test]
    fn picture_prefers_first_usable_source() {
        let mut tree = VisualTree::new();
        let picture = tree.add_root(VisualNode::new(NodeKind::Picture, rect(200.0, 200.0)));
        tree.append_child(
            picture,
            VisualNode::new(NodeKind::Source(SourceVariant::default()), rect(0.0, 0.0)),
        );
        tree.append_child(
            picture,
            VisualNode::new(
                NodeKind::Source(SourceVariant {
                    srcset: Some("https://x/a.webp 1x, https://x/b.webp 2x".to_string()),
                    src: None,
                }),
                rect(0.0, 0.0),
            ),
        );
        tree.append_child(
            picture,
            VisualNode::raster(RasterImage::with_src("https://x/fallback.jpg"), rect(200.0, 200.0)),
        );

        let ranked = resolver().rank(&tree, &[picture]);
        assert_eq!(ranked[0].url, "https://x/b.webp");
        assert_eq!(ranked[0].source_node, picture);
    }

    #[test]
    fn picture_falls_back_to_embedded_raster_subject_to_size() {
        let mut tree = VisualTree::new();
        let picture = tree.add_root(VisualNode::new(NodeKind::Picture, rect(200.0, 200.0)));
        tree.append_child(
            picture,
            VisualNode::raster(RasterImage::with_src("https://x/tiny.jpg"), rect(10.0, 10.0)),
        );

        let config = ResolverConfig::default();
        let resolver = CandidateResolver::new(config).expect("valid config");
        let candidates = resolver.rank(&tree, &[picture]);
        assert!(candidates.is_empty());
    }

    /// 节点树之上放大全部包围盒的查询层，模拟 CSS 缩放后的渲染尺寸。
    struct ScaledProbe<'a> {
        tree: &'a VisualTree,
        factor: f64,
    }

    impl GeometryProbe for ScaledProbe<'_> {
        fn stack_at(&self, point: Point) -> Vec<NodeId> {
            self.tree.stack_at(point)
        }

        fn node(&self, id: NodeId) -> Option<&VisualNode> {
            self.tree.node(id)
        }

        fn parent(&self, id: NodeId) -> Option<NodeId> {
            self.tree.parent(id)
        }

        fn children(&self, id: NodeId) -> Vec<NodeId> {
            self.tree.children(id)
        }

        fn image_descendants(&self, id: NodeId) -> Vec<NodeId> {
            self.tree.image_descendants(id)
        }

        fn bounding_box(&self, id: NodeId) -> Option<Rect> {
            let rect = self.tree.bounding_box(id)?;
            Some(Rect::new(rect.x, rect.y, rect.width * self.factor, rect.height * self.factor))
        }
    }

    #[test]
    fn picture_fallback_size_comes_from_probe_bounding_box() {
        let mut tree = VisualTree::new();
        let picture = tree.add_root(VisualNode::new(NodeKind::Picture, rect(20.0, 20.0)));
        tree.append_child(
            picture,
            VisualNode::raster(RasterImage::with_src("https://x/scaled.jpg"), rect(10.0, 10.0)),
        );

        let probe = ScaledProbe {
            tree: &tree,
            factor: 20.0,
        };
        assert_eq!(
            resolver().resolve(&probe, &[picture]).as_deref(),
            Some("https://x/scaled.jpg")
        );
        assert_eq!(resolver().resolve(&tree, &[picture]), None);
    }

    #[test]
    fn background_image_uses_display_area_only() {
        let mut tree = VisualTree::new();
        let div = tree.add_root(
            VisualNode::generic(rect(100.0, 50.0)).with_background(r#"url("https://x/bg.jpg")"#),
        );

        let ranked = resolver().rank(&tree, &[div]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].origin, CandidateOrigin::Background);
        assert_eq!(ranked[0].score, 5_000.0 + 500.0);
    }

    #[test]
    fn background_none_is_skipped() {
        let mut tree = VisualTree::new();
        let div = tree.add_root(VisualNode::generic(rect(100.0, 50.0)).with_background("none"));
        assert!(resolver().rank(&tree, &[div]).is_empty());
    }

    #[test]
    fn vector_graphic_becomes_inline_svg() {
        let mut tree = VisualTree::new();
        let svg = tree.add_root(VisualNode::new(
            NodeKind::Vector(VectorElement::new("svg").with_attribute("viewBox", "0 0 10 10")),
            rect(64.0, 64.0),
        ));
        let path = tree.append_child(
            svg,
            VisualNode::new(
                NodeKind::Vector(VectorElement::new("path").with_attribute("d", "M0 0")),
                rect(64.0, 64.0),
            ),
        );

        let ranked = resolver().rank(&tree, &[path, svg]);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].url.starts_with("data:image/svg+xml;base64,"));
        assert_eq!(ranked[0].source_node, path);
    }

    #[test]
    fn relative_urls_are_resolved_against_base() {
        let config = ResolverConfig {
            base_url: Some("https://chat.example/rooms/1".to_string()),
            ..ResolverConfig::default()
        };
        let resolver = CandidateResolver::new(config).expect("valid config");

        let mut tree = VisualTree::new();
        let img = tree.add_root(VisualNode::raster(
            RasterImage::with_src("/media/p.png"),
            rect(100.0, 100.0),
        ));
        let blob = tree.add_root(VisualNode::raster(
            RasterImage::with_src("blob:https://chat.example/uuid"),
            rect(100.0, 100.0),
        ));

        let ranked = resolver.rank(&tree, &[img, blob]);
        assert_eq!(ranked[0].url, "blob:https://chat.example/uuid");
        assert_eq!(ranked[1].url, "https://chat.example/media/p.png");
    }

    #[test]
    fn relative_background_url_is_resolved_against_base() {
        let config = ResolverConfig {
            base_url: Some("https://chat.example/rooms/1".to_string()),
            ..ResolverConfig::default()
        };
        let resolver = CandidateResolver::new(config).expect("valid config");

        let mut tree = VisualTree::new();
        let div = tree.add_root(
            VisualNode::generic(rect(100.0, 50.0)).with_background("url('../covers/bg.jpg')"),
        );

        assert_eq!(
            resolver.resolve(&tree, &[div]).as_deref(),
            Some("https://chat.example/covers/bg.jpg")
        );
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut tree = VisualTree::new();
        let a = tree.add_root(VisualNode::raster(RasterImage::with_src("https://x/a.png"), rect(50.0, 50.0)));
        let b = tree.add_root(VisualNode::raster(RasterImage::with_src("https://x/b.png"), rect(50.0, 50.0)));

        let ranked = resolver().rank(&tree, &[a, b]);
        assert_eq!(ranked[0].url, "https://x/a.png");
        assert_eq!(ranked[1].url, "https://x/b.png");
    }

    #[test]
    fn resolve_at_uses_hit_stack() {
        let mut tree = VisualTree::new();
        tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://x/far.png"),
            Rect::new(500.0, 500.0, 100.0, 100.0),
        ));
        let near = tree.add_root(VisualNode::raster(
            RasterImage::with_src("https://x/near.png"),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        ));

        let best = resolver().resolve_at(&tree, Point::new(50.0, 50.0)).expect("candidate");
        assert_eq!(best.source_node, near);
    }
}
