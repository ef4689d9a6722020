use image_magnifier::geometry::{
    GeometryProbe, NodeKind, Point, RasterImage, Rect, VectorElement, VisualNode, VisualTree,
};
use image_magnifier::magnifier::{MagnifierController, NullHost, ZoomConfig};
use image_magnifier::resolver::{CandidateOrigin, CandidateResolver, ResolveError, ResolverConfig};
use image_magnifier::scene::Scene;

fn resolver() -> CandidateResolver {
    CandidateResolver::new(ResolverConfig::default()).expect("default resolver config")
}

/// 聊天应用常见结构：控制层盖在照片上方，缩略占位图叠在角落。
const CHAT_SCENE: &str = r#"{
    "nodes": [
        {
            "kind": { "type": "generic" },
            "rect": { "x": 0, "y": 0, "width": 800, "height": 600 },
            "children": [
                {
                    "kind": { "type": "raster", "src": "blob:abc",
                              "natural_size": { "width": 2000, "height": 1500 } },
                    "rect": { "x": 100, "y": 100, "width": 300, "height": 200 }
                },
                {
                    "kind": { "type": "raster", "src": "data:image/png;base64,iVBORw0KGgo=",
                              "natural_size": { "width": 8, "height": 8 } },
                    "rect": { "x": 100, "y": 100, "width": 40, "height": 40 }
                }
            ]
        },
        {
            "kind": { "type": "generic" },
            "rect": { "x": 0, "y": 0, "width": 800, "height": 600 },
            "z_index": 10
        }
    ]
}"#;

#[test]
fn overlay_stack_resolves_to_blob_photo() {
    let tree = Scene::from_json_str(CHAT_SCENE).expect("scene").build_tree();
    let point = Point::new(120.0, 120.0);

    let stack = tree.stack_at(point);
    assert_eq!(stack.len(), 4, "overlay, photo, placeholder and container are all hit");

    let candidate = resolver().resolve_at(&tree, point).expect("candidate");
    assert_eq!(candidate.url, "blob:abc");
}

#[test]
fn explicit_stack_resolves_to_blob_photo() {
    let mut tree = VisualTree::new();
    let overlay = tree.add_root(VisualNode::generic(Rect::new(0.0, 0.0, 300.0, 200.0)));
    let photo = tree.add_root(VisualNode::raster(
        RasterImage::with_src("blob:abc").natural(2000.0, 1500.0),
        Rect::new(0.0, 0.0, 300.0, 200.0),
    ));
    let tiny = tree.add_root(VisualNode::raster(
        RasterImage::with_src("data:image/png;base64,AAAA").natural(10.0, 10.0),
        Rect::new(0.0, 0.0, 40.0, 40.0),
    ));

    let resolved = resolver().resolve(&tree, &[overlay, photo, tiny]);
    assert_eq!(resolved.as_deref(), Some("blob:abc"));
}

#[test]
fn duplicate_urls_contribute_one_candidate() {
    let mut tree = VisualTree::new();
    let rect = Rect::new(0.0, 0.0, 200.0, 200.0);
    let first = tree.add_root(VisualNode::raster(RasterImage::with_src("https://x.test/a.png"), rect));
    let second = tree.add_root(VisualNode::raster(RasterImage::with_src("https://x.test/a.png"), rect));
    let other = tree.add_root(VisualNode::raster(RasterImage::with_src("https://x.test/b.png"), rect));

    let ranked = resolver().rank(&tree, &[first, second, other]);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].url, "https://x.test/a.png", "equal scores keep insertion order");
    assert_eq!(ranked[0].source_node, first);
}

#[test]
fn icons_below_threshold_are_ignored() {
    let mut tree = VisualTree::new();
    let icon = tree.add_root(VisualNode::raster(
        RasterImage::with_src("https://x.test/icon.png").natural(512.0, 512.0),
        Rect::new(0.0, 0.0, 16.0, 16.0),
    ));
    let spacer = tree.add_root(
        VisualNode::generic(Rect::new(0.0, 0.0, 19.0, 400.0)).with_background("url(spacer.gif)"),
    );

    assert!(resolver().rank(&tree, &[icon, spacer]).is_empty());
    assert!(matches!(
        resolver().resolve_at(&tree, Point::new(1.0, 1.0)),
        Err(ResolveError::NoCandidateFound)
    ));
}

#[test]
fn deep_descendant_under_small_control_is_found() {
    let mut tree = VisualTree::new();
    let card = tree.add_root(VisualNode::generic(Rect::new(0.0, 0.0, 400.0, 400.0)));
    let wrapper = tree.append_child(card, VisualNode::generic(Rect::new(0.0, 0.0, 400.0, 400.0)));
    let inner = tree.append_child(wrapper, VisualNode::generic(Rect::new(0.0, 0.0, 400.0, 400.0)));
    tree.append_child(
        inner,
        VisualNode::raster(
            RasterImage::with_src("https://x.test/full.jpg").natural(1600.0, 1600.0),
            Rect::new(0.0, 0.0, 400.0, 400.0),
        ),
    );
    let button = tree.add_root(VisualNode::generic(Rect::new(0.0, 0.0, 10.0, 10.0)).with_z_index(5));

    let ranked = resolver().rank(&tree, &[button, card]);
    assert_eq!(ranked[0].url, "https://x.test/full.jpg");
    assert_eq!(ranked[0].origin, CandidateOrigin::Descendant);
}

#[test]
fn srcset_and_lazy_attributes_feed_resolution() {
    let mut tree = VisualTree::new();
    let rect = Rect::new(0.0, 0.0, 300.0, 300.0);
    let responsive = tree.add_root(VisualNode::raster(
        RasterImage::with_src("https://x.test/small.jpg").srcset("https://x.test/1x.jpg 1x, https://x.test/2x.jpg 2x"),
        rect,
    ));
    let lazy = tree.add_root(VisualNode::raster(
        RasterImage::default().lazy("data-lazy-src", "https://x.test/lazy.jpg"),
        rect,
    ));

    let resolver = resolver();
    assert_eq!(
        resolver.resolve(&tree, &[responsive]).as_deref(),
        Some("https://x.test/2x.jpg")
    );
    assert_eq!(
        resolver.resolve(&tree, &[lazy]).as_deref(),
        Some("https://x.test/lazy.jpg")
    );
}

#[test]
fn svg_resolves_to_inline_data_url() {
    let mut tree = VisualTree::new();
    let svg = tree.add_root(VisualNode::new(
        NodeKind::Vector(VectorElement::new("svg").with_attribute("viewBox", "0 0 10 10")),
        Rect::new(0.0, 0.0, 100.0, 100.0),
    ));
    let path = tree.append_child(
        svg,
        VisualNode::new(
            NodeKind::Vector(VectorElement::new("path").with_attribute("d", "M0 0L10 10")),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        ),
    );

    let url = resolver().resolve(&tree, &[path]).expect("vector url");
    assert!(url.starts_with("data:image/svg+xml;base64,"));
}

#[test]
fn resolved_url_opens_magnifier_and_wheel_zooms_at_center() {
    let tree = Scene::from_json_str(CHAT_SCENE).expect("scene").build_tree();
    let candidate = resolver().resolve_at(&tree, Point::new(120.0, 120.0)).expect("candidate");

    let mut controller =
        MagnifierController::new(NullHost, ZoomConfig::default()).expect("controller");
    controller.open(candidate.url.clone()).expect("open");

    let zoom = controller.wheel_zoom(-100.0, Point::ORIGIN).expect("wheel");
    assert!((zoom - 1.2).abs() < 1e-9);

    let state = controller.state().expect("open state");
    assert_eq!(state.image_url(), "blob:abc");
    assert_eq!(state.pan(), Point::ORIGIN);
}
