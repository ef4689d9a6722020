//! # 场景文件
//!
//! 以 JSON 描述一棵可视节点树，供 `magnifier-probe` 与集成测试在没有真实页面时使用。
//!
//! ```json
//! {
//!   "base_url": "https://chat.example/room/1",
//!   "blobs": { "blob:https://chat.example/42": "photo.png" },
//!   "nodes": [
//!     {
//!       "kind": { "type": "generic" },
//!       "rect": { "x": 0, "y": 0, "width": 400, "height": 300 },
//!       "children": [
//!         {
//!           "kind": { "type": "raster", "src": "blob:https://chat.example/42",
//!                     "natural_size": { "width": 2000, "height": 1500 } },
//!           "rect": { "x": 50, "y": 50, "width": 300, "height": 200 }
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `blobs` 的值是相对场景文件目录的路径，加载时注册到 `BlobRegistry`。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::exporter::BlobRegistry;
use crate::geometry::{NodeId, VisualNode, VisualTree};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(flatten)]
    pub node: VisualNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub base_url: Option<String>,
    pub blobs: BTreeMap<String, PathBuf>,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| AppError::Scene(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// 按文档顺序展开为节点树。
    pub fn build_tree(&self) -> VisualTree {
        let mut tree = VisualTree::new();
        for scene_node in &self.nodes {
            let id = tree.add_root(scene_node.node.clone());
            Self::append_children(&mut tree, id, &scene_node.children);
        }
        tree
    }

    fn append_children(tree: &mut VisualTree, parent: NodeId, children: &[SceneNode]) {
        for child in children {
            let id = tree.append_child(parent, child.node.clone());
            Self::append_children(tree, id, &child.children);
        }
    }

    /// 把场景声明的 blob 读入内存存储，返回注册数量。
    pub fn register_blobs(&self, registry: &BlobRegistry, scene_dir: &Path) -> Result<usize, AppError> {
        for (url, relative) in &self.blobs {
            let path = scene_dir.join(relative);
            let bytes = fs::read(&path)?;
            log::debug!("📦 注册 blob {} <- {}（{} bytes）", url, path.display(), bytes.len());
            registry.register(url.clone(), bytes)?;
        }
        Ok(self.blobs.len())
    }
}
