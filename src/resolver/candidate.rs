//! 候选结果模型

use serde::Serialize;

use crate::geometry::NodeId;

/// 候选的来源路径，仅用于日志与诊断。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    /// 命中栈中的节点本身。
    Element,
    /// 节点的 CSS 背景图。
    Background,
    /// 命中节点下任意深度的位图/矢量后代。
    Descendant,
}

/// 打分完成的候选，生成后不再修改。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub url: String,
    pub score: f64,
    pub source_node: NodeId,
    pub origin: CandidateOrigin,
}
