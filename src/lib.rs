//! # 图片放大镜：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            宿主页面 (渲染层 / 扩展内容脚本)                │
//! │                                                          │
//! │  光标坐标 ── 节点树 ── 放大层 DOM ── 剪贴板 / 下载器       │
//! └───────┬──────────────▲────────────────────▲──────────────┘
//!         ↓ GeometryProbe │ OverlayHost        │ ClipboardSink / ExportSink
//! ┌───────┼──────────────┼────────────────────┼──────────────┐
//! │       ↓              │     image_magnifier │              │
//! │                                                          │
//! │  ┌─ geometry ───── 节点树、命中栈、矢量序列化              │
//! │  ├─ srcset ─────── 响应式源选择（唯一的分辨率比较逻辑）    │
//! │  ├─ resolver ───── 候选收集·打分·去重 → 最佳 URL           │
//! │  ├─ magnifier ──── 放大层状态机（缩放·锚点·拖拽）          │
//! │  ├─ exporter ───── 离屏导出 → 重新获取 → 剪贴板/保存       │
//! │  │                                                       │
//! │  ├─ config ─────── MagnifierSettings (JSON)               │
//! │  ├─ scene ──────── 场景文件（CLI 与测试用节点树）          │
//! │  └─ error ──────── AppError (统一错误类型)                 │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 调用链
//!
//! 光标坐标 → `CandidateResolver`（借助 `GeometryProbe` 与 `srcset`）→ 最佳 URL
//! → `MagnifierController` 打开放大层 → 用户缩放/拖拽 → 用户触发导出 → `PixelExporter`。
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`geometry`] | 可视节点模型、`VisualTree` 节点树、`GeometryProbe` 边界、SVG 序列化 |
//! | [`srcset`] | 解析 `srcset` 描述串并选出密度最高的条目 |
//! | [`resolver`] | 从命中栈收集候选、按协议/分辨率/显示面积打分、去重排序 |
//! | [`magnifier`] | 离散档位与滚轮锚点缩放、拖拽平移、打开/关闭生命周期 |
//! | [`exporter`] | 无损像素导出与跨域回退链、复制到剪贴板、保存 |
//! | [`config`] | 聚合各子系统配置，JSON 读写与校验 |
//! | [`scene`] | JSON 场景格式，构造节点树与 blob 存储 |
//! | [`error`] | 统一错误类型 `AppError` |

pub mod config;
pub mod error;
pub mod exporter;
pub mod geometry;
pub mod magnifier;
pub mod resolver;
pub mod scene;
pub mod srcset;

pub use config::MagnifierSettings;
pub use error::AppError;
