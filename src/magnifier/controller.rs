//! # 放大层控制器
//!
//! ## 设计思路
//!
//! 两态状态机：`Closed`（初始，可重复打开）与 `Open`。
//! 状态用 `Option<MagnifierState>` 表达，`None` 即关闭，
//! 因此“打开 ⇔ 有图片地址”在类型层面成立，不需要额外校验。
//!
//! ## 实现思路
//!
//! - 打开：已打开时拒绝（至多一个实例），否则重置缩放 1.0、平移 (0,0)，锁定页面滚动。
//! - 关闭：先结束拖拽（注销监听），再恢复滚动、卸载放大层并丢弃状态。
//! - 离散步进走 `ZoomLadder::step`；滚轮缩放以光标为锚点，保持光标下的内容点不动。
//! - 任意路径缩放到 ≤ 1.0 时平移归零，并结束进行中的拖拽。
//! - 拖拽只在缩放 > 1 时开始，平移不做边界限制。

use crate::geometry::Point;

use super::config::ZoomConfig;
use super::error::MagnifierError;
use super::host::OverlayHost;
use super::input::{MagnifierInput, ZoomDirection};
use super::state::{MagnifierState, Transform};

pub struct MagnifierController<H: OverlayHost> {
    host: H,
    config: ZoomConfig,
    state: Option<MagnifierState>,
}

impl<H: OverlayHost> MagnifierController<H> {
    pub fn new(host: H, config: ZoomConfig) -> Result<Self, MagnifierError> {
        config.validate()?;
        Ok(Self {
            host,
            config,
            state: None,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&MagnifierState> {
        self.state.as_ref()
    }

    pub fn transform(&self) -> Option<Transform> {
        self.state.as_ref().map(MagnifierState::transform)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Closed → Open。
    pub fn open(&mut self, image_url: impl Into<String>) -> Result<(), MagnifierError> {
        if self.state.is_some() {
            log::debug!("放大层已打开，忽略重复打开请求");
            return Err(MagnifierError::AlreadyOpen);
        }

        let image_url = image_url.into();
        if image_url.trim().is_empty() {
            return Err(MagnifierError::EmptyUrl);
        }

        log::info!("🔍 打开放大层 - 图片: {}", redact_for_log(&image_url));
        self.host.mount(&image_url);
        self.host.suspend_page_scroll();

        let state = MagnifierState::opened(image_url);
        self.host.apply_transform(&state.transform());
        self.state = Some(state);
        Ok(())
    }

    /// Open → Closed；已关闭时返回 `false`。
    pub fn close(&mut self) -> bool {
        let Some(state) = self.state.take() else {
            return false;
        };

        if state.is_panning() {
            self.host.detach_drag_listeners();
        }
        self.host.restore_page_scroll();
        self.host.unmount();

        log::info!("🔍 关闭放大层 - 最终缩放: {:.2}", state.zoom);
        true
    }

    /// 离散步进一档，返回新的缩放倍数。
    pub fn step_zoom(&mut self, direction: ZoomDirection) -> Result<f64, MagnifierError> {
        let state = self.state.as_ref().ok_or(MagnifierError::NotOpen)?;
        let zoom = self.config.ladder.step(state.zoom, direction);
        let pan = state.pan;
        self.commit(zoom, pan);
        Ok(zoom)
    }

    /// 以光标为锚点的连续缩放。
    ///
    /// `cursor` 为光标相对图片静止中心的偏移。
    /// ```text
    /// factor   = 1 + (-delta) * sensitivity
    /// proposed = zoom * factor
    /// change   = clamp(proposed) / zoom
    /// pan'     = cursor - change * (cursor - pan)
    /// ```
    pub fn wheel_zoom(&mut self, delta: f64, cursor: Point) -> Result<f64, MagnifierError> {
        let state = self.state.as_ref().ok_or(MagnifierError::NotOpen)?;
        if !delta.is_finite() {
            return Ok(state.zoom);
        }

        let current = state.zoom;
        let factor = 1.0 + (-delta) * self.config.wheel_sensitivity;
        let zoom = self.config.ladder.clamp(current * factor);
        let scale_change = zoom / current;

        let pan = Point::new(
            cursor.x - scale_change * (cursor.x - state.pan.x),
            cursor.y - scale_change * (cursor.y - state.pan.y),
        );

        self.commit(zoom, pan);
        Ok(zoom)
    }

    /// 开始拖拽；缩放 ≤ 1 时不开始，返回 `false`。
    pub fn begin_pan(&mut self, pointer: Point) -> Result<bool, MagnifierError> {
        let state = self.state.as_mut().ok_or(MagnifierError::NotOpen)?;
        if state.zoom <= 1.0 {
            return Ok(false);
        }
        if state.is_panning() {
            return Ok(true);
        }

        state.drag_offset = Some(pointer.offset_from(state.pan));
        self.host.attach_drag_listeners();
        Ok(true)
    }

    /// 拖拽移动；未在拖拽时返回 `false`。
    pub fn move_pan(&mut self, pointer: Point) -> Result<bool, MagnifierError> {
        let state = self.state.as_mut().ok_or(MagnifierError::NotOpen)?;
        let Some(offset) = state.drag_offset else {
            return Ok(false);
        };

        state.pan = pointer.offset_from(offset);
        let transform = state.transform();
        self.host.apply_transform(&transform);
        Ok(true)
    }

    /// 结束拖拽（正常松开或指针丢失），返回之前是否在拖拽。
    pub fn end_pan(&mut self) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.drag_offset.take().is_none() {
            return false;
        }
        self.host.detach_drag_listeners();
        true
    }

    /// 统一消息入口。
    pub fn handle(&mut self, input: MagnifierInput) -> Result<(), MagnifierError> {
        match input {
            MagnifierInput::Open(url) => self.open(url),
            MagnifierInput::Close => {
                self.close();
                Ok(())
            }
            MagnifierInput::StepZoom(direction) => self.step_zoom(direction).map(|_| ()),
            MagnifierInput::Wheel { delta, cursor } => self.wheel_zoom(delta, cursor).map(|_| ()),
            MagnifierInput::PanStart(pointer) => self.begin_pan(pointer).map(|_| ()),
            MagnifierInput::PanMove(pointer) => self.move_pan(pointer).map(|_| ()),
            MagnifierInput::PanEnd | MagnifierInput::PointerLost => {
                self.end_pan();
                Ok(())
            }
        }
    }

    fn commit(&mut self, zoom: f64, pan: Point) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        state.zoom = zoom;
        state.pan = if zoom <= 1.0 { Point::ORIGIN } else { pan };

        let stop_drag = zoom <= 1.0 && state.drag_offset.take().is_some();
        let transform = state.transform();

        if stop_drag {
            self.host.detach_drag_listeners();
        }
        self.host.apply_transform(&transform);
    }
}

impl<H: OverlayHost> Drop for MagnifierController<H> {
    fn drop(&mut self) {
        self.close();
    }
}

/// 日志中不输出完整的 Data URL 负载。
fn redact_for_log(url: &str) -> String {
    const MAX_LOG_LEN: usize = 96;
    if url.len() <= MAX_LOG_LEN {
        return url.to_string();
    }
    let mut cut = MAX_LOG_LEN;
    while !url.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…({} bytes)", &url[..cut], url.len())
}
