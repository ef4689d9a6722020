//! # 放大层宿主边界
//!
//! 控制器不直接操作页面，而是通过 `OverlayHost` 通知外层：
//! 挂载/卸载放大层、锁定/恢复页面滚动、注册/注销全局拖拽监听、应用变换。
//! 控制器保证：
//! - `suspend_page_scroll` 与 `restore_page_scroll` 成对出现
//! - `attach_drag_listeners` 只在拖拽开始时调用，所有退出路径都会调用 `detach_drag_listeners`

use super::state::Transform;

pub trait OverlayHost {
    fn mount(&mut self, image_url: &str);

    /// 释放放大层的全部临时视觉状态。
    fn unmount(&mut self);

    fn suspend_page_scroll(&mut self);

    fn restore_page_scroll(&mut self);

    fn attach_drag_listeners(&mut self);

    fn detach_drag_listeners(&mut self);

    fn apply_transform(&mut self, transform: &Transform);
}

/// 不做任何事的宿主，用于无界面场景（CLI、纯状态测试）。
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHost;

impl OverlayHost for NullHost {
    fn mount(&mut self, _image_url: &str) {}

    fn unmount(&mut self) {}

    fn suspend_page_scroll(&mut self) {}

    fn restore_page_scroll(&mut self) {}

    fn attach_drag_listeners(&mut self) {}

    fn detach_drag_listeners(&mut self) {}

    fn apply_transform(&mut self, _transform: &Transform) {}
}

/// 允许调用方出借自己的宿主。
impl<T: OverlayHost + ?Sized> OverlayHost for &mut T {
    fn mount(&mut self, image_url: &str) {
        (**self).mount(image_url);
    }

    fn unmount(&mut self) {
        (**self).unmount();
    }

    fn suspend_page_scroll(&mut self) {
        (**self).suspend_page_scroll();
    }

    fn restore_page_scroll(&mut self) {
        (**self).restore_page_scroll();
    }

    fn attach_drag_listeners(&mut self) {
        (**self).attach_drag_listeners();
    }

    fn detach_drag_listeners(&mut self) {
        (**self).detach_drag_listeners();
    }

    fn apply_transform(&mut self, transform: &Transform) {
        (**self).apply_transform(transform);
    }
}
