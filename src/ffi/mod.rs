//! ### English
//! C ABI surface for `cast_remote_display`.
//!
//! All exported symbols are `extern "C"` functions; structs are `#[repr(C)]`.
//! Callbacks receive the embedder's `user_data` pointer unchanged and may be NULL.
//!
//! ### 中文
//! `cast_remote_display` 的 C ABI 接口层。
//!
//! 所有导出符号均为 `extern "C"` 函数；结构体使用 `#[repr(C)]`。
//! 回调会原样收到宿主的 `user_data` 指针，且回调本身可以为 NULL。
mod abi;
mod display;
mod egl;

use std::ffi::{CString, c_char, c_void};
use std::sync::Arc;

use crate::engine::{
    ErrorPresenter, FrameConsumedListener, SessionListener, SurfaceLifecycleController,
};

/// ### English
/// C ABI version for `cast_remote_display`.
///
/// ### 中文
/// `cast_remote_display` 的 C ABI 版本号。
const CAST_REMOTE_DISPLAY_ABI_VERSION: u32 = 1;

#[repr(C)]
#[derive(Clone, Copy)]
/// ### English
/// Embedder callback table.
///
/// Thread affinity:
/// - `on_frame_consumed` runs on the remote render thread.
/// - `on_remote_surface_ready` / `on_remote_surface_gone` run on the thread that reported the
///   surface event.
/// - `set_error_message` / `reveal_error_banner` run on the thread calling
///   `cast_remote_display_drain_errors`.
///
/// ### 中文
/// 宿主回调表。
///
/// 线程归属：
/// - `on_frame_consumed` 在远端渲染线程执行。
/// - `on_remote_surface_ready` / `on_remote_surface_gone` 在上报 surface 事件的线程执行。
/// - `set_error_message` / `reveal_error_banner` 在调用 `cast_remote_display_drain_errors`
///   的线程执行。
pub struct CastRemoteDisplayCallbacks {
    pub user_data: *mut c_void,
    pub on_frame_consumed: Option<unsafe extern "C" fn(*mut c_void, u32)>,
    pub on_remote_surface_ready: Option<unsafe extern "C" fn(*mut c_void, u32, u32)>,
    pub on_remote_surface_gone: Option<unsafe extern "C" fn(*mut c_void)>,
    /// ### English
    /// Receives a NUL-terminated UTF-8 string, valid only for the duration of the call.
    ///
    /// ### 中文
    /// 接收以 NUL 结尾的 UTF-8 字符串，仅在本次调用期间有效。
    pub set_error_message: Option<unsafe extern "C" fn(*mut c_void, *const c_char)>,
    pub reveal_error_banner: Option<unsafe extern "C" fn(*mut c_void)>,
}

/// ### English
/// Adapts the C callback table to the engine's listener traits.
///
/// ### 中文
/// 把 C 回调表适配为引擎的监听器 trait。
struct CallbackBridge {
    callbacks: CastRemoteDisplayCallbacks,
}

/// ### English
/// The embedder guarantees `user_data` and the callbacks may be used from any thread for the
/// lifetime of the display handle.
///
/// ### 中文
/// 宿主保证在 display 句柄存活期间，`user_data` 与回调可在任意线程使用。
unsafe impl Send for CallbackBridge {}
unsafe impl Sync for CallbackBridge {}

impl FrameConsumedListener for CallbackBridge {
    fn on_frame_consumed(&self, texture_id: u32) {
        if let Some(callback) = self.callbacks.on_frame_consumed {
            unsafe { callback(self.callbacks.user_data, texture_id) };
        }
    }
}

impl SessionListener for CallbackBridge {
    fn on_remote_surface_ready(&self, width: u32, height: u32) {
        if let Some(callback) = self.callbacks.on_remote_surface_ready {
            unsafe { callback(self.callbacks.user_data, width, height) };
        }
    }

    fn on_remote_surface_gone(&self) {
        if let Some(callback) = self.callbacks.on_remote_surface_gone {
            unsafe { callback(self.callbacks.user_data) };
        }
    }
}

impl ErrorPresenter for CallbackBridge {
    fn set_error_message(&self, message: &str) {
        let Some(callback) = self.callbacks.set_error_message else {
            return;
        };
        let message = CString::new(message.replace('\0', " ")).unwrap_or_default();
        unsafe { callback(self.callbacks.user_data, message.as_ptr()) };
    }

    fn reveal_error_banner(&self) {
        if let Some(callback) = self.callbacks.reveal_error_banner {
            unsafe { callback(self.callbacks.user_data) };
        }
    }
}

/// ### English
/// Opaque handle owning one surface lifecycle controller (and, lazily, its render thread).
///
/// ### 中文
/// 不透明句柄，持有一个 surface 生命周期控制器（以及惰性创建的渲染线程）。
pub struct CastRemoteDisplay {
    controller: SurfaceLifecycleController,
    /// ### English
    /// Presenter side of the callback table, used by `drain_errors`.
    ///
    /// ### 中文
    /// 回调表的展示端，供 `drain_errors` 使用。
    bridge: Arc<CallbackBridge>,
}
