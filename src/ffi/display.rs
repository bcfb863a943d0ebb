//! ### English
//! C ABI bindings for the remote display lifecycle.
//!
//! ### 中文
//! 远端显示生命周期相关的 C ABI 绑定。

use std::ffi::c_void;
use std::sync::Arc;

use tracing::warn;

use super::{CallbackBridge, CastRemoteDisplay, CastRemoteDisplayCallbacks};
use crate::engine::{
    EmbedderEgl, NativeWindow, RemoteDisplayOptions, SurfaceLifecycleController, SurfaceState,
};

#[unsafe(no_mangle)]
/// ### English
/// Creates a remote display controller.
///
/// `cast_remote_display_set_egl_api` must have been called first. `flags` is a bitmask of
/// `CAST_REMOTE_DISPLAY_FLAG_*` values. Returns NULL on failure.
///
/// ### 中文
/// 创建远端显示控制器。
///
/// 必须先调用 `cast_remote_display_set_egl_api`。`flags` 为 `CAST_REMOTE_DISPLAY_FLAG_*`
/// 位掩码。失败时返回 NULL。
pub unsafe extern "C" fn cast_remote_display_create(
    callbacks: *const CastRemoteDisplayCallbacks,
    flags: u32,
) -> *mut CastRemoteDisplay {
    if callbacks.is_null() {
        return std::ptr::null_mut();
    }

    let egl = match EmbedderEgl::installed() {
        Ok(egl) => egl,
        Err(err) => {
            warn!(%err, "cannot create remote display");
            return std::ptr::null_mut();
        }
    };

    let bridge = Arc::new(CallbackBridge {
        callbacks: unsafe { *callbacks },
    });
    let controller = SurfaceLifecycleController::new(
        Arc::new(egl),
        RemoteDisplayOptions::from_flags(flags),
        bridge.clone(),
        bridge.clone(),
    );

    Box::into_raw(Box::new(CastRemoteDisplay { controller, bridge }))
}

#[unsafe(no_mangle)]
/// ### English
/// Destroys a controller created by `cast_remote_display_create`.
///
/// A running render thread is asked to stop; it releases its context on its own thread.
///
/// ### 中文
/// 销毁由 `cast_remote_display_create` 创建的控制器。
///
/// 正在运行的渲染线程会收到停止请求，并在其自身线程上释放上下文。
pub unsafe extern "C" fn cast_remote_display_destroy(display: *mut CastRemoteDisplay) {
    if display.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(display));
    }
}

#[unsafe(no_mangle)]
/// ### English
/// Reports that the remote surface is available. `window` is the native window
/// (e.g. `ANativeWindow*`) and must outlive the matching `surface_destroyed` call.
///
/// ### 中文
/// 上报远端 surface 可用。`window` 为原生窗口（例如 `ANativeWindow*`），
/// 其生命周期必须覆盖到对应的 `surface_destroyed` 调用。
pub unsafe extern "C" fn cast_remote_display_surface_available(
    display: *mut CastRemoteDisplay,
    window: *mut c_void,
    width: u32,
    height: u32,
) {
    if display.is_null() {
        return;
    }
    let Some(window) = NativeWindow::from_raw(window as usize) else {
        warn!("surface_available called with a NULL window");
        return;
    };

    unsafe { (*display).controller.on_surface_available(window, width, height) };
}

#[unsafe(no_mangle)]
/// ### English
/// Reports a remote surface size change.
///
/// ### 中文
/// 上报远端 surface 尺寸变化。
pub unsafe extern "C" fn cast_remote_display_surface_resized(
    display: *mut CastRemoteDisplay,
    width: u32,
    height: u32,
) {
    if display.is_null() {
        return;
    }
    unsafe { (*display).controller.on_surface_resized(width, height) };
}

#[unsafe(no_mangle)]
/// ### English
/// Reports that the remote surface is gone. Calls `on_remote_surface_gone`, then stops the
/// render thread without waiting for it.
///
/// ### 中文
/// 上报远端 surface 已销毁。先调用 `on_remote_surface_gone`，再停止渲染线程（不等待）。
pub unsafe extern "C" fn cast_remote_display_surface_destroyed(display: *mut CastRemoteDisplay) {
    if display.is_null() {
        return;
    }
    unsafe { (*display).controller.on_surface_destroyed() };
}

#[unsafe(no_mangle)]
/// ### English
/// Hands `texture_id` to the remote render thread.
///
/// Call on the producer thread with the producer's EGL context current; the first call starts
/// the render thread with that context as its share context.
///
/// Returns `false` if the frame could not be handed off.
///
/// ### 中文
/// 把 `texture_id` 交给远端渲染线程。
///
/// 需在生产者线程调用，且生产者的 EGL 上下文为 current；首次调用会以该上下文作为共享上下文
/// 启动渲染线程。
///
/// 无法交付时返回 `false`。
pub unsafe extern "C" fn cast_remote_display_render_frame(
    display: *mut CastRemoteDisplay,
    texture_id: u32,
) -> bool {
    if display.is_null() {
        return false;
    }
    unsafe { (*display).controller.render_frame_to_texture(texture_id) }.is_ok()
}

#[unsafe(no_mangle)]
/// ### English
/// Delivers queued render errors to `set_error_message` / `reveal_error_banner`.
/// Returns how many errors were delivered.
///
/// ### 中文
/// 把排队的渲染错误交给 `set_error_message` / `reveal_error_banner`；返回交付的数量。
pub unsafe extern "C" fn cast_remote_display_drain_errors(display: *mut CastRemoteDisplay) -> u32 {
    if display.is_null() {
        return 0;
    }
    let display = unsafe { &*display };
    display.controller.drain_errors(display.bridge.as_ref()) as u32
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `true` while a remote surface is available.
///
/// ### 中文
/// 远端 surface 可用时返回 `true`。
pub unsafe extern "C" fn cast_remote_display_has_surface(
    display: *const CastRemoteDisplay,
) -> bool {
    if display.is_null() {
        return false;
    }
    let state = unsafe { (*display).controller.state() };
    matches!(state, SurfaceState::SurfaceReady { .. })
}

#[unsafe(no_mangle)]
/// ### English
/// Returns `true` once any render error has been delivered to the banner.
///
/// ### 中文
/// 一旦有渲染错误交付给横幅即返回 `true`。
pub unsafe extern "C" fn cast_remote_display_has_errored(
    display: *const CastRemoteDisplay,
) -> bool {
    if display.is_null() {
        return false;
    }
    unsafe { (*display).controller.has_errored() }
}
