use tracing::warn;

use crate::engine::{EmbedderEglApi, install_embedder_egl_api};

#[unsafe(no_mangle)]
/// ### English
/// Installs an embedder-provided EGL function table.
///
/// Must be called once, before `cast_remote_display_create`. All function pointers must come
/// from the EGL library that owns the producer's context.
///
/// Returns `true` on success.
///
/// ### 中文
/// 安装由宿主提供的 EGL 函数表。
///
/// 必须在 `cast_remote_display_create` 之前调用且只调用一次。所有函数指针必须来自持有
/// 生产者上下文的同一个 EGL 库。
///
/// 成功返回 `true`。
pub unsafe extern "C" fn cast_remote_display_set_egl_api(api: *const EmbedderEglApi) -> bool {
    if api.is_null() {
        return false;
    }

    let api = unsafe { *api };
    match install_embedder_egl_api(api) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, "rejected embedder EGL table");
            false
        }
    }
}
