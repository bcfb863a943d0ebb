/// ### English
/// Engine internal modules (EGL seam, rendering, render thread, surface lifecycle).
///
/// ### 中文
/// 引擎内部模块（EGL 接缝、渲染、渲染线程、surface 生命周期等）。
pub mod controller;
pub mod egl;
pub mod error;
pub mod flags;
pub mod listeners;
pub(crate) mod lockfree;
pub mod options;
pub mod rendering;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{SurfaceLifecycleController, SurfaceState};
pub use egl::{EmbedderEgl, EmbedderEglApi, NativeWindow, install_embedder_egl_api};
pub use listeners::{ErrorPresenter, FrameConsumedListener, SessionListener};
pub use options::RemoteDisplayOptions;
