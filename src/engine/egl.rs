//! ### English
//! EGL platform seam.
//! Holds the opaque handle types, the EGL constants used by the core and the `EglPlatform` trait
//! that the render engine talks to. The production implementation is backed by an
//! embedder-provided function table (see `embedder`).
//!
//! ### 中文
//! EGL 平台接缝层。
//! 包含不透明句柄类型、核心使用的 EGL 常量，以及渲染引擎所依赖的 `EglPlatform` trait。
//! 生产实现基于宿主提供的函数表（见 `embedder`）。

use dpi::PhysicalSize;

use crate::engine::error::RemoteDisplayError;
use crate::engine::rendering::QuadGl;

mod config_chooser;
mod embedder;

pub use config_chooser::{GraphicsConfig, choose_config};
pub use embedder::{EmbedderEgl, EmbedderEglApi, install_embedder_egl_api};

/// ### English
/// `EGLint`.
///
/// ### 中文
/// `EGLint`。
pub type EGLint = i32;

pub const EGL_SUCCESS: EGLint = 0x3000;
pub const EGL_BAD_CONTEXT: EGLint = 0x3006;
pub const EGL_NONE: EGLint = 0x3038;
pub const EGL_ALPHA_SIZE: EGLint = 0x3021;
pub const EGL_BLUE_SIZE: EGLint = 0x3022;
pub const EGL_GREEN_SIZE: EGLint = 0x3023;
pub const EGL_RED_SIZE: EGLint = 0x3024;
pub const EGL_DEPTH_SIZE: EGLint = 0x3025;
pub const EGL_STENCIL_SIZE: EGLint = 0x3026;
pub const EGL_SAMPLES: EGLint = 0x3031;
pub const EGL_SAMPLE_BUFFERS: EGLint = 0x3032;
pub const EGL_RENDERABLE_TYPE: EGLint = 0x3040;
pub const EGL_HEIGHT: EGLint = 0x3056;
pub const EGL_WIDTH: EGLint = 0x3057;
pub const EGL_DRAW: EGLint = 0x3059;
pub const EGL_CONTEXT_CLIENT_VERSION: EGLint = 0x3098;
pub const EGL_OPENGL_ES2_BIT: EGLint = 0x0004;

macro_rules! egl_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub fn from_raw(raw: usize) -> Option<Self> {
                (raw != 0).then_some(Self(raw))
            }

            #[inline]
            pub fn as_raw(self) -> usize {
                self.0
            }
        }
    };
}

egl_handle!(
    /// ### English
    /// `EGLDisplay` handle (never `EGL_NO_DISPLAY`).
    ///
    /// ### 中文
    /// `EGLDisplay` 句柄（不会是 `EGL_NO_DISPLAY`）。
    EglDisplay
);
egl_handle!(
    /// ### English
    /// `EGLConfig` handle.
    ///
    /// ### 中文
    /// `EGLConfig` 句柄。
    EglConfig
);
egl_handle!(
    /// ### English
    /// `EGLContext` handle (never `EGL_NO_CONTEXT`).
    ///
    /// ### 中文
    /// `EGLContext` 句柄（不会是 `EGL_NO_CONTEXT`）。
    EglContext
);
egl_handle!(
    /// ### English
    /// `EGLSurface` handle (never `EGL_NO_SURFACE`).
    ///
    /// ### 中文
    /// `EGLSurface` 句柄（不会是 `EGL_NO_SURFACE`）。
    EglSurface
);
egl_handle!(
    /// ### English
    /// `EGLNativeWindowType` of the remote display (e.g. an `ANativeWindow*`).
    ///
    /// The window is owned by the surface lifecycle controller's embedder; the engine only
    /// creates an `EGLSurface` on top of it.
    ///
    /// ### 中文
    /// 远端显示的 `EGLNativeWindowType`（例如 `ANativeWindow*`）。
    ///
    /// 该窗口由生命周期控制器的宿主持有；引擎只会在其上创建 `EGLSurface`。
    NativeWindow
);

/// ### English
/// Borrowed handle to the producer's context whose object namespace the engine shares.
///
/// The engine passes it to `eglCreateContext` as the share context and never destroys it:
/// freeing the parent context is not this crate's responsibility.
///
/// ### 中文
/// 生产者上下文的借用句柄；引擎与其共享对象命名空间。
///
/// 引擎只把它作为 `eglCreateContext` 的共享上下文参数，从不销毁它：
/// 释放父上下文不是本 crate 的职责。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParentContext(EglContext);

impl ParentContext {
    #[inline]
    pub fn borrowed(context: EglContext) -> Self {
        Self(context)
    }

    #[inline]
    pub fn context(self) -> EglContext {
        self.0
    }
}

/// ### English
/// Everything the core needs from EGL.
///
/// Implementations must be callable from any thread; the "current" queries and
/// `make_current` refer to the calling thread, as EGL does.
///
/// ### 中文
/// 核心逻辑对 EGL 的全部依赖。
///
/// 实现必须可在任意线程调用；与 EGL 一致，“current” 查询与 `make_current`
/// 都针对调用线程。
pub trait EglPlatform: Send + Sync {
    /// ### English
    /// Returns the initialized default display (`eglGetDisplay` + `eglInitialize`).
    ///
    /// ### 中文
    /// 返回已初始化的默认 display（`eglGetDisplay` + `eglInitialize`）。
    fn default_display(&self) -> Result<EglDisplay, RemoteDisplayError>;

    /// ### English
    /// Runs `eglChooseConfig` for an `EGL_NONE`-terminated attribute list.
    /// Returns `None` if the call itself failed, `Some(vec![])` if nothing matched.
    ///
    /// ### 中文
    /// 以 `EGL_NONE` 结尾的属性列表调用 `eglChooseConfig`。
    /// 调用本身失败时返回 `None`；无匹配时返回 `Some(vec![])`。
    fn choose_configs(&self, display: EglDisplay, attribs: &[EGLint]) -> Option<Vec<EglConfig>>;

    fn config_attrib(
        &self,
        display: EglDisplay,
        config: EglConfig,
        attribute: EGLint,
    ) -> Option<EGLint>;

    fn create_context(
        &self,
        display: EglDisplay,
        config: EglConfig,
        share: ParentContext,
        attribs: &[EGLint],
    ) -> Option<EglContext>;

    fn create_window_surface(
        &self,
        display: EglDisplay,
        config: EglConfig,
        window: NativeWindow,
    ) -> Option<EglSurface>;

    /// ### English
    /// `eglMakeCurrent`; passing `None` for both releases the calling thread's binding.
    ///
    /// ### 中文
    /// `eglMakeCurrent`；两者都传 `None` 表示解除调用线程的绑定。
    fn make_current(
        &self,
        display: EglDisplay,
        surface: Option<EglSurface>,
        context: Option<EglContext>,
    ) -> bool;

    fn current_context(&self) -> Option<EglContext>;

    fn current_draw_surface(&self) -> Option<EglSurface>;

    fn swap_buffers(&self, display: EglDisplay, surface: EglSurface) -> bool;

    fn surface_size(&self, display: EglDisplay, surface: EglSurface) -> Option<PhysicalSize<u32>>;

    fn destroy_context(&self, display: EglDisplay, context: EglContext) -> bool;

    fn destroy_surface(&self, display: EglDisplay, surface: EglSurface) -> bool;

    /// ### English
    /// `eglGetError` (clears the thread's EGL error state).
    ///
    /// ### 中文
    /// `eglGetError`（会清除线程的 EGL 错误状态）。
    fn error(&self) -> EGLint;

    /// ### English
    /// Loads GL entry points for the context current on the calling thread.
    ///
    /// ### 中文
    /// 为调用线程当前的上下文加载 GL 函数入口。
    fn load_gl(&self) -> Result<Box<dyn QuadGl>, RemoteDisplayError>;
}
