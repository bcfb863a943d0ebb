//! ### English
//! EGL context + window surface owned by the remote render thread.
//! The context shares its object namespace with the producer's context, so texture IDs created
//! by the local renderer can be sampled here.
//!
//! ### 中文
//! 由远端渲染线程持有的 EGL 上下文与窗口 surface。
//! 该上下文与生产者上下文共享对象命名空间，因此本地渲染器创建的纹理 ID 可在此采样。

use std::sync::Arc;

use dpi::PhysicalSize;
use tracing::{debug, warn};

use crate::engine::egl::{
    self, EGL_BAD_CONTEXT, EGL_CONTEXT_CLIENT_VERSION, EGL_NONE, EGLint, EglContext, EglDisplay,
    EglPlatform, EglSurface, GraphicsConfig, NativeWindow, ParentContext,
};
use crate::engine::error::RemoteDisplayError;

/// ### English
/// Display, config, context and surface of one remote render engine.
///
/// Must be created, used and destroyed on the render thread. Destruction happens exactly once
/// (explicit `destroy` or `Drop`, whichever comes first).
///
/// ### 中文
/// 单个远端渲染引擎的 display、config、上下文与 surface。
///
/// 必须在渲染线程创建、使用与销毁；销毁只发生一次（显式 `destroy` 或 `Drop`，以先到者为准）。
pub(crate) struct RemoteSharedContext {
    /// ### English
    /// EGL entry points.
    ///
    /// ### 中文
    /// EGL 函数入口。
    egl: Arc<dyn EglPlatform>,
    /// ### English
    /// Initialized default display.
    ///
    /// ### 中文
    /// 已初始化的默认 display。
    display: EglDisplay,
    /// ### English
    /// Framebuffer config shared by the context and the surface.
    ///
    /// ### 中文
    /// 上下文与 surface 共用的帧缓冲 config。
    config: GraphicsConfig,
    /// ### English
    /// Owned context; `None` once destroyed.
    ///
    /// ### 中文
    /// 自有上下文；销毁后为 `None`。
    context: Option<EglContext>,
    /// ### English
    /// Owned window surface; `None` once destroyed (or before creation).
    ///
    /// ### 中文
    /// 自有窗口 surface；销毁后（或创建前）为 `None`。
    surface: Option<EglSurface>,
}

impl RemoteSharedContext {
    /// ### English
    /// Selects a config, creates a context sharing with `parent` and a window surface on
    /// `window`, then makes them current on the calling thread.
    ///
    /// `client_versions` is tried in order (e.g. `[3, 2]`): the first version the driver accepts
    /// wins. Anything created before a failure is destroyed before returning.
    ///
    /// ### 中文
    /// 选择 config，创建与 `parent` 共享的上下文以及基于 `window` 的窗口 surface，
    /// 并在调用线程上设为 current。
    ///
    /// `client_versions` 按顺序探测（例如 `[3, 2]`），驱动接受的第一个版本胜出。
    /// 失败前已创建的资源会在返回前销毁。
    pub(crate) fn create(
        egl: Arc<dyn EglPlatform>,
        parent: ParentContext,
        window: NativeWindow,
        client_versions: &[EGLint],
    ) -> Result<Self, RemoteDisplayError> {
        let display = egl.default_display()?;
        let config = egl::choose_config(egl.as_ref(), display)?;
        debug!(?config, "selected EGL config for the remote surface");

        let context = create_context(egl.as_ref(), display, config, parent, client_versions)?;

        let mut shared = Self {
            egl,
            display,
            config,
            context: Some(context),
            surface: None,
        };

        let surface = shared
            .egl
            .create_window_surface(display, config.handle, window)
            .ok_or_else(|| RemoteDisplayError::SurfaceCreation(shared.egl.error()))?;
        shared.surface = Some(surface);

        if !shared.egl.make_current(display, Some(surface), Some(context)) {
            return Err(RemoteDisplayError::MakeCurrent(shared.egl.error()));
        }

        Ok(shared)
    }

    pub(crate) fn egl(&self) -> &dyn EglPlatform {
        self.egl.as_ref()
    }

    pub(crate) fn config(&self) -> GraphicsConfig {
        self.config
    }

    /// ### English
    /// Re-binds the context/surface pair if something else became current on this thread.
    ///
    /// Returns the EGL error code if a re-bind was needed and failed. The code is read exactly
    /// once, so it is still available to the caller.
    ///
    /// ### 中文
    /// 如果本线程的 current 被其他代码替换，则重新绑定上下文/surface。
    ///
    /// 若需要重新绑定且失败，返回 EGL 错误码。错误码只读取一次，因此调用方仍能拿到它。
    pub(crate) fn ensure_current(&self) -> Result<(), EGLint> {
        let (Some(context), Some(surface)) = (self.context, self.surface) else {
            return Err(EGL_BAD_CONTEXT);
        };

        if self.egl.current_context() == Some(context)
            && self.egl.current_draw_surface() == Some(surface)
        {
            return Ok(());
        }

        debug!(
            context = context.as_raw(),
            previous = ?self.egl.current_context(),
            "making the remote context current"
        );
        if !self.egl.make_current(self.display, Some(surface), Some(context)) {
            let error = self.egl.error();
            warn!(error, "eglMakeCurrent failed");
            return Err(error);
        }
        Ok(())
    }

    pub(crate) fn swap_buffers(&self) -> bool {
        match self.surface {
            Some(surface) => self.egl.swap_buffers(self.display, surface),
            None => false,
        }
    }

    pub(crate) fn surface_size(&self) -> Option<PhysicalSize<u32>> {
        self.egl.surface_size(self.display, self.surface?)
    }

    /// ### English
    /// Releases the thread binding and destroys the context and surface (idempotent).
    ///
    /// ### 中文
    /// 解除线程绑定，并销毁上下文与 surface（幂等）。
    pub(crate) fn destroy(&mut self) {
        if self.context.is_none() && self.surface.is_none() {
            return;
        }

        self.egl.make_current(self.display, None, None);
        if let Some(context) = self.context.take() {
            if !self.egl.destroy_context(self.display, context) {
                let error = self.egl.error();
                warn!(error, "eglDestroyContext failed");
            }
        }
        if let Some(surface) = self.surface.take() {
            if !self.egl.destroy_surface(self.display, surface) {
                let error = self.egl.error();
                warn!(error, "eglDestroySurface failed");
            }
        }
        debug!("remote EGL context and surface destroyed");
    }
}

impl Drop for RemoteSharedContext {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn create_context(
    egl: &dyn EglPlatform,
    display: EglDisplay,
    config: GraphicsConfig,
    parent: ParentContext,
    client_versions: &[EGLint],
) -> Result<EglContext, RemoteDisplayError> {
    debug!(parent = parent.context().as_raw(), "creating shared remote context");

    let mut last_error = EGL_BAD_CONTEXT;
    for &version in client_versions {
        let attribs = [EGL_CONTEXT_CLIENT_VERSION, version, EGL_NONE];
        if let Some(context) = egl.create_context(display, config.handle, parent, &attribs) {
            debug!(version, context = context.as_raw(), "created shared context");
            return Ok(context);
        }
        last_error = egl.error();
        debug!(
            version,
            error = last_error,
            "context creation failed; parent context might use an older version"
        );
    }

    warn!(error = last_error, "could not create a shared remote context");
    Err(RemoteDisplayError::ContextCreation(last_error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{EGL_BAD_MATCH, EGL_BAD_SURFACE, FakeEgl, with_verbose_logging};

    fn parent(egl: &FakeEgl) -> ParentContext {
        ParentContext::borrowed(egl.producer_context())
    }

    #[test]
    fn falls_back_to_lower_client_version() {
        let egl = Arc::new(FakeEgl::new());
        egl.reject_client_version(3);

        let shared =
            RemoteSharedContext::create(egl.clone(), parent(&egl), egl.window(), &[3, 2]).unwrap();
        assert_eq!(egl.created_client_versions(), vec![2]);
        assert_eq!(shared.ensure_current(), Ok(()));
    }

    #[test]
    fn surface_failure_destroys_the_context_once() {
        let egl = Arc::new(FakeEgl::new());
        egl.fail_surface_creation();

        let result = RemoteSharedContext::create(egl.clone(), parent(&egl), egl.window(), &[3, 2]);
        assert!(matches!(result, Err(RemoteDisplayError::SurfaceCreation(_))));
        assert_eq!(egl.contexts_destroyed(), 1);
        assert_eq!(egl.surfaces_destroyed(), 0);
    }

    #[test]
    fn destroy_is_idempotent_and_never_touches_the_parent() {
        let egl = Arc::new(FakeEgl::new());
        let mut shared =
            RemoteSharedContext::create(egl.clone(), parent(&egl), egl.window(), &[3]).unwrap();

        shared.destroy();
        shared.destroy();
        drop(shared);

        assert_eq!(egl.contexts_destroyed(), 1);
        assert_eq!(egl.surfaces_destroyed(), 1);
        assert!(!egl.was_destroyed(egl.producer_context()));
    }

    #[test]
    fn stolen_binding_is_restored() {
        let egl = Arc::new(FakeEgl::new());
        let shared =
            RemoteSharedContext::create(egl.clone(), parent(&egl), egl.window(), &[3]).unwrap();

        egl.steal_current();
        let before = egl.make_current_calls();
        assert_eq!(shared.ensure_current(), Ok(()));
        assert_eq!(egl.make_current_calls(), before + 1);

        assert_eq!(shared.ensure_current(), Ok(()));
        assert_eq!(egl.make_current_calls(), before + 1);
    }

    #[test]
    fn context_creation_keeps_the_driver_error_when_logging_is_verbose() {
        let egl = Arc::new(FakeEgl::new());
        egl.reject_client_version(3);
        egl.reject_client_version(2);

        let result = with_verbose_logging(|| {
            RemoteSharedContext::create(egl.clone(), parent(&egl), egl.window(), &[3, 2])
        });
        assert!(matches!(
            result,
            Err(RemoteDisplayError::ContextCreation(EGL_BAD_MATCH))
        ));
    }

    #[test]
    fn failed_rebind_returns_the_driver_error_when_logging_is_verbose() {
        let egl = Arc::new(FakeEgl::new());
        let shared =
            RemoteSharedContext::create(egl.clone(), parent(&egl), egl.window(), &[3]).unwrap();

        egl.lose_surfaces();
        let result = with_verbose_logging(|| shared.ensure_current());
        assert_eq!(result, Err(EGL_BAD_SURFACE));
    }
}
