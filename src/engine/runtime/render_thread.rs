//! ### English
//! Remote render thread: owns the shared EGL context and redraws the latest announced texture
//! onto the remote surface.
//!
//! ### 中文
//! 远端渲染线程：持有共享 EGL 上下文，并把最新宣告的纹理重绘到远端 surface。

use std::sync::Arc;

use dpi::PhysicalSize;
use tracing::{debug, warn};

use crate::engine::egl::{EGL_SUCCESS, EglPlatform, NativeWindow, ParentContext};
use crate::engine::error::{ErrorSender, RemoteDisplayError, RenderErrorEvent};
use crate::engine::listeners::FrameConsumedListener;
use crate::engine::lockfree::OneShot;
use crate::engine::options::RemoteDisplayOptions;
use crate::engine::rendering::{GL_NO_ERROR, GLint, QuadGl, QuadProgram, RemoteSharedContext};

use super::mailbox::FrameMailbox;

/// ### English
/// Upper bound on GL errors drained per check (a lost context can report errors forever).
///
/// ### 中文
/// 每次检查最多排空的 GL 错误数（上下文丢失时可能无限报告错误）。
const MAX_GL_ERRORS_PER_CHECK: usize = 8;

/// ### English
/// Everything the render thread needs, moved onto it at spawn time.
///
/// ### 中文
/// 渲染线程所需的全部内容，在 spawn 时移入线程。
pub(super) struct RenderThreadInit {
    pub(super) egl: Arc<dyn EglPlatform>,
    pub(super) parent: ParentContext,
    pub(super) window: NativeWindow,
    pub(super) options: RemoteDisplayOptions,
    pub(super) mailbox: Arc<FrameMailbox>,
    pub(super) frames: Arc<dyn FrameConsumedListener>,
    pub(super) errors: ErrorSender,
    pub(super) init: Arc<OneShot<Result<(), RemoteDisplayError>>>,
}

/// ### English
/// Closes the init slot if the thread leaves without reporting (including by panic).
///
/// ### 中文
/// 若线程未上报结果就退出（包括 panic），则关闭初始化槽位。
struct CloseInitOnExit(Arc<OneShot<Result<(), RemoteDisplayError>>>);

impl Drop for CloseInitOnExit {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// ### English
/// Non-fatal error sink: logs and forwards `(source, code, operation)` to the controller.
///
/// ### 中文
/// 非致命错误出口：记录日志并把 `(source, code, operation)` 转发给控制器。
struct ErrorReporter {
    source: String,
    errors: ErrorSender,
}

impl ErrorReporter {
    fn report(&self, code: i32, operation: &str) {
        warn!(
            source = %self.source,
            "error 0x{code:x} while doing: {operation}"
        );
        if self
            .errors
            .try_send(RenderErrorEvent::new(self.source.as_str(), code, operation))
            .is_err()
        {
            debug!("error channel full or closed; dropping report");
        }
    }

    fn report_fatal(&self, err: &RemoteDisplayError) {
        let event = RenderErrorEvent::start_failure(self.source.as_str(), err);
        self.report(event.code, &event.message);
    }

    /// ### English
    /// Drains pending GL errors, then the EGL error. Returns the last code seen, if any.
    ///
    /// ### 中文
    /// 先排空待处理的 GL 错误，再检查 EGL 错误；返回最后一个错误码（若有）。
    fn check(&self, gl: &dyn QuadGl, egl: &dyn EglPlatform, operation: &str) -> Option<i32> {
        let mut last = None;
        for _ in 0..MAX_GL_ERRORS_PER_CHECK {
            let error = gl.get_error();
            if error == GL_NO_ERROR {
                break;
            }
            self.report(error as i32, operation);
            last = Some(error as i32);
        }

        let error = egl.error();
        if error != EGL_SUCCESS {
            self.report(error, operation);
            last = Some(error);
        }
        last
    }
}

/// ### English
/// Render thread entry function.
/// Returns after a stop request, or immediately if initialization fails.
///
/// ### 中文
/// 渲染线程入口函数。
/// 收到停止请求后返回；若初始化失败则立即返回。
pub(super) fn run_render_thread(init: RenderThreadInit) {
    let RenderThreadInit {
        egl,
        parent,
        window,
        options,
        mailbox,
        frames,
        errors,
        init,
    } = init;
    let _close_init = CloseInitOnExit(init.clone());

    let reporter = ErrorReporter {
        source: options.error_source.clone(),
        errors,
    };

    /// ### English
    /// 1) Lazy initialization: config, shared context, surface, GL, program.
    ///
    /// ### 中文
    /// 1) 惰性初始化：config、共享上下文、surface、GL、program。
    let mut shared =
        match RemoteSharedContext::create(egl, parent, window, &options.client_versions) {
            Ok(shared) => shared,
            Err(err) => {
                reporter.report_fatal(&err);
                init.send(Err(err));
                return;
            }
        };

    let gl = match shared.egl().load_gl() {
        Ok(gl) => gl,
        Err(err) => {
            reporter.report_fatal(&err);
            init.send(Err(err));
            return;
        }
    };
    let gl = gl.as_ref();

    let quad = match QuadProgram::new(gl, |op: &str| {
        reporter.check(gl, shared.egl(), op);
    }) {
        Ok(quad) => quad,
        Err(err) => {
            reporter.report_fatal(&err);
            init.send(Err(err));
            return;
        }
    };

    if let Some(code) = reporter.check(gl, shared.egl(), "initialize") {
        quad.delete(gl);
        let err = RemoteDisplayError::PendingError(code);
        reporter.report_fatal(&err);
        init.send(Err(err));
        return;
    }

    debug!(config = ?shared.config(), "remote render thread initialized");
    init.send(Ok(()));

    let check = |op: &str| {
        reporter.check(gl, shared.egl(), op);
    };

    let mut bound_texture: Option<u32> = None;
    let mut viewport: Option<PhysicalSize<u32>> = None;

    loop {
        /// ### English
        /// 2) Start the iteration: clear the new-frame flag, pick up a dirty texture.
        ///
        /// ### 中文
        /// 2) 开始迭代：清除新帧标记，取得 dirty 纹理。
        let ticket = mailbox.begin_frame();
        if ticket.shutdown {
            break;
        }

        /// ### English
        /// 3) Other code on this thread may have replaced the current binding.
        ///
        /// ### 中文
        /// 3) 本线程上的其他代码可能替换了 current 绑定。
        if let Err(code) = shared.ensure_current() {
            reporter.report(code, "make current");
        }

        if let Some(texture) = ticket.rebind {
            quad.bind_texture(gl, texture, check);
            bound_texture = Some(texture);
        }

        /// ### English
        /// 4) Draw, present and hand the texture back to the producer.
        ///
        /// ### 中文
        /// 4) 绘制、呈现，并把纹理交还给生产者。
        if let Some(texture) = bound_texture {
            let size = shared.surface_size();
            if size.is_some() && size != viewport {
                if let Some(size) = size {
                    gl.viewport(size.width as GLint, size.height as GLint);
                    check("viewport");
                }
                viewport = size;
            }

            quad.draw(gl, options.clear_color, check);

            if !shared.swap_buffers() {
                warn!("unable to swap buffers");
            }
            check("swap buffers");

            frames.on_frame_consumed(texture);
        }

        /// ### English
        /// 5) Sleep only if nothing arrived while this iteration ran.
        ///
        /// ### 中文
        /// 5) 仅当本轮迭代期间没有新工作到达时才休眠。
        mailbox.wait_for_work();
    }

    debug!("remote render thread stopping");
    quad.delete(gl);
    shared.destroy();
}
