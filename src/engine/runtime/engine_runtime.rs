//! ### English
//! Handle that spawns and owns the dedicated remote render thread.
//!
//! ### 中文
//! 创建并持有独立远端渲染线程的句柄。

use std::sync::Arc;
use std::thread;

use tracing::{debug, warn};

use crate::engine::egl::{EglPlatform, NativeWindow, ParentContext};
use crate::engine::error::{ErrorSender, RemoteDisplayError, RenderErrorEvent};
use crate::engine::listeners::FrameConsumedListener;
use crate::engine::lockfree::{OneShot, RecvError};
use crate::engine::options::RemoteDisplayOptions;

use super::mailbox::FrameMailbox;
use super::render_thread::{self, RenderThreadInit};

/// ### English
/// Remote render engine: one thread, one shared context, one remote surface.
///
/// Dropping the engine requests a stop but never joins the thread.
///
/// ### 中文
/// 远端渲染引擎：一个线程、一个共享上下文、一个远端 surface。
///
/// drop 时只请求停止，从不 join 线程。
pub struct RemoteRenderEngine {
    /// ### English
    /// Latest-wins slot shared with the render thread.
    ///
    /// ### 中文
    /// 与渲染线程共享的 latest-wins 槽位。
    mailbox: Arc<FrameMailbox>,
    /// ### English
    /// Join handle for the render thread. Only tests join it.
    ///
    /// ### 中文
    /// 渲染线程的 join handle；仅测试会 join。
    #[cfg(test)]
    thread: Option<thread::JoinHandle<()>>,
}

impl RemoteRenderEngine {
    /// ### English
    /// Spawns the render thread and waits until it finishes initialization (or times out).
    ///
    /// The shared context is created on the render thread with `parent` as its share context;
    /// `parent` itself is never made current or destroyed there.
    ///
    /// #### Parameters
    /// - `egl`: EGL entry points.
    /// - `parent`: Producer context whose objects (textures) the engine will sample.
    /// - `window`: Native window backing the remote surface.
    /// - `options`: Version ladder, clear color, timeouts, thread name.
    /// - `frames`: Receives `on_frame_consumed` after each presented frame.
    /// - `errors`: Non-fatal error channel drained by the controller.
    ///
    /// ### 中文
    /// 创建渲染线程并等待其完成初始化（或超时）。
    ///
    /// 共享上下文在渲染线程上以 `parent` 作为共享上下文创建；`parent` 本身不会在该线程
    /// 被设为 current，也不会被销毁。
    ///
    /// #### 参数
    /// - `egl`：EGL 入口。
    /// - `parent`：生产者上下文；引擎会采样其对象（纹理）。
    /// - `window`：远端 surface 背后的原生窗口。
    /// - `options`：版本阶梯、清屏色、超时、线程名。
    /// - `frames`：每呈现一帧后接收 `on_frame_consumed`。
    /// - `errors`：由控制器排空的非致命错误通道。
    pub fn start(
        egl: Arc<dyn EglPlatform>,
        parent: ParentContext,
        window: NativeWindow,
        options: &RemoteDisplayOptions,
        frames: Arc<dyn FrameConsumedListener>,
        errors: ErrorSender,
    ) -> Result<Self, RemoteDisplayError> {
        let mailbox = Arc::new(FrameMailbox::new());
        let init = Arc::new(OneShot::new(thread::current()));
        let start_errors = errors.clone();

        let thread_init = RenderThreadInit {
            egl,
            parent,
            window,
            options: options.clone(),
            mailbox: mailbox.clone(),
            frames,
            errors,
            init: init.clone(),
        };

        let spawned = thread::Builder::new()
            .name(options.thread_name.clone())
            .spawn(move || render_thread::run_render_thread(thread_init));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(err) => {
                let err = RemoteDisplayError::from(err);
                report_start_failure(&start_errors, options, &err);
                return Err(err);
            }
        };

        match init.recv_timeout(options.init_timeout) {
            Ok(Ok(())) => {
                debug!(thread = %options.thread_name, "remote render engine started");
                Ok(Self {
                    mailbox,
                    #[cfg(test)]
                    thread: Some(thread),
                })
            }
            /*
            ### English
            The render thread already reported this failure on the error channel.

            ### 中文
            渲染线程已在错误通道上报过该失败。
            */
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(RecvError::Closed) => {
                let _ = thread.join();
                let err = RemoteDisplayError::InitAbandoned;
                report_start_failure(&start_errors, options, &err);
                Err(err)
            }
            Err(RecvError::Timeout) => {
                warn!(
                    timeout = ?options.init_timeout,
                    "remote render thread did not initialize in time; detaching"
                );
                mailbox.request_shutdown();
                let err = RemoteDisplayError::InitTimeout;
                report_start_failure(&start_errors, options, &err);
                Err(err)
            }
        }
    }

    /// ### English
    /// Publishes `texture_id` as the newest frame. Never blocks beyond a short critical section.
    ///
    /// ### 中文
    /// 将 `texture_id` 发布为最新帧；除短暂临界区外不会阻塞。
    pub fn announce_texture(&self, texture_id: u32) {
        self.mailbox.announce(texture_id);
    }

    /// ### English
    /// Requests the render thread to exit after its current iteration. Idempotent and
    /// non-blocking.
    ///
    /// ### 中文
    /// 请求渲染线程在当前迭代结束后退出；幂等且非阻塞。
    pub fn stop(&self) {
        if self.mailbox.request_shutdown() {
            debug!("remote render engine stop requested");
        }
    }

    #[cfg(test)]
    pub(crate) fn is_stop_requested(&self) -> bool {
        self.mailbox.is_shutdown_requested()
    }

    #[cfg(test)]
    pub(crate) fn join(mut self) {
        self.stop();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for RemoteRenderEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// ### English
/// Pushes a start failure the render thread could not report itself.
///
/// ### 中文
/// 上报渲染线程自身无法上报的启动失败。
fn report_start_failure(
    errors: &ErrorSender,
    options: &RemoteDisplayOptions,
    err: &RemoteDisplayError,
) {
    let event = RenderErrorEvent::start_failure(options.error_source.as_str(), err);
    if errors.try_send(event).is_err() {
        debug!("error channel full or closed; dropping start failure");
    }
}
