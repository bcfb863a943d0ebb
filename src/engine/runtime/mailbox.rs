//! ### English
//! Single-slot, latest-wins hand-off between the producer and the remote render thread.
//!
//! ### 中文
//! 生产者与远端渲染线程之间的单槽、最新覆盖（latest-wins）交接。

use std::sync::{Condvar, Mutex, MutexGuard};

use tracing::warn;

/// ### English
/// Pending texture plus the two wake flags. Guarded by `FrameMailbox::state`.
///
/// ### 中文
/// 待处理纹理以及两个唤醒标记；由 `FrameMailbox::state` 保护。
#[derive(Debug, Default)]
struct MailboxState {
    /// ### English
    /// Most recently announced texture (`None` until the first announcement).
    ///
    /// ### 中文
    /// 最近一次宣告的纹理（首次宣告前为 `None`）。
    texture_id: Option<u32>,
    /// ### English
    /// The texture must be (re)bound before the next draw.
    ///
    /// ### 中文
    /// 下一次绘制前必须（重新）绑定纹理。
    dirty: bool,
    /// ### English
    /// A frame was announced since the render thread last started an iteration.
    ///
    /// ### 中文
    /// 自渲染线程上次开始迭代以来有新帧被宣告。
    frame_available: bool,
    /// ### English
    /// Sticky stop request.
    ///
    /// ### 中文
    /// 粘滞的停止请求。
    shutdown_requested: bool,
}

/// ### English
/// What the render thread picked up at the start of an iteration.
///
/// ### 中文
/// 渲染线程在一次迭代开始时取得的内容。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FrameTicket {
    /// ### English
    /// Stop was requested; the loop must exit instead of drawing.
    ///
    /// ### 中文
    /// 已请求停止；循环应退出而不是绘制。
    pub(crate) shutdown: bool,
    /// ### English
    /// Texture to bind before drawing (set when the slot was dirty).
    ///
    /// ### 中文
    /// 绘制前需要绑定的纹理（槽位为 dirty 时才有值）。
    pub(crate) rebind: Option<u32>,
}

/// ### English
/// Mutex + condition variable pair shared by the producer and the render thread.
///
/// No frames are queued: a new announcement overwrites an unconsumed one, and the producer is
/// never blocked beyond the short critical section.
///
/// ### 中文
/// 生产者与渲染线程共享的互斥锁 + 条件变量。
///
/// 不排队任何帧：新的宣告会覆盖尚未消费的旧宣告；生产者只会在短暂的临界区内阻塞。
#[derive(Debug, Default)]
pub(crate) struct FrameMailbox {
    state: Mutex<MailboxState>,
    wake: Condvar,
}

impl FrameMailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MailboxState> {
        self.state.lock().unwrap_or_else(|e| {
            warn!("frame mailbox mutex poisoned; continuing");
            e.into_inner()
        })
    }

    /// ### English
    /// Publishes `texture_id` as the newest frame and wakes the render thread.
    ///
    /// Always marks the slot dirty, even for the id that is already pending: a repeated id
    /// means "new content in the same texture" and must be redrawn.
    ///
    /// ### 中文
    /// 将 `texture_id` 发布为最新帧并唤醒渲染线程。
    ///
    /// 即使与当前待处理的 id 相同也总是标记为 dirty：重复的 id 表示“同一纹理中的新内容”，
    /// 必须重绘。
    pub(crate) fn announce(&self, texture_id: u32) {
        let mut state = self.lock();
        state.texture_id = Some(texture_id);
        state.dirty = true;
        state.frame_available = true;
        self.wake.notify_one();
    }

    /// ### English
    /// Requests the render thread to exit. Returns `false` if a stop was already requested.
    ///
    /// ### 中文
    /// 请求渲染线程退出；若此前已请求过则返回 `false`。
    pub(crate) fn request_shutdown(&self) -> bool {
        let mut state = self.lock();
        let first = !state.shutdown_requested;
        state.shutdown_requested = true;
        self.wake.notify_one();
        first
    }

    #[cfg(test)]
    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.lock().shutdown_requested
    }

    /// ### English
    /// Starts an iteration: clears the new-frame flag and takes the dirty texture, if any.
    ///
    /// ### 中文
    /// 开始一次迭代：清除新帧标记，并取走 dirty 纹理（若有）。
    pub(crate) fn begin_frame(&self) -> FrameTicket {
        let mut state = self.lock();
        if state.shutdown_requested {
            return FrameTicket {
                shutdown: true,
                rebind: None,
            };
        }

        state.frame_available = false;
        let rebind = if state.dirty {
            state.dirty = false;
            state.texture_id
        } else {
            None
        };

        FrameTicket {
            shutdown: false,
            rebind,
        }
    }

    /// ### English
    /// Blocks until a frame is announced or a stop is requested.
    ///
    /// The flags are checked under the same lock the condition variable releases, so an
    /// announcement racing with this call is never lost. Returns immediately if work arrived
    /// while the previous iteration was running.
    ///
    /// ### 中文
    /// 阻塞直到有新帧宣告或收到停止请求。
    ///
    /// 标记检查与条件变量释放的是同一把锁，因此与本调用竞争的宣告不会丢失。
    /// 若上一轮迭代期间已有新工作到达，则立即返回。
    pub(crate) fn wait_for_work(&self) {
        let mut state = self.lock();
        while !state.frame_available && !state.dirty && !state.shutdown_requested {
            state = self.wake.wait(state).unwrap_or_else(|e| {
                warn!("frame mailbox condvar wait poisoned; continuing");
                e.into_inner()
            });
        }
    }
}
