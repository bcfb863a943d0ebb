use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const EMPTY: u8 = 0;
const WRITING: u8 = 1;
const READY: u8 = 2;
const TAKEN: u8 = 3;
const CLOSED: u8 = 4;

/// ### English
/// Why `OneShot::recv_timeout` returned without a value.
///
/// ### 中文
/// `OneShot::recv_timeout` 未取得值而返回的原因。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecvError {
    /// ### English
    /// The deadline passed with nothing sent.
    ///
    /// ### 中文
    /// 超过截止时间仍未发送。
    Timeout,
    /// ### English
    /// The sender gave up (e.g. the render thread exited early) or the value was already taken.
    ///
    /// ### 中文
    /// 发送方放弃（例如渲染线程提前退出），或值已被取走。
    Closed,
}

/// ### English
/// One-shot, single-producer single-consumer (SPSC) value handoff.
///
/// Used to hand the render thread's initialization result back to the thread that started it.
///
/// - No locks.
/// - Receiver thread is stored so the sender can `unpark()` it.
/// - The sender can `close()` without a value so the receiver stops waiting early.
///
/// ### 中文
/// 一次性（oneshot）的单生产者/单消费者值传递。
///
/// 用于把渲染线程的初始化结果交还给启动它的线程。
///
/// - 无锁。
/// - 保存接收方线程句柄，发送方在完成后可 `unpark()` 唤醒。
/// - 发送方可以不带值地 `close()`，让接收方提前结束等待。
pub(crate) struct OneShot<T> {
    /// ### English
    /// State machine: `EMPTY` → `WRITING` → `READY` → `TAKEN`, or `EMPTY` → `CLOSED`.
    ///
    /// ### 中文
    /// 状态机：`EMPTY` → `WRITING` → `READY` → `TAKEN`，或 `EMPTY` → `CLOSED`。
    state: AtomicU8,
    /// ### English
    /// Storage for the payload written by the sender and read by the receiver.
    ///
    /// ### 中文
    /// 载荷存储区：由发送方写入、由接收方读取。
    value: UnsafeCell<MaybeUninit<T>>,
    /// ### English
    /// Receiver thread handle used to `unpark()` on send/close.
    ///
    /// ### 中文
    /// 接收方线程句柄：发送或关闭后用于 `unpark()` 唤醒。
    waiter: thread::Thread,
}

unsafe impl<T: Send> Send for OneShot<T> {}
unsafe impl<T: Send> Sync for OneShot<T> {}

impl<T> OneShot<T> {
    #[inline]
    pub(crate) fn new(waiter: thread::Thread) -> Self {
        Self {
            state: AtomicU8::new(EMPTY),
            value: UnsafeCell::new(MaybeUninit::uninit()),
            waiter,
        }
    }

    /// ### English
    /// Sends the value. Returns `false` if it was already sent or closed.
    ///
    /// ### 中文
    /// 发送值；若已发送或已关闭则返回 `false`。
    #[inline]
    pub(crate) fn send(&self, value: T) -> bool {
        if self
            .state
            .compare_exchange(EMPTY, WRITING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        unsafe {
            (*self.value.get()).write(value);
        }
        self.state.store(READY, Ordering::Release);
        self.waiter.unpark();
        true
    }

    /// ### English
    /// Marks the slot as abandoned if nothing was sent. Returns `false` otherwise.
    ///
    /// ### 中文
    /// 若尚未发送，则将槽位标记为放弃；否则返回 `false`。
    #[inline]
    pub(crate) fn close(&self) -> bool {
        let closed = self
            .state
            .compare_exchange(EMPTY, CLOSED, Ordering::AcqRel, Ordering::Relaxed)
            .is_ok();
        if closed {
            self.waiter.unpark();
        }
        closed
    }

    #[inline]
    fn try_recv(&self) -> Result<Option<T>, RecvError> {
        match self
            .state
            .compare_exchange(READY, TAKEN, Ordering::Acquire, Ordering::Relaxed)
        {
            Ok(_) => Ok(Some(unsafe { (*self.value.get()).assume_init_read() })),
            Err(CLOSED | TAKEN) => Err(RecvError::Closed),
            Err(_) => Ok(None),
        }
    }

    /// ### English
    /// Receives the value with a timeout. Must be called from the `waiter` thread.
    ///
    /// ### 中文
    /// 在超时时间内等待接收值；必须在 `waiter` 线程调用。
    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(value) = self.try_recv()? {
                return Ok(value);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(RecvError::Timeout);
            }
            thread::park_timeout(deadline - now);
        }
    }
}

impl<T> Drop for OneShot<T> {
    fn drop(&mut self) {
        if self.state.load(Ordering::Acquire) == READY {
            unsafe {
                drop((*self.value.get()).assume_init_read());
            }
        }
    }
}
