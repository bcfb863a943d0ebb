//! ### English
//! Surface lifecycle controller: starts the remote render engine lazily, tears it down when the
//! remote surface goes away, and turns render errors into banner updates.
//!
//! ### 中文
//! Surface 生命周期控制器：惰性启动远端渲染引擎，在远端 surface 消失时拆除它，
//! 并把渲染错误转换为横幅更新。

mod banner;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::Receiver;
use dpi::PhysicalSize;
use tracing::{debug, warn};

use crate::engine::egl::{EglPlatform, NativeWindow, ParentContext};
use crate::engine::error::{ErrorSender, RemoteDisplayError, RenderErrorEvent};
use crate::engine::listeners::{ErrorPresenter, FrameConsumedListener, SessionListener};
use crate::engine::options::RemoteDisplayOptions;
use crate::engine::runtime::RemoteRenderEngine;

use banner::ErrorBanner;

/// ### English
/// Capacity of the render-error channel; reports beyond it are dropped by the render thread.
///
/// ### 中文
/// 渲染错误通道的容量；超出部分由渲染线程丢弃。
const ERROR_CHANNEL_CAPACITY: usize = 64;

/// ### English
/// Observable state of the remote surface.
///
/// ### 中文
/// 远端 surface 的可观察状态。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    NoSurface,
    SurfaceReady { width: u32, height: u32 },
}

/// ### English
/// Engine slot for the current surface.
///
/// ### 中文
/// 当前 surface 对应的引擎槽位。
enum EngineSlot {
    /// ### English
    /// Not started yet; the first rendered frame starts it.
    ///
    /// ### 中文
    /// 尚未启动；第一帧渲染时启动。
    Idle,
    /// ### English
    /// The producer thread is waiting for the render thread to initialize. The surface lock is
    /// not held meanwhile.
    ///
    /// ### 中文
    /// 生产者线程正在等待渲染线程初始化；期间不持有 surface 锁。
    Starting,
    Running(RemoteRenderEngine),
    /// ### English
    /// Start failed and was reported; nothing renders until the surface is re-offered.
    ///
    /// ### 中文
    /// 启动失败且已上报；在 surface 重新提供之前不会渲染。
    Failed,
}

struct SurfaceSlot {
    /// ### English
    /// Distinguishes surfaces that reuse the same native window handle.
    ///
    /// ### 中文
    /// 用于区分复用同一原生窗口句柄的不同 surface。
    generation: u64,
    window: NativeWindow,
    size: PhysicalSize<u32>,
    engine: EngineSlot,
}

/// ### English
/// Owns at most one engine, bound to the current remote surface.
///
/// Thread roles:
/// - Surface callbacks and `drain_errors` run on the UI thread.
/// - `render_frame_to_texture` runs on the producer thread, with the producer context current.
///
/// ### 中文
/// 最多持有一个引擎，并绑定到当前远端 surface。
///
/// 线程角色：
/// - surface 回调与 `drain_errors` 在 UI 线程执行。
/// - `render_frame_to_texture` 在生产者线程执行，且生产者上下文为 current。
pub struct SurfaceLifecycleController {
    egl: Arc<dyn EglPlatform>,
    options: RemoteDisplayOptions,
    session: Arc<dyn SessionListener>,
    frames: Arc<dyn FrameConsumedListener>,
    error_sender: ErrorSender,
    error_receiver: Receiver<RenderErrorEvent>,
    surface: Mutex<Option<SurfaceSlot>>,
    next_generation: AtomicU64,
    banner: Mutex<ErrorBanner>,
}

impl SurfaceLifecycleController {
    pub fn new(
        egl: Arc<dyn EglPlatform>,
        options: RemoteDisplayOptions,
        session: Arc<dyn SessionListener>,
        frames: Arc<dyn FrameConsumedListener>,
    ) -> Self {
        let (error_sender, error_receiver) = crossbeam_channel::bounded(ERROR_CHANNEL_CAPACITY);
        Self {
            egl,
            options,
            session,
            frames,
            error_sender,
            error_receiver,
            surface: Mutex::new(None),
            next_generation: AtomicU64::new(0),
            banner: Mutex::new(ErrorBanner::default()),
        }
    }

    fn surface(&self) -> MutexGuard<'_, Option<SurfaceSlot>> {
        self.surface.lock().unwrap_or_else(|e| {
            warn!("surface controller mutex poisoned; continuing");
            e.into_inner()
        })
    }

    pub fn state(&self) -> SurfaceState {
        match self.surface().as_ref() {
            Some(slot) => SurfaceState::SurfaceReady {
                width: slot.size.width,
                height: slot.size.height,
            },
            None => SurfaceState::NoSurface,
        }
    }

    /// ### English
    /// NoSurface → SurfaceReady. Notifies the session collaborator with the surface size.
    ///
    /// A surface offered while another is active replaces it (the old engine is stopped).
    ///
    /// ### 中文
    /// NoSurface → SurfaceReady；以 surface 尺寸通知会话协作方。
    ///
    /// 若已有活动 surface 时又提供新 surface，则替换旧的（旧引擎会被停止）。
    pub fn on_surface_available(&self, window: NativeWindow, width: u32, height: u32) {
        debug!(width, height, "remote surface available");
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let previous = self.surface().replace(SurfaceSlot {
            generation,
            window,
            size: PhysicalSize::new(width, height),
            engine: EngineSlot::Idle,
        });
        if let Some(previous) = previous {
            warn!("remote surface replaced without a destroy event");
            stop_engine(previous);
        }

        self.session.on_remote_surface_ready(width, height);
    }

    /// ### English
    /// SurfaceReady → SurfaceReady. Records the new size; the engine keeps running and picks the
    /// size up from the surface itself.
    ///
    /// ### 中文
    /// SurfaceReady → SurfaceReady；记录新尺寸。引擎继续运行，并从 surface 本身读取尺寸。
    pub fn on_surface_resized(&self, width: u32, height: u32) {
        match self.surface().as_mut() {
            Some(slot) => {
                debug!(width, height, "remote surface resized");
                slot.size = PhysicalSize::new(width, height);
            }
            None => debug!(width, height, "resize without a remote surface; ignoring"),
        }
    }

    /// ### English
    /// SurfaceReady → NoSurface. Signals session end first, then stops the engine.
    ///
    /// ### 中文
    /// SurfaceReady → NoSurface；先通知会话结束，再停止引擎。
    pub fn on_surface_destroyed(&self) {
        if self.surface().is_none() {
            debug!("remote surface destroyed twice; ignoring");
            return;
        }

        self.session.on_remote_surface_gone();

        if let Some(slot) = self.surface().take() {
            stop_engine(slot);
        }
        debug!("remote surface destroyed");
    }

    /// ### English
    /// Hands `texture_id` to the remote engine, starting it on first use.
    ///
    /// Must be called on the producer thread with the producer's EGL context current: that
    /// context becomes the engine's share context.
    ///
    /// ### 中文
    /// 把 `texture_id` 交给远端引擎；首次调用时启动引擎。
    ///
    /// 必须在生产者线程调用，且生产者的 EGL 上下文为 current：该上下文会成为引擎的共享上下文。
    pub fn render_frame_to_texture(&self, texture_id: u32) -> Result<(), RemoteDisplayError> {
        let (generation, window, parent) = {
            let mut surface = self.surface();
            let Some(slot) = surface.as_mut() else {
                warn!("can't render remotely, no active surface to render to");
                return Err(RemoteDisplayError::NoSurface);
            };

            match &slot.engine {
                EngineSlot::Running(engine) => {
                    engine.announce_texture(texture_id);
                    return Ok(());
                }
                EngineSlot::Starting | EngineSlot::Failed => {
                    debug!(texture_id, "remote engine unavailable; frame dropped");
                    return Ok(());
                }
                EngineSlot::Idle => {}
            }

            let Some(parent) = self.egl.current_context() else {
                warn!("can't start the remote engine, no EGL context is current on this thread");
                return Err(RemoteDisplayError::NoParentContext);
            };
            slot.engine = EngineSlot::Starting;
            (slot.generation, slot.window, parent)
        };

        let started = RemoteRenderEngine::start(
            self.egl.clone(),
            ParentContext::borrowed(parent),
            window,
            &self.options,
            self.frames.clone(),
            self.error_sender.clone(),
        );

        match self.surface().as_mut() {
            Some(slot) if slot.generation == generation => match started {
                Ok(engine) => {
                    engine.announce_texture(texture_id);
                    slot.engine = EngineSlot::Running(engine);
                    Ok(())
                }
                Err(err) => {
                    warn!(%err, "remote render engine failed to start");
                    slot.engine = EngineSlot::Failed;
                    Err(err)
                }
            },
            _ => {
                let engine = started?;
                debug!("remote surface went away while the engine was starting; stopping it");
                engine.stop();
                Err(RemoteDisplayError::NoSurface)
            }
        }
    }

    /// ### English
    /// Drains pending render errors into `presenter`. Returns how many were shown.
    ///
    /// ### 中文
    /// 将待处理的渲染错误排空到 `presenter`；返回展示的数量。
    pub fn drain_errors(&self, presenter: &dyn ErrorPresenter) -> usize {
        let mut banner = self.banner.lock().unwrap_or_else(|e| e.into_inner());
        let mut shown = 0;
        while let Ok(event) = self.error_receiver.try_recv() {
            banner.show(&event, presenter);
            shown += 1;
        }
        shown
    }

    #[cfg(test)]
    fn engine_stop_requested(&self) -> Option<bool> {
        match self.surface().as_ref().map(|slot| &slot.engine) {
            Some(EngineSlot::Running(engine)) => Some(engine.is_stop_requested()),
            _ => None,
        }
    }

    pub fn has_errored(&self) -> bool {
        self.banner
            .lock()
            .map(|banner| banner.is_errored())
            .unwrap_or_else(|e| e.into_inner().is_errored())
    }
}

impl Drop for SurfaceLifecycleController {
    fn drop(&mut self) {
        if let Some(slot) = self.surface().take() {
            stop_engine(slot);
        }
    }
}

fn stop_engine(slot: SurfaceSlot) {
    if let EngineSlot::Running(engine) = slot.engine {
        engine.stop();
    }
}
