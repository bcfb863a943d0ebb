//! ### English
//! Collaborator interfaces the core calls out to.
//!
//! ### 中文
//! 核心逻辑向外调用的协作方接口。

/// ### English
/// Producer-side notification that a texture was drawn and presented on the remote surface,
/// so the producer may recycle it.
///
/// Called on the render thread, once per presented frame.
///
/// ### 中文
/// 生产者侧通知：某纹理已在远端 surface 上绘制并呈现，生产者可以复用它。
///
/// 在渲染线程调用，每呈现一帧调用一次。
pub trait FrameConsumedListener: Send + Sync {
    fn on_frame_consumed(&self, texture_id: u32);
}

/// ### English
/// Session collaborator gating when the remote session is considered active.
///
/// ### 中文
/// 决定远端会话何时视为活跃的会话协作方。
pub trait SessionListener: Send + Sync {
    fn on_remote_surface_ready(&self, width: u32, height: u32);
    fn on_remote_surface_gone(&self);
}

/// ### English
/// User-visible error presentation, driven from the thread that drains the error channel.
///
/// ### 中文
/// 面向用户的错误展示；由排空错误通道的线程驱动。
pub trait ErrorPresenter {
    /// ### English
    /// Replaces the displayed error text.
    ///
    /// ### 中文
    /// 替换显示的错误文本。
    fn set_error_message(&self, message: &str);

    /// ### English
    /// Makes the error banner visible. Called at most once per controller.
    ///
    /// ### 中文
    /// 显示错误横幅；每个控制器最多调用一次。
    fn reveal_error_banner(&self);
}
