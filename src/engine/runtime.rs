//! ### English
//! Remote render runtime: the frame mailbox, the render thread and its owning handle.
//!
//! ### 中文
//! 远端渲染运行时：帧邮箱、渲染线程及持有它的句柄。

mod mailbox;
mod render_thread;

mod engine_runtime;

pub use engine_runtime::RemoteRenderEngine;
