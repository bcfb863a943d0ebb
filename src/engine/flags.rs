//! ### English
//! Bitflags controlling optional engine behaviors.
//!
//! These are passed through the C ABI as a `u32` bitmask.
//!
//! ### 中文
//! 控制引擎可选行为的位标志（bitflags）。
//!
//! 通过 C ABI 以 `u32` 位掩码传入。

/// ### English
/// Only request an OpenGL ES 2 context (skip the ES 3 attempt).
///
/// Useful when the producer's context is known to be ES 2 and the driver logs noisy failures
/// for the ES 3 attempt.
///
/// ### 中文
/// 只请求 OpenGL ES 2 上下文（跳过 ES 3 探测）。
///
/// 当已知生产者上下文为 ES 2、且驱动会为 ES 3 尝试输出大量失败日志时使用。
pub const CAST_REMOTE_DISPLAY_FLAG_GLES2_ONLY: u32 = 1 << 0;
