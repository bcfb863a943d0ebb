//! ### English
//! Lock-free primitives shared across the engine.
//!
//! ### 中文
//! 引擎内复用的无锁原语。
mod oneshot;

pub(crate) use oneshot::{OneShot, RecvError};
