/// ### English
/// `cast_remote_display` cdylib crate root.
/// Exposes the C ABI via `ffi`; core implementation lives under `engine`.
///
/// ### 中文
/// `cast_remote_display` 的 cdylib crate 根。
/// 通过 `ffi` 导出 C ABI；核心实现位于 `engine` 模块。
mod engine;
mod ffi;
