#[unsafe(no_mangle)]
/// ### English
/// Returns the C ABI version.
///
/// ### 中文
/// 返回 C ABI 版本号。
pub extern "C" fn cast_remote_display_abi_version() -> u32 {
    super::CAST_REMOTE_DISPLAY_ABI_VERSION
}
