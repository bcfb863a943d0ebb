//! ### English
//! Tunables for the remote render engine.
//!
//! ### 中文
//! 远端渲染引擎的可调参数。

use std::time::Duration;

use crate::engine::egl::EGLint;
use crate::engine::flags;

/// ### English
/// Options shared by every engine a controller starts.
///
/// ### 中文
/// 控制器启动的每个引擎共用的选项。
#[derive(Clone, Debug, PartialEq)]
pub struct RemoteDisplayOptions {
    /// ### English
    /// `EGL_CONTEXT_CLIENT_VERSION` values tried in order when creating the shared context.
    ///
    /// ### 中文
    /// 创建共享上下文时按顺序探测的 `EGL_CONTEXT_CLIENT_VERSION` 取值。
    pub client_versions: Vec<EGLint>,
    /// ### English
    /// Color the remote surface is cleared with before each draw.
    ///
    /// ### 中文
    /// 每次绘制前清屏使用的颜色。
    pub clear_color: [f32; 4],
    /// ### English
    /// How long `start` waits for the render thread to finish initialization.
    ///
    /// ### 中文
    /// `start` 等待渲染线程完成初始化的最长时间。
    pub init_timeout: Duration,
    pub thread_name: String,
    /// ### English
    /// Source tag attached to every error the engine reports.
    ///
    /// ### 中文
    /// 引擎上报的每条错误所附带的来源标签。
    pub error_source: String,
}

impl Default for RemoteDisplayOptions {
    fn default() -> Self {
        Self {
            client_versions: vec![3, 2],
            clear_color: [0.0, 0.0, 1.0, 0.0],
            init_timeout: Duration::from_secs(30),
            thread_name: "remote-display-render".to_string(),
            error_source: "RemoteTexture".to_string(),
        }
    }
}

impl RemoteDisplayOptions {
    /// ### English
    /// Builds options from the C ABI bitmask (see `flags`).
    ///
    /// ### 中文
    /// 根据 C ABI 位掩码构建选项（见 `flags`）。
    pub fn from_flags(bits: u32) -> Self {
        let mut options = Self::default();
        if bits & flags::CAST_REMOTE_DISPLAY_FLAG_GLES2_ONLY != 0 {
            options.client_versions = vec![2];
        }
        options
    }
}
