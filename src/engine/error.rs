//! ### English
//! Error types shared by the selector, the render engine and the lifecycle controller.
//!
//! ### 中文
//! 配置选择器、渲染引擎与生命周期控制器共用的错误类型。

use thiserror::Error;

/// ### English
/// Errors that prevent the remote render engine from starting (or a call from being accepted).
///
/// Errors that happen while the loop is running are never returned; they are reported as
/// `RenderErrorEvent`s instead.
///
/// ### 中文
/// 阻止远端渲染引擎启动（或拒绝某次调用）的错误。
///
/// 渲染循环运行期间发生的错误不会以 `Err` 返回，而是作为 `RenderErrorEvent` 上报。
#[derive(Debug, Error)]
pub enum RemoteDisplayError {
    #[error("EGL API has not been installed by the embedder")]
    ApiNotInstalled,
    #[error("EGL API is already installed")]
    ApiAlreadyInstalled,
    #[error("EmbedderEglApi.{0} is NULL")]
    NullEntryPoint(&'static str),
    #[error("eglGetDisplay failed (0x{0:x})")]
    NoDisplay(i32),
    #[error("eglInitialize failed (0x{0:x})")]
    DisplayInitialization(i32),
    #[error("eglChooseConfig failed for the {0} attribute list")]
    ConfigQuery(&'static str),
    #[error("no compatible EGL config found")]
    NoCompatibleConfig,
    #[error("could not create a shared EGL context (0x{0:x})")]
    ContextCreation(i32),
    #[error("eglCreateWindowSurface failed (0x{0:x})")]
    SurfaceCreation(i32),
    #[error("eglMakeCurrent failed (0x{0:x})")]
    MakeCurrent(i32),
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: &'static str, log: String },
    #[error("program failed to link: {0}")]
    ProgramLink(String),
    #[error("GL/EGL error 0x{0:x} pending after initialization")]
    PendingError(i32),
    #[error("render thread did not finish initialization in time")]
    InitTimeout,
    #[error("render thread exited before reporting initialization")]
    InitAbandoned,
    #[error("failed to spawn the render thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("no remote surface is available")]
    NoSurface,
    #[error("no EGL context is current on the calling thread")]
    NoParentContext,
}

impl RemoteDisplayError {
    /// ### English
    /// Numeric code carried by the matching `RenderErrorEvent` (the EGL/GL code when one exists).
    ///
    /// ### 中文
    /// 对应 `RenderErrorEvent` 中携带的数值错误码（若存在则为 EGL/GL 错误码）。
    pub fn code(&self) -> i32 {
        match self {
            Self::NoDisplay(code)
            | Self::DisplayInitialization(code)
            | Self::ContextCreation(code)
            | Self::SurfaceCreation(code)
            | Self::MakeCurrent(code)
            | Self::PendingError(code) => *code,
            _ => 0,
        }
    }
}

/// ### English
/// One non-fatal error report travelling from the render thread to the controller.
///
/// ### 中文
/// 从渲染线程发往控制器的一条非致命错误报告。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderErrorEvent {
    /// ### English
    /// Component tag (e.g. `"RemoteTexture"`).
    ///
    /// ### 中文
    /// 组件标签（例如 `"RemoteTexture"`）。
    pub source: String,
    /// ### English
    /// GL or EGL error code (`0` when the failure has no native code).
    ///
    /// ### 中文
    /// GL 或 EGL 错误码（无原生错误码时为 `0`）。
    pub code: i32,
    /// ### English
    /// The operation that was being performed.
    ///
    /// ### 中文
    /// 出错时正在执行的操作。
    pub message: String,
}

impl RenderErrorEvent {
    pub fn new(source: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            code,
            message: message.into(),
        }
    }

    /// ### English
    /// Report for an engine that could not start.
    ///
    /// ### 中文
    /// 引擎无法启动时的报告。
    pub fn start_failure(source: impl Into<String>, err: &RemoteDisplayError) -> Self {
        Self::new(source, err.code(), format!("initialization failed: {err}"))
    }

    /// ### English
    /// User-facing text: source, hex error code and the failing operation.
    ///
    /// ### 中文
    /// 面向用户的文本：来源、十六进制错误码与失败的操作。
    pub fn display_message(&self) -> String {
        format!(
            "{}: error 0x{:x} while doing: {}",
            self.source, self.code, self.message
        )
    }
}

/// ### English
/// Sending half of the error channel handed to the render thread.
///
/// ### 中文
/// 交给渲染线程的错误通道发送端。
pub type ErrorSender = crossbeam_channel::Sender<RenderErrorEvent>;
