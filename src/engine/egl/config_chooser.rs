//! ### English
//! EGL config selection for the remote surface.
//!
//! Tries a multisampled attribute list first, then a plain list, and only accepts configs whose
//! color channels are exactly RGBA8888.
//!
//! ### 中文
//! 远端 surface 的 EGL config 选择。
//!
//! 先尝试多重采样规格，再退回简单规格；只接受颜色通道恰好为 RGBA8888 的 config。

use tracing::{debug, error};

use super::{
    EGL_ALPHA_SIZE, EGL_BLUE_SIZE, EGL_DEPTH_SIZE, EGL_GREEN_SIZE, EGL_NONE, EGL_OPENGL_ES2_BIT,
    EGL_RED_SIZE, EGL_RENDERABLE_TYPE, EGL_SAMPLE_BUFFERS, EGL_SAMPLES, EGL_STENCIL_SIZE, EGLint,
    EglConfig, EglDisplay, EglPlatform,
};
use crate::engine::error::RemoteDisplayError;

const RED_SIZE: EGLint = 8;
const GREEN_SIZE: EGLint = 8;
const BLUE_SIZE: EGLint = 8;
const ALPHA_SIZE: EGLint = 8;
const DEPTH_SIZE: EGLint = 16;
const STENCIL_SIZE: EGLint = 0;

const PREFERRED_CONFIG_ATTRIBS: [EGLint; 19] = [
    EGL_RED_SIZE,
    RED_SIZE,
    EGL_GREEN_SIZE,
    GREEN_SIZE,
    EGL_BLUE_SIZE,
    BLUE_SIZE,
    EGL_ALPHA_SIZE,
    ALPHA_SIZE,
    EGL_DEPTH_SIZE,
    DEPTH_SIZE,
    EGL_STENCIL_SIZE,
    STENCIL_SIZE,
    EGL_RENDERABLE_TYPE,
    EGL_OPENGL_ES2_BIT,
    EGL_SAMPLE_BUFFERS,
    1,
    EGL_SAMPLES,
    4,
    EGL_NONE,
];

const SIMPLE_CONFIG_ATTRIBS: [EGLint; 13] = [
    EGL_RED_SIZE,
    RED_SIZE,
    EGL_GREEN_SIZE,
    GREEN_SIZE,
    EGL_BLUE_SIZE,
    BLUE_SIZE,
    EGL_ALPHA_SIZE,
    ALPHA_SIZE,
    EGL_DEPTH_SIZE,
    DEPTH_SIZE,
    EGL_STENCIL_SIZE,
    STENCIL_SIZE,
    EGL_NONE,
];

/// ### English
/// The framebuffer format picked for one display. Immutable once chosen.
///
/// ### 中文
/// 为某个 display 选定的帧缓冲格式；选定后不可变。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphicsConfig {
    pub handle: EglConfig,
    pub red: EGLint,
    pub green: EGLint,
    pub blue: EGLint,
    pub alpha: EGLint,
    pub depth: EGLint,
    pub stencil: EGLint,
    pub samples: EGLint,
}

/// ### English
/// Picks the config used for both the engine context and the remote window surface.
///
/// 1. Query the multisampled ES2-renderable attribute list.
/// 2. If nothing matches, query the simple attribute list (no multisampling, no
///    renderable-type bit).
/// 3. Return the first candidate with enough depth/stencil and exactly 8/8/8/8 color.
///
/// ### 中文
/// 选择引擎上下文与远端窗口 surface 共用的 config。
///
/// 1. 查询多重采样、ES2 可渲染的规格。
/// 2. 若无匹配，则查询简单规格（无多重采样、无可渲染类型限制）。
/// 3. 返回第一个深度/模板足够且颜色恰好为 8/8/8/8 的候选。
pub fn choose_config(
    egl: &dyn EglPlatform,
    display: EglDisplay,
) -> Result<GraphicsConfig, RemoteDisplayError> {
    let mut candidates = egl
        .choose_configs(display, &PREFERRED_CONFIG_ATTRIBS)
        .ok_or_else(|| {
            error!("could not fetch configs for the preferred attribute list");
            RemoteDisplayError::ConfigQuery("preferred")
        })?;

    if candidates.is_empty() {
        debug!("no multisampled config available, retrying with the simple attribute list");
        candidates = egl
            .choose_configs(display, &SIMPLE_CONFIG_ATTRIBS)
            .ok_or_else(|| {
                error!("could not fetch configs for the simple attribute list");
                RemoteDisplayError::ConfigQuery("simple")
            })?;
    }

    if candidates.is_empty() {
        error!("no compatible EGL configs found");
        return Err(RemoteDisplayError::NoCompatibleConfig);
    }

    candidates
        .into_iter()
        .find_map(|config| describe_if_exact(egl, display, config))
        .ok_or_else(|| {
            error!("no EGL config with exact RGBA8888 channels");
            RemoteDisplayError::NoCompatibleConfig
        })
}

fn describe_if_exact(
    egl: &dyn EglPlatform,
    display: EglDisplay,
    config: EglConfig,
) -> Option<GraphicsConfig> {
    let attrib = |name| egl.config_attrib(display, config, name).unwrap_or(0);

    let depth = attrib(EGL_DEPTH_SIZE);
    let stencil = attrib(EGL_STENCIL_SIZE);
    if depth < DEPTH_SIZE || stencil < STENCIL_SIZE {
        return None;
    }

    let described = GraphicsConfig {
        handle: config,
        red: attrib(EGL_RED_SIZE),
        green: attrib(EGL_GREEN_SIZE),
        blue: attrib(EGL_BLUE_SIZE),
        alpha: attrib(EGL_ALPHA_SIZE),
        depth,
        stencil,
        samples: attrib(EGL_SAMPLES),
    };

    (described.red == RED_SIZE
        && described.green == GREEN_SIZE
        && described.blue == BLUE_SIZE
        && described.alpha == ALPHA_SIZE)
        .then_some(described)
}
