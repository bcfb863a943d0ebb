//! ### English
//! Rendering module entry point.
//! Splits the GL seam, the quad program and the shared EGL context into submodules.
//!
//! ### 中文
//! 渲染模块入口。
//! 将 GL 接缝、四边形 program 与共享 EGL 上下文拆分到子模块。

mod gl;
mod quad;
mod shared_context;

pub use gl::{GLint, QuadGl};

pub(crate) use gl::{GL_NO_ERROR, load_quad_gl};
pub(crate) use quad::QuadProgram;
pub(crate) use shared_context::RemoteSharedContext;

#[cfg(test)]
pub(crate) use gl::{GL_FRAGMENT_SHADER, GL_VERTEX_SHADER, GLenum, GLuint, ShaderDialect};
