//! ### English
//! Narrow GL surface used by the remote render loop, plus its gleam-backed implementation.
//!
//! ### 中文
//! 远端渲染循环使用的精简 GL 接口，以及基于 gleam 的实现。

use std::ffi::c_void;
use std::rc::Rc;

use gleam::gl::{self, Gl};
use glow::HasContext as _;

pub type GLenum = u32;
pub type GLuint = u32;
pub type GLint = i32;

pub const GL_NO_ERROR: GLenum = gl::NO_ERROR;
pub const GL_VERTEX_SHADER: GLenum = gl::VERTEX_SHADER;
pub const GL_FRAGMENT_SHADER: GLenum = gl::FRAGMENT_SHADER;

/// ### English
/// GLSL flavour the quad shaders are written in for the current context.
///
/// ### 中文
/// 当前上下文下四边形着色器所用的 GLSL 方言。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderDialect {
    /// ### English
    /// OpenGL ES: `#version 100` with a default float precision.
    ///
    /// ### 中文
    /// OpenGL ES：`#version 100`，并声明默认浮点精度。
    Gles100,
    /// ### English
    /// Desktop GL below 3.2: `#version 120`, fixed vertex array state.
    ///
    /// ### 中文
    /// 3.2 以下的桌面 GL：`#version 120`，使用默认顶点数组状态。
    Glsl120,
    /// ### English
    /// Desktop GL 3.2+: `#version 150` with `in`/`out`; draws need a bound vertex array object.
    ///
    /// ### 中文
    /// 桌面 GL 3.2+：`#version 150`，使用 `in`/`out`；绘制时必须绑定 VAO。
    Glsl150,
}

impl ShaderDialect {
    pub(crate) fn for_version(is_gles: bool, major: u32, minor: u32) -> Self {
        if is_gles {
            Self::Gles100
        } else if (major, minor) >= (3, 2) {
            Self::Glsl150
        } else {
            Self::Glsl120
        }
    }

    pub(crate) fn needs_vertex_array(self) -> bool {
        self == Self::Glsl150
    }
}

/// ### English
/// The GL calls the remote render loop issues. One call per method so every operation can be
/// followed by an error check.
///
/// ### 中文
/// 远端渲染循环会发出的 GL 调用；每个方法对应一次调用，便于每步操作后检查错误。
pub trait QuadGl {
    /// ### English
    /// Shader dialect matching the current context's API and version.
    ///
    /// ### 中文
    /// 与当前上下文 API 及版本匹配的着色器方言。
    fn shader_dialect(&self) -> ShaderDialect;

    fn get_error(&self) -> GLenum;

    /// ### English
    /// Creates, sources and compiles a shader. `Err` carries the info log.
    ///
    /// ### 中文
    /// 创建、设置源码并编译着色器；`Err` 携带 info log。
    fn compile_shader(&self, kind: GLenum, source: &str) -> Result<GLuint, String>;

    fn delete_shader(&self, shader: GLuint);

    /// ### English
    /// Creates a program from two compiled shaders and links it. `Err` carries the info log.
    ///
    /// ### 中文
    /// 用两个已编译的着色器创建并链接 program；`Err` 携带 info log。
    fn link_program(&self, vertex: GLuint, fragment: GLuint) -> Result<GLuint, String>;

    fn delete_program(&self, program: GLuint);
    fn use_program(&self, program: GLuint);
    fn attrib_location(&self, program: GLuint, name: &str) -> GLint;
    fn uniform_location(&self, program: GLuint, name: &str) -> GLint;

    /// ### English
    /// Uploads `data` into a new `GL_STATIC_DRAW` array buffer and leaves it bound.
    ///
    /// ### 中文
    /// 将 `data` 上传到新的 `GL_STATIC_DRAW` 数组缓冲区，并保持其绑定。
    fn upload_vertex_buffer(&self, data: &[f32]) -> GLuint;

    fn delete_buffer(&self, buffer: GLuint);

    /// ### English
    /// Generates a vertex array object and leaves it bound.
    ///
    /// ### 中文
    /// 生成一个顶点数组对象（VAO）并保持其绑定。
    fn create_vertex_array(&self) -> GLuint;

    fn delete_vertex_array(&self, vertex_array: GLuint);
    fn enable_vertex_attrib(&self, location: GLuint);

    /// ### English
    /// `glVertexAttribPointer` for float data from the bound array buffer.
    ///
    /// ### 中文
    /// 针对当前绑定数组缓冲区中浮点数据的 `glVertexAttribPointer`。
    fn vertex_attrib_pointer(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLint,
        offset: u32,
    );

    /// ### English
    /// Binds `texture` to `GL_TEXTURE0` as a `GL_TEXTURE_2D`.
    ///
    /// ### 中文
    /// 将 `texture` 作为 `GL_TEXTURE_2D` 绑定到 `GL_TEXTURE0`。
    fn bind_texture_unit0(&self, texture: GLuint);

    /// ### English
    /// Linear min/mag filtering and clamp-to-edge on S and T for the bound texture.
    ///
    /// ### 中文
    /// 对当前绑定纹理设置线性缩放过滤，并在 S/T 方向 clamp-to-edge。
    fn set_linear_clamp_sampling(&self);

    fn set_sampler_uniform(&self, location: GLint, unit: GLint);
    fn viewport(&self, width: GLint, height: GLint);
    fn clear_color(&self, rgba: [f32; 4]);
    fn clear_color_buffer(&self);
    fn draw_triangle_strip(&self, vertex_count: GLint);
}

/// ### English
/// Expected forms: `"4.6.0 ..."` or `"OpenGL ES 3.2 ..."`.
///
/// ### 中文
/// 期望的版本字符串形式：`"4.6.0 ..."` 或 `"OpenGL ES 3.2 ..."`。
pub(crate) fn parse_gl_version(version: &str) -> (u32, u32) {
    let mut major = 0u32;
    let mut minor = 0u32;
    let number_token = version
        .split_whitespace()
        .find(|t| t.chars().next().is_some_and(|c| c.is_ascii_digit()));
    if let Some(token) = number_token {
        let mut parts = token.split('.');
        if let Some(m) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            major = m;
        }
        if let Some(n) = parts.next().and_then(|s| s.parse::<u32>().ok()) {
            minor = n;
        }
    }
    (major, minor)
}

/// ### English
/// Loads GL entry points for the context current on this thread.
///
/// glow is used once to read `GL_VERSION` (to pick the GLES vs desktop function table);
/// all per-frame calls go through gleam.
///
/// ### 中文
/// 为当前线程的上下文加载 GL 函数入口。
///
/// 仅用 glow 读取一次 `GL_VERSION`（决定使用 GLES 还是桌面 GL 函数表）；
/// 每帧调用全部经由 gleam。
pub(crate) fn load_quad_gl(loader: impl Fn(&str) -> *const c_void) -> Box<dyn QuadGl> {
    let glow = unsafe { glow::Context::from_loader_function(|name| loader(name)) };
    let version = unsafe { glow.get_parameter_string(glow::VERSION) };
    let is_gles = version.starts_with("OpenGL ES");
    let (major, minor) = parse_gl_version(&version);
    let dialect = ShaderDialect::for_version(is_gles, major, minor);
    tracing::debug!(%version, major, minor, ?dialect, "remote context GL version");

    let gl: Rc<dyn Gl> = unsafe {
        if is_gles {
            gl::GlesFns::load_with(|name| loader(name))
        } else {
            gl::GlFns::load_with(|name| loader(name))
        }
    };

    Box::new(GleamQuadGl { gl, dialect })
}

struct GleamQuadGl {
    gl: Rc<dyn Gl>,
    dialect: ShaderDialect,
}

impl QuadGl for GleamQuadGl {
    fn shader_dialect(&self) -> ShaderDialect {
        self.dialect
    }

    fn get_error(&self) -> GLenum {
        self.gl.get_error()
    }

    fn compile_shader(&self, kind: GLenum, source: &str) -> Result<GLuint, String> {
        let shader = self.gl.create_shader(kind);
        self.gl.shader_source(shader, &[source.as_bytes()]);
        self.gl.compile_shader(shader);

        let mut status = [0];
        unsafe {
            self.gl
                .get_shader_iv(shader, gl::COMPILE_STATUS, &mut status);
        }
        if status[0] != gl::TRUE as GLint {
            let log = self.gl.get_shader_info_log(shader);
            self.gl.delete_shader(shader);
            return Err(log);
        }
        Ok(shader)
    }

    fn delete_shader(&self, shader: GLuint) {
        self.gl.delete_shader(shader);
    }

    fn link_program(&self, vertex: GLuint, fragment: GLuint) -> Result<GLuint, String> {
        let program = self.gl.create_program();
        self.gl.attach_shader(program, vertex);
        self.gl.attach_shader(program, fragment);
        self.gl.link_program(program);

        let mut status = [0];
        unsafe {
            self.gl
                .get_program_iv(program, gl::LINK_STATUS, &mut status);
        }
        if status[0] != gl::TRUE as GLint {
            let log = self.gl.get_program_info_log(program);
            self.gl.delete_program(program);
            return Err(log);
        }
        Ok(program)
    }

    fn delete_program(&self, program: GLuint) {
        self.gl.delete_program(program);
    }

    fn use_program(&self, program: GLuint) {
        self.gl.use_program(program);
    }

    fn attrib_location(&self, program: GLuint, name: &str) -> GLint {
        self.gl.get_attrib_location(program, name)
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> GLint {
        self.gl.get_uniform_location(program, name)
    }

    fn upload_vertex_buffer(&self, data: &[f32]) -> GLuint {
        let buffer = self.gl.gen_buffers(1)[0];
        self.gl.bind_buffer(gl::ARRAY_BUFFER, buffer);
        gl::buffer_data(&*self.gl, gl::ARRAY_BUFFER, data, gl::STATIC_DRAW);
        buffer
    }

    fn delete_buffer(&self, buffer: GLuint) {
        self.gl.delete_buffers(&[buffer]);
    }

    fn create_vertex_array(&self) -> GLuint {
        let vertex_array = self.gl.gen_vertex_arrays(1)[0];
        self.gl.bind_vertex_array(vertex_array);
        vertex_array
    }

    fn delete_vertex_array(&self, vertex_array: GLuint) {
        self.gl.bind_vertex_array(0);
        self.gl.delete_vertex_arrays(&[vertex_array]);
    }

    fn enable_vertex_attrib(&self, location: GLuint) {
        self.gl.enable_vertex_attrib_array(location);
    }

    fn vertex_attrib_pointer(
        &self,
        location: GLuint,
        components: GLint,
        stride: GLint,
        offset: u32,
    ) {
        self.gl
            .vertex_attrib_pointer(location, components, gl::FLOAT, false, stride, offset);
    }

    fn bind_texture_unit0(&self, texture: GLuint) {
        self.gl.active_texture(gl::TEXTURE0);
        self.gl.bind_texture(gl::TEXTURE_2D, texture);
    }

    fn set_linear_clamp_sampling(&self) {
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
        self.gl
            .tex_parameter_i(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
    }

    fn set_sampler_uniform(&self, location: GLint, unit: GLint) {
        self.gl.uniform_1i(location, unit);
    }

    fn viewport(&self, width: GLint, height: GLint) {
        self.gl.viewport(0, 0, width, height);
    }

    fn clear_color(&self, rgba: [f32; 4]) {
        self.gl.clear_color(rgba[0], rgba[1], rgba[2], rgba[3]);
    }

    fn clear_color_buffer(&self) {
        self.gl.clear(gl::COLOR_BUFFER_BIT);
    }

    fn draw_triangle_strip(&self, vertex_count: GLint) {
        self.gl.draw_arrays(gl::TRIANGLE_STRIP, 0, vertex_count);
    }
}
