//! ### English
//! Full-screen textured quad: the fixed shader program and its vertex buffer.
//!
//! ### 中文
//! 全屏纹理四边形：固定的着色器程序及其顶点缓冲区。

use super::gl::{GL_FRAGMENT_SHADER, GL_VERTEX_SHADER, GLint, GLuint, QuadGl, ShaderDialect};
use crate::engine::error::RemoteDisplayError;

const POSITION_ATTRIB_NAME: &str = "position";
const TEXTURE_COORDS_ATTRIB_NAME: &str = "texCoords";
const TEXTURE_SAMPLER_NAME: &str = "textureSampler";

const GLES_HEADER: &str = "#version 100\nprecision mediump float;\n";
const GLSL_120_HEADER: &str = "#version 120\n";
const GLSL_150_HEADER: &str = "#version 150\n";

/// ### English
/// Passes the position through and forwards texture coordinates.
///
/// ### 中文
/// 直接透传位置，并转发纹理坐标。
const VERTEX_SHADER_BODY: &str = "attribute vec4 position;
attribute vec2 texCoords;
varying vec2 outTexCoords;
void main(void) {
    outTexCoords = texCoords;
    gl_Position = position;
}
";

/// ### English
/// Samples the texture and forces alpha to 1.
///
/// ### 中文
/// 采样纹理，并把 alpha 强制为 1。
const FRAGMENT_SHADER_BODY: &str = "varying vec2 outTexCoords;
uniform sampler2D textureSampler;
void main(void) {
    gl_FragColor = vec4(texture2D(textureSampler, outTexCoords).rgb, 1.0);
}
";

const VERTEX_SHADER_BODY_150: &str = "in vec4 position;
in vec2 texCoords;
out vec2 outTexCoords;
void main(void) {
    outTexCoords = texCoords;
    gl_Position = position;
}
";

const FRAGMENT_SHADER_BODY_150: &str = "in vec2 outTexCoords;
uniform sampler2D textureSampler;
out vec4 fragColor;
void main(void) {
    fragColor = vec4(texture(textureSampler, outTexCoords).rgb, 1.0);
}
";

/// ### English
/// Full vertex and fragment sources for `dialect`.
///
/// ### 中文
/// `dialect` 对应的完整顶点与片元着色器源码。
fn shader_sources(dialect: ShaderDialect) -> (String, String) {
    let (header, vertex, fragment) = match dialect {
        ShaderDialect::Gles100 => (GLES_HEADER, VERTEX_SHADER_BODY, FRAGMENT_SHADER_BODY),
        ShaderDialect::Glsl120 => (GLSL_120_HEADER, VERTEX_SHADER_BODY, FRAGMENT_SHADER_BODY),
        ShaderDialect::Glsl150 => (
            GLSL_150_HEADER,
            VERTEX_SHADER_BODY_150,
            FRAGMENT_SHADER_BODY_150,
        ),
    };
    (format!("{header}{vertex}"), format!("{header}{fragment}"))
}

const FLOATS_PER_VERTEX: usize = 5;
const BYTES_PER_FLOAT: usize = 4;
const STRIDE_BYTES: GLint = (FLOATS_PER_VERTEX * BYTES_PER_FLOAT) as GLint;
const POSITION_OFFSET_BYTES: u32 = 0;
const UV_OFFSET_BYTES: u32 = (3 * BYTES_PER_FLOAT) as u32;
pub(crate) const QUAD_VERTEX_COUNT: GLint = 4;

/// ### English
/// X, Y, Z, U, V for the 4 vertices of the triangle strip covering clip space.
///
/// ### 中文
/// 覆盖整个裁剪空间的三角形带 4 个顶点的 X、Y、Z、U、V。
#[rustfmt::skip]
pub(crate) const QUAD_VERTICES: [f32; FLOATS_PER_VERTEX * QUAD_VERTEX_COUNT as usize] = [
    -1.0, -1.0, 0.0, 0.0, 0.0,
     1.0, -1.0, 0.0, 1.0, 0.0,
    -1.0,  1.0, 0.0, 0.0, 1.0,
     1.0,  1.0, 0.0, 1.0, 1.0,
];

/// ### English
/// Compiled program plus the vertex buffer feeding it.
///
/// Created on the render thread after the remote context became current; `delete` must run on
/// that thread before the context is destroyed.
///
/// ### 中文
/// 已编译的 program 及为其提供数据的顶点缓冲区。
///
/// 在远端上下文成为 current 后于渲染线程创建；`delete` 必须在同一线程、销毁上下文之前执行。
pub(crate) struct QuadProgram {
    program: GLuint,
    /// ### English
    /// Only created for dialects that cannot draw without one.
    ///
    /// ### 中文
    /// 仅在没有 VAO 就无法绘制的方言下创建。
    vertex_array: Option<GLuint>,
    vertex_buffer: GLuint,
    position_location: GLint,
    texture_coords_location: GLint,
    sampler_location: GLint,
}

impl QuadProgram {
    /// ### English
    /// Compiles and links the program, uploads the quad and wires the attributes.
    ///
    /// `check` is invoked after each GL call with a description of the operation.
    ///
    /// ### 中文
    /// 编译并链接 program、上传四边形顶点并设置属性。
    ///
    /// 每次 GL 调用后都会以操作描述调用 `check`。
    pub(crate) fn new(
        gl: &dyn QuadGl,
        mut check: impl FnMut(&str),
    ) -> Result<Self, RemoteDisplayError> {
        let dialect = gl.shader_dialect();
        let (vertex_source, fragment_source) = shader_sources(dialect);

        let vertex_shader = gl
            .compile_shader(GL_VERTEX_SHADER, &vertex_source)
            .map_err(|log| RemoteDisplayError::ShaderCompile { stage: "vertex", log })?;
        check("compile vertex shader");

        let fragment_shader = match gl.compile_shader(GL_FRAGMENT_SHADER, &fragment_source) {
            Ok(shader) => shader,
            Err(log) => {
                gl.delete_shader(vertex_shader);
                return Err(RemoteDisplayError::ShaderCompile {
                    stage: "fragment",
                    log,
                });
            }
        };
        check("compile fragment shader");

        let linked = gl.link_program(vertex_shader, fragment_shader);
        /*
        ### English
        The program keeps the shaders alive; the shader names are no longer needed.

        ### 中文
        program 会保持着色器存活；着色器名称不再需要。
        */
        gl.delete_shader(vertex_shader);
        gl.delete_shader(fragment_shader);
        let program = linked.map_err(RemoteDisplayError::ProgramLink)?;
        check("link program");

        let position_location = gl.attrib_location(program, POSITION_ATTRIB_NAME);
        check("initialize - position");
        let texture_coords_location = gl.attrib_location(program, TEXTURE_COORDS_ATTRIB_NAME);
        check("initialize - texCoords");
        let sampler_location = gl.uniform_location(program, TEXTURE_SAMPLER_NAME);
        check("initialize - texture");

        gl.use_program(program);
        check("use program");

        let vertex_array = dialect.needs_vertex_array().then(|| {
            let vertex_array = gl.create_vertex_array();
            check("create vertex array");
            vertex_array
        });

        let vertex_buffer = gl.upload_vertex_buffer(&QUAD_VERTICES);
        check("upload quad vertices");

        let quad = Self {
            program,
            vertex_array,
            vertex_buffer,
            position_location,
            texture_coords_location,
            sampler_location,
        };

        if quad.position_location >= 0 {
            gl.enable_vertex_attrib(quad.position_location as GLuint);
            check("enable vertex attrib array for position");
        }
        if quad.texture_coords_location >= 0 {
            gl.enable_vertex_attrib(quad.texture_coords_location as GLuint);
            check("enable vertex attrib array for tex coords");
        }

        Ok(quad)
    }

    /// ### English
    /// Binds `texture` to unit 0 with linear/clamp sampling and points the sampler at it.
    ///
    /// ### 中文
    /// 将 `texture` 以线性/clamp 采样绑定到纹理单元 0，并让 sampler 指向它。
    pub(crate) fn bind_texture(
        &self,
        gl: &dyn QuadGl,
        texture: GLuint,
        mut check: impl FnMut(&str),
    ) {
        gl.bind_texture_unit0(texture);
        check("bind texture");
        gl.set_linear_clamp_sampling();
        check("set texture sampling");
        gl.set_sampler_uniform(self.sampler_location, 0);
        check("set texture uniform");
    }

    /// ### English
    /// Clears with `clear_color` and draws the 4-vertex strip.
    ///
    /// ### 中文
    /// 以 `clear_color` 清屏并绘制 4 顶点三角形带。
    pub(crate) fn draw(&self, gl: &dyn QuadGl, clear_color: [f32; 4], mut check: impl FnMut(&str)) {
        gl.clear_color(clear_color);
        check("clear color");
        gl.clear_color_buffer();
        check("clear buffer");

        if self.position_location >= 0 {
            gl.vertex_attrib_pointer(
                self.position_location as GLuint,
                3,
                STRIDE_BYTES,
                POSITION_OFFSET_BYTES,
            );
            check("triangle vertices pos");
        }
        if self.texture_coords_location >= 0 {
            gl.vertex_attrib_pointer(
                self.texture_coords_location as GLuint,
                2,
                STRIDE_BYTES,
                UV_OFFSET_BYTES,
            );
            check("triangle vertices uv");
        }

        gl.draw_triangle_strip(QUAD_VERTEX_COUNT);
        check("draw quad");
    }

    pub(crate) fn delete(&self, gl: &dyn QuadGl) {
        gl.delete_buffer(self.vertex_buffer);
        if let Some(vertex_array) = self.vertex_array {
            gl.delete_vertex_array(vertex_array);
        }
        gl.delete_program(self.program);
    }
}
