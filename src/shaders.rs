//! GLSL shader sources and compilation helpers.
//!
//! All shaders target GLSL 1.40 (OpenGL 3.1), which is widely supported on
//! desktop platforms.

use glow::HasContext;

use crate::error::{FontError, FontResult};

/// Vertex shader for glyph quads.
///
/// Vertices are in local glyph pixels; `u_transform` carries the full
/// scene-to-clip transform built by the text renderer.
///
/// # Uniforms
///
/// | Name          | Type   | Description                          |
/// |---------------|--------|--------------------------------------|
/// | `u_transform` | `mat4` | Local glyph pixels to clip space     |
pub const GLYPH_VERTEX_SRC: &str = r"#version 140

in vec2 a_position;
in vec2 a_tex_coord;

uniform mat4 u_transform;

out vec2 v_uv;

void main() {
    v_uv = a_tex_coord;
    gl_Position = u_transform * vec4(a_position, 0.0, 1.0);
}
";

/// Fragment shader for glyph quads.
///
/// The atlas is premultiplied, so the straight `u_color` is premultiplied
/// before modulating the texel. With texturing off the quad is a flat fill.
///
/// # Uniforms
///
/// | Name           | Type        | Description                             |
/// |----------------|-------------|-----------------------------------------|
/// | `u_texture`    | `sampler2D` | Atlas texture unit                      |
/// | `u_color`      | `vec4`      | Straight RGBA draw color                |
/// | `u_textured`   | `bool`      | Sample the atlas                        |
/// | `u_alpha_test` | `bool`      | Discard fragments with zero alpha       |
pub const GLYPH_FRAGMENT_SRC: &str = r"#version 140

in vec2 v_uv;

uniform sampler2D u_texture;
uniform vec4 u_color;
uniform bool u_textured;
uniform bool u_alpha_test;

out vec4 frag_color;

void main() {
    vec4 color = vec4(u_color.rgb * u_color.a, u_color.a);
    if (u_textured) {
        color *= texture(u_texture, v_uv);
    }
    if (u_alpha_test && color.a <= 0.0) {
        discard;
    }
    frag_color = color;
}
";

/// Compile a shader program from vertex and fragment source strings.
///
/// Attribute 0 is bound to `a_position` and attribute 1 to `a_tex_coord`
/// before linking. The compiled shader objects are detached and deleted after
/// successful linking, so only the program handle needs to be cleaned up by
/// the caller.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`FontError::Shader`] if shader compilation or program linking
/// fails.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> FontResult<glow::Program> {
    let program = unsafe { gl.create_program() }.map_err(FontError::Shader)?;

    let vs = unsafe { compile_shader(gl, glow::VERTEX_SHADER, vertex_src) }?;
    let fs = unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) }?;

    unsafe {
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.bind_attrib_location(program, 0, "a_position");
        gl.bind_attrib_location(program, 1, "a_tex_coord");
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(FontError::Shader(format!("Program link error: {log}")));
        }

        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
    }

    Ok(program)
}

/// Compile a single shader stage (vertex or fragment) from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> FontResult<glow::Shader> {
    unsafe {
        let shader = gl.create_shader(shader_type).map_err(FontError::Shader)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(FontError::Shader(format!("Shader compile error: {log}")));
        }

        Ok(shader)
    }
}
