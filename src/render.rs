//! [`RenderContext`] over OpenGL via glow, and the atlas texture uploader.

use glam::Mat4;
use glow::{HasContext, PixelUnpackData};
use std::sync::Arc;

use crate::{
    atlas::AtlasImage,
    context::{Capability, RenderContext, TransformStack},
    error::{FontError, FontResult},
    shaders,
    types::{Color, TexturedVertex, WHITE},
};

/// GL internal format for RGBA8 textures, pre-cast to the `i32` that
/// `tex_image_2d` expects.
#[expect(clippy::cast_possible_wrap)]
const RGBA8_INTERNAL_FORMAT: i32 = glow::RGBA8 as i32;

/// Largest side the `i32` GL size type can carry.
const GL_SIZE_MAX: u32 = i32::MAX.unsigned_abs();

/// Convert a `u32` dimension to the `i32` GL size type.
fn gl_size(value: u32) -> FontResult<i32> {
    i32::try_from(value).map_err(|_| FontError::AtlasTooLarge {
        side: value,
        max: GL_SIZE_MAX,
    })
}

/// GL bindings the context touches while uploading or drawing, captured from
/// the live GL state so the host's bindings survive every call.
struct GlBindings {
    active_texture: u32,
    /// `TEXTURE_2D` binding on unit 0, the unit glyphs sample from.
    texture_2d: Option<glow::Texture>,
    program: Option<glow::Program>,
    vertex_array: Option<glow::VertexArray>,
    array_buffer: Option<glow::Buffer>,
    unpack_alignment: i32,
}

impl GlBindings {
    /// Read the current bindings. Leaves texture unit 0 active.
    unsafe fn backup(gl: &glow::Context) -> Self {
        unsafe {
            let active_texture = active_texture_unit(gl);
            gl.active_texture(glow::TEXTURE0);
            Self {
                active_texture,
                texture_2d: gl.get_parameter_texture(glow::TEXTURE_BINDING_2D),
                program: gl.get_parameter_program(glow::CURRENT_PROGRAM),
                vertex_array: gl.get_parameter_vertex_array(glow::VERTEX_ARRAY_BINDING),
                array_buffer: gl.get_parameter_buffer(glow::ARRAY_BUFFER_BINDING),
                unpack_alignment: gl.get_parameter_i32(glow::UNPACK_ALIGNMENT),
            }
        }
    }

    /// Put every captured binding back, the active texture unit last.
    unsafe fn restore(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(self.program);
            gl.bind_vertex_array(self.vertex_array);
            gl.bind_buffer(glow::ARRAY_BUFFER, self.array_buffer);
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, self.unpack_alignment);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, self.texture_2d);
            gl.active_texture(self.active_texture);
        }
    }
}

/// The active texture unit (`TEXTURE0 + n`).
unsafe fn active_texture_unit(gl: &glow::Context) -> u32 {
    let unit = unsafe { gl.get_parameter_i32(glow::ACTIVE_TEXTURE) };
    u32::try_from(unit).unwrap_or(glow::TEXTURE0)
}

/// Cached uniform locations for the glyph shader program.
struct GlyphUniforms {
    /// `u_transform` — local glyph pixels to clip space.
    transform: glow::UniformLocation,
    /// `u_texture` — texture unit index (always 0).
    texture: glow::UniformLocation,
    /// `u_color` — straight RGBA draw color.
    color: glow::UniformLocation,
    /// `u_textured` — whether to sample the atlas.
    textured: glow::UniformLocation,
    /// `u_alpha_test` — whether to discard transparent fragments.
    alpha_test: glow::UniformLocation,
}

/// Look up a uniform the glyph program declares.
unsafe fn uniform(
    gl: &glow::Context,
    program: glow::Program,
    name: &'static str,
) -> FontResult<glow::UniformLocation> {
    unsafe { gl.get_uniform_location(program, name) }.ok_or(FontError::MissingUniform(name))
}

/// An OpenGL 3.1+ rendering context for [`GlyphFont`](crate::GlyphFont).
///
/// Keeps the transform stack, draw color and texturing/alpha-test switches on
/// the CPU and feeds them to a small shader program per quad. Depth testing
/// and the texture bound on unit 0 are read from and written to GL directly,
/// so changes the host makes between draws are seen and restored. Uploads and
/// draws put back the program, vertex array, array buffer and active texture
/// unit they found.
///
/// The transform stack holds the complete scene-to-clip matrix; set it with
/// [`set_transform`](Self::set_transform) before drawing. Blending is left to
/// the caller; the atlas is premultiplied, so
/// `blend_func(ONE, ONE_MINUS_SRC_ALPHA)` composites it correctly.
pub struct GlowContext {
    /// The OpenGL context, shared via [`Arc`] with the host application.
    gl: Arc<glow::Context>,

    /// Compiled glyph shader program.
    program: glow::Program,
    /// Cached uniform locations for [`program`](Self::program).
    uniforms: GlyphUniforms,

    /// Vertex array object with position and texture coordinate attributes.
    vao: glow::VertexArray,
    /// Vertex buffer for streaming one quad per draw.
    vbo: glow::Buffer,

    /// `MAX_TEXTURE_SIZE` of the context.
    max_texture_size: u32,
    viewport: [u32; 2],
    transform: TransformStack,
    color: Color,
    textured: bool,
    alpha_test: bool,
}

impl GlowContext {
    /// Compile the glyph program and create the vertex buffer objects.
    ///
    /// # Safety
    ///
    /// The `gl` context must be current and valid, and must stay current on
    /// this thread whenever the returned context or a font built with it is
    /// used. The caller must call [`destroy`](Self::destroy) before the GL
    /// context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if shader compilation, program linking, or GL
    /// resource creation fails.
    pub unsafe fn new(gl: Arc<glow::Context>) -> FontResult<Self> {
        let program = unsafe {
            shaders::compile_program(&gl, shaders::GLYPH_VERTEX_SRC, shaders::GLYPH_FRAGMENT_SRC)?
        };

        let uniforms = unsafe {
            GlyphUniforms {
                transform: uniform(&gl, program, "u_transform")?,
                texture: uniform(&gl, program, "u_texture")?,
                color: uniform(&gl, program, "u_color")?,
                textured: uniform(&gl, program, "u_textured")?,
                alpha_test: uniform(&gl, program, "u_alpha_test")?,
            }
        };

        let (vao, vbo) = unsafe {
            let bindings = GlBindings::backup(&gl);
            let vao = gl
                .create_vertex_array()
                .map_err(FontError::CreateBufferObject)?;
            let vbo = gl.create_buffer().map_err(FontError::CreateBufferObject)?;

            // Interleaved vec2 position + vec2 texture coordinate, 16 bytes.
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let stride = std::mem::size_of::<TexturedVertex>() as i32;
            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(1, 2, glow::FLOAT, false, stride, 8);
            bindings.restore(&gl);

            (vao, vbo)
        };

        let max_texture_size =
            u32::try_from(unsafe { gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE) }).unwrap_or(0);

        log::debug!("Glyph shader program ready, max texture size {max_texture_size}");

        Ok(Self {
            gl,
            program,
            uniforms,
            vao,
            vbo,
            max_texture_size,
            viewport: [1, 1],
            transform: TransformStack::default(),
            color: WHITE,
            textured: false,
            alpha_test: false,
        })
    }

    /// Record the viewport size text is scaled against. Call whenever the
    /// drawable is resized.
    pub fn set_viewport_size(&mut self, size: [u32; 2]) {
        self.viewport = size;
    }

    /// Replace the current scene-to-clip matrix.
    pub fn set_transform(&mut self, matrix: Mat4) {
        self.transform.set(matrix);
    }

    /// Release the shader program and buffers.
    pub fn destroy(self) {
        let gl = &self.gl;
        unsafe {
            gl.delete_program(self.program);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
        }
    }
}

/// Upload the atlas as an RGBA8 texture, linear-filtered and edge-clamped on
/// both axes, without mipmaps.
///
/// # Safety
///
/// Requires a valid, current OpenGL context. Leaves the new texture bound on
/// the active unit and `UNPACK_ALIGNMENT` at 4.
unsafe fn upload_atlas(gl: &glow::Context, image: &AtlasImage) -> FontResult<glow::Texture> {
    let side = gl_size(image.side())?;
    let pixels = image.to_gl_format();

    let texture = unsafe { gl.create_texture() }.map_err(FontError::CreateTexture)?;
    unsafe {
        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            RGBA8_INTERNAL_FORMAT,
            side,
            side,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            PixelUnpackData::Slice(Some(&pixels)),
        );
        set_atlas_tex_params(gl);
    }

    Ok(texture)
}

/// Set filtering and wrapping for the atlas texture.
unsafe fn set_atlas_tex_params(gl: &glow::Context) {
    // GL constant values are small enough that the cast is always safe.
    #[expect(clippy::cast_possible_wrap)]
    unsafe {
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MIN_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_MAG_FILTER,
            glow::LINEAR as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_S,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.tex_parameter_i32(
            glow::TEXTURE_2D,
            glow::TEXTURE_WRAP_T,
            glow::CLAMP_TO_EDGE as i32,
        );
    }
}

impl RenderContext for GlowContext {
    type Texture = glow::Texture;

    fn viewport_size(&self) -> [u32; 2] {
        self.viewport
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size.min(GL_SIZE_MAX)
    }

    fn create_texture(&mut self, image: &AtlasImage) -> FontResult<glow::Texture> {
        let texture = unsafe {
            let bindings = GlBindings::backup(&self.gl);
            let texture = upload_atlas(&self.gl, image);
            bindings.restore(&self.gl);
            texture
        }?;
        log::debug!("Uploaded {0}x{0} atlas texture", image.side());
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: glow::Texture) {
        // GL unbinds a deleted texture from every unit itself.
        unsafe { self.gl.delete_texture(texture) };
    }

    fn bound_texture(&self) -> Option<glow::Texture> {
        let gl = &self.gl;
        unsafe {
            let unit = active_texture_unit(gl);
            gl.active_texture(glow::TEXTURE0);
            let texture = gl.get_parameter_texture(glow::TEXTURE_BINDING_2D);
            gl.active_texture(unit);
            texture
        }
    }

    fn bind_texture(&mut self, texture: Option<glow::Texture>) {
        let gl = &self.gl;
        unsafe {
            let unit = active_texture_unit(gl);
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, texture);
            gl.active_texture(unit);
        }
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::Texture2d => self.textured,
            Capability::AlphaTest => self.alpha_test,
            Capability::DepthTest => unsafe { self.gl.is_enabled(glow::DEPTH_TEST) },
        }
    }

    fn set_enabled(&mut self, capability: Capability, enabled: bool) {
        match capability {
            Capability::Texture2d => self.textured = enabled,
            Capability::AlphaTest => self.alpha_test = enabled,
            Capability::DepthTest => unsafe {
                if enabled {
                    self.gl.enable(glow::DEPTH_TEST);
                } else {
                    self.gl.disable(glow::DEPTH_TEST);
                }
            },
        }
    }

    fn transform_mut(&mut self) -> &mut TransformStack {
        &mut self.transform
    }

    fn draw_quad(&mut self, quad: &[TexturedVertex; 4]) {
        let gl = &self.gl;
        let u = &self.uniforms;
        let [r, g, b, a] = self.color;

        unsafe {
            let bindings = GlBindings::backup(gl);
            gl.use_program(Some(self.program));
            gl.uniform_matrix_4_f32_slice(
                Some(&u.transform),
                false,
                &self.transform.current().to_cols_array(),
            );
            gl.uniform_4_f32(Some(&u.color), r, g, b, a);
            gl.uniform_1_i32(Some(&u.textured), i32::from(self.textured));
            gl.uniform_1_i32(Some(&u.alpha_test), i32::from(self.alpha_test));
            gl.uniform_1_i32(Some(&u.texture), 0);

            gl.bind_vertex_array(Some(self.vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(quad.as_slice()),
                glow::STREAM_DRAW,
            );
            gl.draw_arrays(glow::TRIANGLE_FAN, 0, 4);

            bindings.restore(gl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gl_size_accepts_i32_range() {
        assert_eq!(gl_size(4096).ok(), Some(4096));
        assert_eq!(gl_size(GL_SIZE_MAX).ok(), Some(i32::MAX));
        assert!(matches!(
            gl_size(u32::MAX),
            Err(FontError::AtlasTooLarge {
                side: u32::MAX,
                max: GL_SIZE_MAX
            })
        ));
    }

    #[test]
    fn vertex_layout_matches_attribute_offsets() {
        assert_eq!(std::mem::size_of::<TexturedVertex>(), 16);
        let vertex = TexturedVertex {
            position: [1.0, 2.0],
            tex_coord: [3.0, 4.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(floats, [1.0, 2.0, 3.0, 4.0]);
    }
}
