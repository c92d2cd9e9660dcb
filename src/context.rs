//! The rendering state the text renderer reads and mutates.
//!
//! Drawing text touches the current color, the bound texture, a few enable
//! flags and the transform stack. Instead of reaching for implicit global GL
//! state, the renderer takes a [`RenderContext`] so the same code runs against
//! [`GlowContext`](crate::GlowContext) or an in-memory recorder.

use glam::{Mat4, Vec3};

use crate::atlas::AtlasImage;
use crate::error::FontResult;
use crate::types::{Color, TexturedVertex};

/// Toggleable pipeline state used while drawing text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Sample the bound texture; when off, quads are filled with the color.
    Texture2d,
    /// Discard fully transparent fragments.
    AlphaTest,
    /// Depth testing against the framebuffer's depth buffer.
    DepthTest,
}

/// A matrix stack with fixed-function semantics: every operation
/// post-multiplies the current matrix.
#[derive(Clone, Debug)]
pub struct TransformStack {
    current: Mat4,
    saved: Vec<Mat4>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl TransformStack {
    /// A stack whose current matrix is `matrix`.
    #[must_use]
    pub fn new(matrix: Mat4) -> Self {
        Self {
            current: matrix,
            saved: Vec::with_capacity(8),
        }
    }

    /// The matrix vertices are transformed by.
    #[must_use]
    pub fn current(&self) -> Mat4 {
        self.current
    }

    /// Replace the current matrix.
    pub fn set(&mut self, matrix: Mat4) {
        self.current = matrix;
    }

    /// Number of saved matrices.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Save the current matrix.
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restore the most recently saved matrix. Popping an empty stack leaves
    /// the current matrix untouched.
    pub fn pop(&mut self) {
        match self.saved.pop() {
            Some(matrix) => self.current = matrix,
            None => log::warn!("Transform stack underflow"),
        }
    }

    /// Post-multiply a translation.
    pub fn translate(&mut self, offset: Vec3) {
        self.current *= Mat4::from_translation(offset);
    }

    /// Post-multiply a scale.
    pub fn scale(&mut self, factors: Vec3) {
        self.current *= Mat4::from_scale(factors);
    }

    /// The x and y scale factors on the diagonal of the current matrix.
    ///
    /// Only meaningful when the upper-left block holds no rotation or shear.
    #[must_use]
    pub fn diagonal_scale(&self) -> [f32; 2] {
        [self.current.x_axis.x, self.current.y_axis.y]
    }
}

/// The rendering surface a [`GlyphFont`](crate::GlyphFont) is built on and
/// drawn into.
///
/// All calls must happen on the thread that owns the underlying graphics
/// context.
pub trait RenderContext {
    /// Handle to a texture owned by this context.
    type Texture: Copy + PartialEq + std::fmt::Debug;

    /// Viewport width and height in pixels.
    fn viewport_size(&self) -> [u32; 2];

    /// Largest texture side the context can allocate.
    fn max_texture_size(&self) -> u32;

    /// Upload `image` as a new RGBA8 texture, linear-filtered and clamped to
    /// the edge, without mipmaps.
    ///
    /// # Errors
    ///
    /// Fails when the host cannot allocate the texture.
    fn create_texture(&mut self, image: &AtlasImage) -> FontResult<Self::Texture>;

    /// Release a texture created by [`create_texture`](Self::create_texture).
    fn delete_texture(&mut self, texture: Self::Texture);

    /// The texture quads are currently sampled from, as the context holds it
    /// now rather than as last set through this trait.
    fn bound_texture(&self) -> Option<Self::Texture>;

    /// Bind `texture` for subsequent quads.
    fn bind_texture(&mut self, texture: Option<Self::Texture>);

    /// Current draw color.
    fn color(&self) -> Color;

    /// Set the draw color.
    fn set_color(&mut self, color: Color);

    /// Whether `capability` is on.
    fn is_enabled(&self, capability: Capability) -> bool;

    /// Turn `capability` on or off.
    fn set_enabled(&mut self, capability: Capability, enabled: bool);

    /// The transform stack, mutably.
    fn transform_mut(&mut self) -> &mut TransformStack;

    /// Draw one quad with the current transform, color and texture state.
    fn draw_quad(&mut self, quad: &[TexturedVertex; 4]);
}
