//! The font handle: owns the atlas texture and the 256 glyph draw commands.

use glam::Vec3;

use crate::atlas;
use crate::context::{Capability, RenderContext};
use crate::error::{FontError, FontResult};
use crate::glyph::Glyph;
use crate::metrics::FontMetrics;
use crate::types::{Color, GLYPH_COUNT, WHITE};

/// Outlined text in a single fixed font, drawn from a 256-glyph atlas.
///
/// The atlas is rasterized and uploaded once in [`new`](Self::new). Each
/// [`draw`](Self::draw) then issues one quad per byte, scaled so that glyphs
/// keep their pixel size whatever the scale of the current transform.
///
/// The texture belongs to the context the font was built with. Call
/// [`destroy`](Self::destroy) with that context to release it; dropping the
/// handle without doing so leaks the texture.
///
/// # Example
///
/// ```no_run
/// # #[cfg(all(feature = "glow", feature = "fontdue"))]
/// # fn example(
/// #     gl: std::sync::Arc<glow::Context>,
/// #     ttf: &[u8],
/// # ) -> Result<(), outline_text_gl::FontError> {
/// # use outline_text_gl::{FontdueFace, GlowContext, GlyphFont};
/// // During setup (with a current GL context):
/// let mut ctx = unsafe { GlowContext::new(gl) }?;
/// let font = GlyphFont::new(FontdueFace::from_bytes(ttf, 13.0)?, &mut ctx)?;
///
/// // Each frame:
/// ctx.set_viewport_size([800, 600]);
/// font.draw(&mut ctx, glam::Vec3::ZERO, "-12 dB");
///
/// // On shutdown:
/// font.destroy(&mut ctx);
/// ctx.destroy();
/// # Ok(())
/// # }
/// # fn main() {}
/// ```
pub struct GlyphFont<F, T> {
    font: F,
    texture: T,
    side: u32,
    glyphs: Box<[Glyph; GLYPH_COUNT]>,
    /// Descent plus one pixel; text is lowered by this so the baseline sits on
    /// the anchor.
    baseline_offset: f32,
}

impl<F: FontMetrics, T: Copy + PartialEq + std::fmt::Debug> GlyphFont<F, T> {
    /// Rasterize `font` into an atlas, upload it through `ctx` and build every
    /// glyph's draw command.
    ///
    /// # Errors
    ///
    /// Fails with [`FontError::AtlasOverflow`] or [`FontError::AtlasTooLarge`]
    /// if the atlas would not fit a texture of `ctx`, before anything is
    /// allocated, and with the context's error if it cannot create the
    /// texture.
    pub fn new<C>(font: F, ctx: &mut C) -> FontResult<Self>
    where
        C: RenderContext<Texture = T>,
    {
        let side = atlas::texture_side(&font)?;
        let max = ctx.max_texture_size();
        if side > max {
            return Err(FontError::AtlasTooLarge { side, max });
        }

        let image = atlas::rasterize(&font, side);
        let texture = ctx.create_texture(&image)?;

        let rects = image.rects();
        let glyphs = Box::new(std::array::from_fn(|code| {
            Glyph::precompile(rects[code], side)
        }));

        #[expect(clippy::cast_precision_loss)]
        let baseline_offset = (font.descent() + 1) as f32;

        log::debug!("Built {side}x{side} glyph atlas as texture {texture:?}");

        Ok(Self {
            font,
            texture,
            side,
            glyphs,
            baseline_offset,
        })
    }

    /// Draw `text` in white with its baseline starting at `position`.
    ///
    /// See [`draw_colored`](Self::draw_colored).
    pub fn draw<C>(&self, ctx: &mut C, position: Vec3, text: impl AsRef<[u8]>)
    where
        C: RenderContext<Texture = T>,
    {
        self.draw_colored(ctx, position, text, WHITE);
    }

    /// Draw `text` in `color` with its baseline starting at `position`.
    ///
    /// Every byte of `text` is one glyph, read as Latin-1. Multi-byte encoded
    /// text is not decoded: a UTF-8 `&str` outside ASCII draws one glyph per
    /// byte.
    ///
    /// `position` is in the space of the context's current transform, which
    /// must be free of rotation and shear. Glyph size is fixed in window
    /// pixels, and text is drawn without depth testing so it is never hidden
    /// by the scene.
    ///
    /// On return, the color, bound texture, texturing, alpha test, depth test
    /// and transform stack of `ctx` are as they were before the call.
    pub fn draw_colored<C>(
        &self,
        ctx: &mut C,
        position: Vec3,
        text: impl AsRef<[u8]>,
        color: Color,
    ) where
        C: RenderContext<Texture = T>,
    {
        let saved_color = ctx.color();
        let saved_texture = ctx.bound_texture();
        let textured = ctx.is_enabled(Capability::Texture2d);
        let alpha_test = ctx.is_enabled(Capability::AlphaTest);
        let depth_test = ctx.is_enabled(Capability::DepthTest);

        ctx.set_color(color);
        ctx.set_enabled(Capability::Texture2d, true);
        ctx.set_enabled(Capability::AlphaTest, true);
        ctx.bind_texture(Some(self.texture));

        let [width, height] = ctx.viewport_size();
        let transform = ctx.transform_mut();
        transform.push();
        transform.translate(position);
        let [current_x, current_y] = transform.diagonal_scale();
        transform.scale(Vec3::new(
            pixel_scale(width, current_x),
            pixel_scale(height, current_y),
            0.0,
        ));
        transform.translate(Vec3::new(0.0, -self.baseline_offset, 0.0));

        ctx.set_enabled(Capability::DepthTest, false);
        for &code in text.as_ref() {
            let glyph = &self.glyphs[usize::from(code)];
            ctx.draw_quad(&glyph.quad);
            ctx.transform_mut().translate(Vec3::new(glyph.advance, 0.0, 0.0));
        }
        ctx.set_enabled(Capability::DepthTest, depth_test);

        ctx.set_enabled(Capability::AlphaTest, alpha_test);
        ctx.set_enabled(Capability::Texture2d, textured);
        ctx.transform_mut().pop();
        ctx.bind_texture(saved_texture);
        ctx.set_color(saved_color);
    }

    /// The font the atlas was built from.
    #[must_use]
    pub fn font(&self) -> &F {
        &self.font
    }

    /// The draw command for byte `code`.
    #[must_use]
    pub fn glyph(&self, code: u8) -> &Glyph {
        &self.glyphs[usize::from(code)]
    }

    /// Atlas side length in pixels.
    #[must_use]
    pub fn atlas_side(&self) -> u32 {
        self.side
    }

    /// Pixels the text is lowered by to put the baseline on the anchor.
    #[must_use]
    pub fn baseline_offset(&self) -> f32 {
        self.baseline_offset
    }

    /// Release the atlas texture. `ctx` must be the context the font was
    /// built with.
    pub fn destroy<C>(self, ctx: &mut C)
    where
        C: RenderContext<Texture = T>,
    {
        log::debug!("Deleting glyph atlas texture {:?}", self.texture);
        ctx.delete_texture(self.texture);
    }
}

/// Scale that turns one local unit into one window pixel along an axis of
/// `viewport` pixels, given the axis' current scale.
///
/// A zero current scale leaves the axis uncompensated.
#[expect(clippy::cast_precision_loss)]
fn pixel_scale(viewport: u32, current: f32) -> f32 {
    let screen = 2.0 / viewport.max(1) as f32;
    if current.abs() > f32::EPSILON {
        screen / current
    } else {
        screen
    }
}
