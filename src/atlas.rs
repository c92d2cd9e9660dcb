//! CPU side of the glyph atlas: sizing, packing and outlined rasterization.
//!
//! The 256 byte codes are laid out on a 16×16 grid, one row per 16
//! consecutive codes. Every glyph is painted nine times in black at offsets
//! `(0..3, 0..3)` and once in white at `(1, 1)`, which leaves a 1 px black
//! outline around a white body. The outline keeps the text readable over any
//! scene background once the renderer tints the white body.

use std::path::Path;

use image::{imageops, ImageResult, Rgba, RgbaImage};

use crate::error::{FontError, FontResult};
use crate::metrics::{FontMetrics, GlyphCoverage};
use crate::types::{GlyphRect, GLYPH_COUNT, GRID, OUTLINE_MARGIN};

/// Smallest atlas side produced, even for degenerate fonts.
pub const MIN_SIDE: u32 = 16;

/// Horizontal pixels a glyph occupies in its row: the outlined cell plus the
/// gap to the next cell.
fn packed_width(advance: u32) -> Option<u32> {
    advance.checked_add(2 * OUTLINE_MARGIN)
}

/// Compute the side length of the square, power-of-two atlas for `font`.
///
/// The side covers all 16 rows of `line_height + 2` pixels and the widest row
/// of packed glyphs, and is never below [`MIN_SIDE`].
///
/// # Errors
///
/// Returns [`FontError::AtlasOverflow`] if the metrics are so large that the
/// side does not fit a `u32`.
#[expect(clippy::cast_possible_truncation)]
pub fn texture_side(font: &impl FontMetrics) -> FontResult<u32> {
    let rows = font
        .line_height()
        .checked_add(OUTLINE_MARGIN)
        .and_then(|cell| cell.checked_mul(GRID as u32))
        .ok_or(FontError::AtlasOverflow)?;

    let mut widest_row = 0;
    for row in 0..GRID {
        let mut width = 0u32;
        for col in 0..GRID {
            width = packed_width(font.advance(code_at(row, col)))
                .and_then(|packed| width.checked_add(packed))
                .ok_or(FontError::AtlasOverflow)?;
        }
        widest_row = widest_row.max(width);
    }

    if font.line_height() == 0 {
        log::warn!("Font reports a zero line height; cells hold only the outline margin");
    }

    rows.max(widest_row)
        .max(MIN_SIDE)
        .checked_next_power_of_two()
        .ok_or(FontError::AtlasOverflow)
}

/// Byte code stored at `row`, `col` of the grid.
#[expect(clippy::cast_possible_truncation)]
fn code_at(row: usize, col: usize) -> u8 {
    (GRID * row + col) as u8
}

/// The rasterized atlas: premultiplied RGBA pixels plus every glyph's cell.
pub struct AtlasImage {
    pixels: RgbaImage,
    rects: [GlyphRect; GLYPH_COUNT],
}

impl AtlasImage {
    /// Side length in pixels.
    #[must_use]
    pub fn side(&self) -> u32 {
        self.pixels.width()
    }

    /// Premultiplied RGBA pixels, row 0 on top.
    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Cell of every glyph, indexed by byte code.
    #[must_use]
    pub fn rects(&self) -> &[GlyphRect; GLYPH_COUNT] {
        &self.rects
    }

    /// Pixel bytes in the layout GL expects for a texture upload: rows flipped
    /// so that image row 0 lands at texture `v = 1`.
    #[must_use]
    pub fn to_gl_format(&self) -> Vec<u8> {
        imageops::flip_vertical(&self.pixels).into_raw()
    }

    /// Write the atlas to a PNG file, for inspecting the packing.
    ///
    /// # Errors
    ///
    /// Returns the encoder's error if the file cannot be written.
    pub fn save_png(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        self.pixels.save(path)
    }
}

/// Rasterize all 256 glyphs of `font` into a `side`×`side` atlas.
///
/// Allocates `side * side * 4` bytes up front; size it with [`texture_side`]
/// and check the result against the target's texture limit first.
pub fn rasterize(font: &impl FontMetrics, side: u32) -> AtlasImage {
    let mut pixels = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
    let mut rects = [GlyphRect::default(); GLYPH_COUNT];

    let cell_height = font.line_height().saturating_add(OUTLINE_MARGIN);
    // Glyph metrics are a few hundred pixels at most.
    #[expect(clippy::cast_possible_wrap)]
    let baseline_lift = font.descent() as i32 + font.underline_position() + 1;

    let mut pos_y = 0u32;
    for row in 0..GRID {
        pos_y = pos_y.saturating_add(cell_height);
        let mut pos_x = 0;
        for col in 0..GRID {
            let code = code_at(row, col);
            let rect = GlyphRect {
                left: pos_x,
                top: pos_y - cell_height,
                width: font.advance(code).saturating_add(OUTLINE_MARGIN),
                height: cell_height,
            };
            rects[usize::from(code)] = rect;

            let coverage = font.coverage(code);
            #[expect(clippy::cast_possible_wrap)]
            let (pen_x, baseline) = (pos_x as i32, pos_y as i32 - baseline_lift);
            for dx in 0..3 {
                for dy in 0..3 {
                    paint(&mut pixels, &rect, &coverage, pen_x + dx, baseline + dy, 0);
                }
            }
            paint(&mut pixels, &rect, &coverage, pen_x + 1, baseline + 1, u8::MAX);

            pos_x = pos_x.saturating_add(rect.width).saturating_add(OUTLINE_MARGIN);
        }
    }

    log::debug!("Rasterized {GLYPH_COUNT} glyphs into a {side}x{side} atlas");
    AtlasImage { pixels, rects }
}

/// Composite `coverage` in an opaque gray `pen` over `pixels` with the pen at
/// `(pen_x, baseline)`, clipped to `clip` and to the image.
fn paint(
    pixels: &mut RgbaImage,
    clip: &GlyphRect,
    coverage: &GlyphCoverage,
    pen_x: i32,
    baseline: i32,
    pen: u8,
) {
    let origin_x = pen_x + coverage.left;
    let origin_y = baseline + coverage.top;
    let right = clip.right().min(pixels.width());
    let bottom = clip.bottom().min(pixels.height());

    for y in clip.top..bottom {
        for x in clip.left..right {
            let (Ok(gx), Ok(gy)) = (
                usize::try_from(i64::from(x) - i64::from(origin_x)),
                usize::try_from(i64::from(y) - i64::from(origin_y)),
            ) else {
                continue;
            };
            let alpha = coverage.at(gx, gy);
            if alpha == 0 {
                continue;
            }
            let dst = pixels.get_pixel_mut(x, y);
            dst.0 = source_over(dst.0, pen, alpha);
        }
    }
}

/// Premultiplied source-over of an opaque gray `pen` at `alpha` coverage.
fn source_over(dst: [u8; 4], pen: u8, alpha: u8) -> [u8; 4] {
    let a = u32::from(alpha);
    let src = mul_div255(u32::from(pen), a);
    let keep = 255 - a;
    let blend = |d: u8, s: u32| -> u8 {
        // s + d * (1 - a) never exceeds 255 for premultiplied inputs.
        #[expect(clippy::cast_possible_truncation)]
        let out = (s + mul_div255(u32::from(d), keep)).min(255) as u8;
        out
    };
    [
        blend(dst[0], src),
        blend(dst[1], src),
        blend(dst[2], src),
        blend(dst[3], a),
    ]
}

/// `a * b / 255`, rounded.
fn mul_div255(a: u32, b: u32) -> u32 {
    (a * b + 127) / 255
}
