//! Per-glyph draw commands: a textured quad plus the pen advance.

use crate::types::{GlyphRect, TexturedVertex, OUTLINE_MARGIN};

/// Everything needed to draw one byte code and move the pen past it.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Glyph {
    /// Cell in atlas pixels.
    pub rect: GlyphRect,
    /// Quad corners in local pixels, in fan order: bottom-left, top-left,
    /// top-right, bottom-right.
    pub quad: [TexturedVertex; 4],
    /// Horizontal translation applied after drawing. The two outline columns
    /// overlap the next glyph, so this is the cell width minus the margin.
    pub advance: f32,
}

impl Glyph {
    /// Build the draw command for the glyph stored at `rect` of an atlas with
    /// the given `side`.
    ///
    /// Texture `v` runs bottom-up while atlas rows run top-down, so the bottom
    /// of the cell maps to `1 - bottom / side`.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn precompile(rect: GlyphRect, side: u32) -> Self {
        let side = side.max(1) as f32;
        let (w, h) = (rect.width as f32, rect.height as f32);

        let x1 = rect.left as f32 / side;
        let x2 = rect.right() as f32 / side;
        let y1 = 1.0 - rect.bottom() as f32 / side;
        let y2 = 1.0 - rect.top as f32 / side;

        let vertex = |x, y, u, v| TexturedVertex {
            position: [x, y],
            tex_coord: [u, v],
        };

        Self {
            rect,
            quad: [
                vertex(0.0, 0.0, x1, y1),
                vertex(0.0, h, x1, y2),
                vertex(w, h, x2, y2),
                vertex(w, 0.0, x2, y1),
            ],
            advance: (rect.width.saturating_sub(OUTLINE_MARGIN)) as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::atlas;
    use crate::testing::BlockFont;

    #[test]
    fn quad_spans_the_cell_in_local_pixels() {
        let rect = GlyphRect {
            left: 32,
            top: 64,
            width: 10,
            height: 14,
        };
        let glyph = Glyph::precompile(rect, 128);
        let positions: Vec<_> = glyph.quad.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            [[0.0, 0.0], [0.0, 14.0], [10.0, 14.0], [10.0, 0.0]]
        );
        assert_relative_eq!(glyph.advance, 8.0);
    }

    #[test]
    fn tex_coords_flip_the_v_axis() {
        let rect = GlyphRect {
            left: 32,
            top: 64,
            width: 32,
            height: 32,
        };
        let glyph = Glyph::precompile(rect, 128);
        let [bl, tl, tr, br] = glyph.quad.map(|v| v.tex_coord);

        assert_relative_eq!(bl[0], 0.25);
        assert_relative_eq!(bl[1], 0.25);
        assert_relative_eq!(tl[1], 0.5);
        assert_relative_eq!(tr[0], 0.5);
        assert_relative_eq!(br[1], 0.25);
    }

    #[test]
    fn every_tex_coord_is_normalized() {
        let font = BlockFont::new(12, 7).with_wide_glyph(b'M', 13);
        let side = atlas::texture_side(&font).expect("atlas side fits in u32");
        let image = atlas::rasterize(&font, side);

        for rect in image.rects() {
            let glyph = Glyph::precompile(*rect, side);
            for vertex in glyph.quad {
                for c in vertex.tex_coord {
                    assert!((0.0..=1.0).contains(&c), "{c} out of range for {rect:?}");
                }
            }
        }
    }
}
