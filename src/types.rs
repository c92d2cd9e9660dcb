//! Plain data types shared by the atlas builder and the renderer.

use bytemuck::{Pod, Zeroable};

/// Number of glyphs per atlas row and number of rows.
pub const GRID: usize = 16;

/// Number of glyphs in an atlas, one per byte value.
pub const GLYPH_COUNT: usize = GRID * GRID;

/// Extra pixels reserved around each glyph for its 1 px outline.
pub const OUTLINE_MARGIN: u32 = 2;

/// Straight RGBA color with components in `[0, 1]`.
pub type Color = [f32; 4];

/// Opaque white, the default text color.
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];

/// A glyph's cell in atlas pixel coordinates (row 0 at the top).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

impl GlyphRect {
    /// One past the rightmost column.
    #[must_use]
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.width)
    }

    /// One past the bottom row.
    #[must_use]
    pub fn bottom(&self) -> u32 {
        self.top.saturating_add(self.height)
    }

    /// Whether two cells share at least one pixel.
    #[must_use]
    pub fn overlaps(&self, other: &GlyphRect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// A quad corner in local glyph pixels with its atlas texture coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TexturedVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}
