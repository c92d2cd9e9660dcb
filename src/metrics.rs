//! Font-metrics provider consumed by the atlas builder.
//!
//! The atlas only needs a handful of integer metrics and an alpha coverage
//! bitmap per byte code, so any rasterizer can sit behind [`FontMetrics`].
//! [`FontdueFace`] is the bundled implementation.

/// An 8-bit alpha coverage bitmap for one glyph.
///
/// Offsets are relative to the pen: `left` is the column of the first pixel
/// to the right of the pen position and `top` is the row of the first pixel
/// relative to the baseline, negative above it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphCoverage {
    pub left: i32,
    pub top: i32,
    pub width: usize,
    pub height: usize,
    /// Row-major coverage, `width * height` bytes, row 0 on top.
    pub alpha: Vec<u8>,
}

impl GlyphCoverage {
    /// A glyph that paints nothing (spaces, control codes).
    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Coverage at `(x, y)` inside the bitmap, zero outside.
    #[must_use]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha.get(y * self.width + x).copied().unwrap_or(0)
    }
}

/// Metrics and rasterization for a fixed-size font, addressed by byte code.
///
/// Byte codes are interpreted as Latin-1 code points. All metrics are whole
/// pixels, matching the integer grid the atlas is packed on.
pub trait FontMetrics {
    /// Ascent plus descent, without line gap.
    fn line_height(&self) -> u32;

    /// Horizontal advance of `code`.
    fn advance(&self, code: u8) -> u32;

    /// Distance from the baseline to the lowest descender, positive.
    fn descent(&self) -> u32;

    /// Distance from the baseline down to the underline.
    fn underline_position(&self) -> i32;

    /// Alpha coverage of `code`, positioned relative to pen and baseline.
    fn coverage(&self, code: u8) -> GlyphCoverage;
}

impl<F: FontMetrics + ?Sized> FontMetrics for &F {
    fn line_height(&self) -> u32 {
        (**self).line_height()
    }

    fn advance(&self, code: u8) -> u32 {
        (**self).advance(code)
    }

    fn descent(&self) -> u32 {
        (**self).descent()
    }

    fn underline_position(&self) -> i32 {
        (**self).underline_position()
    }

    fn coverage(&self, code: u8) -> GlyphCoverage {
        (**self).coverage(code)
    }
}

#[cfg(feature = "fontdue")]
pub use self::fontdue_face::FontdueFace;

#[cfg(feature = "fontdue")]
mod fontdue_face {
    use fontdue::{Font, FontSettings};

    use super::{FontMetrics, GlyphCoverage};
    use crate::error::{FontError, FontResult};

    /// A TTF/OTF face rasterized by [fontdue] at a fixed pixel size.
    ///
    /// [fontdue]: https://docs.rs/fontdue
    pub struct FontdueFace {
        font: Font,
        px: f32,
        ascent: u32,
        descent: u32,
    }

    impl FontdueFace {
        /// Parse `data` and prepare it for rasterizing at `px` pixels.
        ///
        /// # Errors
        ///
        /// Fails if the pixel size is not a positive finite number, if the data
        /// is not a font fontdue understands, or if the face lacks horizontal
        /// line metrics.
        pub fn from_bytes(data: &[u8], px: f32) -> FontResult<Self> {
            if !px.is_finite() || px <= 0.0 {
                return Err(FontError::InvalidPixelSize(px));
            }

            let settings = FontSettings {
                scale: px,
                ..FontSettings::default()
            };
            let font = Font::from_bytes(data, settings)
                .map_err(|err| FontError::FontLoad(err.to_owned()))?;
            let line = font
                .horizontal_line_metrics(px)
                .ok_or(FontError::MissingLineMetrics)?;

            Ok(Self {
                font,
                px,
                ascent: whole_pixels(line.ascent),
                descent: whole_pixels(-line.descent),
            })
        }

        /// Pixel size the face rasterizes at.
        #[must_use]
        pub fn pixel_size(&self) -> f32 {
            self.px
        }

        /// The parsed fontdue font.
        #[must_use]
        pub fn font(&self) -> &Font {
            &self.font
        }
    }

    impl FontMetrics for FontdueFace {
        fn line_height(&self) -> u32 {
            self.ascent + self.descent
        }

        fn advance(&self, code: u8) -> u32 {
            whole_pixels(self.font.metrics(char::from(code), self.px).advance_width)
        }

        fn descent(&self) -> u32 {
            self.descent
        }

        // fontdue does not expose the post table; one pixel puts the outlined
        // glyph flush with the top of its cell.
        fn underline_position(&self) -> i32 {
            1
        }

        fn coverage(&self, code: u8) -> GlyphCoverage {
            let (metrics, alpha) = self.font.rasterize(char::from(code), self.px);
            // Dimensions of a rasterized glyph stay far below i32::MAX.
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let height = metrics.height as i32;
            GlyphCoverage {
                left: metrics.xmin,
                top: -(metrics.ymin + height),
                width: metrics.width,
                height: metrics.height,
                alpha,
            }
        }
    }

    /// Round a non-negative metric to whole pixels.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn whole_pixels(value: f32) -> u32 {
        value.max(0.0).round() as u32
    }

}
