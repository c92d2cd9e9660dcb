//! Error type shared by font loading, atlas upload and GL setup.

use thiserror::Error;

/// Errors that can occur while building a [`GlyphFont`](crate::GlyphFont) or
/// the GL resources it draws with.
#[derive(Error, Debug)]
pub enum FontError {
    /// The font data could not be parsed.
    #[error("Failed to load font: {0}")]
    FontLoad(String),

    /// The requested pixel size is zero, negative or not finite.
    #[error("Invalid font pixel size: {0}")]
    InvalidPixelSize(f32),

    /// The font carries no horizontal line metrics (ascent/descent).
    #[error("Font has no horizontal line metrics")]
    MissingLineMetrics,

    /// The font's metrics are too large for the atlas side to fit a `u32`.
    #[error("Atlas dimensions overflow u32")]
    AtlasOverflow,

    /// The atlas side exceeds the largest texture the target accepts.
    #[error("Atlas side {side} exceeds the maximum texture size {max}")]
    AtlasTooLarge {
        /// Side length the font needs.
        side: u32,
        /// Largest side the target accepts.
        max: u32,
    },

    /// The host could not allocate the atlas texture.
    #[error("Failed to create texture: {0}")]
    CreateTexture(String),

    /// Creating a buffer or vertex array failed.
    #[error("Failed to create buffer object: {0}")]
    CreateBufferObject(String),

    /// Shader compilation or program linking failed.
    #[error("Failed to build shader program: {0}")]
    Shader(String),

    /// A uniform the glyph program relies on is missing.
    #[error("Uniform `{0}` missing from glyph shader")]
    MissingUniform(&'static str),
}

/// Result alias used throughout the crate.
pub type FontResult<T> = Result<T, FontError>;
