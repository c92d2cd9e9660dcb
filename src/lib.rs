//! Outlined text for OpenGL scenes, drawn from a 256-glyph texture atlas.
//!
//! This crate provides [`GlyphFont`], which rasterizes every byte code of a
//! fixed-size font into one square texture and then draws strings as one
//! textured quad per byte. Glyphs keep their pixel size regardless of the
//! scale of the current transform, so labels anchored at world positions
//! stay legible while the scene zooms.
//!
//! # Features
//!
//! - **1 px outline**: each glyph is a white body inside a black outline,
//!   readable over any background and tinted by the draw color.
//! - **One-time atlas build**: rasterization and upload happen once; drawing
//!   only streams quads.
//! - **Explicit render state**: drawing goes through a [`RenderContext`], so
//!   the geometry can be exercised without a GPU. [`GlowContext`] is the
//!   OpenGL implementation (feature `glow`).
//! - **Pluggable fonts**: any [`FontMetrics`] provider works;
//!   [`FontdueFace`] loads TTF/OTF data (feature `fontdue`).
//!
//! Text is single-byte: every byte is one glyph, read as Latin-1.
//!
//! # Safety
//!
//! [`GlowContext`] requires a valid, current OpenGL context for as long as it
//! and any font built with it are in use. All GL calls must be made on the
//! thread that owns the context.

pub mod atlas;
mod context;
mod error;
mod font;
mod glyph;
mod metrics;
mod types;

#[cfg(feature = "glow")]
mod render;
#[cfg(feature = "glow")]
mod shaders;

#[cfg(test)]
mod testing;

pub use context::{Capability, RenderContext, TransformStack};
pub use error::{FontError, FontResult};
pub use font::GlyphFont;
pub use glyph::Glyph;
pub use metrics::{FontMetrics, GlyphCoverage};
pub use types::{Color, GlyphRect, TexturedVertex, GLYPH_COUNT, GRID, OUTLINE_MARGIN, WHITE};

#[cfg(feature = "fontdue")]
pub use metrics::FontdueFace;
#[cfg(feature = "glow")]
pub use render::GlowContext;
