//! Synthetic fonts and a recording render context for unit tests.

use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3};

use crate::atlas::AtlasImage;
use crate::context::{Capability, RenderContext, TransformStack};
use crate::error::{FontError, FontResult};
use crate::metrics::{FontMetrics, GlyphCoverage};
use crate::types::{Color, TexturedVertex};

/// A fixed-cell font whose printable glyphs are solid blocks.
///
/// Codes up to and including space are blank.
#[derive(Clone, Debug)]
pub struct BlockFont {
    height: u32,
    width: u32,
    wide: HashMap<u8, u32>,
}

impl BlockFont {
    pub fn new(height: u32, width: u32) -> Self {
        Self {
            height,
            width,
            wide: HashMap::new(),
        }
    }

    /// Give `code` a different advance.
    pub fn with_wide_glyph(mut self, code: u8, advance: u32) -> Self {
        self.wide.insert(code, advance);
        self
    }
}

impl FontMetrics for BlockFont {
    fn line_height(&self) -> u32 {
        self.height
    }

    fn advance(&self, code: u8) -> u32 {
        self.wide.get(&code).copied().unwrap_or(self.width)
    }

    fn descent(&self) -> u32 {
        self.height / 4
    }

    fn underline_position(&self) -> i32 {
        1
    }

    fn coverage(&self, code: u8) -> GlyphCoverage {
        let width = self.advance(code).saturating_sub(1) as usize;
        let height = self.height as usize;
        if code <= b' ' || width == 0 || height == 0 {
            return GlyphCoverage::blank();
        }
        GlyphCoverage {
            left: 0,
            top: -((self.height - self.descent()) as i32),
            width,
            height,
            alpha: vec![u8::MAX; width * height],
        }
    }
}

/// One recorded [`RenderContext::draw_quad`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCall {
    pub texture: Option<u32>,
    pub color: Color,
    /// Corners in window pixels, origin bottom-left.
    pub corners: [Vec2; 4],
    pub tex_coords: [[f32; 2]; 4],
    pub depth_test: bool,
    pub textured: bool,
    pub alpha_test: bool,
}

impl DrawCall {
    /// Width and height of the drawn quad in window pixels.
    pub fn pixel_size(&self) -> Vec2 {
        (self.corners[2] - self.corners[0]).abs()
    }
}

/// A [`RenderContext`] that records draws instead of rasterizing them.
#[derive(Debug)]
pub struct RecordingContext {
    pub viewport: [u32; 2],
    pub transform: TransformStack,
    pub color: Color,
    pub bound: Option<u32>,
    pub enabled: HashMap<Capability, bool>,
    pub draws: Vec<DrawCall>,
    pub live_textures: Vec<u32>,
    pub uploads: Vec<Vec<u8>>,
    pub fail_texture_creation: bool,
    pub max_texture_size: u32,
    next_texture: u32,
}

impl RecordingContext {
    pub fn new(viewport: [u32; 2]) -> Self {
        let mut enabled = HashMap::new();
        enabled.insert(Capability::DepthTest, true);
        Self {
            viewport,
            transform: TransformStack::default(),
            color: [0.25, 0.5, 0.75, 1.0],
            bound: None,
            enabled,
            draws: Vec::new(),
            live_textures: Vec::new(),
            uploads: Vec::new(),
            fail_texture_creation: false,
            max_texture_size: 16384,
            next_texture: 1,
        }
    }

    pub fn with_matrix(mut self, matrix: Mat4) -> Self {
        self.transform.set(matrix);
        self
    }

    fn to_window(&self, clip: Vec3) -> Vec2 {
        let [w, h] = self.viewport;
        Vec2::new(
            (clip.x + 1.0) * 0.5 * w as f32,
            (clip.y + 1.0) * 0.5 * h as f32,
        )
    }
}

impl RenderContext for RecordingContext {
    type Texture = u32;

    fn viewport_size(&self) -> [u32; 2] {
        self.viewport
    }

    fn max_texture_size(&self) -> u32 {
        self.max_texture_size
    }

    fn create_texture(&mut self, image: &AtlasImage) -> FontResult<u32> {
        if self.fail_texture_creation {
            return Err(FontError::CreateTexture("out of texture memory".into()));
        }
        let texture = self.next_texture;
        self.next_texture += 1;
        self.live_textures.push(texture);
        self.uploads.push(image.to_gl_format());
        Ok(texture)
    }

    fn delete_texture(&mut self, texture: u32) {
        self.live_textures.retain(|&t| t != texture);
    }

    fn bound_texture(&self) -> Option<u32> {
        self.bound
    }

    fn bind_texture(&mut self, texture: Option<u32>) {
        self.bound = texture;
    }

    fn color(&self) -> Color {
        self.color
    }

    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.get(&capability).copied().unwrap_or(false)
    }

    fn set_enabled(&mut self, capability: Capability, enabled: bool) {
        self.enabled.insert(capability, enabled);
    }

    fn transform_mut(&mut self) -> &mut TransformStack {
        &mut self.transform
    }

    fn draw_quad(&mut self, quad: &[TexturedVertex; 4]) {
        let matrix = self.transform.current();
        let corners = (*quad).map(|v| {
            let [x, y] = v.position;
            self.to_window(matrix.project_point3(Vec3::new(x, y, 0.0)))
        });
        let call = DrawCall {
            texture: self.bound,
            color: self.color,
            corners,
            tex_coords: (*quad).map(|v| v.tex_coord),
            depth_test: self.is_enabled(Capability::DepthTest),
            textured: self.is_enabled(Capability::Texture2d),
            alpha_test: self.is_enabled(Capability::AlphaTest),
        };
        self.draws.push(call);
    }
}
