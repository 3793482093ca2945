//! Triangle-list surface
//!
//! Tessellates every fill into `Vertex` triangles under the current affine
//! transform. Text is recorded as runs rather than rasterised. Used by the
//! headless binary and by scene tests.

use glam::{Affine2, Vec2};
use std::f32::consts::TAU;

use super::surface::{Color, Surface, with_alpha};
use super::vertex::Vertex;

/// Segments used for a full ellipse
const ELLIPSE_SEGMENTS: u32 = 16;

/// A recorded text draw (already transformed)
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub pos: Vec2,
    pub font_size: f32,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct VertexBatch {
    pub vertices: Vec<Vertex>,
    pub texts: Vec<TextRun>,
    transform: Affine2,
    alpha: f32,
    stack: Vec<(Affine2, f32)>,
}

impl Default for VertexBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            texts: Vec::new(),
            transform: Affine2::IDENTITY,
            alpha: 1.0,
            stack: Vec::new(),
        }
    }

    /// Drop recorded geometry, keeping allocations
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.texts.clear();
        self.stack.clear();
        self.transform = Affine2::IDENTITY;
        self.alpha = 1.0;
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Packed vertex bytes, ready for upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn push_vertex(&mut self, p: Vec2, color: Color) {
        let p = self.transform.transform_point2(p);
        self.vertices.push(Vertex::at(p, color));
    }
}

impl Surface for VertexBatch {
    fn save(&mut self) {
        self.stack.push((self.transform, self.alpha));
    }

    fn restore(&mut self) {
        if let Some((transform, alpha)) = self.stack.pop() {
            self.transform = transform;
            self.alpha = alpha;
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    fn rotate(&mut self, radians: f32) {
        self.transform = self.transform * Affine2::from_angle(radians);
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        let color = with_alpha(color, self.alpha);
        let (a, b) = (pos, pos + Vec2::new(size.x, 0.0));
        let (c, d) = (pos + size, pos + Vec2::new(0.0, size.y));

        // Two triangles
        self.push_vertex(a, color);
        self.push_vertex(b, color);
        self.push_vertex(c, color);

        self.push_vertex(a, color);
        self.push_vertex(c, color);
        self.push_vertex(d, color);
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        let color = with_alpha(color, self.alpha);
        for i in 0..ELLIPSE_SEGMENTS {
            let theta1 = (i as f32 / ELLIPSE_SEGMENTS as f32) * TAU;
            let theta2 = ((i + 1) as f32 / ELLIPSE_SEGMENTS as f32) * TAU;

            // Triangle from center to edge
            self.push_vertex(center, color);
            self.push_vertex(center + Vec2::from_angle(theta1) * radii, color);
            self.push_vertex(center + Vec2::from_angle(theta2) * radii, color);
        }
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, font_size: f32, color: Color) {
        let pos = self.transform.transform_point2(pos);
        self.texts.push(TextRun {
            text: text.to_string(),
            pos,
            font_size,
            color: with_alpha(color, self.alpha),
        });
    }
}
