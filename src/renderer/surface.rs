//! Drawing surface contract
//!
//! Everything the scene composer needs from a backend: filled rectangles,
//! filled ellipses, text, a save/restore transform stack and global alpha.

use glam::Vec2;

/// Linear RGBA, 0-1 per channel
pub type Color = [f32; 4];

pub trait Surface {
    /// Push the current transform and alpha
    fn save(&mut self);
    /// Pop back to the last `save`
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    /// Rotate subsequent drawing by `radians` around the current origin
    fn rotate(&mut self, radians: f32);
    /// Global alpha multiplier for subsequent drawing
    fn set_alpha(&mut self, alpha: f32);

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color);
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);
    /// Draw `text` centered horizontally on `pos`
    fn fill_text(&mut self, text: &str, pos: Vec2, font_size: f32, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.fill_ellipse(center, Vec2::splat(radius), color);
    }
}

/// `Color` with its alpha scaled
#[inline]
pub fn with_alpha(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha]
}
