//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::surface::Color;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Color) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn at(pos: Vec2, color: Color) -> Self {
        Self::new(pos.x, pos.y, color)
    }

    /// Byte stride of one vertex in a packed buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const BACKGROUND: Color = [0.0, 0.067, 0.133, 1.0];
    pub const GROUND: Color = [0.2, 0.4, 0.2, 1.0];
    pub const LAVA: Color = [1.0, 0.27, 0.0, 1.0];
    pub const LAVA_GLOW: Color = [1.0, 0.67, 0.0, 1.0];
    pub const TREE_TRUNK: Color = [0.4, 0.26, 0.13, 1.0];
    pub const TREE_LEAVES: Color = [0.13, 0.55, 0.13, 1.0];
    pub const ROCK: Color = [0.5, 0.5, 0.5, 1.0];

    pub const PLAYER: Color = [0.0, 1.0, 0.53, 1.0];
    pub const PLAYER_INVINCIBLE: Color = [1.0, 1.0, 0.0, 1.0];
    pub const PLAYER_SHIELD: Color = [0.0, 0.67, 1.0, 0.35];

    pub const BULLET: Color = [1.0, 1.0, 0.0, 1.0];
    pub const LASER: Color = [1.0, 0.0, 0.4, 1.0];
    pub const CHAOS_BULLET: Color = [0.8, 0.2, 1.0, 1.0];
    pub const BIG_BOY: Color = [1.0, 0.5, 0.0, 0.6];
    pub const EXPLOSIVE: Color = [1.0, 0.3, 0.1, 1.0];
    pub const ENEMY_BULLET: Color = [1.0, 0.2, 0.2, 1.0];
    pub const BOMB: Color = [0.3, 0.3, 0.3, 1.0];

    pub const CARRIER: Color = [0.33, 0.42, 0.18, 1.0];
    pub const WHEEL: Color = [0.13, 0.13, 0.13, 1.0];
    pub const HP_BACK: Color = [0.3, 0.0, 0.0, 1.0];
    pub const HP_FRONT: Color = [0.0, 1.0, 0.0, 1.0];
    pub const ENEMY_SHIELD: Color = [0.4, 0.8, 1.0, 0.5];
    pub const PROTECTED: Color = [1.0, 1.0, 1.0, 0.3];

    pub const PORTAL: Color = [0.6, 0.2, 1.0, 0.7];
    pub const GHOST: Color = [0.9, 0.9, 1.0, 0.8];
    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const RED_OVERLAY: Color = [1.0, 0.0, 0.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 24);
        let verts = [Vertex::new(1.0, 2.0, colors::WHITE); 3];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 72);
    }
}
