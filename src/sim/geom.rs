//! Axis-aligned bounding boxes
//!
//! Every entity is anchored at its top-left corner with a width/height, so
//! all cross-population collisions reduce to a single overlap test.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub const fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test (touching edges do not collide)
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.pos.x < other.right()
            && self.right() > other.pos.x
            && self.pos.y < other.bottom()
            && self.bottom() > other.pos.y
    }
}

/// Anything with a bounding box
pub trait Bounded {
    fn bounds(&self) -> Aabb;

    fn collides_with<T: Bounded + ?Sized>(&self, other: &T) -> bool {
        self.bounds().intersects(&other.bounds())
    }
}

impl Bounded for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}
