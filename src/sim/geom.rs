//! Axis-aligned rectangles and overlap tests
//!
//! Screen-style coordinates: x grows to the right, y grows downward, and a
//! rect's `pos` is its top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x / 2.0
    }

    /// Strict overlap on both axes; shared edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Shrink by `amount` on every side
    pub fn inset(&self, amount: f32) -> Rect {
        Rect {
            pos: self.pos + Vec2::splat(amount),
            size: self.size - Vec2::splat(amount * 2.0),
        }
    }

    /// Horizontal spans touch or overlap (inclusive at the edges)
    #[inline]
    pub fn spans_x(&self, other: &Rect) -> bool {
        self.right() >= other.left() && self.left() <= other.right()
    }
}

/// Penetration depth of a mover into a solid, measured from each face of the solid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlaps {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Overlaps {
    pub fn between(mover: &Rect, solid: &Rect) -> Self {
        Self {
            left: mover.right() - solid.left(),
            right: solid.right() - mover.left(),
            top: mover.bottom() - solid.top(),
            bottom: solid.bottom() - mover.top(),
        }
    }

    /// Smallest penetration across the four faces
    pub fn min(&self) -> f32 {
        self.left.min(self.right).min(self.top).min(self.bottom)
    }
}
