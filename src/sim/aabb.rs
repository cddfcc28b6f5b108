//! Axis-aligned boxes
//!
//! Screen coordinates: x grows to the right, y grows downward. A box is
//! `{x0, x1, y0, y1}` with `x0 <= x1` and `y0 <= y1`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{ContractViolation, finite};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Aabb {
    /// Box with top-left corner `min` and the given size
    pub fn from_min_size(min: DVec2, size: DVec2) -> Self {
        Self {
            x0: min.x,
            x1: min.x + size.x,
            y0: min.y,
            y1: min.y + size.y,
        }
    }

    /// Validate finiteness and ordering
    pub fn checked(self) -> Result<Self, ContractViolation> {
        finite("box x0", self.x0)?;
        finite("box x1", self.x1)?;
        finite("box y0", self.y0)?;
        finite("box y1", self.y1)?;
        if self.x0 > self.x1 {
            return Err(ContractViolation::InvertedBox {
                axis: 'x',
                lo: self.x0,
                hi: self.x1,
            });
        }
        if self.y0 > self.y1 {
            return Err(ContractViolation::InvertedBox {
                axis: 'y',
                lo: self.y0,
                hi: self.y1,
            });
        }
        Ok(self)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[inline]
    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x0, self.y0)
    }

    #[inline]
    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width(), self.height())
    }

    /// Bottom-right corner (the hero's "feet" for aiming)
    #[inline]
    pub fn bottom_right(&self) -> DVec2 {
        DVec2::new(self.x1, self.y1)
    }

    /// Same box moved by `offset`
    pub fn translated(&self, offset: DVec2) -> Self {
        Self {
            x0: self.x0 + offset.x,
            x1: self.x1 + offset.x,
            y0: self.y0 + offset.y,
            y1: self.y1 + offset.y,
        }
    }

    /// Same size, placed so its bottom edge sits at `y`
    pub fn with_bottom_at(&self, y: f64) -> Self {
        Self {
            y0: y - self.height(),
            y1: y,
            ..*self
        }
    }

    /// Same size, placed so its top edge sits at `y`
    pub fn with_top_at(&self, y: f64) -> Self {
        Self {
            y0: y,
            y1: y + self.height(),
            ..*self
        }
    }

    /// Same size, placed so its right edge sits at `x`
    pub fn with_right_at(&self, x: f64) -> Self {
        Self {
            x0: x - self.width(),
            x1: x,
            ..*self
        }
    }

    /// Same size, placed so its left edge sits at `x`
    pub fn with_left_at(&self, x: f64) -> Self {
        Self {
            x0: x,
            x1: x + self.width(),
            ..*self
        }
    }

    /// Strict horizontal overlap (touching edges do not count)
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.x1 > other.x0 && self.x0 < other.x1
    }

    /// Strict vertical overlap (touching edges do not count)
    #[inline]
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        self.y1 > other.y0 && self.y0 < other.y1
    }

    /// Whether this box has left `bounds` below, to the left or to the right
    ///
    /// Rising above the top is allowed.
    pub fn escapes(&self, bounds: &Aabb) -> bool {
        self.y1 > bounds.y1 || self.x0 < bounds.x0 || self.x1 > bounds.x1
    }

    /// Approximate equality within `tolerance` on every edge
    pub fn approx_eq(&self, other: &Aabb, tolerance: f64) -> bool {
        (self.x0 - other.x0).abs() <= tolerance
            && (self.x1 - other.x1).abs() <= tolerance
            && (self.y0 - other.y0).abs() <= tolerance
            && (self.y1 - other.y1).abs() <= tolerance
    }
}
