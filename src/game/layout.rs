//! Fan geometry for a hand of cards.
//!
//! Cards form an arch: the outer cards sit on the baseline, every step towards
//! the middle lifts a card by one margin, and an even hand shares its crown
//! between the two middle cards. Each card is then turned so that its top edge
//! points away from a pivot below the hand.

use crate::game::animation::normalize_degrees;
use crate::models::settings::Settings;
use crate::models::view::{Transform, Vec2};

/// Target placement of one card for a given hand size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutFrame {
    pub y_offset: f32,
    pub position: Vec2,
    pub rotation: f32,
}

impl From<LayoutFrame> for Transform {
    fn from(frame: LayoutFrame) -> Self {
        Transform::new(frame.position, frame.rotation)
    }
}

/// Number of arch margins card `index` is lifted by in a hand of `size`.
pub fn arch_steps(index: usize, size: usize) -> usize {
    debug_assert!(index < size || size == 0, "card {index} outside hand of {size}");
    if size < 3 || index == 0 || index + 1 >= size {
        return 0;
    }

    let mid = size / 2;
    if size % 2 == 0 && (index == mid - 1 || index == mid) {
        mid - 1
    } else if index <= mid {
        index
    } else {
        size - 1 - index
    }
}

#[derive(Debug, Clone)]
pub struct HandLayoutEngine {
    arch_margin: f32,
    baseline: Vec2,
    rotation_pivot: Vec2,
    rotation_adjustment: f32,
}

impl HandLayoutEngine {
    pub fn new(arch_margin: f32, baseline: Vec2, pivot_drop: f32, rotation_adjustment: f32) -> Self {
        Self {
            arch_margin,
            baseline,
            rotation_pivot: Vec2::new(baseline.x, baseline.y - pivot_drop),
            rotation_adjustment,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.arch_margin,
            settings.baseline(),
            settings.pivot_drop,
            settings.rotation_adjustment,
        )
    }

    pub fn baseline(&self) -> Vec2 {
        self.baseline
    }

    pub fn y_offset(&self, index: usize, size: usize) -> f32 {
        self.arch_margin * arch_steps(index, size) as f32
    }

    /// Angle, in degrees, that turns a card at `position` to face away from the pivot.
    pub fn rotation_towards(&self, position: Vec2) -> f32 {
        let relative = self.rotation_pivot - position;
        normalize_degrees(relative.y.atan2(relative.x).to_degrees() - self.rotation_adjustment)
    }

    /// Frame of card `index` in a hand of `size`, for a card placed at horizontal `x`.
    pub fn compute_frame(&self, index: usize, size: usize, x: f32) -> LayoutFrame {
        let y_offset = self.y_offset(index, size);
        let position = Vec2::new(x, self.baseline.y + y_offset);
        LayoutFrame {
            y_offset,
            position,
            rotation: self.rotation_towards(position),
        }
    }
}
