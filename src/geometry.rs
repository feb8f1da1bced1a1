//! Bounding-box geometry in pixel space.
//!
//! `BoundingBox` is a small `Copy` value type in corner format (`left`,
//! `top`, `right`, `bottom`) with side-effect-free inherent methods. See
//! spec §4.1.

/// Axis-aligned bounding box in pixel coordinates (corner format).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Create a box from corner coordinates.
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Clip the box into `[0, frame_width] × [0, frame_height]`.
    ///
    /// Side-effect-free: returns a new box.
    pub fn clamp_to(&self, frame_width: f32, frame_height: f32) -> BoundingBox {
        BoundingBox {
            left: self.left.clamp(0.0, frame_width),
            top: self.top.clamp(0.0, frame_height),
            right: self.right.clamp(0.0, frame_width),
            bottom: self.bottom.clamp(0.0, frame_height),
        }
    }

    /// Area of the box: `(right - left) * (bottom - top)`.
    ///
    /// Each extent is clamped at 0 first, so degenerate or inverted boxes
    /// yield 0 and never a negative value.
    pub fn area(&self) -> f32 {
        let width = (self.right - self.left).max(0.0);
        let height = (self.bottom - self.top).max(0.0);
        width * height
    }

    /// Intersection-over-union with `other`, in `[0, 1]`.
    ///
    /// Intersection width and height are each clamped at 0, so
    /// non-overlapping boxes give 0. If the union area is 0, the result is
    /// defined as 0 (guards division by zero).
    pub fn iou(&self, other: &BoundingBox) -> f32 {
        let inter_left = self.left.max(other.left);
        let inter_top = self.top.max(other.top);
        let inter_right = self.right.min(other.right);
        let inter_bottom = self.bottom.min(other.bottom);

        let inter_width = (inter_right - inter_left).max(0.0);
        let inter_height = (inter_bottom - inter_top).max(0.0);
        let intersection = inter_width * inter_height;

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}
