//! Geometry primitives for page layout and drawing
//!
//! Document coordinates: origin at the top-left of the first page, y grows
//! downwards, units are canvas pixels at the current zoom.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or offset) in document or page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Integer dimensions of a page or viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions by `factor`, truncating toward zero
    pub fn scaled(self, factor: f64) -> Size {
        Size::new(
            (factor * self.width as f64) as u32,
            (factor * self.height as f64) as u32,
        )
    }

    /// Per-axis ratio `self / reference`. A zero reference dimension gives 0.
    pub fn ratio_to(self, reference: Size) -> (f64, f64) {
        let ratio = |value: u32, base: u32| {
            if base == 0 {
                0.0
            } else {
                value as f64 / base as f64
            }
        };
        (
            ratio(self.width, reference.width),
            ratio(self.height, reference.height),
        )
    }
}

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at `origin` with the given integer size
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width as f64, size.height as f64)
    }
}

/// Whether an element at `position` with `size` intersects the visible area.
///
/// The element is hidden only when it lies entirely before or entirely after
/// the visible area on one axis; touching edges count as visible.
pub fn compute_visibility(
    canvas_offset: Point,
    canvas_visible_size: Size,
    position: Point,
    size: Size,
) -> bool {
    if position.x + (size.width as f64) < canvas_offset.x {
        return false;
    }
    if canvas_offset.x + (canvas_visible_size.width as f64) < position.x {
        return false;
    }
    if position.y + (size.height as f64) < canvas_offset.y {
        return false;
    }
    if canvas_offset.y + (canvas_visible_size.height as f64) < position.y {
        return false;
    }
    true
}
