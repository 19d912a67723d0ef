//! Rendering-surface interfaces consumed by page drawers
//!
//! The toolkit side implements [`Canvas`] (drawer registration, repaint
//! requests) and [`RenderContext`] (2D primitives). The spinner animation
//! itself is opaque here: drawers only move it and attach/detach it.

use crate::geometry::{Point, Rect};
use crate::page::PageId;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Default spinner icon edge, in pixels
pub const DEFAULT_SPINNER_ICON_SIZE: f64 = 48.0;

/// RGB color with normalized components (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Neutral grey painted where a page image is not loaded yet
    pub const PLACEHOLDER: Color = Color::rgb(0.85, 0.85, 0.85);

    /// Outline color of page boxes
    pub const BOX_OUTLINE: Color = Color::rgb(0.0, 0.85, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Spinner shared between its page drawer and the canvas
///
/// The drawer moves and animates it; the canvas keeps a clone of the handle
/// while it is attached and reads the current state on every paint.
pub type SpinnerHandle = Rc<RefCell<Spinner>>;

/// The shared surface that drawers render on
pub trait Canvas {
    /// Attach an extra drawer (the loading spinner) to the canvas
    fn add_drawer(&mut self, spinner: &SpinnerHandle);

    /// Detach a drawer previously attached with [`Canvas::add_drawer`]
    fn remove_drawer(&mut self, spinner: &SpinnerHandle);

    /// Request a repaint
    fn redraw(&mut self);
}

/// 2D drawing primitives for one paint pass
pub trait RenderContext {
    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);

    /// Draw `surface` scaled to fill `dest`
    fn blit(&mut self, surface: &Surface, dest: Rect);
}

/// Loading spinner shown in the middle of a page while its image loads
///
/// Identified by the page it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Spinner {
    owner: PageId,
    position: Point,
    icon_size: f64,
    frame: u32,
}

impl Spinner {
    pub fn new(owner: PageId, icon_size: f64) -> Self {
        Self {
            owner,
            position: Point::ORIGIN,
            icon_size,
            frame: 0,
        }
    }

    pub fn owner(&self) -> PageId {
        self.owner
    }

    /// Top-left corner of the icon in document coordinates
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn icon_size(&self) -> f64 {
        self.icon_size
    }

    /// Current animation frame
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Advance the animation by one tick
    pub fn on_tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }
}
