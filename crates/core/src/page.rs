//! Page backend interface
//!
//! The document backend owns pages. The view only holds shared handles and
//! asks for the image and boxes from loader jobs, off the UI thread.

use crate::error::LoadResult;
use crate::geometry::{Point, Size};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a page within its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(pub usize);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A page provided by the document backend
///
/// `image` and `boxes` may block (decode, OCR lookup); they are only called
/// from loader jobs on scheduler threads.
pub trait Page: Send + Sync {
    fn id(&self) -> PageId;

    /// Native page size in pixels
    fn size(&self) -> Size;

    /// Decode the page image at native resolution
    fn image(&self) -> LoadResult<DynamicImage>;

    /// Positioned text regions, in native page coordinates
    fn boxes(&self) -> LoadResult<Vec<PageBox>>;
}

/// A recognised word and its rectangle on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageBox {
    /// `(top_left, bottom_right)` in native page coordinates
    pub position: (Point, Point),

    /// Text content of the region
    #[serde(default)]
    pub content: String,
}

impl PageBox {
    pub fn new(position: ((f64, f64), (f64, f64)), content: impl Into<String>) -> Self {
        let ((x0, y0), (x1, y1)) = position;
        Self {
            position: (Point::new(x0, y0), Point::new(x1, y1)),
            content: content.into(),
        }
    }

    pub fn width(&self) -> f64 {
        self.position.1.x - self.position.0.x
    }

    pub fn height(&self) -> f64 {
        self.position.1.y - self.position.0.y
    }
}
