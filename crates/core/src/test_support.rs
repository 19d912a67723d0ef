//! Fakes shared by the unit tests

use crate::canvas::{Canvas, Color, RenderContext, Spinner, SpinnerHandle};
use crate::error::{LoadError, LoadResult};
use crate::geometry::{Rect, Size};
use crate::page::{Page, PageBox, PageId};
use crate::surface::Surface;
use image::{DynamicImage, Rgba, RgbaImage};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// In-memory page with a blank image and two boxes
pub(crate) struct FakePage {
    id: PageId,
    size: Size,
    fail: bool,
}

impl FakePage {
    pub(crate) fn new(id: usize, size: Size) -> Self {
        Self {
            id: PageId(id),
            size,
            fail: false,
        }
    }

    /// Every load on this page fails
    pub(crate) fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Page for FakePage {
    fn id(&self) -> PageId {
        self.id
    }

    fn size(&self) -> Size {
        self.size
    }

    fn image(&self) -> LoadResult<DynamicImage> {
        if self.fail {
            return Err(LoadError::PageNotFound(self.id));
        }
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            8,
            10,
            Rgba([255, 255, 255, 255]),
        )))
    }

    fn boxes(&self) -> LoadResult<Vec<PageBox>> {
        if self.fail {
            return Err(LoadError::Boxes {
                page: self.id,
                reason: "backend unavailable".to_string(),
            });
        }
        Ok(vec![
            PageBox::new(((10.0, 10.0), (60.0, 20.0)), "hello"),
            PageBox::new(((70.0, 10.0), (120.0, 20.0)), "world"),
        ])
    }
}

pub(crate) fn test_surface() -> Surface {
    Surface::from_rgba(RgbaImage::new(4, 4))
}

#[derive(Default)]
struct CanvasLog {
    attached: HashMap<PageId, SpinnerHandle>,
    added: HashMap<PageId, usize>,
    removed: HashMap<PageId, usize>,
    redraws: usize,
}

/// Canvas that keeps attached spinners and counts repaint requests
///
/// Clones share the same log, so a test can keep one handle while the
/// layout owns another.
#[derive(Clone, Default)]
pub(crate) struct RecordingCanvas {
    log: Rc<RefCell<CanvasLog>>,
}

impl RecordingCanvas {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn has_spinner(&self, page: PageId) -> bool {
        self.log.borrow().attached.contains_key(&page)
    }

    /// State of the spinner attached for `page`, as the canvas would paint it
    pub(crate) fn attached_spinner(&self, page: PageId) -> Option<Spinner> {
        self.log
            .borrow()
            .attached
            .get(&page)
            .map(|spinner| spinner.borrow().clone())
    }

    pub(crate) fn add_count(&self, page: PageId) -> usize {
        self.log.borrow().added.get(&page).copied().unwrap_or(0)
    }

    pub(crate) fn remove_count(&self, page: PageId) -> usize {
        self.log.borrow().removed.get(&page).copied().unwrap_or(0)
    }

    pub(crate) fn redraws(&self) -> usize {
        self.log.borrow().redraws
    }
}

impl Canvas for RecordingCanvas {
    fn add_drawer(&mut self, spinner: &SpinnerHandle) {
        let owner = spinner.borrow().owner();
        let mut log = self.log.borrow_mut();
        let previous = log.attached.insert(owner, Rc::clone(spinner));
        assert!(previous.is_none(), "spinner of {owner} attached twice");
        *log.added.entry(owner).or_default() += 1;
    }

    fn remove_drawer(&mut self, spinner: &SpinnerHandle) {
        let owner = spinner.borrow().owner();
        let mut log = self.log.borrow_mut();
        let removed = log.attached.remove(&owner);
        assert!(removed.is_some(), "spinner of {owner} removed while detached");
        *log.removed.entry(owner).or_default() += 1;
    }

    fn redraw(&mut self) {
        self.log.borrow_mut().redraws += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    Fill(Rect, Color),
    Stroke(Rect, Color, f64),
    Blit(Rect),
}

/// Render context that records every primitive
#[derive(Default)]
pub(crate) struct RecordingContext {
    ops: Vec<DrawOp>,
}

impl RecordingContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn ops(&self) -> Vec<DrawOp> {
        self.ops.clone()
    }

    pub(crate) fn clear(&mut self) {
        self.ops.clear();
    }
}

impl RenderContext for RecordingContext {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.ops.push(DrawOp::Stroke(rect, color, line_width));
    }

    fn blit(&mut self, _surface: &Surface, dest: Rect) {
        self.ops.push(DrawOp::Blit(dest));
    }
}
