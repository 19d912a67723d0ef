//! Per-page drawer: visibility-driven loading and rendering
//!
//! A [`PageDrawer`] decides on every paint pass whether its page intersects
//! the visible area. A page entering view gets a spinner and an image load;
//! a page leaving view releases its surface and boxes. Load results arrive
//! later through the UI queue and are dropped if the page has left view in
//! the meantime.
//!
//! State machine:
//!
//! - `Hidden`: not visible, no surface, no boxes
//! - `Placeholder`: visible, image not loaded (grey area, spinner while loading)
//! - `Loaded`: visible with a surface, boxes drawn on top when enabled

use crate::canvas::{Canvas, Color, RenderContext, Spinner, SpinnerHandle};
use crate::config::ViewConfig;
use crate::geometry::{compute_visibility, Point, Rect, Size};
use crate::loaders::PageLoaders;
use crate::page::{Page, PageBox, PageId};
use crate::surface::Surface;
use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Observable state of a [`PageDrawer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Hidden,
    Placeholder,
    Loaded,
}

/// Stateful view-model of one page
pub struct PageDrawer {
    page: Arc<dyn Page>,
    max_size: Size,
    position: Point,
    size: Size,
    visible: bool,
    loading: bool,
    surface: Option<Surface>,
    boxes: Vec<PageBox>,
    show_all_boxes: bool,
    spinner: SpinnerHandle,
    placeholder_color: Color,
    box_color: Color,
}

impl PageDrawer {
    /// Create a hidden drawer at native size
    pub fn new(position: Point, page: Arc<dyn Page>, config: &ViewConfig) -> Self {
        let max_size = page.size();
        let spinner = Rc::new(RefCell::new(Spinner::new(
            page.id(),
            config.spinner_icon_size,
        )));
        let mut drawer = Self {
            page,
            max_size,
            position,
            size: max_size,
            visible: false,
            loading: false,
            surface: None,
            boxes: Vec::new(),
            show_all_boxes: config.show_all_boxes,
            spinner,
            placeholder_color: config.placeholder_color,
            box_color: config.box_color,
        };
        drawer.update_spinner_position();
        drawer
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn page_id(&self) -> PageId {
        self.page.id()
    }

    pub fn state(&self) -> DrawerState {
        match (self.visible, &self.surface) {
            (false, _) => DrawerState::Hidden,
            (true, None) => DrawerState::Placeholder,
            (true, Some(_)) => DrawerState::Loaded,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn boxes(&self) -> &[PageBox] {
        &self.boxes
    }

    pub fn spinner(&self) -> Ref<'_, Spinner> {
        self.spinner.borrow()
    }

    /// Native page size
    pub fn max_size(&self) -> Size {
        self.max_size
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Move the page. Recomputes the spinner position.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
        self.update_spinner_position();
    }

    /// Current render size
    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the page. Recomputes the spinner position.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.update_spinner_position();
    }

    /// Set the render size to `factor` times the native size, truncated
    pub fn set_size_ratio(&mut self, factor: f64) {
        self.set_size(self.max_size.scaled(factor));
    }

    pub fn show_all_boxes(&self) -> bool {
        self.show_all_boxes
    }

    /// Toggle the box overlay, repainting if the page is on screen
    pub fn set_show_all_boxes(&mut self, show: bool, canvas: &mut dyn Canvas) {
        if self.show_all_boxes == show {
            return;
        }
        self.show_all_boxes = show;
        if self.visible {
            canvas.redraw();
        }
    }

    fn update_spinner_position(&mut self) {
        let mut spinner = self.spinner.borrow_mut();
        let half_icon = spinner.icon_size() / 2.0;
        spinner.set_position(Point::new(
            self.position.x + (self.size.width as f64 / 2.0) - half_icon,
            self.position.y + (self.size.height as f64 / 2.0) - half_icon,
        ));
    }

    /// Animation tick, forwarded to the spinner while loading
    pub fn on_tick(&mut self) {
        if self.loading {
            self.spinner.borrow_mut().on_tick();
        }
    }

    /// Attach the spinner and queue an image load, unless one is in flight
    pub fn load_content(&mut self, canvas: &mut dyn Canvas, loaders: &PageLoaders) {
        if self.loading {
            return;
        }
        canvas.add_drawer(&self.spinner);
        self.loading = true;
        loaders.load_img(&self.page);
    }

    /// Image load result, delivered on the UI thread
    pub fn on_page_loading_img(
        &mut self,
        canvas: &mut dyn Canvas,
        loaders: &PageLoaders,
        page: PageId,
        surface: Surface,
    ) {
        if page != self.page_id() {
            tracing::debug!(expected = %self.page_id(), got = %page, "image for another page ignored");
            return;
        }
        if self.loading {
            canvas.remove_drawer(&self.spinner);
            self.loading = false;
        }
        if !self.visible {
            tracing::debug!(%page, "page left view before its image loaded, discarding");
            return;
        }
        self.surface = Some(surface);
        canvas.redraw();
        if self.boxes.is_empty() {
            loaders.load_boxes(&self.page);
        }
    }

    /// Box load result, delivered on the UI thread
    pub fn on_page_loading_boxes(
        &mut self,
        canvas: &mut dyn Canvas,
        page: PageId,
        boxes: Vec<PageBox>,
    ) {
        if page != self.page_id() || !self.visible {
            return;
        }
        self.boxes = boxes;
        if self.show_all_boxes {
            canvas.redraw();
        }
    }

    /// Detach the spinner and release the surface and boxes
    ///
    /// An in-flight load keeps running; its result is dropped on arrival.
    pub fn unload_content(&mut self, canvas: &mut dyn Canvas) {
        if self.loading {
            canvas.remove_drawer(&self.spinner);
            self.loading = false;
        }
        self.surface = None;
        self.boxes = Vec::new();
    }

    pub fn hide(&mut self, canvas: &mut dyn Canvas) {
        self.unload_content(canvas);
        self.visible = false;
    }

    /// Paint pass
    ///
    /// Runs the visibility transition first, then draws the placeholder or
    /// the surface, then the box outlines if enabled.
    pub fn draw(
        &mut self,
        ctx: &mut dyn RenderContext,
        canvas: &mut dyn Canvas,
        loaders: &PageLoaders,
        canvas_offset: Point,
        canvas_visible_size: Size,
    ) {
        let should_be_visible =
            compute_visibility(canvas_offset, canvas_visible_size, self.position, self.size);
        if should_be_visible && !self.visible {
            tracing::debug!(page = %self.page_id(), "page entered view");
            self.load_content(canvas, loaders);
        } else if !should_be_visible && self.visible {
            tracing::debug!(page = %self.page_id(), "page left view");
            self.unload_content(canvas);
        }
        self.visible = should_be_visible;

        if !self.visible {
            return;
        }

        match &self.surface {
            None => self.draw_tmp_area(ctx, canvas_offset),
            Some(surface) => self.draw_surface(ctx, surface, canvas_offset),
        }

        if self.show_all_boxes {
            self.draw_boxes(ctx, canvas_offset, &self.boxes, self.box_color);
        }
    }

    /// Screen-space rectangle covered by the page
    pub fn screen_rect(&self, canvas_offset: Point) -> Rect {
        Rect::from_origin_size(self.position - canvas_offset, self.size)
    }

    fn draw_tmp_area(&self, ctx: &mut dyn RenderContext, canvas_offset: Point) {
        ctx.fill_rect(self.screen_rect(canvas_offset), self.placeholder_color);
    }

    fn draw_surface(&self, ctx: &mut dyn RenderContext, surface: &Surface, canvas_offset: Point) {
        ctx.blit(surface, self.screen_rect(canvas_offset));
    }

    /// Screen-space rectangle of a box: scaled from native page coordinates
    /// to the current size, translated by the page position, truncated.
    pub fn box_rect(&self, word: &PageBox, canvas_offset: Point) -> Rect {
        let (x_factor, y_factor) = self.size.ratio_to(self.max_size);
        let (top_left, _) = word.position;

        let x = top_left.x * x_factor + self.position.x - canvas_offset.x;
        let y = top_left.y * y_factor + self.position.y - canvas_offset.y;
        let width = word.width() * x_factor;
        let height = word.height() * y_factor;

        Rect::new(x.trunc(), y.trunc(), width.trunc(), height.trunc())
    }

    fn draw_boxes(
        &self,
        ctx: &mut dyn RenderContext,
        canvas_offset: Point,
        boxes: &[PageBox],
        color: Color,
    ) {
        for word in boxes {
            ctx.stroke_rect(self.box_rect(word, canvas_offset), color, 1.0);
        }
    }
}

impl std::fmt::Debug for PageDrawer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageDrawer")
            .field("page", &self.page_id())
            .field("position", &self.position)
            .field("size", &self.size)
            .field("state", &self.state())
            .field("loading", &self.loading)
            .field("boxes", &self.boxes.len())
            .finish()
    }
}
