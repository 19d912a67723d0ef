//! Vertical page layout: the UI-side owner of all page drawers
//!
//! The layout is the single-threaded context that load results are posted
//! to. The event loop calls [`PageLayout::process_pending`] when idle and
//! [`PageLayout::draw`] on every paint.

use crate::canvas::{Canvas, RenderContext};
use crate::config::ViewConfig;
use crate::drawer::PageDrawer;
use crate::geometry::{Point, Size};
use crate::loaders::{LayoutSender, PageLoaders};
use crate::page::{Page, PageBox, PageId};
use crate::surface::Surface;
use pageview_scheduler::{IdleQueue, SchedulerConfig, SchedulerResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Pages of one document stacked top to bottom
pub struct PageLayout {
    drawers: Vec<PageDrawer>,
    index: HashMap<PageId, usize>,
    canvas: Box<dyn Canvas>,
    loaders: PageLoaders,
    idle: IdleQueue<PageLayout>,
    config: ViewConfig,
    size_ratio: f64,
}

impl PageLayout {
    /// Build a layout with one drawer per page, at native size.
    ///
    /// Loader schedulers are not started; call [`PageLayout::start`].
    pub fn new(pages: Vec<Arc<dyn Page>>, canvas: Box<dyn Canvas>, config: ViewConfig) -> Self {
        Self::with_scheduler_config(pages, canvas, config, SchedulerConfig::default())
    }

    pub fn with_scheduler_config(
        pages: Vec<Arc<dyn Page>>,
        canvas: Box<dyn Canvas>,
        config: ViewConfig,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        let idle = IdleQueue::new();
        let loaders = PageLoaders::with_scheduler_config(idle.sender(), &config, scheduler_config);

        let mut index = HashMap::with_capacity(pages.len());
        let drawers: Vec<PageDrawer> = pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| {
                index.insert(page.id(), i);
                PageDrawer::new(Point::ORIGIN, page, &config)
            })
            .collect();

        let mut layout = Self {
            drawers,
            index,
            canvas,
            loaders,
            idle,
            config,
            size_ratio: 1.0,
        };
        layout.relayout();
        layout
    }

    /// Start the image and box loader threads
    pub fn start(&self) -> SchedulerResult<()> {
        self.loaders.start()
    }

    pub fn loaders(&self) -> &PageLoaders {
        &self.loaders
    }

    /// Sender for posting tasks onto this layout's UI queue
    pub fn idle_sender(&self) -> LayoutSender {
        self.idle.sender()
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn drawers(&self) -> &[PageDrawer] {
        &self.drawers
    }

    pub fn drawer(&self, page: PageId) -> Option<&PageDrawer> {
        self.index.get(&page).map(|&i| &self.drawers[i])
    }

    pub fn size_ratio(&self) -> f64 {
        self.size_ratio
    }

    /// Zoom every page to `factor` times its native size and re-stack them
    pub fn set_size_ratio(&mut self, factor: f64) {
        self.size_ratio = factor;
        for drawer in &mut self.drawers {
            drawer.set_size_ratio(factor);
        }
        self.relayout();
        self.canvas.redraw();
    }

    fn relayout(&mut self) {
        let mut y = 0.0;
        for drawer in &mut self.drawers {
            drawer.set_position(Point::new(0.0, y));
            y += drawer.size().height as f64 + self.config.page_spacing;
        }
    }

    /// Total size of the laid-out document
    pub fn document_size(&self) -> Size {
        let width = self
            .drawers
            .iter()
            .map(|d| d.size().width)
            .max()
            .unwrap_or(0);
        let pages: f64 = self.drawers.iter().map(|d| d.size().height as f64).sum();
        let gaps = self.drawers.len().saturating_sub(1) as f64 * self.config.page_spacing;
        Size::new(width, (pages + gaps) as u32)
    }

    pub fn set_show_all_boxes(&mut self, show: bool) {
        self.config.show_all_boxes = show;
        for drawer in &mut self.drawers {
            drawer.set_show_all_boxes(show, self.canvas.as_mut());
        }
    }

    /// Paint every page for the given viewport
    pub fn draw(
        &mut self,
        ctx: &mut dyn RenderContext,
        canvas_offset: Point,
        canvas_visible_size: Size,
    ) {
        let canvas = self.canvas.as_mut();
        for drawer in &mut self.drawers {
            drawer.draw(ctx, canvas, &self.loaders, canvas_offset, canvas_visible_size);
        }
    }

    pub fn on_tick(&mut self) {
        for drawer in &mut self.drawers {
            drawer.on_tick();
        }
    }

    /// Run the load results posted so far, in posting order.
    ///
    /// Returns the number of tasks run.
    pub fn process_pending(&mut self) -> usize {
        let tasks = self.idle.take_pending();
        let count = tasks.len();
        for task in tasks {
            task(self);
        }
        count
    }

    /// Route an image result to its page's drawer
    pub fn on_page_loading_img(&mut self, page: PageId, surface: Surface) {
        let Some(&i) = self.index.get(&page) else {
            tracing::debug!(%page, "image for unknown page ignored");
            return;
        };
        self.drawers[i].on_page_loading_img(self.canvas.as_mut(), &self.loaders, page, surface);
    }

    /// Route a box result to its page's drawer
    pub fn on_page_loading_boxes(&mut self, page: PageId, boxes: Vec<PageBox>) {
        let Some(&i) = self.index.get(&page) else {
            tracing::debug!(%page, "boxes for unknown page ignored");
            return;
        };
        self.drawers[i].on_page_loading_boxes(self.canvas.as_mut(), page, boxes);
    }

    /// Hide every page and release their content
    pub fn hide_all(&mut self) {
        for drawer in &mut self.drawers {
            drawer.hide(self.canvas.as_mut());
        }
    }
}

impl Drop for PageLayout {
    fn drop(&mut self) {
        // Never block the UI thread on a running decode
        self.loaders.detach();
    }
}
