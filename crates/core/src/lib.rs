//! Page View Core Library
//!
//! Visibility-driven loading of document pages.
//!
//! A [`PageLayout`] stacks one [`PageDrawer`] per page. On each paint pass a
//! drawer that scrolls into view queues an image load on the image
//! scheduler; once the image arrives it queues a box load on the box
//! scheduler. Drawers that scroll out of view drop their content, and late
//! results for them are discarded.
//!
//! Loads run on [`pageview_scheduler`] worker threads. Their results are
//! posted to the layout's UI queue and applied by
//! [`PageLayout::process_pending`], so drawers are only ever touched from
//! the thread that owns the layout.

pub mod canvas;
pub mod config;
pub mod drawer;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod loaders;
pub mod page;
pub mod surface;

#[cfg(test)]
mod test_support;

pub use canvas::{
    Canvas, Color, RenderContext, Spinner, SpinnerHandle, DEFAULT_SPINNER_ICON_SIZE,
};
pub use config::{ViewConfig, PAGE_BOXES_PRIORITY, PAGE_IMG_PRIORITY};
pub use drawer::{DrawerState, PageDrawer};
pub use error::{ConfigError, LoadError, LoadResult};
pub use geometry::{compute_visibility, Point, Rect, Size};
pub use layout::PageLayout;
pub use loaders::{
    LayoutSender, PageBoxesLoaderFactory, PageBoxesLoaderJob, PageImgLoaderFactory,
    PageImgLoaderJob, PageLoaders, PAGE_BOXES_LOADER, PAGE_IMG_LOADER,
};
pub use page::{Page, PageBox, PageId};
pub use surface::Surface;
