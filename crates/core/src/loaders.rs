//! Loader jobs for page images and page boxes
//!
//! Each job loads one resource of one page on a scheduler thread. Its
//! factory wires the job's progress event to an idle task, so the result
//! reaches the page's drawer on the UI thread and never from the worker.

use crate::config::ViewConfig;
use crate::layout::PageLayout;
use crate::page::{Page, PageBox, PageId};
use crate::surface::Surface;
use pageview_scheduler::{
    CancellationToken, IdleSender, Job, JobEvents, JobFactory, JobId, JobPriority, JobScheduler,
    SchedulerConfig, SchedulerResult,
};
use std::sync::Arc;

/// Factory name of page image jobs
pub const PAGE_IMG_LOADER: &str = "PageImgLoader";

/// Factory name of page box jobs
pub const PAGE_BOXES_LOADER: &str = "PageBoxesLoader";

/// Sender posting tasks onto the layout's UI queue
pub type LayoutSender = IdleSender<PageLayout>;

/// Decodes a page image and converts it to a [`Surface`]
pub struct PageImgLoaderJob {
    id: JobId,
    priority: JobPriority,
    page: Arc<dyn Page>,
    events: JobEvents<Surface>,
}

impl PageImgLoaderJob {
    pub fn new(id: JobId, priority: JobPriority, page: Arc<dyn Page>) -> Self {
        Self {
            id,
            priority,
            page,
            events: JobEvents::new(),
        }
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn events_mut(&mut self) -> &mut JobEvents<Surface> {
        &mut self.events
    }
}

impl Job for PageImgLoaderJob {
    fn id(&self) -> JobId {
        self.id
    }

    fn factory_name(&self) -> &'static str {
        PAGE_IMG_LOADER
    }

    fn priority(&self) -> JobPriority {
        self.priority
    }

    fn run(&mut self, _token: &CancellationToken) {
        let page = &self.page;
        tracing::debug!(page = %page.id(), job_id = self.id, "loading page image");
        self.events
            .run_guarded(self.id, || page.image().map(Surface::from_image));
    }
}

/// Loads the positioned text boxes of a page
pub struct PageBoxesLoaderJob {
    id: JobId,
    priority: JobPriority,
    page: Arc<dyn Page>,
    events: JobEvents<Vec<PageBox>>,
}

impl PageBoxesLoaderJob {
    pub fn new(id: JobId, priority: JobPriority, page: Arc<dyn Page>) -> Self {
        Self {
            id,
            priority,
            page,
            events: JobEvents::new(),
        }
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn events_mut(&mut self) -> &mut JobEvents<Vec<PageBox>> {
        &mut self.events
    }
}

impl Job for PageBoxesLoaderJob {
    fn id(&self) -> JobId {
        self.id
    }

    fn factory_name(&self) -> &'static str {
        PAGE_BOXES_LOADER
    }

    fn priority(&self) -> JobPriority {
        self.priority
    }

    fn run(&mut self, _token: &CancellationToken) {
        let page = &self.page;
        tracing::debug!(page = %page.id(), job_id = self.id, "loading page boxes");
        self.events.run_guarded(self.id, || page.boxes());
    }
}

/// Builds [`PageImgLoaderJob`]s whose result is delivered to the layout
#[derive(Debug)]
pub struct PageImgLoaderFactory {
    factory: JobFactory,
    priority: JobPriority,
}

impl PageImgLoaderFactory {
    pub fn new(priority: JobPriority) -> Self {
        Self {
            factory: JobFactory::new(PAGE_IMG_LOADER),
            priority,
        }
    }

    pub fn name(&self) -> &'static str {
        self.factory.name()
    }

    /// Mint a job for `page`. On success the surface is posted to `target`,
    /// which hands it to the drawer of that page.
    pub fn make(&self, target: &LayoutSender, page: Arc<dyn Page>) -> PageImgLoaderJob {
        let page_id = page.id();
        let mut job = PageImgLoaderJob::new(self.factory.next_id(), self.priority, page);
        let target = target.clone();
        job.events_mut().connect_progress(move |_, surface| {
            target.add(move |layout: &mut PageLayout| layout.on_page_loading_img(page_id, surface));
        });
        job
    }
}

/// Builds [`PageBoxesLoaderJob`]s whose result is delivered to the layout
#[derive(Debug)]
pub struct PageBoxesLoaderFactory {
    factory: JobFactory,
    priority: JobPriority,
}

impl PageBoxesLoaderFactory {
    pub fn new(priority: JobPriority) -> Self {
        Self {
            factory: JobFactory::new(PAGE_BOXES_LOADER),
            priority,
        }
    }

    pub fn name(&self) -> &'static str {
        self.factory.name()
    }

    pub fn make(&self, target: &LayoutSender, page: Arc<dyn Page>) -> PageBoxesLoaderJob {
        let page_id = page.id();
        let mut job = PageBoxesLoaderJob::new(self.factory.next_id(), self.priority, page);
        let target = target.clone();
        job.events_mut().connect_progress(move |_, boxes| {
            target.add(move |layout: &mut PageLayout| {
                layout.on_page_loading_boxes(page_id, boxes)
            });
        });
        job
    }
}

/// The factories and schedulers page drawers submit their loads to
///
/// Images and boxes each get their own scheduler, so an image decode never
/// waits behind box extraction and vice versa.
pub struct PageLoaders {
    img_factory: PageImgLoaderFactory,
    boxes_factory: PageBoxesLoaderFactory,
    img_scheduler: JobScheduler,
    boxes_scheduler: JobScheduler,
    target: LayoutSender,
}

impl PageLoaders {
    /// Create loaders posting results to `target`. Schedulers are not started.
    pub fn new(target: LayoutSender, config: &ViewConfig) -> Self {
        Self::with_scheduler_config(target, config, SchedulerConfig::default())
    }

    pub fn with_scheduler_config(
        target: LayoutSender,
        config: &ViewConfig,
        scheduler_config: SchedulerConfig,
    ) -> Self {
        Self {
            img_factory: PageImgLoaderFactory::new(config.img_priority()),
            boxes_factory: PageBoxesLoaderFactory::new(config.boxes_priority()),
            img_scheduler: JobScheduler::with_config("page_img_loader", scheduler_config.clone()),
            boxes_scheduler: JobScheduler::with_config("page_boxes_loader", scheduler_config),
            target,
        }
    }

    /// Start both scheduler threads
    pub fn start(&self) -> SchedulerResult<()> {
        self.img_scheduler.start()?;
        self.boxes_scheduler.start()
    }

    /// Stop both schedulers, dropping queued loads
    pub fn stop(&self) {
        self.img_scheduler.stop();
        self.boxes_scheduler.stop();
    }

    /// Stop both schedulers without waiting for loads already running
    pub fn detach(&self) {
        self.img_scheduler.detach();
        self.boxes_scheduler.detach();
    }

    pub fn img_scheduler(&self) -> &JobScheduler {
        &self.img_scheduler
    }

    pub fn boxes_scheduler(&self) -> &JobScheduler {
        &self.boxes_scheduler
    }

    /// Queue an image load for `page`. Returns `false` if it could not be queued.
    pub fn load_img(&self, page: &Arc<dyn Page>) -> bool {
        let job = self.img_factory.make(&self.target, page.clone());
        Self::submit(&self.img_scheduler, page.id(), Box::new(job))
    }

    /// Queue a box load for `page`. Returns `false` if it could not be queued.
    pub fn load_boxes(&self, page: &Arc<dyn Page>) -> bool {
        let job = self.boxes_factory.make(&self.target, page.clone());
        Self::submit(&self.boxes_scheduler, page.id(), Box::new(job))
    }

    fn submit(scheduler: &JobScheduler, page: PageId, job: Box<dyn Job>) -> bool {
        match scheduler.schedule(job) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(%page, error = %err, "could not queue page load");
                false
            }
        }
    }
}
