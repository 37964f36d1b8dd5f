//! Everything the render thread does once per tick.
//!
//! The order is fixed: drain the lifecycle queues, apply navigation
//! commands, advance the running session, then draw. GPU resources are
//! only ever touched from here, through the backend handed to `tick`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, unbounded};
use glam::{Vec2, Vec3};
use image::RgbaImage;
use tracing::{debug, info, trace, warn};

use super::captions::{CaptionWorker, RenderedCaption};
use super::transition::{TransitionController, caption_alpha};
use super::{CarouselWindow, WindowSnapshot};
use crate::config::Configuration;
use crate::events::{Direction, NavigationCommand, NavigationState, SessionKind, TransitionEvent};
use crate::picture::{PendingQuad, PictureCatalog, QuadProducer};
use crate::processing::label::{CaptionSource, LabelRenderer};
use crate::processing::shadow::ShadowBlur;
use crate::render::depth::DepthSort;
use crate::render::lifecycle::{LifecycleConsumer, lifecycle_queue};
use crate::render::renderable::Renderable;
use crate::render::supersample::Supersampler;
use crate::render::{Camera, OverlayDraw, RenderBackend, TextureId};

/// Caption baseline sits this many font sizes above the bottom edge.
const CAPTION_LIFT: f32 = 1.7;

/// Read-only view for debug overlays.
#[derive(Debug, Clone, PartialEq)]
pub struct DebugSnapshot {
    pub camera: Vec3,
    pub sigma: f64,
    pub phase: f64,
    pub window: WindowSnapshot,
    pub navigation: NavigationState,
}

#[derive(Debug, Clone, Copy)]
struct CaptionTexture {
    texture: TextureId,
    size: Vec2,
}

#[derive(Debug)]
struct Caption {
    current: Option<CaptionTexture>,
    /// Picture whose caption `current` shows, drawable or not.
    shown: Option<usize>,
    /// Requested when a slide starts, shown once the outgoing caption has
    /// faded out.
    incoming: Option<usize>,
    requested: HashSet<usize>,
    ready: HashMap<usize, Option<RgbaImage>>,
    alpha: f32,
}

impl Default for Caption {
    fn default() -> Self {
        Self {
            current: None,
            shown: None,
            incoming: None,
            requested: HashSet::new(),
            ready: HashMap::new(),
            alpha: 1.0,
        }
    }
}

/// Borrowed state the drain callbacks share.
struct DrainCtx<'a> {
    window: &'a mut CarouselWindow,
    backend: &'a mut dyn RenderBackend,
}

pub struct CarouselRuntime {
    catalog: Arc<PictureCatalog>,
    producer: QuadProducer,
    consumer: LifecycleConsumer<PendingQuad, Renderable>,
    window: CarouselWindow,
    controller: TransitionController,
    camera: Camera,
    supersampler: Supersampler,
    commands_tx: Sender<NavigationCommand>,
    commands: Receiver<NavigationCommand>,
    captions: Option<CaptionWorker>,
    caption: Caption,
    navigation: NavigationState,
    /// Catalog length when the window last asked for missing quads.
    arrivals_seen: usize,
}

impl std::fmt::Debug for CarouselRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarouselRuntime")
            .field("window", &self.window)
            .field("controller", &self.controller)
            .field("camera", &self.camera)
            .field("supersampler", &self.supersampler)
            .field("captions", &self.captions.is_some())
            .field("navigation", &self.navigation)
            .finish_non_exhaustive()
    }
}

impl CarouselRuntime {
    pub fn new(
        catalog: Arc<PictureCatalog>,
        producer: QuadProducer,
        consumer: LifecycleConsumer<PendingQuad, Renderable>,
        controller: TransitionController,
    ) -> Self {
        let (commands_tx, commands) = unbounded();
        Self {
            catalog,
            producer,
            consumer,
            window: CarouselWindow::new(),
            controller,
            camera: Camera::default(),
            supersampler: Supersampler::disabled(),
            commands_tx,
            commands,
            captions: None,
            caption: Caption::default(),
            navigation: NavigationState::default(),
            arrivals_seen: 0,
        }
    }

    /// Build a runtime from configuration with a fresh catalog and queue.
    /// Captions are disabled when no system font can be loaded.
    pub fn from_config(cfg: &Configuration) -> Self {
        let (producer, consumer) = lifecycle_queue();
        let controller =
            TransitionController::new(cfg.curve.build(), cfg.slide_duration, cfg.zoom_duration);
        let mut runtime = Self::new(Arc::new(PictureCatalog::new()), producer, consumer, controller)
            .with_camera(Camera::new(cfg.camera))
            .with_supersampler(Supersampler::new(cfg.effective_samples()));
        match LabelRenderer::from_system_fonts(cfg.label.font_size, ShadowBlur::from(&cfg.shadow)) {
            Ok(labels) => runtime = runtime.with_captions(Box::new(labels)),
            Err(err) => warn!("captions disabled: {err:#}"),
        }
        info!(
            passes = runtime.passes(),
            captions = runtime.captions.is_some(),
            "carousel runtime ready"
        );
        runtime
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_supersampler(mut self, supersampler: Supersampler) -> Self {
        self.supersampler = supersampler;
        self
    }

    /// Scene passes drawn per frame, after snapping to a supported pattern.
    pub fn passes(&self) -> usize {
        self.supersampler.passes()
    }

    /// Render captions from `captions` on a background thread.
    pub fn with_captions(mut self, captions: Box<dyn CaptionSource>) -> Self {
        self.captions = CaptionWorker::spawn(captions);
        self
    }

    pub fn catalog(&self) -> &Arc<PictureCatalog> {
        &self.catalog
    }

    /// Producer side of the lifecycle queue, for picture sources.
    pub fn producer(&self) -> QuadProducer {
        self.producer.clone()
    }

    /// Sender for navigation input. Commands are applied on the next tick.
    pub fn commands(&self) -> Sender<NavigationCommand> {
        self.commands_tx.clone()
    }

    pub fn window(&self) -> &CarouselWindow {
        &self.window
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }

    /// Curve parameters stay tunable while the carousel runs.
    pub fn controller_mut(&mut self) -> &mut TransitionController {
        &mut self.controller
    }

    pub fn subscribe(&mut self) -> Receiver<TransitionEvent> {
        self.controller.subscribe()
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn navigation(&self) -> NavigationState {
        self.navigation
    }

    /// Opacity the caption was drawn with on the last tick.
    pub fn caption_alpha(&self) -> f32 {
        self.caption.alpha
    }

    /// Catalog index whose caption is on screen.
    pub fn caption_picture(&self) -> Option<usize> {
        self.caption.shown
    }

    /// Whether captions have been requested and not yet collected.
    pub fn captions_pending(&self) -> bool {
        !self.caption.requested.is_empty()
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let curve = self.controller.curve();
        DebugSnapshot {
            camera: self.camera.eye,
            sigma: curve.sigma(),
            phase: curve.phase(),
            window: self.window.snapshot(),
            navigation: self.navigation,
        }
    }

    /// Run one render tick at `now`.
    pub fn tick(&mut self, now: Instant, backend: &mut dyn RenderBackend) -> anyhow::Result<()> {
        self.drain(backend);
        self.request_arrivals();
        self.collect_captions();
        self.apply_commands(now);
        self.advance(now, backend);
        self.refresh_navigation();
        self.render(backend)
    }

    fn drain(&mut self, backend: &mut dyn RenderBackend) {
        let mut ctx = DrainCtx {
            window: &mut self.window,
            backend,
        };
        self.consumer.drain_with(&mut ctx, install_pending, |ctx, mut quad| {
            quad.dispose(ctx.backend);
        });
    }

    /// Pictures appended after the window moved past the first three need
    /// their quads requested here; the feed only queues the initial window.
    fn request_arrivals(&mut self) {
        let len = self.catalog.len();
        if len == self.arrivals_seen || self.controller.is_active() {
            return;
        }
        self.arrivals_seen = len;
        self.window.request_missing(&self.catalog, &self.producer);
    }

    fn apply_commands(&mut self, now: Instant) {
        let len = self.catalog.len();
        while let Ok(command) = self.commands.try_recv() {
            match self.controller.request(command, &mut self.window, len, now) {
                Some(kind) => self.session_started(kind),
                None => trace!(?command, "command ignored"),
            }
        }
    }

    fn advance(&mut self, now: Instant, backend: &mut dyn RenderBackend) {
        let outcome = self
            .controller
            .tick(now, &mut self.window, &self.catalog, &self.producer);

        if let Some(progress) = outcome.progress {
            if matches!(progress.kind, SessionKind::Slide(_)) && outcome.completed.is_none() {
                let (alpha, swap) = caption_alpha(progress.raw);
                self.caption.alpha = alpha;
                if swap {
                    self.swap_caption(backend);
                }
            }
        }
        if let Some(SessionKind::Slide(_)) = outcome.completed {
            // A late tick can skip the faded-out moment entirely.
            self.swap_caption(backend);
            self.caption.alpha = 1.0;
        }
        if let Some(kind) = outcome.started {
            self.session_started(kind);
        }

        let sliding = matches!(
            self.controller.session().map(|session| session.kind),
            Some(SessionKind::Slide(_))
        );
        if !sliding && self.caption_picture() != Some(self.window.selected()) {
            self.show_caption_now(backend);
        }
    }

    fn session_started(&mut self, kind: SessionKind) {
        let SessionKind::Slide(direction) = kind else {
            return;
        };
        let selected = self.window.selected();
        let picture = match direction {
            Direction::Forward => selected + 1,
            Direction::Backward => selected.saturating_sub(1),
        };
        debug!(picture, "incoming caption requested");
        self.caption.incoming = Some(picture);
        self.request_caption(picture);
    }

    /// Move captions the worker has finished into the ready set. Results
    /// for pictures that are neither selected nor incoming are dropped.
    fn collect_captions(&mut self) {
        let Some(worker) = self.captions.as_ref() else {
            return;
        };
        let selected = self.window.selected();
        for RenderedCaption { picture, image } in worker.finished() {
            self.caption.requested.remove(&picture);
            if picture == selected || self.caption.incoming == Some(picture) {
                self.caption.ready.insert(picture, image);
            } else {
                trace!(picture, "stale caption dropped");
            }
        }
    }

    fn request_caption(&mut self, picture: usize) {
        let Some(worker) = self.captions.as_ref() else {
            return;
        };
        if self.caption.requested.contains(&picture) || self.caption.ready.contains_key(&picture) {
            return;
        }
        let Some(entry) = self.catalog.get(picture) else {
            return;
        };
        if worker.request(picture, entry.name()) {
            self.caption.requested.insert(picture);
        } else {
            warn!(picture, "caption worker is gone");
        }
    }

    fn swap_caption(&mut self, backend: &mut dyn RenderBackend) {
        let Some(picture) = self.caption.incoming.take() else {
            return;
        };
        match self.caption.ready.remove(&picture) {
            Some(image) => self.replace_caption(picture, image.as_ref(), backend),
            None => {
                debug!(picture, "incoming caption still rendering");
                self.clear_caption(backend);
            }
        }
    }

    fn show_caption_now(&mut self, backend: &mut dyn RenderBackend) {
        let picture = self.window.selected();
        if self.captions.is_none() || self.catalog.get(picture).is_none() {
            return;
        }
        match self.caption.ready.remove(&picture) {
            Some(image) => {
                self.replace_caption(picture, image.as_ref(), backend);
                self.caption.alpha = 1.0;
            }
            None => self.request_caption(picture),
        }
    }

    fn clear_caption(&mut self, backend: &mut dyn RenderBackend) {
        if let Some(old) = self.caption.current.take() {
            backend.destroy_texture(old.texture);
        }
        self.caption.shown = None;
    }

    fn replace_caption(
        &mut self,
        picture: usize,
        image: Option<&RgbaImage>,
        backend: &mut dyn RenderBackend,
    ) {
        self.clear_caption(backend);
        self.caption.shown = Some(picture);
        let Some(image) = image else {
            return;
        };
        match backend.create_texture(image) {
            Ok(texture) => {
                debug!(picture, texture = texture.0, "caption swapped");
                self.caption.current = Some(CaptionTexture {
                    texture,
                    size: Vec2::new(image.width() as f32, image.height() as f32),
                });
            }
            Err(err) => warn!(picture, "caption upload failed: {err:#}"),
        }
    }

    fn refresh_navigation(&mut self) {
        let navigation = self.window.navigation(self.catalog.len());
        if navigation == self.navigation {
            return;
        }
        self.navigation = navigation;
        if !self.controller.is_active() {
            debug!(?navigation, "navigation changed");
            self.controller
                .publish(TransitionEvent::NavigationChanged(navigation));
        }
    }

    fn render(&self, backend: &mut dyn RenderBackend) -> anyhow::Result<()> {
        backend.begin_frame();

        let view = self.camera.view();
        let mut items: Vec<Option<&Renderable>> = self.window.renderables().collect();
        DepthSort::new(view).sort(&mut items);
        self.supersampler.render(backend, |backend| {
            for item in items.iter().flatten() {
                item.render(view, backend);
            }
        });

        if let (Some(caption), Some(captions)) = (self.caption.current, self.captions.as_ref()) {
            let (width, height) = backend.viewport();
            backend.draw_overlay(&OverlayDraw {
                texture: caption.texture,
                origin: Vec2::new(
                    (width as f32 - caption.size.x) / 2.0,
                    height as f32 - captions.font_size() * CAPTION_LIFT,
                ),
                size: caption.size,
                opacity: self.caption.alpha,
            });
        }

        backend.end_frame()
    }

    /// Release every GPU resource the carousel holds. Pending quads are
    /// dropped without being uploaded.
    pub fn shutdown(&mut self, backend: &mut dyn RenderBackend) {
        let stats = self.consumer.drain_with(
            backend,
            |_, pending: PendingQuad| trace!(picture = pending.picture, "pending quad dropped"),
            |backend, mut quad: Renderable| quad.dispose(backend),
        );
        let mut released = stats.disposed;
        for mut quad in self.window.take_all() {
            quad.dispose(backend);
            released += 1;
        }
        self.clear_caption(backend);
        self.caption.incoming = None;
        self.caption.requested.clear();
        self.caption.ready.clear();
        info!(released, "carousel resources released");
    }
}

fn install_pending(ctx: &mut DrainCtx<'_>, pending: PendingQuad) {
    let PendingQuad { picture, mut quad } = pending;
    let Some(slot) = ctx.window.slot_for(picture) else {
        trace!(picture, "quad outside window; dropped");
        return;
    };
    if let Err(err) = quad.init(ctx.backend) {
        warn!(picture, "quad upload failed: {err:#}");
        return;
    }
    if let Err(mut quad) = ctx.window.install(slot, quad) {
        quad.dispose(ctx.backend);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use image::Rgba;

    use super::*;
    use crate::carousel::Slot;
    use crate::picture::CarouselFeed;
    use crate::render::recording::{Call, RecordingBackend};

    /// Captions whose width encodes the text length.
    struct BlockCaptions;

    impl CaptionSource for BlockCaptions {
        fn font_size(&self) -> f32 {
            10.0
        }

        fn render(&self, text: &str) -> Option<RgbaImage> {
            let width = text.len() as u32 * 4;
            (width > 0).then(|| RgbaImage::from_pixel(width, 8, Rgba([255, 255, 255, 255])))
        }
    }

    fn runtime_with(pictures: &[&str]) -> CarouselRuntime {
        let (producer, consumer) = lifecycle_queue();
        let catalog = Arc::new(PictureCatalog::new());
        let feed = CarouselFeed::new(Arc::clone(&catalog), producer.clone());
        for name in pictures {
            feed.add_picture(name, RgbaImage::new(30, 20));
        }
        CarouselRuntime::new(catalog, producer, consumer, TransitionController::default())
            .with_captions(Box::new(BlockCaptions))
    }

    /// Tick at `now` until every requested caption has been collected.
    fn settle(runtime: &mut CarouselRuntime, backend: &mut RecordingBackend, now: Instant) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            runtime.tick(now, backend).unwrap();
            if !runtime.captions_pending() {
                return;
            }
            assert!(Instant::now() < deadline, "captions never arrived");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn first_tick_installs_the_initial_window() {
        let mut runtime = runtime_with(&["a", "b", "c", "d", "e"]);
        let mut backend = RecordingBackend::new((800, 600));
        settle(&mut runtime, &mut backend, Instant::now());
        runtime.tick(Instant::now(), &mut backend).unwrap();

        let snapshot = runtime.window().snapshot();
        assert_eq!(snapshot.slot(Slot::Left), None);
        assert_eq!(snapshot.slot(Slot::Selected).unwrap().name, "a");
        assert_eq!(snapshot.slot(Slot::Next).unwrap().name, "b");
        assert_eq!(snapshot.slot(Slot::Right).unwrap().name, "c");
        // Three quads plus the caption.
        assert_eq!(backend.created().len(), 4);
        assert_eq!(
            runtime.navigation(),
            NavigationState {
                can_next: true,
                can_previous: false,
                can_show: true
            }
        );
    }

    #[test]
    fn frame_draws_reflections_and_caption_overlay() {
        let mut runtime = runtime_with(&["first", "second"]);
        let mut backend = RecordingBackend::new((800, 600));
        let now = Instant::now();
        settle(&mut runtime, &mut backend, now);
        runtime.tick(now, &mut backend).unwrap();
        backend.clear_log();
        runtime.tick(now, &mut backend).unwrap();

        // Two reflected quads, two draws each.
        assert_eq!(backend.draws().len(), 4);
        let overlays = backend.overlays();
        assert_eq!(overlays.len(), 1);
        assert_eq!(overlays[0].size, Vec2::new(20.0, 8.0));
        assert_eq!(overlays[0].origin, Vec2::new(390.0, 583.0));
        assert_eq!(backend.calls().last(), Some(&&Call::EndFrame));
    }

    #[test]
    fn slide_swaps_caption_once_faded_out() {
        let mut runtime = runtime_with(&["a", "bbbb", "c"]);
        let mut backend = RecordingBackend::new((800, 600));
        let start = Instant::now();
        settle(&mut runtime, &mut backend, start);
        runtime.tick(start, &mut backend).unwrap();
        assert_eq!(runtime.caption_picture(), Some(0));

        runtime.commands().send(NavigationCommand::Next).unwrap();
        settle(&mut runtime, &mut backend, start);
        runtime
            .tick(start + Duration::from_millis(200), &mut backend)
            .unwrap();
        assert_eq!(runtime.caption_picture(), Some(0));
        assert!((runtime.caption_alpha() - 0.5).abs() < 1e-6);

        runtime
            .tick(start + Duration::from_millis(400), &mut backend)
            .unwrap();
        assert_eq!(runtime.caption_picture(), Some(1));
        assert_eq!(runtime.caption_alpha(), 0.1);

        runtime
            .tick(start + Duration::from_millis(900), &mut backend)
            .unwrap();
        assert_eq!(runtime.window().selected(), 1);
        assert_eq!(runtime.caption_alpha(), 1.0);
    }

    #[test]
    fn navigation_changes_are_published() {
        let mut runtime = runtime_with(&["a"]);
        let events = runtime.subscribe();
        let mut backend = RecordingBackend::new((640, 480));
        runtime.tick(Instant::now(), &mut backend).unwrap();
        runtime.tick(Instant::now(), &mut backend).unwrap();

        let published: Vec<_> = events.try_iter().collect();
        assert_eq!(
            published,
            vec![TransitionEvent::NavigationChanged(NavigationState {
                can_next: false,
                can_previous: false,
                can_show: true
            })]
        );
    }

    #[test]
    fn shutdown_releases_every_texture() {
        let mut runtime = runtime_with(&["a", "b", "c", "d"]);
        let mut backend = RecordingBackend::new((640, 480));
        let start = Instant::now();
        runtime.tick(start, &mut backend).unwrap();
        runtime.commands().send(NavigationCommand::Next).unwrap();
        runtime.tick(start, &mut backend).unwrap();
        runtime.tick(start + Duration::from_secs(2), &mut backend).unwrap();
        runtime.tick(start + Duration::from_secs(2), &mut backend).unwrap();
        assert!(backend.live_textures() > 0);

        runtime.shutdown(&mut backend);
        assert_eq!(backend.live_textures(), 0);
        assert!(runtime.window().renderables().all(|item| item.is_none()));
    }

    #[test]
    fn picture_arriving_after_a_slide_fills_the_right_slot() {
        let (producer, consumer) = lifecycle_queue();
        let catalog = Arc::new(PictureCatalog::new());
        let feed = CarouselFeed::new(Arc::clone(&catalog), producer.clone());
        for name in ["a", "b", "c"] {
            feed.add_picture(name, RgbaImage::new(30, 20));
        }
        let mut runtime =
            CarouselRuntime::new(catalog, producer, consumer, TransitionController::default());
        let mut backend = RecordingBackend::new((640, 480));
        let start = Instant::now();
        runtime.tick(start, &mut backend).unwrap();
        runtime.commands().send(NavigationCommand::Next).unwrap();
        runtime.tick(start, &mut backend).unwrap();
        let done = start + Duration::from_secs(2);
        runtime.tick(done, &mut backend).unwrap();
        assert_eq!(runtime.window().selected(), 1);
        assert_eq!(runtime.window().snapshot().slot(Slot::Right), None);

        assert_eq!(feed.add_picture("d", RgbaImage::new(30, 20)), 3);
        runtime.tick(done, &mut backend).unwrap();
        runtime.tick(done, &mut backend).unwrap();
        let snapshot = runtime.window().snapshot();
        assert_eq!(snapshot.slot(Slot::Right).unwrap().name, "d");
        assert!(runtime.navigation().can_next);
    }

    #[test]
    fn debug_snapshot_reports_camera_and_curve() {
        let runtime = runtime_with(&[]).with_camera(Camera::new([1.0, 2.0, 90.0]));
        let snapshot = runtime.debug_snapshot();
        assert_eq!(snapshot.camera, Vec3::new(1.0, 2.0, 90.0));
        assert_eq!(snapshot.sigma, runtime.controller().curve().sigma());
        assert_eq!(snapshot.phase, runtime.controller().curve().phase());
        assert_eq!(snapshot.window.selected, 0);
    }

    /// Records the thread every caption is rendered on.
    struct ThreadCaptions(crossbeam_channel::Sender<std::thread::ThreadId>);

    impl CaptionSource for ThreadCaptions {
        fn font_size(&self) -> f32 {
            10.0
        }

        fn render(&self, text: &str) -> Option<RgbaImage> {
            let _ = self.0.send(std::thread::current().id());
            let label = RgbaImage::from_pixel(text.len() as u32 * 4, 8, Rgba([255; 4]));
            Some(ShadowBlur::default().create_shadow(&label))
        }
    }

    #[test]
    fn captions_and_shadows_render_off_the_tick_thread() {
        let (tx, rendered_on) = unbounded();
        let (producer, consumer) = lifecycle_queue();
        let catalog = Arc::new(PictureCatalog::new());
        let feed = CarouselFeed::new(Arc::clone(&catalog), producer.clone());
        for name in ["a", "b", "c"] {
            feed.add_picture(name, RgbaImage::new(30, 20));
        }
        let mut runtime =
            CarouselRuntime::new(catalog, producer, consumer, TransitionController::default())
                .with_captions(Box::new(ThreadCaptions(tx)));
        let mut backend = RecordingBackend::new((800, 600));
        let start = Instant::now();

        settle(&mut runtime, &mut backend, start);
        runtime.tick(start, &mut backend).unwrap();
        runtime.commands().send(NavigationCommand::Next).unwrap();
        settle(&mut runtime, &mut backend, start);
        runtime
            .tick(start + Duration::from_secs(2), &mut backend)
            .unwrap();
        assert_eq!(runtime.caption_picture(), Some(1));

        let threads: Vec<_> = rendered_on.try_iter().collect();
        assert_eq!(threads.len(), 2);
        let tick_thread = std::thread::current().id();
        assert!(threads.iter().all(|id| *id != tick_thread));
        // Uploads still happen where the backend lives.
        assert_eq!(backend.resource_threads().len(), 1);
    }
}
