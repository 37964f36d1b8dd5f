use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use photo_carousel::carousel::runtime::CarouselRuntime;
use photo_carousel::carousel::transition::TransitionController;
use photo_carousel::carousel::{Slot, WindowSnapshot};
use photo_carousel::events::{NavigationCommand, SessionKind, TransitionEvent};
use photo_carousel::picture::{CarouselFeed, PictureCatalog};
use photo_carousel::render::TextureId;
use photo_carousel::render::lifecycle::lifecycle_queue;
use photo_carousel::render::recording::RecordingBackend;

/// 30×20 pictures give 60×40 quads.
const QUAD_HEIGHT: f32 = 40.0;

struct Harness {
    runtime: CarouselRuntime,
    backend: RecordingBackend,
    now: Instant,
}

impl Harness {
    fn new(pictures: usize) -> Self {
        let (producer, consumer) = lifecycle_queue();
        let catalog = Arc::new(PictureCatalog::new());
        let feed = CarouselFeed::new(Arc::clone(&catalog), producer.clone());
        for i in 0..pictures {
            feed.add_picture(&format!("p{i}"), RgbaImage::new(30, 20));
        }
        let runtime =
            CarouselRuntime::new(catalog, producer, consumer, TransitionController::default());
        let mut harness = Self {
            runtime,
            backend: RecordingBackend::new((1024, 768)),
            now: Instant::now(),
        };
        harness.tick();
        harness
    }

    fn tick(&mut self) {
        self.runtime.tick(self.now, &mut self.backend).unwrap();
    }

    /// Send `command`, let the whole plan finish, then drain once more so
    /// requested quads are installed.
    fn navigate(&mut self, command: NavigationCommand) {
        self.runtime.commands().send(command).unwrap();
        self.tick();
        while self.runtime.controller().is_active() {
            self.now += Duration::from_secs(1);
            self.tick();
        }
        self.tick();
    }

    fn snapshot(&self) -> WindowSnapshot {
        self.runtime.window().snapshot()
    }

    fn names(&self) -> [Option<String>; 4] {
        let snapshot = self.snapshot();
        Slot::ALL.map(|slot| snapshot.slot(slot).map(|entry| entry.name.clone()))
    }
}

fn names(expected: [Option<&str>; 4]) -> [Option<String>; 4] {
    expected.map(|name| name.map(str::to_owned))
}

#[test]
fn forward_slides_rotate_slots_and_retire_left_once() {
    let mut h = Harness::new(5);
    assert_eq!(h.names(), names([None, Some("p0"), Some("p1"), Some("p2")]));

    h.navigate(NavigationCommand::Next);
    assert_eq!(h.snapshot().selected, 1);
    assert_eq!(h.names(), names([Some("p0"), Some("p1"), Some("p2"), Some("p3")]));
    assert!(h.backend.destroyed().is_empty());

    h.navigate(NavigationCommand::Next);
    assert_eq!(h.snapshot().selected, 2);
    assert_eq!(h.names(), names([Some("p1"), Some("p2"), Some("p3"), Some("p4")]));
    // p0 was the first texture uploaded.
    assert_eq!(h.backend.destroyed(), vec![TextureId(1)]);

    let snapshot = h.snapshot();
    for slot in Slot::ALL {
        let entry = snapshot.slot(slot).unwrap();
        assert!(entry.initialized);
        let pose = slot.resting_pose(QUAD_HEIGHT);
        assert!((entry.transform.position - pose.position).length() < 1e-4, "{slot:?}");
        assert_eq!(entry.transform.rotation, pose.rotation);
    }
}

#[test]
fn backward_slide_mirrors_forward() {
    let mut h = Harness::new(5);
    h.navigate(NavigationCommand::Next);
    h.navigate(NavigationCommand::Next);
    let destroyed_before = h.backend.destroyed().len();

    h.navigate(NavigationCommand::Previous);
    assert_eq!(h.snapshot().selected, 1);
    assert_eq!(h.names(), names([Some("p0"), Some("p1"), Some("p2"), Some("p3")]));
    assert_eq!(h.backend.destroyed().len(), destroyed_before + 1);
}

#[test]
fn next_at_last_picture_changes_nothing() {
    let mut h = Harness::new(3);
    h.navigate(NavigationCommand::Next);
    h.navigate(NavigationCommand::Next);
    assert_eq!(h.snapshot().selected, 2);
    assert_eq!(h.names(), names([Some("p1"), Some("p2"), None, None]));
    assert!(!h.runtime.navigation().can_next);

    let before = h.snapshot();
    h.navigate(NavigationCommand::Next);
    assert_eq!(h.snapshot(), before);
}

#[test]
fn previous_at_first_picture_changes_nothing() {
    let mut h = Harness::new(3);
    let before = h.snapshot();
    h.navigate(NavigationCommand::Previous);
    assert_eq!(h.snapshot(), before);
    assert!(h.backend.destroyed().is_empty());
}

#[test]
fn mid_slide_incoming_quad_is_between_poses() {
    let mut h = Harness::new(4);
    h.runtime.commands().send(NavigationCommand::Next).unwrap();
    h.tick();
    h.now += Duration::from_millis(400);
    h.tick();

    let snapshot = h.snapshot();
    let incoming = snapshot.slot(Slot::Next).unwrap();
    let scale = incoming.transform.scale.x;
    assert!(scale > 0.5 && scale < 1.0, "scale {scale}");
    assert!(incoming.transform.position.x < 36.0 && incoming.transform.position.x > -7.0);
    assert_eq!(snapshot.selected, 0);
}

#[test]
fn completion_is_published_once_per_session() {
    let mut h = Harness::new(4);
    let events = h.runtime.subscribe();
    h.navigate(NavigationCommand::ToggleShow);
    h.navigate(NavigationCommand::Next);

    let completed: Vec<SessionKind> = events
        .try_iter()
        .filter_map(|event| match event {
            TransitionEvent::Completed { kind, .. } => Some(kind),
            TransitionEvent::NavigationChanged(_) => None,
        })
        .collect();
    assert_eq!(completed.len(), 4);
    assert!(h.snapshot().showing);
    assert_eq!(h.snapshot().selected, 1);
}
