use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbaImage;
use photo_carousel::carousel::runtime::CarouselRuntime;
use photo_carousel::carousel::transition::TransitionController;
use photo_carousel::events::NavigationCommand;
use photo_carousel::picture::{CarouselFeed, PictureCatalog};
use photo_carousel::render::lifecycle::lifecycle_queue;
use photo_carousel::render::recording::{Call, RecordingBackend};
use photo_carousel::render::supersample::Supersampler;

fn runtime(pictures: usize, samples: usize) -> CarouselRuntime {
    let (producer, consumer) = lifecycle_queue();
    let catalog = Arc::new(PictureCatalog::new());
    let feed = CarouselFeed::new(Arc::clone(&catalog), producer.clone());
    for i in 0..pictures {
        feed.add_picture(&format!("p{i}"), RgbaImage::new(40, 30));
    }
    CarouselRuntime::new(catalog, producer, consumer, TransitionController::default())
        .with_supersampler(Supersampler::new(samples))
}

/// Calls of the most recent frame, `BeginFrame` through `EndFrame`.
fn last_frame(backend: &RecordingBackend) -> Vec<Call> {
    let calls = backend.calls();
    let start = calls
        .iter()
        .rposition(|call| matches!(call, Call::BeginFrame))
        .unwrap();
    calls[start..].iter().map(|call| (*call).clone()).collect()
}

#[test]
fn each_frame_accumulates_one_weighted_pass_per_sample() {
    let mut runtime = runtime(4, 4);
    let mut backend = RecordingBackend::new((640, 480));
    runtime.tick(Instant::now(), &mut backend).unwrap();

    let frame = last_frame(&backend);
    assert!(matches!(frame.last(), Some(Call::EndFrame)));
    let clears = frame.iter().filter(|c| matches!(c, Call::Clear)).count();
    let weights: Vec<f32> = frame
        .iter()
        .filter_map(|c| match c {
            Call::Accumulate(weight) => Some(*weight),
            _ => None,
        })
        .collect();
    assert_eq!(clears, 4);
    assert_eq!(weights, vec![0.25; 4]);

    // Every pass draws the same scene.
    let draws = frame.iter().filter(|c| matches!(c, Call::DrawQuad(_))).count();
    assert!(draws > 0);
    assert_eq!(draws % 4, 0);

    // Projections differ between passes by the jitter offset only.
    let projections: Vec<_> = frame
        .iter()
        .filter_map(|c| match c {
            Call::SetProjection(m) => Some(*m),
            _ => None,
        })
        .collect();
    assert_eq!(projections.len(), 4);
    assert!(projections.windows(2).any(|p| p[0] != p[1]));
}

#[test]
fn disabled_supersampling_draws_a_single_pass() {
    let mut runtime = runtime(2, 1);
    let mut backend = RecordingBackend::new((640, 480));
    runtime.tick(Instant::now(), &mut backend).unwrap();

    let frame = last_frame(&backend);
    assert_eq!(frame.iter().filter(|c| matches!(c, Call::Clear)).count(), 1);
    assert!(!frame.iter().any(|c| matches!(c, Call::Accumulate(_))));
}

#[test]
fn shutdown_after_navigation_leaves_no_live_textures() {
    let mut runtime = runtime(6, 3);
    let mut backend = RecordingBackend::new((800, 600));
    let mut now = Instant::now();
    runtime.tick(now, &mut backend).unwrap();

    for _ in 0..3 {
        runtime.commands().send(NavigationCommand::Next).unwrap();
        runtime.tick(now, &mut backend).unwrap();
        while runtime.controller().is_active() {
            now += Duration::from_millis(100);
            runtime.tick(now, &mut backend).unwrap();
        }
        runtime.tick(now, &mut backend).unwrap();
    }
    assert_eq!(runtime.window().snapshot().selected, 3);
    assert!(backend.live_textures() > 0);

    runtime.shutdown(&mut backend);
    assert_eq!(backend.live_textures(), 0);
    assert_eq!(backend.resource_threads().len(), 1);
}

#[test]
fn reported_passes_match_the_snapped_jitter_pattern() {
    // Seven samples snap to the eight-sample pattern.
    let mut carousel = runtime(2, 7);
    assert_eq!(carousel.passes(), 8);

    let mut backend = RecordingBackend::new((640, 480));
    carousel.tick(Instant::now(), &mut backend).unwrap();
    let frame = last_frame(&backend);
    let clears = frame.iter().filter(|c| matches!(c, Call::Clear)).count();
    assert_eq!(clears, carousel.passes());

    assert_eq!(runtime(2, 1).passes(), 1);
}
