//! End-to-end tests for the progressive renderer.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use proptest::prelude::*;

use sdf_kernel::geometry::point::Point3d;
use sdf_kernel::geometry::raycast::{MarchOutcome, MissReason, raycast3};
use sdf_kernel::shapes::Sphere3d;
use sdf_render::{
    Camera, CancelToken, Discard, FnSink, Framebuffer, PartialRender, PartialSink, RenderConfig,
    RenderError, RenderProgress, RenderState, Renderer3, Rgba,
};

fn sphere() -> Sphere3d {
    Sphere3d::new(Point3d::ORIGIN, 5.0).unwrap()
}

fn view() -> RwLock<RenderState> {
    RwLock::new(RenderState::default().with_camera(Point3d::ORIGIN, 0.0, 0.0, 20.0))
}

fn count(frame: &Framebuffer, color: Rgba) -> usize {
    frame.pixels().iter().filter(|p| **p == color).count()
}

/// Records what the renderer did with it.
#[derive(Default)]
struct ProbeSink {
    published: Vec<RenderProgress>,
    closed: usize,
}

impl PartialSink for ProbeSink {
    fn publish(&mut self, progress: RenderProgress, _frame: &Framebuffer) {
        self.published.push(progress);
    }

    fn close(&mut self) {
        self.closed += 1;
    }
}

// ---------------------------------------------------------------------------
// Full passes
// ---------------------------------------------------------------------------

#[test]
fn test_center_hits_and_corner_misses() {
    let config = RenderConfig::deterministic(7, 2);
    let mut renderer = Renderer3::with_config(sphere(), config.clone());
    let state = view();
    let frame = renderer
        .render(&state, (11, 11), &CancelToken::new(), Discard)
        .unwrap();

    assert_eq!(frame.get(5, 5), Some(config.hit_color));
    assert_eq!(frame.get(0, 0), Some(config.miss_color));
    assert_eq!(frame.get(10, 10), Some(config.miss_color));

    // The corner ray runs out of distance long before the step budget.
    let camera = Camera::new(&state.read(), (11, 11)).unwrap();
    let params = renderer.march_params_for(&camera);
    let corner = raycast3(renderer.shape(), &camera.ray(0, 0), &params);
    assert_eq!(corner.outcome, MarchOutcome::Miss(MissReason::DistanceBudget));
    assert!(corner.steps < params.max_steps);

    let center = raycast3(renderer.shape(), &camera.ray(5, 5), &params);
    match center.outcome {
        MarchOutcome::Hit { distance, .. } => assert!((distance - 15.0).abs() < 1e-3),
        other => panic!("expected hit, got {other:?}"),
    }
}

#[test]
fn test_full_pass_leaves_no_transparent_pixels() {
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(1, 3));
    let frame = renderer
        .render(&view(), (17, 9), &CancelToken::new(), Discard)
        .unwrap();
    assert_eq!(frame.len(), 17 * 9);
    assert_eq!(count(&frame, Rgba::TRANSPARENT), 0);
    // The shared handle holds the same raster.
    assert_eq!(*renderer.frame().read(), frame);
}

#[test]
fn test_image_is_upright() {
    // A sphere above the pivot shows up in the top rows.
    let high = Sphere3d::new(Point3d::new(0.0, 0.0, 6.0), 3.0).unwrap();
    let config = RenderConfig::deterministic(3, 2);
    let mut renderer = Renderer3::with_config(high, config.clone());
    let frame = renderer
        .render(&view(), (21, 21), &CancelToken::new(), Discard)
        .unwrap();
    let hits_in_rows = |rows: std::ops::Range<u32>| {
        rows.flat_map(|y| (0..21).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.get(x, y) == Some(config.hit_color))
            .count()
    };
    assert!(hits_in_rows(0..10) > 0);
    assert_eq!(hits_in_rows(11..21), 0);
}

#[test]
fn test_deterministic_across_worker_counts_and_passes() {
    let state = view();
    let mut single = Renderer3::with_config(sphere(), RenderConfig::deterministic(11, 1));
    let mut pooled = Renderer3::with_config(sphere(), RenderConfig::deterministic(99, 4));

    let a = single.render(&state, (23, 15), &CancelToken::new(), Discard).unwrap();
    let b = pooled.render(&state, (23, 15), &CancelToken::new(), Discard).unwrap();
    let c = pooled.render(&state, (23, 15), &CancelToken::new(), Discard).unwrap();
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn test_progress_is_published_per_batch_and_sink_closed() {
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 2));
    let mut probe = ProbeSink::default();
    renderer
        .render(&view(), (15, 15), &CancelToken::new(), &mut probe)
        .unwrap();

    let rendered: Vec<usize> = probe.published.iter().map(|p| p.rendered).collect();
    assert_eq!(rendered, vec![100, 200, 225]);
    assert!(probe.published.iter().all(|p| p.total == 225));
    assert_eq!(probe.closed, 1);
}

#[test]
fn test_channel_sink_receives_partial_frames() {
    // Room for every update of the pass, so nothing has to drain concurrently.
    let (tx, rx) = mpsc::sync_channel::<PartialRender>(3);
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 2));
    let last = renderer
        .render(&view(), (15, 15), &CancelToken::new(), tx)
        .unwrap();

    // The sender was dropped with the pass, so this drains and ends.
    let updates: Vec<PartialRender> = rx.iter().collect();
    assert_eq!(updates.len(), 3);
    let first = &updates[0];
    assert_eq!(first.progress.rendered, 100);
    assert_eq!(first.frame.len() - count(&first.frame, Rgba::TRANSPARENT), 100);
    assert_eq!(updates[2].frame, last);
}

#[test]
fn test_full_channel_holds_back_the_pass() {
    let (tx, rx) = mpsc::sync_channel::<PartialRender>(1);
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 4));
    let frame = renderer.frame();
    let written = || {
        let frame = frame.read();
        frame.len() - count(&frame, Rgba::TRANSPARENT)
    };

    thread::scope(|scope| {
        let pass = scope.spawn(|| renderer.render(&view(), (21, 21), &CancelToken::new(), tx));

        // The first update fills the channel and the second one blocks the
        // collector, so the raster stops at two batches until we receive.
        let deadline = Instant::now() + Duration::from_secs(10);
        while written() < 200 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        thread::sleep(Duration::from_millis(100));
        assert_eq!(written(), 200);
        assert!(!pass.is_finished());

        let rendered: Vec<usize> = rx.iter().map(|update| update.progress.rendered).collect();
        assert_eq!(rendered, vec![100, 200, 300, 400, 441]);
        assert!(pass.join().unwrap().is_ok());
    });
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn test_precancelled_pass_stops_after_one_batch() {
    let (tx, rx) = mpsc::sync_channel::<PartialRender>(1);
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 4));

    let err = renderer.render(&view(), (21, 21), &cancel, tx).unwrap_err();
    assert_eq!(err, RenderError::Cancelled { rendered: 100, total: 441 });

    // Nothing was published and the sink has hung up.
    assert!(rx.recv().is_err());
    let frame = renderer.frame();
    let frame = frame.read();
    assert_eq!(frame.len() - count(&frame, Rgba::TRANSPARENT), 100);
}

#[test]
fn test_cancel_from_sink_takes_effect_next_batch() {
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 4));
    let sink = FnSink(move |_: RenderProgress, _: &Framebuffer| remote.cancel());

    let err = renderer.render(&view(), (21, 21), &cancel, sink).unwrap_err();
    assert_eq!(err, RenderError::Cancelled { rendered: 200, total: 441 });
}

#[test]
fn test_renderer_reusable_after_cancel() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 2));
    assert!(renderer.render(&view(), (21, 21), &cancel, Discard).is_err());

    let frame = renderer
        .render(&view(), (21, 21), &CancelToken::new(), Discard)
        .unwrap();
    assert_eq!(count(&frame, Rgba::TRANSPARENT), 0);
}

// ---------------------------------------------------------------------------
// State and pixel order
// ---------------------------------------------------------------------------

#[test]
fn test_state_is_snapshotted_at_pass_start() {
    let state = view();
    let config = RenderConfig::deterministic(5, 2);
    let mut renderer = Renderer3::with_config(sphere(), config.clone());
    // Moving the camera far away mid-pass must not affect this pass.
    let sink = FnSink(|_: RenderProgress, _: &Framebuffer| {
        state.write().dist = 1000.0;
    });
    let frame = renderer
        .render(&state, (11, 11), &CancelToken::new(), sink)
        .unwrap();
    assert_eq!(frame.get(5, 5), Some(config.hit_color));
    assert_eq!(state.read().dist, 1000.0);
}

#[test]
fn test_pixel_order_cached_until_resolution_changes() {
    let mut renderer = Renderer3::with_config(sphere(), RenderConfig::deterministic(5, 2));
    let state = view();

    renderer.render(&state, (4, 4), &CancelToken::new(), Discard).unwrap();
    let first = renderer.pixel_order().to_vec();
    assert_eq!(first.len(), 16);

    renderer.render(&state, (4, 4), &CancelToken::new(), Discard).unwrap();
    assert_eq!(renderer.pixel_order(), first.as_slice());

    renderer.render(&state, (5, 3), &CancelToken::new(), Discard).unwrap();
    let mut resized = renderer.pixel_order().to_vec();
    assert_eq!(resized.len(), 15);
    resized.sort_unstable();
    assert_eq!(resized, (0..15).collect::<Vec<_>>());
}

#[test]
fn test_invalid_inputs_close_sink() {
    let mut renderer = Renderer3::new(sphere());
    let mut probe = ProbeSink::default();

    let err = renderer
        .render(&view(), (0, 10), &CancelToken::new(), &mut probe)
        .unwrap_err();
    assert_eq!(err, RenderError::InvalidResolution { width: 0, height: 10 });

    let bad = RwLock::new(RenderState::default().with_fov(0.0));
    let err = renderer
        .render(&bad, (10, 10), &CancelToken::new(), &mut probe)
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidView(_)));

    assert!(probe.published.is_empty());
    assert_eq!(probe.closed, 2);
}

#[test]
fn test_renderer_queries() {
    let renderer = Renderer3::new(sphere());
    assert_eq!(renderer.dimensions(), 3);
    let bb = renderer.bounding_box();
    assert_eq!(bb.min, Point3d::new(-5.0, -5.0, -5.0));
    assert_eq!(bb.max, Point3d::new(5.0, 5.0, 5.0));
}

#[test]
fn test_explicit_max_distance_hides_far_shapes() {
    let config = RenderConfig {
        max_distance: Some(10.0),
        ..RenderConfig::deterministic(5, 2)
    };
    let mut renderer = Renderer3::with_config(sphere(), config.clone());
    let frame = renderer
        .render(&view(), (5, 5), &CancelToken::new(), Discard)
        .unwrap();
    assert_eq!(count(&frame, config.miss_color), 25);
}

#[test]
fn test_state_json_roundtrip() {
    let state = RenderState::default()
        .with_camera(Point3d::new(1.0, 2.0, 3.0), 0.25, -1.5, 42.0)
        .with_fov(1.2);
    let text = serde_json::to_string(&state).unwrap();
    let back: RenderState = serde_json::from_str(&text).unwrap();
    assert_eq!(back, state);
}

#[test]
fn test_tracing_does_not_affect_render() {
    let config = RenderConfig::deterministic(5, 2);
    let mut quiet = Renderer3::with_config(sphere(), config.clone());
    let expected = quiet.render(&view(), (9, 9), &CancelToken::new(), Discard).unwrap();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    let traced = tracing::subscriber::with_default(subscriber, || {
        let mut renderer = Renderer3::with_config(sphere(), config);
        renderer.render(&view(), (9, 9), &CancelToken::new(), Discard).unwrap()
    });
    assert_eq!(traced, expected);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn every_pixel_written_once(
        width in 1u32..24,
        height in 1u32..24,
        workers in 1usize..6,
        batch_size in 1usize..64,
    ) {
        let config = RenderConfig { batch_size, ..RenderConfig::deterministic(17, workers) };
        let mut renderer = Renderer3::with_config(sphere(), config);
        let frame = renderer
            .render(&view(), (width, height), &CancelToken::new(), Discard)
            .unwrap();
        prop_assert_eq!(count(&frame, Rgba::TRANSPARENT), 0);

        let mut order = renderer.pixel_order().to_vec();
        order.sort_unstable();
        prop_assert_eq!(order, (0..(width * height) as usize).collect::<Vec<_>>());
    }
}
