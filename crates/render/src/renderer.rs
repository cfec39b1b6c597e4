//! Progressive, cancellable sphere-tracing renderer.
//!
//! A pass fans pixels out to a pool of scoped worker threads and funnels the
//! results back to the calling thread, which is the only writer of the shared
//! framebuffer. Pixels are visited in a cached random order so early partial
//! rasters already cover the whole image.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use parking_lot::{Mutex, RwLock, RwLockWriteGuard};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, instrument};

use sdf_kernel::geometry::bounds::Box3;
use sdf_kernel::geometry::raycast::{MarchParams, raycast3};
use sdf_kernel::traits::Sdf3;

use crate::camera::Camera;
use crate::cancel::CancelToken;
use crate::config::RenderConfig;
use crate::error::RenderError;
use crate::framebuffer::{Framebuffer, Rgba};
use crate::sink::{PartialSink, RenderProgress};
use crate::state::RenderState;

/// Queued jobs per worker before the producer blocks.
const JOB_QUEUE_PER_WORKER: usize = 4;

/// Fraction added to the derived ray length so silhouettes are not clipped.
const MAX_DISTANCE_MARGIN: f64 = 0.01;

struct PixelJob<'a> {
    x: u32,
    y: u32,
    camera: &'a Camera,
}

struct PixelResult {
    x: u32,
    y: u32,
    color: Rgba,
    hit: bool,
    steps: u32,
}

/// Renders a 3D distance field into a shared RGBA framebuffer.
pub struct Renderer3<S> {
    shape: S,
    config: RenderConfig,
    frame: Arc<RwLock<Framebuffer>>,
    pixel_order: Vec<usize>,
    rng: StdRng,
}

impl<S: Sdf3> Renderer3<S> {
    pub fn new(shape: S) -> Self {
        Self::with_config(shape, RenderConfig::default())
    }

    pub fn with_config(shape: S, config: RenderConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            shape,
            config,
            frame: Arc::new(RwLock::new(Framebuffer::new(0, 0))),
            pixel_order: Vec::new(),
            rng,
        }
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn dimensions(&self) -> usize {
        3
    }

    pub fn bounding_box(&self) -> Box3 {
        self.shape.bounding_box()
    }

    /// Shared handle to the raster being rendered. Readers see partial
    /// results between batches.
    pub fn frame(&self) -> Arc<RwLock<Framebuffer>> {
        Arc::clone(&self.frame)
    }

    /// Order in which the last pass visited pixels, as row-major indices.
    pub fn pixel_order(&self) -> &[usize] {
        &self.pixel_order
    }

    /// March settings a pass uses for `camera`. Unless the config fixes a ray
    /// length, rays may travel far enough to cross the whole bounding box.
    pub fn march_params_for(&self, camera: &Camera) -> MarchParams {
        let max_distance = self.config.max_distance.unwrap_or_else(|| {
            let bb = self.shape.bounding_box();
            let reach = camera.position().distance_to(&bb.center()) + bb.half_diagonal();
            reach * (1.0 + MAX_DISTANCE_MARGIN) + self.config.min_step
        });
        self.config.march_params(max_distance)
    }

    fn refresh_pixel_order(&mut self, count: usize) {
        if self.pixel_order.len() == count {
            return;
        }
        self.pixel_order = (0..count).collect();
        self.pixel_order.shuffle(&mut self.rng);
        debug!(count, "pixel order regenerated");
    }

    /// Render one full pass.
    ///
    /// The state is read once at the start. Every `batch_size` pixels the
    /// framebuffer lock is released, `cancel` is checked and `sink` receives
    /// the partial raster. The sink is closed and every thread joined before
    /// this returns, on success and on error alike.
    #[instrument(skip(self, state, cancel, sink), fields(width = resolution.0, height = resolution.1))]
    pub fn render(
        &mut self,
        state: &RwLock<RenderState>,
        resolution: (u32, u32),
        cancel: &CancelToken,
        mut sink: impl PartialSink,
    ) -> Result<Framebuffer, RenderError> {
        let result = self.render_pass(state, resolution, cancel, &mut sink);
        sink.close();
        result
    }

    fn render_pass(
        &mut self,
        state: &RwLock<RenderState>,
        resolution: (u32, u32),
        cancel: &CancelToken,
        sink: &mut dyn PartialSink,
    ) -> Result<Framebuffer, RenderError> {
        let snapshot = *state.read();
        let camera = Camera::new(&snapshot, resolution)?;
        let (width, height) = resolution;
        let total = width as usize * height as usize;

        {
            let mut frame = self.frame.write();
            if frame.width() == width && frame.height() == height {
                frame.fill(Rgba::TRANSPARENT);
            } else {
                frame.resize(width, height);
            }
        }
        self.refresh_pixel_order(total);

        let params = self.march_params_for(&camera);
        let workers = self.config.worker_count().min(total);
        let batch_size = self.config.batch_size.max(1);
        info!(
            workers,
            total,
            max_distance = params.max_distance,
            "render pass started"
        );

        let shape = &self.shape;
        let config = &self.config;
        let order = &self.pixel_order;
        let frame = &self.frame;
        let camera = &camera;

        let halt = AtomicBool::new(false);
        let (job_tx, job_rx) = mpsc::sync_channel::<PixelJob<'_>>(workers * JOB_QUEUE_PER_WORKER);
        let job_rx = Mutex::new(job_rx);
        let (result_tx, result_rx) = mpsc::channel::<PixelResult>();

        let outcome = thread::scope(|scope| {
            for _ in 0..workers {
                let result_tx = result_tx.clone();
                let job_rx = &job_rx;
                let halt = &halt;
                scope.spawn(move || {
                    loop {
                        let job = job_rx.lock().recv();
                        let Ok(job) = job else { break };
                        // After a halt, keep draining so the producer never blocks.
                        if halt.load(Ordering::Acquire) {
                            continue;
                        }
                        let result = trace_pixel(shape, &job, &params, config);
                        // The collector only hangs up after raising `halt`.
                        let _ = result_tx.send(result);
                    }
                });
            }
            // Workers own the remaining senders: the result stream ends when the last one exits.
            drop(result_tx);

            let halt_ref = &halt;
            scope.spawn(move || {
                for &index in order {
                    if halt_ref.load(Ordering::Acquire) {
                        break;
                    }
                    let job = PixelJob {
                        x: (index % width as usize) as u32,
                        y: (index / width as usize) as u32,
                        camera,
                    };
                    if job_tx.send(job).is_err() {
                        break;
                    }
                }
            });

            let outcome = collect(frame, result_rx, total, batch_size, cancel, sink);
            halt.store(true, Ordering::Release);
            outcome
        });

        let stats = outcome?;
        info!(
            rendered = stats.rendered,
            hits = stats.hits,
            steps = stats.steps,
            "render pass finished"
        );
        Ok(self.frame.read().clone())
    }
}

#[derive(Debug, Default)]
struct PassStats {
    rendered: usize,
    hits: usize,
    steps: u64,
}

/// Write results into the framebuffer until the workers are done or the pass is cancelled.
fn collect(
    frame: &RwLock<Framebuffer>,
    results: Receiver<PixelResult>,
    total: usize,
    batch_size: usize,
    cancel: &CancelToken,
    sink: &mut dyn PartialSink,
) -> Result<PassStats, RenderError> {
    let mut stats = PassStats::default();
    let mut guard = frame.write();
    for result in results.iter() {
        guard.set(result.x, result.y, result.color);
        stats.rendered += 1;
        stats.steps += u64::from(result.steps);
        stats.hits += usize::from(result.hit);
        let finished = stats.rendered == total;
        if finished || stats.rendered % batch_size == 0 {
            let progress = RenderProgress {
                rendered: stats.rendered,
                total,
            };
            // A pass that has written every pixel is complete, not cancelled.
            let cancelled = RwLockWriteGuard::unlocked(&mut guard, || {
                if !finished && cancel.is_cancelled() {
                    return true;
                }
                sink.publish(progress, &frame.read());
                false
            });
            if cancelled {
                debug!(rendered = stats.rendered, total, "render pass cancelled");
                return Err(RenderError::Cancelled {
                    rendered: stats.rendered,
                    total,
                });
            }
        }
    }
    Ok(stats)
}

fn trace_pixel<S: Sdf3 + ?Sized>(
    shape: &S,
    job: &PixelJob<'_>,
    params: &MarchParams,
    config: &RenderConfig,
) -> PixelResult {
    let ray = job.camera.ray(job.x, job.y);
    let result = raycast3(shape, &ray, params);
    let hit = result.is_hit();
    PixelResult {
        x: job.x,
        y: job.y,
        color: if hit { config.hit_color } else { config.miss_color },
        hit,
        steps: result.steps,
    }
}
