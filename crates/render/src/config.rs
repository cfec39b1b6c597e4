//! Renderer settings.

use serde::{Deserialize, Serialize};

use sdf_kernel::geometry::raycast::MarchParams;

use crate::framebuffer::Rgba;

/// Settings for a [`Renderer3`](crate::Renderer3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Worker threads. `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Pixels written between two progress publications.
    pub batch_size: usize,
    /// Seed for the pixel order. `None` draws one from the OS.
    pub seed: Option<u64>,
    pub initial_step: f64,
    pub min_step: f64,
    pub hit_epsilon: f64,
    pub max_steps: u32,
    /// Ray length limit. `None` derives it from the shape's bounding box.
    pub max_distance: Option<f64>,
    pub hit_color: Rgba,
    pub miss_color: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let march = MarchParams::default();
        Self {
            workers: None,
            batch_size: 100,
            seed: None,
            initial_step: march.initial_step,
            min_step: march.min_step,
            hit_epsilon: march.hit_epsilon,
            max_steps: march.max_steps,
            max_distance: None,
            hit_color: Rgba([0, 0, 255, 255]),
            miss_color: Rgba([150, 50, 50, 255]),
        }
    }
}

impl RenderConfig {
    /// Fast settings for interactive use: loose hit tolerance and small batches.
    pub fn preview() -> Self {
        let march = MarchParams::coarse();
        Self {
            batch_size: 50,
            min_step: march.min_step,
            hit_epsilon: march.hit_epsilon,
            max_steps: march.max_steps,
            ..Self::default()
        }
    }

    /// Reproducible settings: fixed seed and worker count.
    pub fn deterministic(seed: u64, workers: usize) -> Self {
        Self {
            seed: Some(seed),
            workers: Some(workers),
            ..Self::default()
        }
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.workers
            .filter(|&n| n > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }

    pub(crate) fn march_params(&self, max_distance: f64) -> MarchParams {
        MarchParams {
            initial_step: self.initial_step,
            min_step: self.min_step,
            hit_epsilon: self.hit_epsilon,
            max_distance,
            max_steps: self.max_steps,
        }
    }
}
