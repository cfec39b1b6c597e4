//! Sphere tracing against a 3D distance field.

use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::ray::Ray;
use crate::traits::Sdf3;

/// Step and budget settings for [`raycast3`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchParams {
    /// Ray parameter where marching starts.
    pub initial_step: f64,
    /// Smallest advance per step, so grazing rays still make progress.
    pub min_step: f64,
    /// A sample this close to the surface (or inside it) counts as a hit.
    pub hit_epsilon: f64,
    /// The ray is abandoned once it has travelled further than this.
    pub max_distance: f64,
    pub max_steps: u32,
}

impl Default for MarchParams {
    fn default() -> Self {
        Self {
            initial_step: 0.0,
            min_step: 1e-3,
            hit_epsilon: 1e-4,
            max_distance: 1e4,
            max_steps: 1000,
        }
    }
}

impl MarchParams {
    /// Loose settings for interactive previews.
    pub fn coarse() -> Self {
        Self {
            min_step: 1e-2,
            hit_epsilon: 1e-3,
            max_steps: 200,
            ..Self::default()
        }
    }

    /// Tight settings for final output.
    pub fn fine() -> Self {
        Self {
            min_step: 1e-5,
            hit_epsilon: 1e-6,
            max_steps: 10_000,
            ..Self::default()
        }
    }

    pub fn with_max_distance(self, max_distance: f64) -> Self {
        Self {
            max_distance,
            ..self
        }
    }
}

/// Why a ray did not hit anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissReason {
    /// `max_steps` distance queries were spent without reaching the surface.
    StepBudget,
    /// The ray travelled past `max_distance`.
    DistanceBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarchOutcome {
    /// `distance` is the ray parameter of the hit.
    Hit { point: Point3d, distance: f64 },
    Miss(MissReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarchResult {
    pub outcome: MarchOutcome,
    /// Number of distance queries made.
    pub steps: u32,
}

impl MarchResult {
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, MarchOutcome::Hit { .. })
    }
}

/// March `ray` through `shape` until it hits the surface or a budget runs out.
///
/// Each step advances by the queried distance, which never overshoots the
/// surface for a true distance bound. A start point already inside the shape
/// is reported as a hit at `initial_step`.
pub fn raycast3<S: Sdf3 + ?Sized>(shape: &S, ray: &Ray, params: &MarchParams) -> MarchResult {
    let mut t = params.initial_step;
    let mut steps = 0;
    loop {
        if steps >= params.max_steps {
            return MarchResult {
                outcome: MarchOutcome::Miss(MissReason::StepBudget),
                steps,
            };
        }
        let point = ray.at(t);
        let d = shape.distance(point);
        steps += 1;
        if d <= params.hit_epsilon {
            return MarchResult {
                outcome: MarchOutcome::Hit { point, distance: t },
                steps,
            };
        }
        t += d.max(params.min_step);
        if t > params.max_distance {
            return MarchResult {
                outcome: MarchOutcome::Miss(MissReason::DistanceBudget),
                steps,
            };
        }
    }
}
