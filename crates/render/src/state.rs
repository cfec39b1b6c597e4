//! Camera pose shared between a display layer and the renderer.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};
use tracing::debug;

use sdf_kernel::geometry::bounds::Box3;
use sdf_kernel::geometry::point::Point3d;
use sdf_kernel::geometry::transform::Transform;

use crate::error::RenderError;

/// An orbit camera: it looks at `center` from `dist` away, rotated by `pitch`
/// about X and then `yaw` about Z. Z is up.
///
/// Angles are radians. `fov` is the horizontal field of view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderState {
    pub center: Point3d,
    pub pitch: f64,
    pub yaw: f64,
    pub dist: f64,
    pub fov: f64,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            center: Point3d::ORIGIN,
            pitch: 0.0,
            yaw: 0.0,
            dist: 10.0,
            fov: FRAC_PI_2,
        }
    }
}

impl RenderState {
    pub fn with_camera(self, center: Point3d, pitch: f64, yaw: f64, dist: f64) -> Self {
        Self {
            center,
            pitch,
            yaw,
            dist,
            ..self
        }
    }

    pub fn with_fov(self, fov: f64) -> Self {
        Self { fov, ..self }
    }

    /// Orientation of the camera without its translation: `RotZ(yaw) * RotX(pitch)`.
    pub fn camera_rotation(&self) -> Transform {
        Transform::rotation_z(self.yaw).then(&Transform::rotation_x(self.pitch))
    }

    /// Orbit frame: the camera rotation placed at `center`.
    pub fn orbit_frame(&self) -> Transform {
        Transform::translation(self.center.to_vec3()).then(&self.camera_rotation())
    }

    /// World position of the eye.
    pub fn eye(&self) -> Point3d {
        self.orbit_frame()
            .transform_point(&Point3d::new(0.0, -self.dist, 0.0))
    }

    /// Aim at the center of `bb` from far enough that its bounding sphere fits
    /// the horizontal field of view. Angles are kept.
    pub fn frame_box(self, bb: &Box3) -> Self {
        let radius = bb.half_diagonal();
        let dist = if radius > 0.0 && self.fov > 0.0 && self.fov < PI {
            radius / (self.fov / 2.0).sin()
        } else {
            self.dist
        };
        debug!(radius, dist, "framing bounding box");
        Self {
            center: bb.center(),
            dist,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.center.is_finite() {
            return Err(RenderError::InvalidView(format!(
                "camera center must be finite, got {:?}",
                self.center
            )));
        }
        if !(self.pitch.is_finite() && self.yaw.is_finite()) {
            return Err(RenderError::InvalidView(format!(
                "camera angles must be finite, got pitch {} yaw {}",
                self.pitch, self.yaw
            )));
        }
        if !(self.dist > 0.0 && self.dist.is_finite()) {
            return Err(RenderError::InvalidView(format!(
                "camera distance must be positive and finite, got {}",
                self.dist
            )));
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(RenderError::InvalidView(format!(
                "field of view must be in (0, pi), got {}",
                self.fov
            )));
        }
        Ok(())
    }
}
