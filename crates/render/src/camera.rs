//! Pinhole camera: maps pixels of a raster to world-space rays.

use sdf_kernel::geometry::point::Point3d;
use sdf_kernel::geometry::ray::Ray;
use sdf_kernel::geometry::transform::Transform;
use sdf_kernel::geometry::vector::Vec3;

use crate::error::RenderError;
use crate::state::RenderState;

/// Per-pass ray generator. Built once from a [`RenderState`] snapshot and
/// shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3d,
    forward: Vec3,
    rotation: Transform,
    width: u32,
    height: u32,
    tan_half_fov_x: f64,
    tan_half_fov_y: f64,
}

impl Camera {
    pub fn new(state: &RenderState, resolution: (u32, u32)) -> Result<Self, RenderError> {
        let (width, height) = resolution;
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidResolution { width, height });
        }
        state.validate()?;

        let rotation = state.camera_rotation();
        let position = state.eye();
        let forward = (state.center - position)
            .normalized()
            .ok_or_else(|| RenderError::InvalidView("camera eye coincides with its center".into()))?;

        let aspect = width as f64 / height as f64;
        let fov_y = 2.0 * ((state.fov / 2.0).tan() * aspect).atan();

        Ok(Self {
            position,
            forward,
            rotation,
            width,
            height,
            tan_half_fov_x: (state.fov / 2.0).tan(),
            tan_half_fov_y: (fov_y / 2.0).tan(),
        })
    }

    pub fn position(&self) -> Point3d {
        self.position
    }

    /// Unit vector from the eye to the pivot center.
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Ray through the center of pixel `(x, y)`. Row 0 is the top of the image.
    pub fn ray(&self, x: u32, y: u32) -> Ray {
        let ndc_x = (x as f64 + 0.5) / self.width as f64 * 2.0 - 1.0;
        let ndc_y = (y as f64 + 0.5) / self.height as f64 * 2.0 - 1.0;
        let local = Vec3::new(
            ndc_x * self.tan_half_fov_x,
            1.0,
            -ndc_y * self.tan_half_fov_y,
        );
        let direction = self.rotation.transform_vector(&local);
        // `local` has a unit Y component, so the rotated vector is never zero.
        Ray::new(self.position, direction).unwrap_or(Ray {
            origin: self.position,
            direction: self.forward,
        })
    }
}
