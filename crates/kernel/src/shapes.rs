//! Minimal 3D primitives. The full primitive and CSG library lives outside this
//! crate; these two exist so the tracer and renderer have something to work on.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::geometry::bounds::Box3;
use crate::geometry::point::Point3d;
use crate::geometry::vector::Vec3;
use crate::traits::Sdf3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },
    #[error("Shape center must be finite")]
    NonFiniteCenter,
}

fn check_dimension(name: &'static str, value: f64) -> Result<(), ShapeError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::InvalidDimension { name, value })
    }
}

/// A solid ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere3d {
    pub center: Point3d,
    pub radius: f64,
}

impl Sphere3d {
    #[instrument]
    pub fn new(center: Point3d, radius: f64) -> Result<Self, ShapeError> {
        check_dimension("radius", radius)?;
        if !center.is_finite() {
            return Err(ShapeError::NonFiniteCenter);
        }
        debug!("sphere primitive created");
        Ok(Self { center, radius })
    }
}

impl Sdf3 for Sphere3d {
    fn distance(&self, p: Point3d) -> f64 {
        p.distance_to(&self.center) - self.radius
    }

    fn bounding_box(&self) -> Box3 {
        let r = Vec3::new(self.radius, self.radius, self.radius);
        Box3::new(self.center - r, self.center + r)
    }
}

/// A solid axis-aligned box given by its center and half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cuboid3d {
    pub center: Point3d,
    pub half_size: Vec3,
}

impl Cuboid3d {
    #[instrument]
    pub fn new(center: Point3d, size: Vec3) -> Result<Self, ShapeError> {
        check_dimension("width", size.x)?;
        check_dimension("depth", size.y)?;
        check_dimension("height", size.z)?;
        if !center.is_finite() {
            return Err(ShapeError::NonFiniteCenter);
        }
        debug!("cuboid primitive created");
        Ok(Self {
            center,
            half_size: size * 0.5,
        })
    }
}

impl Sdf3 for Cuboid3d {
    fn distance(&self, p: Point3d) -> f64 {
        let q = (p - self.center).abs() - self.half_size;
        q.max_scalar(0.0).length() + q.max_component().min(0.0)
    }

    fn bounding_box(&self) -> Box3 {
        Box3::new(self.center - self.half_size, self.center + self.half_size)
    }
}
