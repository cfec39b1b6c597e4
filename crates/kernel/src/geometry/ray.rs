use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// A half-line with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3d,
    pub direction: Vec3,
}

impl Ray {
    /// Ray from `origin` along `direction`, normalized. `None` if the direction is degenerate.
    pub fn new(origin: Point3d, direction: Vec3) -> Option<Self> {
        Some(Self {
            origin,
            direction: direction.normalized()?,
        })
    }

    pub fn at(&self, t: f64) -> Point3d {
        self.origin + self.direction * t
    }
}
