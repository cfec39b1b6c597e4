//! Geometry kernel for signed-distance-field modeling.
//!
//! Shapes are described by distance functions ([`Sdf2`], [`Sdf3`]) rather than
//! by boundary representations. The kernel provides the vector math, bounding
//! boxes, the natural cubic spline used for 2D profiles, and the sphere tracer
//! that turns a distance function into ray hits.

pub mod geometry;
pub mod shapes;
pub mod traits;

pub use geometry::bounds::{Box2, Box3};
pub use geometry::point::{Point2d, Point3d};
pub use geometry::ray::Ray;
pub use geometry::raycast::{MarchOutcome, MarchParams, MarchResult, MissReason, raycast3};
pub use geometry::spline::{CubicSpline2d, SplineError, SplineSegment};
pub use geometry::transform::Transform;
pub use geometry::vector::{Vec2, Vec3};
pub use shapes::{Cuboid3d, ShapeError, Sphere3d};
pub use traits::{Sdf2, Sdf3};

/// Global tolerance configuration for numeric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Coefficients smaller than this fraction of the largest one are treated as zero.
    pub relative: f64,
    /// Parameter-space step below which iterative refinement stops.
    pub parametric: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            relative: 1e-12,
            parametric: 1e-12,
        }
    }
}

impl Tolerance {
    pub fn is_negligible(&self, value: f64, scale: f64) -> bool {
        value.abs() <= self.relative * scale
    }
}

pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
