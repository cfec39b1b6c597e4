//! Shape capability traits.
//!
//! Every consumer (the sphere tracer, the preview renderer, mesh exporters)
//! only needs a distance query and a bounding box, so shapes are used through
//! these two traits and never through their concrete representation.
//!
//! Both traits require `Send + Sync`: the renderer queries one shape from
//! every worker thread at once.

use std::sync::Arc;

use crate::geometry::bounds::{Box2, Box3};
use crate::geometry::point::{Point2d, Point3d};

/// A 2D shape described by a distance function.
pub trait Sdf2: Send + Sync {
    /// Signed distance from `p` to the boundary: negative inside, zero on it, positive outside.
    fn distance(&self, p: Point2d) -> f64;

    /// A box enclosing the whole shape.
    fn bounding_box(&self) -> Box2;
}

/// A 3D shape described by a distance function.
pub trait Sdf3: Send + Sync {
    /// Signed distance from `p` to the surface: negative inside, zero on it, positive outside.
    fn distance(&self, p: Point3d) -> f64;

    /// A box enclosing the whole shape.
    fn bounding_box(&self) -> Box3;
}

// ── Forwarding implementations ─────────────────────────────────────────────

impl<T: Sdf2 + ?Sized> Sdf2 for &T {
    fn distance(&self, p: Point2d) -> f64 {
        (**self).distance(p)
    }

    fn bounding_box(&self) -> Box2 {
        (**self).bounding_box()
    }
}

impl<T: Sdf2 + ?Sized> Sdf2 for Box<T> {
    fn distance(&self, p: Point2d) -> f64 {
        (**self).distance(p)
    }

    fn bounding_box(&self) -> Box2 {
        (**self).bounding_box()
    }
}

impl<T: Sdf2 + ?Sized> Sdf2 for Arc<T> {
    fn distance(&self, p: Point2d) -> f64 {
        (**self).distance(p)
    }

    fn bounding_box(&self) -> Box2 {
        (**self).bounding_box()
    }
}

impl<T: Sdf3 + ?Sized> Sdf3 for &T {
    fn distance(&self, p: Point3d) -> f64 {
        (**self).distance(p)
    }

    fn bounding_box(&self) -> Box3 {
        (**self).bounding_box()
    }
}

impl<T: Sdf3 + ?Sized> Sdf3 for Box<T> {
    fn distance(&self, p: Point3d) -> f64 {
        (**self).distance(p)
    }

    fn bounding_box(&self) -> Box3 {
        (**self).bounding_box()
    }
}

impl<T: Sdf3 + ?Sized> Sdf3 for Arc<T> {
    fn distance(&self, p: Point3d) -> f64 {
        (**self).distance(p)
    }

    fn bounding_box(&self) -> Box3 {
        (**self).bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Sphere3d;

    fn probe<S: Sdf3>(shape: S) -> f64 {
        shape.distance(Point3d::new(3.0, 0.0, 0.0))
    }

    #[test]
    fn test_forwarding_impls_agree() {
        let sphere = Sphere3d::new(Point3d::ORIGIN, 1.0).unwrap();
        let direct = sphere.distance(Point3d::new(3.0, 0.0, 0.0));
        assert_eq!(probe(&sphere), direct);
        assert_eq!(probe(Arc::new(sphere)), direct);
        let boxed: Box<dyn Sdf3> = Box::new(sphere);
        assert_eq!(probe(boxed), direct);
    }

    #[test]
    fn test_trait_object_bounding_box() {
        let shape: Arc<dyn Sdf3> = Arc::new(Sphere3d::new(Point3d::ORIGIN, 2.0).unwrap());
        let bb = shape.bounding_box();
        assert_eq!(bb.min, Point3d::new(-2.0, -2.0, -2.0));
        assert_eq!(bb.max, Point3d::new(2.0, 2.0, 2.0));
    }
}
