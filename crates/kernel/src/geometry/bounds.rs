use serde::{Deserialize, Serialize};

use super::point::{Point2d, Point3d};
use super::vector::{Vec2, Vec3};

/// Axis-aligned box in the plane. `min` is componentwise no greater than `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    pub min: Point2d,
    pub max: Point2d,
}

impl Box2 {
    /// Box spanning two opposite corners, given in any order.
    pub fn new(a: Point2d, b: Point2d) -> Self {
        Self {
            min: a.min(&b),
            max: a.max(&b),
        }
    }

    /// Smallest box holding every point, or `None` for an empty slice.
    pub fn from_points(points: &[Point2d]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bb = Self::new(*first, *first);
        for p in rest {
            bb.include_point(p);
        }
        Some(bb)
    }

    pub fn include_point(&mut self, p: &Point2d) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Union with another box.
    pub fn extend(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Point2d {
        self.min + self.size() * 0.5
    }

    pub fn distance_to_point(&self, p: &Point2d) -> f64 {
        let dx = (self.min.x - p.x).max(0.0).max(p.x - self.max.x);
        let dy = (self.min.y - p.y).max(0.0).max(p.y - self.max.y);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned box in 3D space. `min` is componentwise no greater than `max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box3 {
    pub min: Point3d,
    pub max: Point3d,
}

impl Box3 {
    /// Box spanning two opposite corners, given in any order.
    pub fn new(a: Point3d, b: Point3d) -> Self {
        Self {
            min: a.min(&b),
            max: a.max(&b),
        }
    }

    /// Smallest box holding every point, or `None` for an empty slice.
    pub fn from_points(points: &[Point3d]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bb = Self::new(*first, *first);
        for p in rest {
            bb.include_point(p);
        }
        Some(bb)
    }

    pub fn include_point(&mut self, p: &Point3d) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Union with another box.
    pub fn extend(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Point3d {
        self.min + self.size() * 0.5
    }

    /// Half the length of the box diagonal: radius of the bounding sphere about `center`.
    pub fn half_diagonal(&self) -> f64 {
        self.size().length() * 0.5
    }
}
