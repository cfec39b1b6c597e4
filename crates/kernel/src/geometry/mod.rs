pub mod bounds;
pub mod cubic;
pub mod point;
pub mod ray;
pub mod raycast;
pub mod spline;
pub mod transform;
pub mod vector;
