use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;

/// A 4x4 affine transformation matrix stored in column-major order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Column-major 4x4 matrix entries.
    pub m: [f64; 16],
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    pub fn translation(offset: Vec3) -> Self {
        #[rustfmt::skip]
        let m = [
            1.0,      0.0,      0.0,      0.0,
            0.0,      1.0,      0.0,      0.0,
            0.0,      0.0,      1.0,      0.0,
            offset.x, offset.y, offset.z, 1.0,
        ];
        Self { m }
    }

    /// Rotation around the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        #[rustfmt::skip]
        let m = [
            1.0, 0.0, 0.0, 0.0,
            0.0, c,   s,   0.0,
            0.0, -s,  c,   0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    /// Rotation around the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        #[rustfmt::skip]
        let m = [
            c,   s,   0.0, 0.0,
            -s,  c,   0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        Self { m }
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.m[col * 4 + row]
    }

    /// Apply to a point (translation included).
    pub fn transform_point(&self, p: &Point3d) -> Point3d {
        let v = self.transform_vector(&p.to_vec3());
        Point3d::new(v.x + self.at(0, 3), v.y + self.at(1, 3), v.z + self.at(2, 3))
    }

    /// Apply to a direction (translation ignored).
    pub fn transform_vector(&self, v: &Vec3) -> Vec3 {
        let x = self.at(0, 0) * v.x + self.at(0, 1) * v.y + self.at(0, 2) * v.z;
        let y = self.at(1, 0) * v.x + self.at(1, 1) * v.y + self.at(1, 2) * v.z;
        let z = self.at(2, 0) * v.x + self.at(2, 1) * v.y + self.at(2, 2) * v.z;
        Vec3::new(x, y, z)
    }

    /// Compose two transforms: `self * other`, so `other` applies first.
    pub fn then(&self, other: &Transform) -> Transform {
        let mut result = [0.0f64; 16];
        for col in 0..4 {
            for row in 0..4 {
                result[col * 4 + row] = (0..4).map(|k| self.at(row, k) * other.at(k, col)).sum();
            }
        }
        Transform { m: result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-12, "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_is_noop() {
        let p = Point3d::new(1.0, -2.0, 3.0);
        assert_eq!(Transform::identity().transform_point(&p), p);
        assert_eq!(Transform::default(), Transform::identity());
    }

    #[test]
    fn test_translation_moves_points_not_vectors() {
        let t = Transform::translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.transform_point(&Point3d::ORIGIN), Point3d::new(1.0, 2.0, 3.0));
        assert_eq!(t.transform_vector(&Vec3::X), Vec3::X);
    }

    #[test]
    fn test_rotation_x_quarter_turn() {
        let r = Transform::rotation_x(FRAC_PI_2);
        assert_vec_close(r.transform_vector(&Vec3::Y), Vec3::Z);
        assert_vec_close(r.transform_vector(&Vec3::Z), -Vec3::Y);
    }

    #[test]
    fn test_rotation_z_quarter_turn() {
        let r = Transform::rotation_z(FRAC_PI_2);
        assert_vec_close(r.transform_vector(&Vec3::X), Vec3::Y);
        assert_vec_close(r.transform_vector(&Vec3::Y), -Vec3::X);
    }

    #[test]
    fn test_then_applies_right_operand_first() {
        // Pitch Y up to Z, then yaw about Z leaves Z alone.
        let r = Transform::rotation_z(FRAC_PI_2).then(&Transform::rotation_x(FRAC_PI_2));
        assert_vec_close(r.transform_vector(&Vec3::Y), Vec3::Z);
        // Yaw first would send Y to -X instead.
        let r = Transform::rotation_x(FRAC_PI_2).then(&Transform::rotation_z(FRAC_PI_2));
        assert_vec_close(r.transform_vector(&Vec3::Y), -Vec3::X);
    }

    #[test]
    fn test_translation_after_rotation() {
        let t = Transform::translation(Vec3::new(0.0, 0.0, 5.0)).then(&Transform::rotation_z(FRAC_PI_2));
        let p = t.transform_point(&Point3d::new(1.0, 0.0, 0.0));
        assert!((p - Point3d::new(0.0, 1.0, 5.0)).length() < 1e-12);
    }
}
