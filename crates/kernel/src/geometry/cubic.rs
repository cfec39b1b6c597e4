use serde::{Deserialize, Serialize};
use tracing::trace;

/// A cubic `f(t) = a + b t + c t^2 + d t^3` on `t in [0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CubicPolynomial {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl CubicPolynomial {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Power-basis cubic with `f(0) = y0`, `f(1) = y1`, `f'(0) = d0`, `f'(1) = d1`.
    pub fn from_hermite(y0: f64, y1: f64, d0: f64, d1: f64) -> Self {
        Self {
            a: y0,
            b: d0,
            c: 3.0 * (y1 - y0) - 2.0 * d0 - d1,
            d: 2.0 * (y0 - y1) + d0 + d1,
        }
    }

    pub fn value(&self, t: f64) -> f64 {
        self.a + t * (self.b + t * (self.c + self.d * t))
    }

    pub fn first_derivative(&self, t: f64) -> f64 {
        self.b + t * (2.0 * self.c + 3.0 * self.d * t)
    }

    pub fn second_derivative(&self, t: f64) -> f64 {
        2.0 * self.c + 6.0 * self.d * t
    }

    /// Parameters where `f'` vanishes, clamped into `[0, 1]`.
    ///
    /// These are the candidate extrema used for exact bounding boxes. Roots
    /// outside the unit interval are clamped to the nearest end, which is
    /// harmless because the endpoints are always part of the box anyway.
    pub fn critical_points(&self) -> Vec<f64> {
        let roots = solve_quadratic(3.0 * self.d, 2.0 * self.c, self.b);
        trace!(
            a = self.a,
            b = self.b,
            c = self.c,
            d = self.d,
            roots = ?roots,
            "cubic critical points"
        );
        roots.into_iter().map(|t| t.clamp(0.0, 1.0)).collect()
    }
}

/// Real roots of `a x^2 + b x + c = 0`.
///
/// A leading (or linear) coefficient that is negligible next to the largest
/// coefficient drops the equation one degree. Constant equations have no
/// isolated roots and return nothing.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    let tol = crate::default_tolerance();
    let scale = a.abs().max(b.abs()).max(c.abs());

    if tol.is_negligible(a, scale) {
        if tol.is_negligible(b, scale) {
            return vec![];
        }
        return vec![-c / b];
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return vec![];
    }
    if disc == 0.0 {
        return vec![-b / (2.0 * a)];
    }
    // Avoid cancellation between -b and the root of the discriminant.
    // disc > 0 here, so q is never zero.
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    vec![q / a, c / q]
}
