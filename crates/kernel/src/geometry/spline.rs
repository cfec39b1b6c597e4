//! Natural cubic splines through 2D knots.
//!
//! Each segment is `x(t), y(t)` with both coordinates a cubic in
//! `t in [0, 1]`. First and second derivatives are continuous across the
//! interior knots and the second derivative is zero at both outer knots.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};

use sdf_solver::{SolverError, TriRow, solve_tridiagonal};

use super::bounds::Box2;
use super::cubic::CubicPolynomial;
use super::point::Point2d;
use super::vector::Vec2;
use crate::traits::Sdf2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplineError {
    #[error("Cubic spline needs at least 2 knots, got {count}")]
    TooFewKnots { count: usize },
    #[error("Knot {index} has a non-finite coordinate")]
    NonFiniteKnot { index: usize },
    #[error("Knot derivative system failed: {0}")]
    Solver(#[from] SolverError),
}

/// Coarse samples per segment before Newton refinement in closest-point queries.
const CLOSEST_SAMPLES: usize = 32;
const NEWTON_ITERATIONS: usize = 8;

/// One cubic piece of a spline, spanning two consecutive knots.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineSegment {
    index: usize,
    p0: Point2d,
    p1: Point2d,
    x: CubicPolynomial,
    y: CubicPolynomial,
    bb: Box2,
}

impl SplineSegment {
    fn new(index: usize, p0: Point2d, p1: Point2d, dp0: Vec2, dp1: Vec2) -> Self {
        let x = CubicPolynomial::from_hermite(p0.x, p1.x, dp0.x, dp1.x);
        let y = CubicPolynomial::from_hermite(p0.y, p1.y, dp0.y, dp1.y);
        let mut segment = Self {
            index,
            p0,
            p1,
            x,
            y,
            bb: Box2::new(p0, p1),
        };
        segment.bb = segment.compute_bounding_box();
        segment
    }

    /// Position of this segment within the spline.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn start(&self) -> Point2d {
        self.p0
    }

    pub fn end(&self) -> Point2d {
        self.p1
    }

    pub fn x(&self) -> &CubicPolynomial {
        &self.x
    }

    pub fn y(&self) -> &CubicPolynomial {
        &self.y
    }

    pub fn value(&self, t: f64) -> Point2d {
        Point2d::new(self.x.value(t), self.y.value(t))
    }

    pub fn first_derivative(&self, t: f64) -> Vec2 {
        Vec2::new(self.x.first_derivative(t), self.y.first_derivative(t))
    }

    pub fn second_derivative(&self, t: f64) -> Vec2 {
        Vec2::new(self.x.second_derivative(t), self.y.second_derivative(t))
    }

    /// Exact bounding box, including any bulge between the knots.
    pub fn bounding_box(&self) -> Box2 {
        self.bb
    }

    fn compute_bounding_box(&self) -> Box2 {
        let mut bb = Box2::new(self.p0, self.p1);
        for t in self.x.critical_points() {
            bb.include_point(&self.value(t));
        }
        for t in self.y.critical_points() {
            bb.include_point(&self.value(t));
        }
        bb
    }

    /// Closest point on this segment to `p` as `(local t, point, distance)`.
    ///
    /// Every local minimum of a coarse sampling is refined, so a second
    /// basin of attraction on a strongly curved segment is not lost.
    pub fn closest_point(&self, p: Point2d) -> (f64, Point2d, f64) {
        let samples: Vec<(f64, f64)> = (0..=CLOSEST_SAMPLES)
            .map(|i| {
                let t = i as f64 / CLOSEST_SAMPLES as f64;
                (t, (self.value(t) - p).length_squared())
            })
            .collect();

        let mut best = (0.0, self.p0, f64::INFINITY);
        for (i, &(t, d2)) in samples.iter().enumerate() {
            let left = i == 0 || samples[i - 1].1 >= d2;
            let right = i == CLOSEST_SAMPLES || samples[i + 1].1 >= d2;
            if !(left && right) {
                continue;
            }
            let candidate = self.refine_closest(p, t, d2);
            if candidate.2 < best.2 {
                best = candidate;
            }
        }
        best
    }

    /// Newton on `d/dt |f(t) - p|^2 / 2` from a sample at `t0` with squared distance `d2`.
    fn refine_closest(&self, p: Point2d, t0: f64, d2: f64) -> (f64, Point2d, f64) {
        let tol = crate::default_tolerance();
        let mut t = t0;
        for _ in 0..NEWTON_ITERATIONS {
            let offset = self.value(t) - p;
            let d1 = self.first_derivative(t);
            let g = offset.dot(&d1);
            let h = d1.dot(&d1) + offset.dot(&self.second_derivative(t));
            if h <= 0.0 {
                break;
            }
            let next = (t - g / h).clamp(0.0, 1.0);
            let step = (next - t).abs();
            t = next;
            if step < tol.parametric {
                break;
            }
        }

        let refined = self.value(t);
        let refined_d2 = (refined - p).length_squared();
        if refined_d2 < d2 {
            (t, refined, refined_d2.sqrt())
        } else {
            (t0, self.value(t0), d2.sqrt())
        }
    }
}

/// A natural cubic spline through an ordered list of knots.
///
/// The global parameter runs over `[0, knots - 1]`; segment `i` covers `[i, i + 1]`.
/// Only the knots are saved. Loading refits the curve, so a saved spline goes
/// through the same checks as [`CubicSpline2d::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SplineKnots", into = "SplineKnots")]
pub struct CubicSpline2d {
    segments: Vec<SplineSegment>,
    bb: Box2,
}

/// Serialized form of a [`CubicSpline2d`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SplineKnots {
    knots: Vec<Point2d>,
}

impl TryFrom<SplineKnots> for CubicSpline2d {
    type Error = SplineError;

    fn try_from(saved: SplineKnots) -> Result<Self, Self::Error> {
        CubicSpline2d::new(&saved.knots)
    }
}

impl From<CubicSpline2d> for SplineKnots {
    fn from(spline: CubicSpline2d) -> Self {
        SplineKnots {
            knots: spline.knots(),
        }
    }
}

impl CubicSpline2d {
    /// Fit a natural cubic spline through `knots`.
    #[instrument(skip(knots), fields(knots = knots.len()))]
    pub fn new(knots: &[Point2d]) -> Result<Self, SplineError> {
        let n = knots.len();
        if n < 2 {
            return Err(SplineError::TooFewKnots { count: n });
        }
        if let Some(index) = knots.iter().position(|k| !k.is_finite()) {
            return Err(SplineError::NonFiniteKnot { index });
        }

        // Same matrix for both axes; only the right-hand sides differ.
        // The end rows encode a zero second derivative at the outer knots.
        let mut rows = vec![TriRow::new(1.0, 4.0, 1.0); n];
        let mut rhs_x = vec![0.0; n];
        let mut rhs_y = vec![0.0; n];
        for i in 1..n - 1 {
            rhs_x[i] = 3.0 * (knots[i + 1].x - knots[i - 1].x);
            rhs_y[i] = 3.0 * (knots[i + 1].y - knots[i - 1].y);
        }
        rows[0] = TriRow::new(0.0, 2.0, 1.0);
        rhs_x[0] = 3.0 * (knots[1].x - knots[0].x);
        rhs_y[0] = 3.0 * (knots[1].y - knots[0].y);
        rows[n - 1] = TriRow::new(1.0, 2.0, 0.0);
        rhs_x[n - 1] = 3.0 * (knots[n - 1].x - knots[n - 2].x);
        rhs_y[n - 1] = 3.0 * (knots[n - 1].y - knots[n - 2].y);

        // The solutions are the first derivatives at every knot.
        let dx = solve_tridiagonal(&rows, &rhs_x)?;
        let dy = solve_tridiagonal(&rows, &rhs_y)?;

        let segments: Vec<SplineSegment> = (0..n - 1)
            .map(|i| {
                SplineSegment::new(
                    i,
                    knots[i],
                    knots[i + 1],
                    Vec2::new(dx[i], dy[i]),
                    Vec2::new(dx[i + 1], dy[i + 1]),
                )
            })
            .collect();

        let bb = segments
            .iter()
            .skip(1)
            .fold(segments[0].bounding_box(), |bb, s| bb.extend(&s.bounding_box()));

        info!(
            segments = segments.len(),
            min = ?[bb.min.x, bb.min.y],
            max = ?[bb.max.x, bb.max.y],
            "cubic spline fitted"
        );
        Ok(Self { segments, bb })
    }

    pub fn segments(&self) -> &[SplineSegment] {
        &self.segments
    }

    /// The knots the curve was fitted through, in order.
    pub fn knots(&self) -> Vec<Point2d> {
        let mut knots: Vec<Point2d> = self.segments.iter().map(|s| s.start()).collect();
        if let Some(last) = self.segments.last() {
            knots.push(last.end());
        }
        knots
    }

    pub fn knot_count(&self) -> usize {
        self.segments.len() + 1
    }

    /// Valid global parameter range, `(0, knots - 1)`.
    pub fn parameter_range(&self) -> (f64, f64) {
        (0.0, self.segments.len() as f64)
    }

    fn locate(&self, t: f64) -> (usize, f64) {
        let n = self.segments.len();
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, n as f64) };
        let i = t as usize;
        if i >= n {
            // The end of the curve is the end of the last segment.
            (n - 1, 1.0)
        } else {
            (i, t - i as f64)
        }
    }

    /// Segment and local parameter for a global parameter. Out-of-range input is clamped.
    pub fn find(&self, t: f64) -> (&SplineSegment, f64) {
        let (i, local) = self.locate(t);
        (&self.segments[i], local)
    }

    pub fn value(&self, t: f64) -> Point2d {
        let (segment, t) = self.find(t);
        segment.value(t)
    }

    pub fn first_derivative(&self, t: f64) -> Vec2 {
        let (segment, t) = self.find(t);
        segment.first_derivative(t)
    }

    pub fn second_derivative(&self, t: f64) -> Vec2 {
        let (segment, t) = self.find(t);
        segment.second_derivative(t)
    }

    /// `n` points at uniform steps of the global parameter, first and last knot included.
    ///
    /// Spacing is uniform in parameter, not in arc length.
    pub fn polygonize(&self, n: usize) -> Vec<Point2d> {
        match n {
            0 => Vec::new(),
            1 => vec![self.value(0.0)],
            _ => {
                let span = self.segments.len() as f64;
                let last = (n - 1) as f64;
                (0..n).map(|i| self.value(span * i as f64 / last)).collect()
            }
        }
    }

    /// Closest point on the curve to `p` as `(global t, point, distance)`.
    pub fn closest_point(&self, p: Point2d) -> (f64, Point2d, f64) {
        let mut best = (0.0, self.segments[0].start(), f64::INFINITY);
        let mut visited = 0usize;
        for segment in &self.segments {
            if segment.bounding_box().distance_to_point(&p) >= best.2 {
                continue;
            }
            visited += 1;
            let (t, q, d) = segment.closest_point(p);
            if d < best.2 {
                best = (segment.index() as f64 + t, q, d);
            }
        }
        debug!(visited, distance = best.2, "spline closest point");
        best
    }
}

/// An open curve has no inside, so the distance is unsigned: zero on the
/// curve and positive everywhere else. Use the curve as a boundary, not as a
/// solid operand in boolean combinations.
impl Sdf2 for CubicSpline2d {
    fn distance(&self, p: Point2d) -> f64 {
        self.closest_point(p).2
    }

    fn bounding_box(&self) -> Box2 {
        self.bb
    }
}
