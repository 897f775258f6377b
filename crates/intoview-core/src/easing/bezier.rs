//! Cubic-Bezier easing evaluator.
//!
//! A curve is fixed by its two inner control points `(x1, y1)` and `(x2, y2)`;
//! the outer points are pinned at `(0, 0)` and `(1, 1)`. Evaluating the curve
//! at progress `x` means inverting the parametric `x(t)` to recover `t`, then
//! reading `y(t)`. Inversion starts from a guess interpolated out of a small
//! precomputed sample table and is refined by Newton-Raphson, or by bisection
//! where the curve is too flat for Newton to be stable.

use crate::{Error, Result};

const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.001;
const SUBDIVISION_PRECISION: f64 = 0.000_000_1;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP_SIZE: f64 = 1.0 / (SPLINE_TABLE_SIZE as f64 - 1.0);

#[inline]
fn coeff_a(p1: f64, p2: f64) -> f64 {
    1.0 - 3.0 * p2 + 3.0 * p1
}

#[inline]
fn coeff_b(p1: f64, p2: f64) -> f64 {
    3.0 * p2 - 6.0 * p1
}

#[inline]
fn coeff_c(p1: f64) -> f64 {
    3.0 * p1
}

/// x(t) given x1 and x2, or y(t) given y1 and y2.
#[inline]
pub(crate) fn calc_bezier(t: f64, p1: f64, p2: f64) -> f64 {
    ((coeff_a(p1, p2) * t + coeff_b(p1, p2)) * t + coeff_c(p1)) * t
}

/// dx/dt given x1 and x2, or dy/dt given y1 and y2.
#[inline]
pub(crate) fn slope(t: f64, p1: f64, p2: f64) -> f64 {
    3.0 * coeff_a(p1, p2) * t * t + 2.0 * coeff_b(p1, p2) * t + coeff_c(p1)
}

fn binary_subdivide(x: f64, mut lower: f64, mut upper: f64, x1: f64, x2: f64) -> f64 {
    let mut iteration = 0;
    loop {
        let t = lower + (upper - lower) / 2.0;
        let error = calc_bezier(t, x1, x2) - x;
        if error > 0.0 {
            upper = t;
        } else {
            lower = t;
        }
        iteration += 1;
        if error.abs() <= SUBDIVISION_PRECISION || iteration >= SUBDIVISION_MAX_ITERATIONS {
            return t;
        }
    }
}

fn newton_raphson_iterate(x: f64, mut guess: f64, x1: f64, x2: f64) -> f64 {
    for _ in 0..NEWTON_ITERATIONS {
        let current_slope = slope(guess, x1, x2);
        if current_slope == 0.0 {
            return guess;
        }
        let error = calc_bezier(guess, x1, x2) - x;
        guess -= error / current_slope;
    }
    guess
}

/// A validated cubic-Bezier timing curve.
///
/// Construct with [`CubicBezier::new`]; evaluate with [`CubicBezier::ease`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    /// `None` for the identity curve, which never needs inverting.
    samples: Option<[f64; SPLINE_TABLE_SIZE]>,
}

impl CubicBezier {
    /// Build a curve from its two control points.
    ///
    /// The x coordinates must lie in `[0, 1]` so that `x(t)` stays monotonic
    /// and invertible. The y coordinates are unconstrained, which allows
    /// overshooting curves.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self> {
        if !((0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2)) {
            return Err(Error::InvalidParameter { x1, x2 });
        }
        Ok(Self::new_unchecked(x1, y1, x2, y2))
    }

    /// Caller guarantees `x1` and `x2` are within `[0, 1]`.
    pub(crate) fn new_unchecked(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let samples = if x1 == y1 && x2 == y2 {
            None
        } else {
            let mut table = [0.0; SPLINE_TABLE_SIZE];
            for (i, sample) in table.iter_mut().enumerate() {
                *sample = calc_bezier(i as f64 * SAMPLE_STEP_SIZE, x1, x2);
            }
            Some(table)
        };

        Self {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    /// Control points as `(x1, y1, x2, y2)`.
    pub fn control_points(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Whether this curve is the straight identity line.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.samples.is_none()
    }

    /// Map linear progress `x` to eased progress.
    ///
    /// `0` and `1` map exactly onto themselves for every valid curve.
    pub fn ease(&self, x: f64) -> f64 {
        let Some(samples) = &self.samples else {
            return x;
        };
        if x == 0.0 {
            return 0.0;
        }
        if x == 1.0 {
            return 1.0;
        }
        calc_bezier(self.t_for_x(samples, x), self.y1, self.y2)
    }

    fn t_for_x(&self, samples: &[f64; SPLINE_TABLE_SIZE], x: f64) -> f64 {
        let last_sample = SPLINE_TABLE_SIZE - 1;
        let mut interval_start = 0.0;
        let mut current = 1;

        while current != last_sample && samples[current] <= x {
            interval_start += SAMPLE_STEP_SIZE;
            current += 1;
        }
        current -= 1;

        let dist = (x - samples[current]) / (samples[current + 1] - samples[current]);
        let guess = interval_start + dist * SAMPLE_STEP_SIZE;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            newton_raphson_iterate(x, guess, self.x1, self.x2)
        } else if initial_slope == 0.0 {
            guess
        } else {
            binary_subdivide(
                x,
                interval_start,
                interval_start + SAMPLE_STEP_SIZE,
                self.x1,
                self.x2,
            )
        }
    }
}

/// Build a cubic-Bezier easing function.
///
/// Fails with [`Error::InvalidParameter`] unless `0 <= x1 <= 1` and
/// `0 <= x2 <= 1`.
pub fn make_cubic_bezier_easing(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
) -> Result<impl Fn(f64) -> f64 + Clone> {
    let curve = CubicBezier::new(x1, y1, x2, y2)?;
    Ok(move |x| curve.ease(x))
}
