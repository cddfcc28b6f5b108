//! Root finding for collision prediction
//!
//! Two interchangeable solvers answer "when does this edge reach that
//! edge?":
//! - Closed form: polynomial trajectories reduce to `a*u² + b*u + c = 0`
//!   with `u = t - now`, solved with the quadratic formula.
//! - Newton-Raphson: works on any motion law, at the cost of an iteration
//!   budget per starting guess.
//!
//! Both return absolute times, ascending, strictly after `now` and no
//! further ahead than the horizon.

use std::ops::Sub;

use super::trajectory::{Edge, Trajectory};
use crate::config::{Config, NewtonParams, RootSolver};
use crate::error::{ContractViolation, finite};

/// Coefficients below this are treated as zero
const DEGENERATE: f64 = 1e-12;

/// Newton roots closer than this are the same root
const ROOT_MERGE: f64 = 1e-4;

/// `a*u² + b*u + c`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Quadratic {
    pub fn constant(c: f64) -> Self {
        Self { a: 0.0, b: 0.0, c }
    }

    #[inline]
    pub fn eval(&self, u: f64) -> f64 {
        (self.a * u + self.b) * u + self.c
    }

    pub fn roots(&self) -> Result<Vec<f64>, ContractViolation> {
        solve_quadratic(self.a, self.b, self.c)
    }
}

impl Sub for Quadratic {
    type Output = Quadratic;

    fn sub(self, rhs: Quadratic) -> Quadratic {
        Quadratic {
            a: self.a - rhs.a,
            b: self.b - rhs.b,
            c: self.c - rhs.c,
        }
    }
}

/// Real roots of `a*t² + b*t + c = 0`, ascending
///
/// - `a = 0, b = 0`: parallel (or coincident) lines, no finite root
/// - `a = 0`: linear, one root
/// - negative discriminant: no real root
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Result<Vec<f64>, ContractViolation> {
    finite("quadratic a", a)?;
    finite("quadratic b", b)?;
    finite("quadratic c", c)?;

    if a.abs() < DEGENERATE {
        if b.abs() < DEGENERATE {
            return Ok(Vec::new());
        }
        return Ok(vec![finite("linear root", -c / b)?]);
    }

    let inner = b * b - 4.0 * a * c;
    if inner < 0.0 {
        return Ok(Vec::new());
    }
    if inner == 0.0 {
        return Ok(vec![finite("double root", -b / (2.0 * a))?]);
    }

    // Stable form: avoids cancellation between -b and sqrt(inner)
    let q = -0.5 * (b + b.signum() * inner.sqrt());
    let r1 = finite("quadratic root", q / a)?;
    let r2 = finite("quadratic root", c / q)?;
    Ok(if r1 <= r2 { vec![r1, r2] } else { vec![r2, r1] })
}

/// The window `(now, now + span]` in which a predicted collision is real
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon {
    pub now: f64,
    pub span: f64,
}

impl Horizon {
    pub fn new(now: f64, span: f64) -> Self {
        Self { now, span }
    }

    /// Window starting at `now` and spanning the longest possible jump
    pub fn for_config(now: f64, config: &Config) -> Self {
        Self::new(now, config.horizon())
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.now + self.span
    }

    /// Strictly in the future and not past the end
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t > self.now && t <= self.end()
    }
}

/// Keep the roots inside the horizon, ascending
pub fn future_roots(roots: impl IntoIterator<Item = f64>, horizon: &Horizon) -> Vec<f64> {
    let mut kept: Vec<f64> = roots.into_iter().filter(|&t| horizon.contains(t)).collect();
    kept.sort_by(f64::total_cmp);
    kept
}

/// Smallest root inside the horizon
pub fn earliest_future_root(
    roots: impl IntoIterator<Item = f64>,
    horizon: &Horizon,
) -> Option<f64> {
    future_roots(roots, horizon).into_iter().next()
}

/// Future zeros of a polynomial in `u = t - horizon.now`
pub fn polynomial_roots(poly: &Quadratic, horizon: &Horizon) -> Result<Vec<f64>, ContractViolation> {
    let roots = poly.roots()?;
    Ok(future_roots(roots.into_iter().map(|u| horizon.now + u), horizon))
}

/// Future zeros of `f` by Newton-Raphson
///
/// Starting guesses are spread evenly over the horizon, the first at `now`
/// and the last at the far end. `f'` is a forward difference. Seeds that
/// stall, diverge or leave the horizon are dropped.
pub fn newton_roots<F>(
    f: F,
    horizon: &Horizon,
    params: &NewtonParams,
) -> Result<Vec<f64>, ContractViolation>
where
    F: Fn(f64) -> f64,
{
    let h = params.derivative_step;
    let mut found: Vec<f64> = Vec::new();

    for k in 0..=params.seeds {
        let mut t = horizon.now + horizon.span * k as f64 / params.seeds as f64;

        for _ in 0..params.iterations {
            let ft = f(t);
            if !ft.is_finite() {
                break;
            }
            if ft.abs() < params.tolerance {
                if horizon.contains(t) && !found.iter().any(|r| (r - t).abs() < ROOT_MERGE) {
                    found.push(finite("newton root", t)?);
                }
                break;
            }
            let slope = (f(t + h) - ft) / h;
            if !slope.is_finite() || slope.abs() < DEGENERATE {
                break;
            }
            t -= ft / slope;
            if !t.is_finite() {
                break;
            }
        }
    }

    found.sort_by(f64::total_cmp);
    Ok(found)
}

/// Future times at which `a_edge` of `a` meets `b_edge` of `b`
///
/// Uses the closed form when both motions are polynomial and the config
/// asks for it, Newton otherwise.
pub fn edge_crossings(
    a: &Trajectory,
    a_edge: Edge,
    b: &Trajectory,
    b_edge: Edge,
    horizon: &Horizon,
    config: &Config,
) -> Result<Vec<f64>, ContractViolation> {
    if config.root_solver == RootSolver::ClosedForm {
        if let (Some(pa), Some(pb)) = (
            a.edge_polynomial(a_edge, horizon.now),
            b.edge_polynomial(b_edge, horizon.now),
        ) {
            return polynomial_roots(&(pa - pb), horizon);
        }
    }
    newton_roots(
        |t| a_edge.of(&a.box_at(t)) - b_edge.of(&b.box_at(t)),
        horizon,
        &config.newton,
    )
}

/// Future times at which `edge` of `trajectory` sits at height `target_y`
pub fn height_crossings(
    trajectory: &Trajectory,
    edge: Edge,
    target_y: f64,
    horizon: &Horizon,
    config: &Config,
) -> Result<Vec<f64>, ContractViolation> {
    finite("target height", target_y)?;
    if config.root_solver == RootSolver::ClosedForm {
        if let Some(poly) = trajectory.edge_polynomial(edge, horizon.now) {
            return polynomial_roots(&(poly - Quadratic::constant(target_y)), horizon);
        }
    }
    newton_roots(
        |t| edge.of(&trajectory.box_at(t)) - target_y,
        horizon,
        &config.newton,
    )
}
