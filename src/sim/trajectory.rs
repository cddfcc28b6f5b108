//! Closed-form trajectories
//!
//! Every moving entity is a pure function of absolute time. A trajectory is
//! an immutable `{kind, params, init}` record; `evaluate(t)` returns the box
//! the entity occupies at tick `t`. Because the motion law is closed-form,
//! collisions can be solved for ahead of time instead of being detected
//! frame by frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::roots::Quadratic;
use crate::error::{ContractViolation, finite};

/// Motion law of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionKind {
    /// Opening flight: constant horizontal speed, sine bobbing
    /// `y = y0 + amplitude * sin(dt / period)`
    Flying { amplitude: f64, period: f64 },
    /// Riding a cloud: horizontal drift, fixed height
    Standing,
    /// Projectile motion
    Falling,
    /// Cloud platform entering from the world's right bound
    CloudDrift,
}

/// Initial conditions of a trajectory, at `dt = 0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionParams {
    pub origin: Aabb,
    pub velocity: DVec2,
    pub acceleration: DVec2,
}

/// Box edge selector for crossing queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    #[inline]
    pub fn of(self, aabb: &Aabb) -> f64 {
        match self {
            Edge::Left => aabb.x0,
            Edge::Right => aabb.x1,
            Edge::Top => aabb.y0,
            Edge::Bottom => aabb.y1,
        }
    }

    #[inline]
    fn component(self, v: DVec2) -> f64 {
        match self {
            Edge::Left | Edge::Right => v.x,
            Edge::Top | Edge::Bottom => v.y,
        }
    }
}

/// A motion law anchored at absolute time `init`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    kind: MotionKind,
    params: MotionParams,
    init: f64,
}

impl Trajectory {
    fn new(kind: MotionKind, params: MotionParams, init: f64) -> Result<Self, ContractViolation> {
        params.origin.checked()?;
        finite("velocity x", params.velocity.x)?;
        finite("velocity y", params.velocity.y)?;
        finite("acceleration x", params.acceleration.x)?;
        finite("acceleration y", params.acceleration.y)?;
        finite("trajectory init", init)?;
        if let MotionKind::Flying { amplitude, period } = kind {
            finite("bob amplitude", amplitude)?;
            finite("bob period", period)?;
        }
        Ok(Self { kind, params, init })
    }

    /// Horizontal flight with sine bobbing
    pub fn flying(
        origin: Aabb,
        speed: f64,
        amplitude: f64,
        period: f64,
        init: f64,
    ) -> Result<Self, ContractViolation> {
        Self::new(
            MotionKind::Flying { amplitude, period },
            MotionParams {
                origin,
                velocity: DVec2::new(speed, 0.0),
                acceleration: DVec2::ZERO,
            },
            init,
        )
    }

    /// Projectile motion from `origin`
    pub fn falling(
        origin: Aabb,
        velocity: DVec2,
        acceleration: DVec2,
        init: f64,
    ) -> Result<Self, ContractViolation> {
        Self::new(
            MotionKind::Falling,
            MotionParams {
                origin,
                velocity,
                acceleration,
            },
            init,
        )
    }

    /// Drifting left at `scroll_speed` at a fixed height
    pub fn standing(origin: Aabb, scroll_speed: f64, init: f64) -> Result<Self, ContractViolation> {
        Self::new(
            MotionKind::Standing,
            MotionParams {
                origin,
                velocity: DVec2::new(-scroll_speed, 0.0),
                acceleration: DVec2::ZERO,
            },
            init,
        )
    }

    /// A cloud whose left edge starts on `right_bound` at tick `init`
    pub fn cloud_drift(
        right_bound: f64,
        top: f64,
        size: DVec2,
        scroll_speed: f64,
        init: f64,
    ) -> Result<Self, ContractViolation> {
        Self::new(
            MotionKind::CloudDrift,
            MotionParams {
                origin: Aabb::from_min_size(DVec2::new(right_bound, top), size),
                velocity: DVec2::new(-scroll_speed, 0.0),
                acceleration: DVec2::ZERO,
            },
            init,
        )
    }

    #[inline]
    pub fn kind(&self) -> MotionKind {
        self.kind
    }

    /// Raw initial conditions, unevaluated
    #[inline]
    pub fn params(&self) -> &MotionParams {
        &self.params
    }

    /// Absolute time the motion law is centered on
    #[inline]
    pub fn init(&self) -> f64 {
        self.init
    }

    /// Whether every edge is at most quadratic in time
    #[inline]
    pub fn is_polynomial(&self) -> bool {
        !matches!(self.kind, MotionKind::Flying { .. })
    }

    fn displacement(&self, dt: f64) -> DVec2 {
        let p = &self.params;
        match self.kind {
            MotionKind::Flying { amplitude, period } => {
                DVec2::new(p.velocity.x * dt, amplitude * (dt / period).sin())
            }
            MotionKind::Falling => p.velocity * dt + 0.5 * p.acceleration * dt * dt,
            MotionKind::Standing | MotionKind::CloudDrift => DVec2::new(p.velocity.x * dt, 0.0),
        }
    }

    /// Box at `t` without contract checks (for iterative solvers)
    #[inline]
    pub fn box_at(&self, t: f64) -> Aabb {
        self.params.origin.translated(self.displacement(t - self.init))
    }

    /// Box at absolute time `t`
    pub fn evaluate(&self, t: f64) -> Result<Aabb, ContractViolation> {
        finite("evaluation time", t)?;
        self.box_at(t).checked()
    }

    /// Analytic velocity at `t`
    pub fn velocity_at(&self, t: f64) -> DVec2 {
        let dt = t - self.init;
        let p = &self.params;
        match self.kind {
            MotionKind::Flying { amplitude, period } => {
                DVec2::new(p.velocity.x, amplitude / period * (dt / period).cos())
            }
            MotionKind::Falling => p.velocity + p.acceleration * dt,
            MotionKind::Standing | MotionKind::CloudDrift => DVec2::new(p.velocity.x, 0.0),
        }
    }

    /// Coefficients of `edge` as a polynomial in `u = t - now`
    ///
    /// `None` for non-polynomial motion.
    pub fn edge_polynomial(&self, edge: Edge, now: f64) -> Option<Quadratic> {
        if !self.is_polynomial() {
            return None;
        }
        let accel = match self.kind {
            MotionKind::Falling => self.params.acceleration,
            _ => DVec2::ZERO,
        };
        Some(Quadratic {
            a: 0.5 * edge.component(accel),
            b: edge.component(self.velocity_at(now)),
            c: edge.of(&self.box_at(now)),
        })
    }
}

/// Forward-difference velocity of the box's top-left corner at `t`
pub fn instantaneous_slope(
    trajectory: &Trajectory,
    t: f64,
    epsilon: f64,
) -> Result<DVec2, ContractViolation> {
    let here = trajectory.evaluate(t)?.min();
    let ahead = trajectory.evaluate(t + epsilon)?.min();
    let slope = (ahead - here) / epsilon;
    finite("slope x", slope.x)?;
    finite("slope y", slope.y)?;
    Ok(slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hero_box() -> Aabb {
        Aabb::from_min_size(DVec2::new(10.0, 60.0), DVec2::splat(32.0))
    }

    #[test]
    fn test_flying_bobs_around_origin() {
        let t = Trajectory::flying(hero_box(), 0.75, 7.0, 30.0, 0.0).unwrap();
        let quarter = 30.0 * std::f64::consts::FRAC_PI_2;
        let b = t.evaluate(quarter).unwrap();
        assert!((b.y0 - (60.0 + 7.0)).abs() < 1e-9);
        assert!((b.x0 - (10.0 + 0.75 * quarter)).abs() < 1e-9);
    }

    #[test]
    fn test_falling_is_projectile() {
        let t = Trajectory::falling(
            hero_box(),
            DVec2::new(2.0, -3.0),
            DVec2::new(0.0, 0.5),
            100.0,
        )
        .unwrap();
        let b = t.evaluate(104.0).unwrap();
        assert!((b.x0 - 18.0).abs() < 1e-9);
        // 60 - 3*4 + 0.5*0.5*16
        assert!((b.y0 - 52.0).abs() < 1e-9);
        assert_eq!(b.size(), DVec2::splat(32.0));
    }

    #[test]
    fn test_standing_drifts_left_at_fixed_height() {
        let t = Trajectory::standing(hero_box(), 1.4, 10.0).unwrap();
        let b = t.evaluate(20.0).unwrap();
        assert!((b.x0 - (10.0 - 14.0)).abs() < 1e-9);
        assert_eq!(b.y0, 60.0);
    }

    #[test]
    fn test_cloud_drift_starts_at_right_bound() {
        let t = Trajectory::cloud_drift(940.0, 200.0, DVec2::new(140.0, 33.0), 1.4, 300.0).unwrap();
        let b = t.evaluate(300.0).unwrap();
        assert_eq!(b.x0, 940.0);
        assert_eq!(b.x1, 1080.0);
        let later = t.evaluate(310.0).unwrap();
        assert!((later.x0 - 926.0).abs() < 1e-9);
        assert_eq!(later.y0, 200.0);
    }

    #[test]
    fn test_params_accessor_is_raw() {
        let t = Trajectory::falling(hero_box(), DVec2::new(1.0, -9.0), DVec2::Y, 5.0).unwrap();
        let _ = t.evaluate(50.0).unwrap();
        assert_eq!(t.params().velocity, DVec2::new(1.0, -9.0));
        assert_eq!(t.params().origin, hero_box());
    }

    #[test]
    fn test_evaluate_rejects_nan_time() {
        let t = Trajectory::standing(hero_box(), 1.0, 0.0).unwrap();
        assert!(t.evaluate(f64::NAN).is_err());
        assert!(Trajectory::standing(hero_box(), f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_slope_matches_analytic_velocity() {
        let t = Trajectory::flying(hero_box(), 0.75, 7.0, 30.0, 0.0).unwrap();
        for step in [0.0, 12.0, 47.0, 90.0] {
            let slope = instantaneous_slope(&t, step, 1e-5).unwrap();
            let v = t.velocity_at(step);
            assert!((slope - v).length() < 1e-4, "step {step}: {slope} vs {v}");
        }
    }

    #[test]
    fn test_edge_polynomial_matches_box() {
        let t = Trajectory::falling(hero_box(), DVec2::new(1.5, -4.0), DVec2::new(0.1, 0.3), 2.0)
            .unwrap();
        let now = 7.0;
        let poly = t.edge_polynomial(Edge::Bottom, now).unwrap();
        for u in [0.0, 1.0, 5.5, 20.0] {
            assert!((poly.eval(u) - t.box_at(now + u).y1).abs() < 1e-9);
        }
        let poly = t.edge_polynomial(Edge::Left, now).unwrap();
        assert!((poly.eval(3.0) - t.box_at(now + 3.0).x0).abs() < 1e-9);

        let flying = Trajectory::flying(hero_box(), 1.0, 7.0, 30.0, 0.0).unwrap();
        assert!(flying.edge_polynomial(Edge::Bottom, 0.0).is_none());
    }

    proptest! {
        #[test]
        fn evaluate_at_init_is_origin(
            x in -500f64..500.,
            y in -500f64..500.,
            vx in -20f64..20.,
            vy in -20f64..20.,
            ay in 0f64..1.,
            init in 0f64..100_000.,
        ) {
            let origin = Aabb::from_min_size(DVec2::new(x, y), DVec2::splat(32.0));
            let kinds = [
                Trajectory::flying(origin, vx, 7.0, 30.0, init).unwrap(),
                Trajectory::falling(origin, DVec2::new(vx, vy), DVec2::new(0.0, ay), init).unwrap(),
                Trajectory::standing(origin, vx.abs(), init).unwrap(),
            ];
            for t in kinds {
                prop_assert_eq!(t.evaluate(init).unwrap(), origin);
            }
        }
    }
}
