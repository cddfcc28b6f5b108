//! Game configuration
//!
//! Every numeric constant the simulation reads lives here. The core never
//! hardcodes tuning; it only sees a `&Config`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::Aabb;

/// Which root finder the collision scheduler uses for polynomial trajectories
///
/// Non-polynomial motion (flight bobbing) always goes through Newton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RootSolver {
    /// Quadratic formula on the trajectory's coefficients
    #[default]
    ClosedForm,
    /// Newton-Raphson with a finite-difference derivative
    Newton,
}

impl RootSolver {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootSolver::ClosedForm => "closed-form",
            RootSolver::Newton => "newton",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "closed-form" | "closed" | "quadratic" => Some(RootSolver::ClosedForm),
            "newton" => Some(RootSolver::Newton),
            _ => None,
        }
    }
}

/// Newton-Raphson iteration settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonParams {
    /// Iteration budget per starting guess
    pub iterations: u32,
    /// Forward difference step for f'(t)
    pub derivative_step: f64,
    /// |f(t)| below this counts as a root
    pub tolerance: f64,
    /// Starting guesses spread over the horizon (the last one sits at its far end)
    pub seeds: u32,
}

impl Default for NewtonParams {
    fn default() -> Self {
        Self {
            iterations: 500,
            derivative_step: 0.1,
            tolerance: 1e-6,
            seeds: 8,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === World ===
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Leaving these bounds (below, left or right) kills the hero
    pub bounds: Aabb,
    /// Downward acceleration while falling
    pub gravity: f64,
    /// Leftward drift of clouds and anything standing on them
    pub scroll_speed: f64,

    // === Hero ===
    pub hero_width: f64,
    pub hero_height: f64,
    pub hero_start_x: f64,
    pub hero_start_y: f64,
    /// Rightward speed during the opening flight
    pub flight_speed: f64,
    pub bob_amplitude: f64,
    pub bob_period: f64,
    /// Forward time step for the flight-to-fall velocity hand-off
    pub slope_epsilon: f64,
    /// Milliseconds of charge per unit of launch speed
    pub charge_scale_ms: f64,
    pub max_launch_speed: f64,

    // === Clouds ===
    pub cloud_width: f64,
    pub cloud_height: f64,
    /// Ticks between spawns (0 disables spawning)
    pub cloud_interval_ticks: u64,
    /// Spawn band as fractions of `bounds.y1`
    pub cloud_band_top: f64,
    pub cloud_band_bottom: f64,

    // === Collision prediction ===
    pub root_solver: RootSolver,
    pub newton: NewtonParams,

    // === Tick driver ===
    pub tick_hz: f64,
    pub max_substeps: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            bounds: Aabb {
                x0: -CLOUD_WIDTH,
                x1: CANVAS_WIDTH + CLOUD_WIDTH,
                y0: -50.0,
                y1: CANVAS_HEIGHT + 50.0,
            },
            gravity: GRAVITY,
            scroll_speed: SCROLL_SPEED,

            hero_width: HERO_WIDTH,
            hero_height: HERO_HEIGHT,
            hero_start_x: HERO_START_X,
            hero_start_y: HERO_START_Y,
            flight_speed: FLIGHT_SPEED,
            bob_amplitude: BOB_AMPLITUDE,
            bob_period: BOB_PERIOD,
            slope_epsilon: SLOPE_EPSILON,
            charge_scale_ms: CHARGE_SCALE_MS,
            max_launch_speed: MAX_LAUNCH_SPEED,

            cloud_width: CLOUD_WIDTH,
            cloud_height: CLOUD_HEIGHT,
            cloud_interval_ticks: CLOUD_INTERVAL_TICKS,
            cloud_band_top: CLOUD_BAND_TOP,
            cloud_band_bottom: CLOUD_BAND_BOTTOM,

            root_solver: RootSolver::ClosedForm,
            newton: NewtonParams::default(),

            tick_hz: TICK_HZ,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        let numbers = [
            self.canvas_width,
            self.canvas_height,
            self.bounds.x0,
            self.bounds.x1,
            self.bounds.y0,
            self.bounds.y1,
            self.gravity,
            self.scroll_speed,
            self.hero_width,
            self.hero_height,
            self.hero_start_x,
            self.hero_start_y,
            self.flight_speed,
            self.bob_amplitude,
            self.bob_period,
            self.slope_epsilon,
            self.charge_scale_ms,
            self.max_launch_speed,
            self.cloud_width,
            self.cloud_height,
            self.cloud_band_top,
            self.cloud_band_bottom,
            self.newton.derivative_step,
            self.newton.tolerance,
            self.tick_hz,
        ];
        if numbers.iter().any(|v| !v.is_finite()) {
            return invalid("all numeric settings must be finite");
        }

        if self.bounds.x0 >= self.bounds.x1 || self.bounds.y0 >= self.bounds.y1 {
            return invalid("bounds must satisfy x0 < x1 and y0 < y1");
        }
        if self.gravity <= 0.0 {
            return invalid("gravity must be positive");
        }
        if self.scroll_speed < 0.0 {
            return invalid("scroll_speed must not be negative");
        }
        if self.hero_width <= 0.0 || self.hero_height <= 0.0 {
            return invalid("hero size must be positive");
        }
        if self.cloud_width <= 0.0 || self.cloud_height <= 0.0 {
            return invalid("cloud size must be positive");
        }
        if self.bob_period <= 0.0 || self.slope_epsilon <= 0.0 {
            return invalid("bob_period and slope_epsilon must be positive");
        }
        if self.charge_scale_ms <= 0.0 || self.max_launch_speed < 0.0 {
            return invalid("charge_scale_ms must be positive and max_launch_speed non-negative");
        }
        let (lo, hi) = self.cloud_band();
        if lo >= hi {
            return invalid("cloud spawn band is empty");
        }
        if self.newton.iterations == 0
            || self.newton.seeds == 0
            || self.newton.derivative_step <= 0.0
            || self.newton.tolerance <= 0.0
        {
            return invalid("newton parameters must be positive");
        }
        if self.tick_hz <= 0.0 || self.max_substeps == 0 {
            return invalid("tick_hz and max_substeps must be positive");
        }
        Ok(())
    }

    /// Range of cloud top edges a new cloud may spawn at
    pub fn cloud_band(&self) -> (f64, f64) {
        let lo = self.cloud_band_top * self.bounds.y1 - self.hero_height - 10.0;
        let hi = self.cloud_band_bottom * self.bounds.y1;
        (lo, hi)
    }

    /// Longest time a jump can stay airborne, in ticks
    ///
    /// Falling the full world height takes `sqrt(2H/g)`; a jump rises and
    /// falls, so the window is twice that. Predicted collisions further out
    /// are discarded.
    pub fn horizon(&self) -> f64 {
        let height = self.bounds.y1 - self.bounds.y0;
        2.0 * (2.0 * height / self.gravity).sqrt()
    }

    /// Duration of one tick in seconds
    pub fn tick_seconds(&self) -> f64 {
        1.0 / self.tick_hz
    }
}
