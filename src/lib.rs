//! Cloud Hopper - a side-scrolling cloud hopping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trajectories, root finding, collision scheduling)
//! - `config`: Numeric tuning, loadable from JSON
//! - `platform`: Tick driver, clocks and browser bindings
//! - `error`: Contract violations and configuration errors

pub mod config;
pub mod error;
pub mod platform;
pub mod sim;

pub use config::{Config, RootSolver};
pub use error::{ConfigError, ContractViolation, Error};

/// Game configuration defaults
pub mod consts {
    /// Simulation rate (ticks per second)
    pub const TICK_HZ: f64 = 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Canvas dimensions
    pub const CANVAS_WIDTH: f64 = 800.0;
    pub const CANVAS_HEIGHT: f64 = 480.0;

    /// Cloud platform size
    pub const CLOUD_WIDTH: f64 = 140.0;
    pub const CLOUD_HEIGHT: f64 = 140.0 / (1.613 * 1.613 * 1.613);
    /// Ticks between cloud spawns
    pub const CLOUD_INTERVAL_TICKS: u64 = 100;
    /// Vertical spawn band, as fractions of the lower world bound
    pub const CLOUD_BAND_TOP: f64 = 0.150;
    pub const CLOUD_BAND_BOTTOM: f64 = 0.875;

    /// World scroll speed (pixels per tick, leftward)
    pub const SCROLL_SPEED: f64 = 1.4;
    /// Horizontal speed while flying (pixels per tick)
    pub const FLIGHT_SPEED: f64 = 0.75;
    /// Flight bobbing: y = y0 + A * sin(dt / period)
    pub const BOB_AMPLITUDE: f64 = 7.0;
    pub const BOB_PERIOD: f64 = 30.0;
    /// Downward acceleration (pixels per tick squared)
    pub const GRAVITY: f64 = 9.8 / 60.0;

    /// Hero size
    pub const HERO_WIDTH: f64 = 32.0;
    pub const HERO_HEIGHT: f64 = 32.0;
    /// Hero start position (top-left corner)
    pub const HERO_START_X: f64 = 10.0;
    pub const HERO_START_Y: f64 = 60.0;

    /// Milliseconds of charge per unit of launch speed
    pub const CHARGE_SCALE_MS: f64 = 30.0;
    /// Launch speed cap (pixels per tick)
    pub const MAX_LAUNCH_SPEED: f64 = 11.0;

    /// Forward time step for numeric slopes (ticks)
    pub const SLOPE_EPSILON: f64 = 1e-4;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    while angle >= PI {
        angle -= TAU;
    }
    while angle < -PI {
        angle += TAU;
    }
    angle
}
