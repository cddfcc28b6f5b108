//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time (charge measurement)
//! - Fixed-timestep tick driving
//! - Browser bindings (wasm32 only)

use crate::config::Config;
use crate::error::{ContractViolation, Error};
use crate::sim::{InputEvent, Scene, SimState, enqueue_input, scene, tick};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Longest frame the driver will catch up on, in seconds
pub const MAX_FRAME_SECONDS: f64 = 0.1;

/// Wall-clock source in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic native clock, zeroed at construction
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(now_ms: f64) -> Self {
        Self { now_ms }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now_ms += ms;
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// A running game: state, tuning, clock and the frame accumulator
#[derive(Debug)]
pub struct Session<C: Clock> {
    state: SimState,
    config: Config,
    clock: C,
    accumulator: f64,
}

impl<C: Clock> Session<C> {
    pub fn new(seed: u64, config: Config, clock: C) -> Result<Self, Error> {
        config.validate()?;
        let state = SimState::new(seed, &config)?;
        log::info!("Session started with seed {}", seed);
        Ok(Self {
            state,
            config,
            clock,
            accumulator: 0.0,
        })
    }

    /// Throw the current run away and start over
    pub fn restart(&mut self, seed: u64) -> Result<(), ContractViolation> {
        self.state = SimState::new(seed, &self.config)?;
        self.accumulator = 0.0;
        log::info!("Session restarted with seed {}", seed);
        Ok(())
    }

    /// Run the fixed ticks covered by `elapsed` seconds of real time
    ///
    /// Returns the number of ticks run. Stops for good once the hero dies.
    pub fn advance(&mut self, elapsed: f64) -> Result<u32, ContractViolation> {
        if !self.is_running() {
            return Ok(0);
        }
        let elapsed = if elapsed.is_finite() {
            elapsed.clamp(0.0, MAX_FRAME_SECONDS)
        } else {
            0.0
        };
        self.accumulator += elapsed;

        let dt = self.config.tick_seconds();
        let mut substeps = 0;
        while self.accumulator >= dt && substeps < self.config.max_substeps {
            tick(&mut self.state, &self.config)?;
            self.accumulator -= dt;
            substeps += 1;

            if self.state.hero.is_dead {
                self.accumulator = 0.0;
                log::info!(
                    "Game over after {} ticks, score {}",
                    self.state.current_step,
                    self.state.score
                );
                break;
            }
        }
        Ok(substeps)
    }

    pub fn press(&mut self) {
        let time_ms = self.clock.now_ms();
        enqueue_input(&mut self.state, InputEvent::PrimaryPressed { time_ms });
    }

    pub fn release(&mut self, x: f64, y: f64) {
        let time_ms = self.clock.now_ms();
        enqueue_input(&mut self.state, InputEvent::PrimaryReleased { x, y, time_ms });
    }

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        enqueue_input(&mut self.state, InputEvent::PointerMoved { x, y });
    }

    pub fn scene(&self) -> Result<Scene, ContractViolation> {
        scene(&self.state, &self.config)
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        !self.state.hero.is_dead
    }

    #[inline]
    pub fn score(&self) -> u64 {
        self.state.score
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Locomotion;

    fn session(config: Config) -> Session<ManualClock> {
        Session::new(1, config, ManualClock::default()).unwrap()
    }

    #[test]
    fn test_advance_runs_whole_ticks() {
        let mut s = session(Config::default());
        assert_eq!(s.advance(0.01).unwrap(), 0);
        assert_eq!(s.advance(0.01).unwrap(), 1);
        assert_eq!(s.advance(0.04).unwrap(), 2);
        assert_eq!(s.state().current_step, 3);
    }

    #[test]
    fn test_advance_clamps_long_frames() {
        let config = Config {
            tick_hz: 100.0,
            ..Config::default()
        };
        let mut s = session(config);
        assert_eq!(s.advance(f64::NAN).unwrap(), 0);
        assert_eq!(s.advance(-1.0).unwrap(), 0);
        // 10 s clamps to 0.1 s, then the substep cap applies
        assert_eq!(s.advance(10.0).unwrap(), 8);
    }

    #[test]
    fn test_release_measures_hold_with_clock() {
        let mut s = session(Config {
            cloud_interval_ticks: 0,
            ..Config::default()
        });
        s.press();
        s.advance(0.02).unwrap();
        assert_eq!(s.state().hero.locomotion, Locomotion::Falling);

        s.clock_mut().advance(250.0);
        s.press();
        s.advance(0.02).unwrap();
        assert_eq!(s.state().hero.jump_charge_start, Some(250.0));

        s.clock_mut().advance(100.0);
        s.release(500.0, 0.0);
        s.advance(0.02).unwrap();
        // Not standing: the charge is dropped without a launch
        assert!(!s.state().hero.is_charging());
        assert_eq!(s.state().hero.locomotion, Locomotion::Falling);
    }

    #[test]
    fn test_stops_ticking_after_death() {
        let mut s = session(Config {
            cloud_interval_ticks: 0,
            ..Config::default()
        });
        s.press();
        let mut frames = 0;
        while s.is_running() {
            s.advance(0.1).unwrap();
            frames += 1;
            assert!(frames < 1000, "hero never fell out of the world");
        }
        let step = s.state().current_step;
        assert_eq!(s.advance(0.1).unwrap(), 0);
        assert_eq!(s.state().current_step, step);
        assert!(s.scene().unwrap().game_over);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = Config {
            gravity: 0.0,
            ..Config::default()
        };
        let err = Session::new(1, config, ManualClock::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_restart_resets_run() {
        let mut s = session(Config::default());
        s.advance(0.1).unwrap();
        s.restart(2).unwrap();
        assert_eq!(s.state().current_step, 0);
        assert_eq!(s.state().seed, 2);
        assert!(s.state().clouds.is_empty());
    }
}
