//! Simulation state and entity types
//!
//! The whole game lives in one `SimState` value that is passed explicitly
//! into `tick` and the reactions. Nothing here is global.

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::reaction::Reaction;
use super::trajectory::Trajectory;
use crate::config::Config;
use crate::error::ContractViolation;

/// Hero motion mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locomotion {
    /// Opening flight, until the first dive
    Flying,
    /// Airborne under gravity
    Falling,
    /// Riding a cloud
    Standing,
    /// Left the screen; terminal
    Dead,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub trajectory: Trajectory,
    pub locomotion: Locomotion,
    pub is_dead: bool,
    /// Last cloud landed on (one point per distinct cloud)
    pub last_cloud_id: Option<u32>,
    /// Cosmetic tilt toward the pointer (radians)
    pub angle: f64,
    /// Wall-clock time (ms) the current jump charge began
    pub jump_charge_start: Option<f64>,
}

impl Hero {
    /// Hero at the start position, flying
    pub fn new(config: &Config) -> Result<Self, ContractViolation> {
        let origin = Aabb::from_min_size(
            DVec2::new(config.hero_start_x, config.hero_start_y),
            DVec2::new(config.hero_width, config.hero_height),
        );
        let trajectory = Trajectory::flying(
            origin,
            config.flight_speed,
            config.bob_amplitude,
            config.bob_period,
            0.0,
        )?;
        Ok(Self {
            trajectory,
            locomotion: Locomotion::Flying,
            is_dead: false,
            last_cloud_id: None,
            angle: 0.0,
            jump_charge_start: None,
        })
    }

    /// Box at absolute time `t`
    #[inline]
    pub fn box_at(&self, t: f64) -> Result<Aabb, ContractViolation> {
        self.trajectory.evaluate(t)
    }

    /// Swap in a new motion law. Ignored once dead.
    pub fn replace_trajectory(&mut self, trajectory: Trajectory, locomotion: Locomotion) -> bool {
        if self.is_dead {
            return false;
        }
        self.trajectory = trajectory;
        self.locomotion = locomotion;
        true
    }

    /// Enter the terminal state
    pub fn kill(&mut self) {
        self.is_dead = true;
        self.locomotion = Locomotion::Dead;
        self.jump_charge_start = None;
    }

    #[inline]
    pub fn is_charging(&self) -> bool {
        self.jump_charge_start.is_some()
    }
}

/// A cloud platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cloud {
    pub id: u32,
    pub trajectory: Trajectory,
}

impl Cloud {
    #[inline]
    pub fn box_at(&self, t: f64) -> Result<Aabb, ContractViolation> {
        self.trajectory.evaluate(t)
    }
}

/// How the hero meets a cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContactKind {
    /// Feet on the cloud's top edge
    Landing,
    /// Head against the cloud's bottom edge
    Underside,
    /// Against the cloud's left or right edge
    Side,
}

/// A predicted future event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCollision {
    /// Absolute time of contact
    pub time: f64,
    /// Hero motion from `time` on
    pub trajectory: Trajectory,
    pub locomotion: Locomotion,
    pub cloud_id: Option<u32>,
    pub kind: ContactKind,
}

impl PendingCollision {
    /// Whether the contact time has been reached at tick `step`
    #[inline]
    pub fn is_due(&self, step: u64) -> bool {
        self.time <= step as f64
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    pub hero: Hero,
    /// Active clouds, in spawn (id) order
    pub clouds: Vec<Cloud>,
    /// At most one scheduled collision
    pub pending_collision: Option<PendingCollision>,
    pub score: u64,
    next_cloud_id: u32,
    /// Tick counter; only `tick` advances it
    pub current_step: u64,
    /// Reactions queued for the next tick, in arrival order
    pub pending_reactions: Vec<Reaction>,
    /// Seed the run was started with
    pub seed: u64,
    rng: Pcg32,
}

impl SimState {
    /// Fresh run: flying hero, no clouds, step 0
    pub fn new(seed: u64, config: &Config) -> Result<Self, ContractViolation> {
        Ok(Self {
            hero: Hero::new(config)?,
            clouds: Vec::new(),
            pending_collision: None,
            score: 0,
            next_cloud_id: 0,
            current_step: 0,
            pending_reactions: Vec::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// Current tick as an absolute time
    #[inline]
    pub fn now(&self) -> f64 {
        self.current_step as f64
    }

    /// Allocate a new cloud id; ids are never reused
    pub fn next_cloud_id(&mut self) -> Result<u32, ContractViolation> {
        let id = self.next_cloud_id;
        self.next_cloud_id = id
            .checked_add(1)
            .ok_or(ContractViolation::Overflow { what: "cloud id" })?;
        Ok(id)
    }

    /// Id the next spawned cloud will get
    #[inline]
    pub fn peek_cloud_id(&self) -> u32 {
        self.next_cloud_id
    }

    /// Deterministic RNG for spawning
    #[inline]
    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    /// Queue a reaction for the next tick
    pub fn enqueue(&mut self, reaction: Reaction) {
        self.pending_reactions.push(reaction);
    }

    pub fn cloud(&self, id: u32) -> Option<&Cloud> {
        self.clouds.iter().find(|c| c.id == id)
    }

    /// Add a cloud at the current step with its top edge at `top`
    pub fn spawn_cloud_at(&mut self, top: f64, config: &Config) -> Result<u32, ContractViolation> {
        let trajectory = Trajectory::cloud_drift(
            config.bounds.x1,
            top,
            DVec2::new(config.cloud_width, config.cloud_height),
            config.scroll_speed,
            self.now(),
        )?;
        let id = self.next_cloud_id()?;
        self.clouds.push(Cloud { id, trajectory });
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_flying_at_start() {
        let config = Config::default();
        let state = SimState::new(7, &config).unwrap();
        assert_eq!(state.current_step, 0);
        assert_eq!(state.hero.locomotion, Locomotion::Flying);
        assert!(!state.hero.is_dead);
        assert!(state.pending_collision.is_none());
        let b = state.hero.box_at(0.0).unwrap();
        assert_eq!(b.x0, config.hero_start_x);
        assert_eq!(b.y0, config.hero_start_y);
        assert_eq!(b.width(), config.hero_width);
    }

    #[test]
    fn test_cloud_ids_strictly_increase() {
        let config = Config::default();
        let mut state = SimState::new(7, &config).unwrap();
        let a = state.spawn_cloud_at(200.0, &config).unwrap();
        let b = state.spawn_cloud_at(300.0, &config).unwrap();
        state.clouds.clear();
        let c = state.spawn_cloud_at(250.0, &config).unwrap();
        assert!(a < b && b < c);
        assert_eq!(state.peek_cloud_id(), c + 1);
    }

    #[test]
    fn test_dead_hero_ignores_trajectory_swap() {
        let config = Config::default();
        let mut hero = Hero::new(&config).unwrap();
        let original = hero.trajectory;
        hero.kill();
        let other = Trajectory::standing(original.params().origin, 1.0, 5.0).unwrap();
        assert!(!hero.replace_trajectory(other, Locomotion::Standing));
        assert_eq!(hero.trajectory, original);
        assert_eq!(hero.locomotion, Locomotion::Dead);
    }

    #[test]
    fn test_pending_collision_due() {
        let config = Config::default();
        let hero = Hero::new(&config).unwrap();
        let pending = PendingCollision {
            time: 41.5,
            trajectory: hero.trajectory,
            locomotion: Locomotion::Standing,
            cloud_id: Some(3),
            kind: ContactKind::Landing,
        };
        assert!(!pending.is_due(41));
        assert!(pending.is_due(42));
    }
}
