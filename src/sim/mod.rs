//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Motion as closed-form functions of time, never integrated
//! - No rendering or platform dependencies

pub mod aabb;
pub mod collision;
pub mod input;
pub mod reaction;
pub mod roots;
pub mod scene;
pub mod state;
pub mod tick;
pub mod trajectory;

pub use aabb::Aabb;
pub use collision::schedule;
pub use input::{InputEvent, enqueue_input};
pub use reaction::Reaction;
pub use roots::{Horizon, Quadratic, solve_quadratic};
pub use scene::{CloudSprite, HeroSprite, Scene, scene};
pub use state::{Cloud, ContactKind, Hero, Locomotion, PendingCollision, SimState};
pub use tick::tick;
pub use trajectory::{Edge, MotionKind, MotionParams, Trajectory, instantaneous_slope};
