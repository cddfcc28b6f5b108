//! Read-only render snapshot
//!
//! Everything a renderer needs for one frame, evaluated at the current step.
//! Building a scene never mutates the simulation.

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::state::{Locomotion, SimState};
use super::trajectory::instantaneous_slope;
use crate::config::Config;
use crate::error::{ContractViolation, finite};
use crate::normalize_angle;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CloudSprite {
    pub id: u32,
    pub aabb: Aabb,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroSprite {
    pub aabb: Aabb,
    /// Tilt in radians (screen space, y down)
    pub angle: f64,
    pub charging: bool,
}

/// One frame's worth of drawable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub step: u64,
    pub clouds: Vec<CloudSprite>,
    /// Absent once the hero is dead
    pub hero: Option<HeroSprite>,
    pub score: u64,
    /// Show the death overlay
    pub game_over: bool,
}

/// Snapshot `state` at its current step
pub fn scene(state: &SimState, config: &Config) -> Result<Scene, ContractViolation> {
    let now = state.now();
    let clouds = state
        .clouds
        .iter()
        .map(|cloud| {
            cloud.box_at(now).map(|aabb| CloudSprite { id: cloud.id, aabb })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let hero = if state.hero.is_dead {
        None
    } else {
        Some(HeroSprite {
            aabb: state.hero.box_at(now)?,
            angle: hero_tilt(state, config)?,
            charging: state.hero.is_charging(),
        })
    };

    Ok(Scene {
        step: state.current_step,
        clouds,
        hero,
        score: state.score,
        game_over: state.hero.is_dead,
    })
}

/// Aim angle while standing, direction of travel otherwise
fn hero_tilt(state: &SimState, config: &Config) -> Result<f64, ContractViolation> {
    let hero = &state.hero;
    match hero.locomotion {
        Locomotion::Standing => Ok(hero.angle),
        Locomotion::Dead => Ok(0.0),
        Locomotion::Flying | Locomotion::Falling => {
            let v = instantaneous_slope(&hero.trajectory, state.now(), config.slope_epsilon)?;
            if v.y == 0.0 {
                Ok(0.0)
            } else {
                finite("hero tilt", normalize_angle(v.y.atan2(v.x)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::reaction::Reaction;
    use crate::sim::tick::tick;
    use glam::DVec2;

    #[test]
    fn test_scene_matches_state() {
        let config = Config::default();
        let mut state = SimState::new(5, &config).unwrap();
        for _ in 0..150 {
            tick(&mut state, &config).unwrap();
        }
        let before = state.clone();
        let frame = scene(&state, &config).unwrap();

        assert_eq!(frame.step, 150);
        assert_eq!(frame.clouds.len(), state.clouds.len());
        for (sprite, cloud) in frame.clouds.iter().zip(&state.clouds) {
            assert_eq!(sprite.id, cloud.id);
            assert_eq!(sprite.aabb, cloud.box_at(150.0).unwrap());
        }
        let hero = frame.hero.unwrap();
        assert_eq!(hero.aabb, state.hero.box_at(150.0).unwrap());
        assert!(!frame.game_over);
        assert_eq!(state.hero, before.hero);
        assert_eq!(state.clouds, before.clouds);
    }

    #[test]
    fn test_falling_hero_tilts_with_motion() {
        let config = Config::default();
        let mut state = SimState::new(5, &config).unwrap();
        Reaction::ClipWings.apply(&mut state, &config).unwrap();
        state.current_step = 40;
        let hero = scene(&state, &config).unwrap().hero.unwrap();
        // Moving right and down: angle in (0, π/2)
        assert!(hero.angle > 0.0 && hero.angle < std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_standing_hero_uses_aim() {
        let config = Config::default();
        let mut state = SimState::new(5, &config).unwrap();
        let origin = state.hero.box_at(0.0).unwrap();
        let standing =
            crate::sim::Trajectory::standing(origin, config.scroll_speed, 0.0).unwrap();
        state.hero.replace_trajectory(standing, Locomotion::Standing);
        let feet = origin.bottom_right();
        Reaction::Aim {
            pointer: feet + DVec2::new(0.0, -50.0),
        }
        .apply(&mut state, &config)
        .unwrap();
        let hero = scene(&state, &config).unwrap().hero.unwrap();
        assert!((hero.angle + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_dead_hero_shows_overlay() {
        let config = Config::default();
        let mut state = SimState::new(5, &config).unwrap();
        state.score = 7;
        Reaction::KillHero.apply(&mut state, &config).unwrap();
        let frame = scene(&state, &config).unwrap();
        assert!(frame.game_over);
        assert!(frame.hero.is_none());
        assert_eq!(frame.score, 7);

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"game_over\":true"));
    }
}
