//! Reactions: the only code that mutates `SimState`
//!
//! Tick rules and input handlers never touch state directly; they queue a
//! `Reaction`, and `tick` applies the queue in arrival order. Every
//! reaction that changes the hero is a no-op once the hero is dead.

use glam::DVec2;
use rand::Rng;

use super::collision;
use super::state::{ContactKind, Locomotion, SimState};
use super::trajectory::{Trajectory, instantaneous_slope};
use crate::config::Config;
use crate::error::{ContractViolation, finite};
use crate::normalize_angle;

/// A queued state transform
#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    /// Add a cloud at the world's right bound
    SpawnCloud,
    /// Drop clouds that drifted fully past the left bound
    PruneClouds,
    /// Hero left the screen
    KillHero,
    /// Predict the next hero/cloud contact
    ScheduleCollision,
    /// Fire the pending collision
    ApplyCollision,
    /// Flying -> Falling, keeping the flight's instantaneous velocity
    ClipWings,
    /// Start charging a jump at wall-clock `time_ms`
    BeginCharge { time_ms: f64 },
    /// Standing -> Falling toward `pointer`, charged until `time_ms`
    Launch { pointer: DVec2, time_ms: f64 },
    /// Cosmetic tilt toward `pointer`
    Aim { pointer: DVec2 },
}

impl Reaction {
    pub fn apply(&self, state: &mut SimState, config: &Config) -> Result<(), ContractViolation> {
        match *self {
            Reaction::SpawnCloud => spawn_cloud(state, config),
            Reaction::PruneClouds => prune_clouds(state, config),
            Reaction::KillHero => {
                kill_hero(state);
                Ok(())
            }
            Reaction::ScheduleCollision => schedule_collision(state, config),
            Reaction::ApplyCollision => {
                apply_collision(state);
                Ok(())
            }
            Reaction::ClipWings => clip_wings(state, config),
            Reaction::BeginCharge { time_ms } => begin_charge(state, time_ms),
            Reaction::Launch { pointer, time_ms } => launch(state, config, pointer, time_ms),
            Reaction::Aim { pointer } => aim(state, pointer),
        }
    }
}

fn spawn_cloud(state: &mut SimState, config: &Config) -> Result<(), ContractViolation> {
    let (lo, hi) = config.cloud_band();
    let top = if lo < hi {
        state.rng().random_range(lo..hi)
    } else {
        lo
    };
    let id = state.spawn_cloud_at(finite("cloud top", top)?, config)?;
    log::debug!("Spawned cloud {} at y={:.1} (step {})", id, top, state.current_step);
    Ok(())
}

fn prune_clouds(state: &mut SimState, config: &Config) -> Result<(), ContractViolation> {
    let now = state.now();
    let mut kept = Vec::with_capacity(state.clouds.len());
    for cloud in &state.clouds {
        if cloud.box_at(now)?.x1 >= config.bounds.x0 {
            kept.push(cloud.clone());
        }
    }

    let pruned = state.clouds.len() - kept.len();
    state.clouds = kept;
    if pruned > 0 {
        log::debug!("Pruned {} cloud(s) at step {}", pruned, state.current_step);
    }
    Ok(())
}

fn kill_hero(state: &mut SimState) {
    if state.hero.is_dead {
        return;
    }
    state.hero.kill();
    state.pending_collision = None;
    log::info!(
        "Hero lost at step {} with score {}",
        state.current_step,
        state.score
    );
}

fn schedule_collision(state: &mut SimState, config: &Config) -> Result<(), ContractViolation> {
    // Never overwrite a live prediction
    if state.pending_collision.is_some() {
        return Ok(());
    }
    state.pending_collision = collision::schedule(&state.hero, &state.clouds, state.now(), config)?;
    Ok(())
}

fn apply_collision(state: &mut SimState) {
    let Some(pending) = state.pending_collision.take() else {
        return;
    };
    if !pending.is_due(state.current_step) {
        state.pending_collision = Some(pending);
        return;
    }
    if !state
        .hero
        .replace_trajectory(pending.trajectory, pending.locomotion)
    {
        return;
    }

    if pending.kind == ContactKind::Landing && state.hero.last_cloud_id != pending.cloud_id {
        state.score += 1;
        state.hero.last_cloud_id = pending.cloud_id;
        log::info!(
            "Landed on cloud {:?} at step {}, score {}",
            pending.cloud_id,
            state.current_step,
            state.score
        );
    } else {
        log::info!(
            "{:?} contact with cloud {:?} at step {}",
            pending.kind,
            pending.cloud_id,
            state.current_step
        );
    }
}

fn clip_wings(state: &mut SimState, config: &Config) -> Result<(), ContractViolation> {
    if state.hero.is_dead || state.hero.locomotion != Locomotion::Flying {
        return Ok(());
    }
    let now = state.now();
    let here = state.hero.box_at(now)?;
    let velocity = instantaneous_slope(&state.hero.trajectory, now, config.slope_epsilon)?;
    let falling = Trajectory::falling(here, velocity, DVec2::new(0.0, config.gravity), now)?;

    state.hero.replace_trajectory(falling, Locomotion::Falling);
    state.pending_collision = None;
    log::info!("Dive at step {}", state.current_step);
    Ok(())
}

fn begin_charge(state: &mut SimState, time_ms: f64) -> Result<(), ContractViolation> {
    let hero = &mut state.hero;
    if hero.is_dead {
        return Ok(());
    }
    if matches!(hero.locomotion, Locomotion::Standing | Locomotion::Falling) {
        hero.jump_charge_start = Some(finite("charge start", time_ms)?);
    }
    Ok(())
}

/// Launch velocity from charge duration and pointer position
///
/// Points from the hero's bottom-right corner toward the pointer, always
/// upward. Speed grows with the hold time and is capped. `None` when the
/// result would not leave the ground: a pointer level with the feet or an
/// empty charge.
pub fn launch_velocity(
    feet: DVec2,
    pointer: DVec2,
    hold_ms: f64,
    config: &Config,
) -> Option<DVec2> {
    let offset = DVec2::new(pointer.x - feet.x, -(pointer.y - feet.y).abs());
    let speed = (hold_ms.max(0.0) / config.charge_scale_ms).min(config.max_launch_speed);
    let velocity = offset.try_normalize()? * speed;
    (velocity.y < 0.0).then_some(velocity)
}

fn launch(
    state: &mut SimState,
    config: &Config,
    pointer: DVec2,
    time_ms: f64,
) -> Result<(), ContractViolation> {
    // Releasing always ends the charge, launching or not
    let Some(start) = state.hero.jump_charge_start.take() else {
        return Ok(());
    };
    if state.hero.is_dead || state.hero.locomotion != Locomotion::Standing {
        return Ok(());
    }

    let now = state.now();
    let here = state.hero.box_at(now)?;
    let hold_ms = finite("charge duration", time_ms - start)?;
    let Some(velocity) = launch_velocity(here.bottom_right(), pointer, hold_ms, config) else {
        log::debug!(
            "Release at step {} too flat or too short to launch",
            state.current_step
        );
        return Ok(());
    };
    let falling = Trajectory::falling(here, velocity, DVec2::new(0.0, config.gravity), now)?;

    state.hero.replace_trajectory(falling, Locomotion::Falling);
    state.pending_collision = None;
    log::info!(
        "Launch at step {}: held {:.0} ms, velocity ({:.2}, {:.2})",
        state.current_step,
        hold_ms,
        velocity.x,
        velocity.y
    );
    Ok(())
}

fn aim(state: &mut SimState, pointer: DVec2) -> Result<(), ContractViolation> {
    if state.hero.is_dead {
        return Ok(());
    }
    let feet = state.hero.box_at(state.now())?.bottom_right();
    let d = pointer - feet;
    state.hero.angle = if d.y == 0.0 {
        0.0
    } else {
        finite("hero angle", normalize_angle(d.y.atan2(d.x)))?
    };
    Ok(())
}
