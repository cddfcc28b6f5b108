//! Fixed timestep simulation tick
//!
//! Each tick evaluates a fixed rule table against the state as it stood at
//! the start of the tick. Reactions from matching rules queue behind any
//! input reactions, then the whole queue is applied in order and the step
//! counter advances by one.

use super::reaction::Reaction;
use super::state::SimState;
use crate::config::Config;
use crate::error::ContractViolation;

type Predicate = fn(&SimState, &Config) -> Result<bool, ContractViolation>;

/// Rule table, in evaluation order
const RULES: [(Predicate, Reaction); 5] = [
    (cloud_due, Reaction::SpawnCloud),
    (has_clouds, Reaction::PruneClouds),
    (hero_escaped, Reaction::KillHero),
    (needs_prediction, Reaction::ScheduleCollision),
    (collision_due, Reaction::ApplyCollision),
];

fn cloud_due(state: &SimState, config: &Config) -> Result<bool, ContractViolation> {
    let every = config.cloud_interval_ticks;
    Ok(every > 0 && state.current_step % every == 0)
}

fn has_clouds(state: &SimState, _: &Config) -> Result<bool, ContractViolation> {
    Ok(!state.clouds.is_empty())
}

fn hero_escaped(state: &SimState, config: &Config) -> Result<bool, ContractViolation> {
    if state.hero.is_dead {
        return Ok(false);
    }
    Ok(state.hero.box_at(state.now())?.escapes(&config.bounds))
}

fn needs_prediction(state: &SimState, _: &Config) -> Result<bool, ContractViolation> {
    Ok(state.pending_collision.is_none() && !state.clouds.is_empty())
}

fn collision_due(state: &SimState, _: &Config) -> Result<bool, ContractViolation> {
    Ok(state
        .pending_collision
        .as_ref()
        .is_some_and(|p| p.is_due(state.current_step)))
}

/// Advance the simulation by one fixed step
///
/// A contract violation aborts the tick; the step counter is not advanced.
pub fn tick(state: &mut SimState, config: &Config) -> Result<(), ContractViolation> {
    let mut queue = std::mem::take(&mut state.pending_reactions);
    for (applies, reaction) in &RULES {
        if applies(state, config)? {
            queue.push(reaction.clone());
        }
    }

    for reaction in &queue {
        reaction.apply(state, config)?;
    }

    state.current_step = state
        .current_step
        .checked_add(1)
        .ok_or(ContractViolation::Overflow { what: "tick counter" })?;
    Ok(())
}
