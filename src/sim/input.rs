//! Logical input events
//!
//! Input never mutates the simulation directly: each event becomes a
//! reaction that the next tick applies ahead of its own rules.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::reaction::Reaction;
use super::state::{Locomotion, SimState};

/// A pointer event with its wall-clock stamp where one matters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Primary button down
    PrimaryPressed { time_ms: f64 },
    /// Primary button up at pointer position
    PrimaryReleased { x: f64, y: f64, time_ms: f64 },
    /// Pointer moved
    PointerMoved { x: f64, y: f64 },
}

/// Translate an input event into a queued reaction
///
/// Pressing while flying dives; otherwise it starts a charge. Input after
/// death is dropped.
pub fn enqueue_input(state: &mut SimState, event: InputEvent) {
    if state.hero.is_dead {
        return;
    }
    let reaction = match event {
        InputEvent::PrimaryPressed { time_ms } => {
            if state.hero.locomotion == Locomotion::Flying {
                Reaction::ClipWings
            } else {
                Reaction::BeginCharge { time_ms }
            }
        }
        InputEvent::PrimaryReleased { x, y, time_ms } => Reaction::Launch {
            pointer: DVec2::new(x, y),
            time_ms,
        },
        InputEvent::PointerMoved { x, y } => Reaction::Aim {
            pointer: DVec2::new(x, y),
        },
    };
    state.enqueue(reaction);
}
