//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers: no closures, no
//! dynamic dispatch, no heap.
//!
//! ```text
//!  SCANNING ──[sweep says turn/stop]──▶ AVOIDING
//!     ▲                                    │
//!     └────────[maneuver held long enough]─┘
//!                 (obstacle map cleared)
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::commands::MotorCommand;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Scanning
        StateDescriptor {
            id: StateId::Scanning,
            name: "Scanning",
            on_enter: Some(scanning_enter),
            on_exit: None,
            on_update: scanning_update,
        },
        // Index 1: Avoiding
        StateDescriptor {
            id: StateId::Avoiding,
            name: "Avoiding",
            on_enter: Some(avoiding_enter),
            on_exit: Some(avoiding_exit),
            on_update: avoiding_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  SCANNING state
// ═══════════════════════════════════════════════════════════════════════════

fn scanning_enter(ctx: &mut FsmContext) {
    ctx.command = MotorCommand::Forward;
}

fn scanning_update(ctx: &mut FsmContext) -> Option<StateId> {
    let command = ctx.map.command();
    ctx.command = command;
    command.is_maneuver().then_some(StateId::Avoiding)
}

// ═══════════════════════════════════════════════════════════════════════════
//  AVOIDING state
// ═══════════════════════════════════════════════════════════════════════════

fn avoiding_enter(ctx: &mut FsmContext) {
    ctx.maneuver_elapsed_ms = 0;
    info!(
        "Avoiding: {:?} for {} ms",
        ctx.command, ctx.config.avoid_duration_ms
    );
}

fn avoiding_exit(ctx: &mut FsmContext) {
    ctx.map.clear();
}

fn avoiding_update(ctx: &mut FsmContext) -> Option<StateId> {
    ctx.maneuver_done().then_some(StateId::Scanning)
}
