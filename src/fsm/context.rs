//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard the state handlers read from and write
//! to: the obstacle map of the last sweep, the motor command to apply,
//! maneuver timing, and configuration.

use crate::app::commands::MotorCommand;
use crate::app::obstacle_map::ObstacleMap;
use crate::config::SystemConfig;

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Timing --
    /// Time the current maneuver has been held (milliseconds).
    pub maneuver_elapsed_ms: u32,

    // -- Inputs --
    /// Sector readings from the most recent sweep.  Written by the decider
    /// before each tick, cleared when a maneuver ends.
    pub map: ObstacleMap,

    // -- Outputs --
    /// Command to apply to the wheels after the tick.
    pub command: MotorCommand,

    // -- Configuration --
    pub config: SystemConfig,
}

impl FsmContext {
    pub fn new(config: SystemConfig) -> Self {
        Self {
            maneuver_elapsed_ms: 0,
            map: ObstacleMap::default(),
            command: MotorCommand::Forward,
            config,
        }
    }

    /// The held maneuver has run for its configured duration.
    pub fn maneuver_done(&self) -> bool {
        self.maneuver_elapsed_ms >= self.config.avoid_duration_ms
    }
}
