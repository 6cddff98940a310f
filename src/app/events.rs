//! Outbound rover events.
//!
//! The ranger, scanner and decider emit these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, record in tests.

use crate::app::commands::MotorCommand;
use crate::app::obstacle_map::ObstacleMap;
use crate::error::SensorError;
use crate::fsm::StateId;
use crate::sensors::{Angle, DistanceSample};

/// Structured events emitted by the control tasks.
#[derive(Debug, Clone, PartialEq)]
pub enum RoverEvent {
    /// The decider has started (carries initial state).
    Started(StateId),

    /// A ranging cycle produced a valid distance.
    Measured(DistanceSample),

    /// A ranging cycle failed; the published sample carries the sentinel.
    RangeFailed { angle: Angle, error: SensorError },

    /// The queue stayed full for the whole publish budget.
    SampleDropped(DistanceSample),

    /// The ranger answered for a different angle than was requested.
    AngleMismatch { requested: Angle, replied: Angle },

    /// The scanner reached a sweep end and handed over to the decider.
    SweepComplete { published: u16, dropped: u16 },

    /// The decider evaluated one sweep.
    Decision { map: ObstacleMap, command: MotorCommand },

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A turn or stop was held for its full duration.
    ManeuverComplete(MotorCommand),

    /// Running counters, once per decision.
    Telemetry(TelemetryData),
}

/// A point-in-time snapshot of the decider's counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub state: StateId,
    pub last_command: MotorCommand,
    pub decisions: u32,
    pub maneuvers: u32,
    pub samples: u32,
    pub invalid_samples: u32,
}
