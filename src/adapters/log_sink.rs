//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured rover events through the
//! `log` facade (ESP-IDF logger on target, `env_logger` on the host).
//! One line per event, tagged so the serial stream can be grepped.

use log::{debug, info, warn};

use crate::app::events::RoverEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RoverEvent`] to the console.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RoverEvent) {
        match event {
            RoverEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            RoverEvent::Measured(s) => {
                info!("RANGE | angle={} | {:.1} cm", s.angle, s.distance_cm);
            }
            RoverEvent::RangeFailed { angle, error } => {
                warn!("RANGE | angle={} | failed: {}", angle, error);
            }
            RoverEvent::SampleDropped(s) => {
                warn!("QUEUE | full, dropped angle={}", s.angle);
            }
            RoverEvent::AngleMismatch { requested, replied } => {
                warn!("RANGE | requested {} but got {}", requested, replied);
            }
            RoverEvent::SweepComplete { published, dropped } => {
                debug!("SWEEP | published={} dropped={}", published, dropped);
            }
            RoverEvent::Decision { map, command } => {
                let nearest = |cm: Option<f32>| cm.map_or(f32::NAN, |d| d);
                info!(
                    "DECIDE | R={}({:.0}) F={}({:.0}) L={}({:.0}) | -> {:?}",
                    if map.right.blocked { "X" } else { "-" },
                    nearest(map.right.nearest_cm),
                    if map.front.blocked { "X" } else { "-" },
                    nearest(map.front.nearest_cm),
                    if map.left.blocked { "X" } else { "-" },
                    nearest(map.left.nearest_cm),
                    command,
                );
            }
            RoverEvent::StateChanged { from, to } => {
                info!("STATE | {:?} -> {:?}", from, to);
            }
            RoverEvent::ManeuverComplete(command) => {
                info!("MOVE | {:?} complete, resuming", command);
            }
            RoverEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={:?} | cmd={:?} | decisions={} maneuvers={} | \
                     samples={} invalid={}",
                    t.state,
                    t.last_command,
                    t.decisions,
                    t.maneuvers,
                    t.samples,
                    t.invalid_samples,
                );
            }
        }
    }
}
