//! Decision task: the hexagonal core.
//!
//! [`Decider`] owns the FSM and its context.  Once per completed sweep it
//! drains the sample queue, builds an [`ObstacleMap`], ticks the FSM and
//! applies the resulting command to the wheels.  Turns and stops are held
//! for the configured duration before the scanner is released again.
//!
//! ```text
//!  sweep_done ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  queue      ──▶ │         Decider          │
//!                 │ map · FSM · maneuver hold│ ──▶ DrivePort
//!  resume     ◀── └──────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, error, info};

use crate::config::SystemConfig;
use crate::fsm::context::FsmContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::link::{Link, QUEUE_CAPACITY};
use crate::sensors::DistanceSample;

use super::commands::MotorCommand;
use super::events::{RoverEvent, TelemetryData};
use super::obstacle_map::{ObstacleMap, SectorPolicy};
use super::ports::{DrivePort, EventSink};

/// Running counters, reported as telemetry after every decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeciderStats {
    pub decisions: u32,
    pub maneuvers: u32,
    pub samples: u32,
    pub invalid_samples: u32,
}

pub struct Decider<W, D, S> {
    fsm: Fsm,
    ctx: FsmContext,
    policy: SectorPolicy,
    drive: W,
    delay: D,
    sink: S,
    link: &'static Link,
    batch: heapless::Vec<DistanceSample, QUEUE_CAPACITY>,
    stats: DeciderStats,
}

impl<W, D, S> Decider<W, D, S>
where
    W: DrivePort,
    D: DelayNs,
    S: EventSink,
{
    /// Does **not** start the FSM: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig, drive: W, delay: D, sink: S, link: &'static Link) -> Self {
        let policy = SectorPolicy::from_config(&config);
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Scanning),
            ctx: FsmContext::new(config),
            policy,
            drive,
            delay,
            sink,
            link,
            batch: heapless::Vec::new(),
            stats: DeciderStats::default(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the initial state and drive forward.
    pub fn start(&mut self) {
        self.fsm.start(&mut self.ctx);
        self.apply(self.ctx.command);
        self.sink.emit(&RoverEvent::Started(self.fsm.current_state()));
        info!("Decider started in {:?}", self.fsm.current_state());
    }

    // ── Per-sweep orchestration ───────────────────────────────

    /// Wait for a sweep, decide, act, and release the scanner.
    pub fn decide_once(&mut self) -> MotorCommand {
        self.link.wait_sweep_done();
        self.batch.clear();
        let drained = self.link.drain(&mut self.batch);
        debug!("Decider drained {drained} samples");
        let command = self.evaluate();
        self.link.release_scanner();
        command
    }

    /// Evaluate the drained batch.  Blocks for the maneuver hold when the
    /// FSM enters `Avoiding`.
    fn evaluate(&mut self) -> MotorCommand {
        let map = ObstacleMap::from_samples(self.batch.iter(), &self.policy);
        self.ctx.map = map;
        self.tick_fsm();

        let command = self.ctx.command;
        self.stats.decisions = self.stats.decisions.wrapping_add(1);
        self.stats.samples = self.stats.samples.wrapping_add(map.samples());
        self.stats.invalid_samples = self.stats.invalid_samples.wrapping_add(map.invalid_samples());
        self.sink.emit(&RoverEvent::Decision { map, command });
        self.apply(command);

        if self.fsm.current_state() == StateId::Avoiding {
            self.hold_maneuver(command);
        }

        self.sink.emit(&RoverEvent::Telemetry(self.telemetry()));
        command
    }

    fn hold_maneuver(&mut self, command: MotorCommand) {
        let hold_ms = self.ctx.config.avoid_duration_ms;
        self.delay.delay_ms(hold_ms);
        self.ctx.maneuver_elapsed_ms = self.ctx.maneuver_elapsed_ms.saturating_add(hold_ms);
        self.tick_fsm();

        self.stats.maneuvers = self.stats.maneuvers.wrapping_add(1);
        self.sink.emit(&RoverEvent::ManeuverComplete(command));
        self.apply(self.ctx.command);
    }

    fn tick_fsm(&mut self) {
        let prev = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        let next = self.fsm.current_state();
        if next != prev {
            self.sink.emit(&RoverEvent::StateChanged { from: prev, to: next });
        }
    }

    fn apply(&mut self, command: MotorCommand) {
        let (left, right) = command.wheels();
        if let Err(e) = self.drive.set_wheels(left, right) {
            error!("Drive {:?} failed: {e}", command);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn last_map(&self) -> &ObstacleMap {
        &self.ctx.map
    }

    pub fn stats(&self) -> DeciderStats {
        self.stats
    }

    pub fn telemetry(&self) -> TelemetryData {
        TelemetryData {
            state: self.fsm.current_state(),
            last_command: self.ctx.command,
            decisions: self.stats.decisions,
            maneuvers: self.stats.maneuvers,
            samples: self.stats.samples,
            invalid_samples: self.stats.invalid_samples,
        }
    }

    pub fn drive(&self) -> &W {
        &self.drive
    }

    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.decide_once();
        }
    }
}
