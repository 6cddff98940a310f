//! Test rig for integration tests.
//!
//! Builds the three tasks over a simulated chassis on virtual time.  The
//! ranger owns the world clock; the scanner and decider sleep on their own
//! clocks so their delays never shift an echo window.  Nothing sleeps for
//! real.

use std::sync::{Arc, Mutex};

use rover::adapters::sim::{
    SimEcho, SimMotorPin, SimServo, SimTrigger, SimWorld, VirtualClock, VirtualDelay,
};
use rover::app::decider::Decider;
use rover::app::events::RoverEvent;
use rover::app::ports::EventSink;
use rover::config::SystemConfig;
use rover::drivers::wheels::WheelDriver;
use rover::link::Link;
use rover::scanner::Scanner;
use rover::sensors::pulse_timer::PulseTimer;
use rover::sensors::ranger::{Ranger, RangerTask};
use rover::sensors::{Angle, DistanceSample};

// ── Shared event recorder ─────────────────────────────────────

/// Cloneable sink; every clone appends to the same log.
#[derive(Clone, Default)]
pub struct SharedSink(Arc<Mutex<Vec<RoverEvent>>>);

impl SharedSink {
    pub fn events(&self) -> Vec<RoverEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Every ranging outcome in order, as published samples would carry it.
    pub fn ranged(&self) -> Vec<(Angle, Option<f32>)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RoverEvent::Measured(s) => Some((s.angle, Some(s.distance_cm))),
                RoverEvent::RangeFailed { angle, .. } => Some((angle, None)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&RoverEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    /// Events up to the first decision.  The scanner keeps running once
    /// released, so later entries depend on thread timing.
    pub fn first_cycle(&self) -> Vec<RoverEvent> {
        self.events()
            .into_iter()
            .take_while(|e| !matches!(e, RoverEvent::Decision { .. }))
            .collect()
    }
}

impl EventSink for SharedSink {
    fn emit(&mut self, event: &RoverEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type TestRanger = RangerTask<
    SimTrigger<VirtualClock>,
    SimEcho<VirtualClock>,
    VirtualDelay,
    VirtualClock,
    VirtualDelay,
    SharedSink,
>;
pub type TestScanner = Scanner<SimServo<VirtualClock>, VirtualDelay, SharedSink>;
pub type TestDecider =
    Decider<WheelDriver<SimMotorPin<VirtualClock>, SimMotorPin<VirtualClock>>, VirtualDelay, SharedSink>;

pub struct Rig {
    pub config: SystemConfig,
    pub link: &'static Link,
    pub world: SimWorld<VirtualClock>,
    pub world_clock: VirtualClock,
    pub decider_clock: VirtualClock,
    pub sink: SharedSink,
    pub ranger: Option<TestRanger>,
    pub scanner: Option<TestScanner>,
    pub decider: TestDecider,
}

impl Rig {
    pub fn new(config: SystemConfig) -> Self {
        let link: &'static Link = Box::leak(Box::new(Link::new()));
        let world_clock = VirtualClock::new();
        let world = SimWorld::new(world_clock.clone());
        let sink = SharedSink::default();

        let timer = PulseTimer::new(
            world.trigger(),
            world.echo(),
            VirtualDelay::new(world_clock.clone()),
            world_clock.clone(),
        );
        let ranger = RangerTask::new(
            Ranger::new(timer, &config),
            VirtualDelay::new(world_clock.clone()),
            sink.clone(),
            link,
            &config,
        );

        let scanner = Scanner::new(
            world.servo_port(),
            VirtualDelay::new(VirtualClock::new()),
            sink.clone(),
            link,
            &config,
        );

        let decider_clock = VirtualClock::new();
        let decider = Decider::new(
            config.clone(),
            WheelDriver::new(world.left_motor(), world.right_motor()),
            VirtualDelay::new(decider_clock.clone()),
            sink.clone(),
            link,
        );

        Self {
            config,
            link,
            world,
            world_clock,
            decider_clock,
            sink,
            ranger: Some(ranger),
            scanner: Some(scanner),
            decider,
        }
    }

    /// Run the ranger forever on its own thread.
    pub fn spawn_ranger(&mut self) {
        let ranger = self.ranger.take().expect("ranger already spawned");
        detach(move || ranger.run());
    }

    /// Run the scanner forever on its own thread.
    pub fn spawn_scanner(&mut self) {
        let scanner = self.scanner.take().expect("scanner already spawned");
        let park = Angle::clamped(i16::from(self.config.servo_center_deg));
        detach(move || scanner.run(park));
    }
}

/// Run a task loop that never returns on its own thread.
fn detach(task: impl FnOnce() + Send + 'static) {
    std::thread::spawn(task);
}

pub fn sample(deg: u8, cm: f32) -> DistanceSample {
    DistanceSample::measured(Angle::new(deg).unwrap(), cm)
}
