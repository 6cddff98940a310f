//! Host-side simulated hardware.
//!
//! A [`SimWorld`] stands in for the chassis: it answers trigger pulses
//! with an echo sized to the obstacle at the servo's current bearing,
//! remembers the servo angle, and rotates the vehicle while the wheel
//! pair is commanded to pivot.
//!
//! ```text
//!  SimServo ──▶ ┌──────────────┐ ◀── SimTrigger
//!               │   SimWorld   │
//!  SimMotorPin ▶│ bearing→echo │ ──▶ SimEcho
//!               └──────────────┘
//! ```
//!
//! Time comes from any [`Clock`].  The host binary uses the wall clock;
//! tests use [`VirtualClock`], which only advances when a
//! [`VirtualDelay`] sleeps, so pulse widths are exact and nothing waits.

use core::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::app::ports::{Clock, ServoPort};
use crate::error::Result;
use crate::sensors::{Angle, SOUND_CM_PER_US};

/// Delay between the trigger's falling edge and the echo rising.
pub const ECHO_LATENCY_US: u64 = 250;

// ───────────────────────────────────────────────────────────────
// Virtual time
// ───────────────────────────────────────────────────────────────

/// Nanosecond counter shared by every clone.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    ns: Arc<AtomicU64>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ns(&self, ns: u64) {
        self.ns.fetch_add(ns, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now_us(&self) -> u64 {
        self.ns.load(Ordering::SeqCst) / 1_000
    }
}

/// Delay that advances a [`VirtualClock`] instead of sleeping.
#[derive(Debug, Clone)]
pub struct VirtualDelay {
    clock: VirtualClock,
}

impl VirtualDelay {
    pub fn new(clock: VirtualClock) -> Self {
        Self { clock }
    }
}

impl DelayNs for VirtualDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.advance_ns(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.advance_ns(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.advance_ns(u64::from(ms) * 1_000_000);
    }
}

// ───────────────────────────────────────────────────────────────
// World model
// ───────────────────────────────────────────────────────────────

/// What the sensor hears when pointed at a bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Echo {
    /// Obstacle at the given distance.
    Reflect { cm: f32 },
    /// Nothing comes back; the rising edge never arrives.
    Silent,
    /// Echo line rises and stays high.
    Stuck,
}

impl Echo {
    /// `(rise, fall)` offsets from the trigger's falling edge.
    fn window(self) -> Option<(u64, u64)> {
        match self {
            Self::Reflect { cm } => {
                let pulse = (f64::from(cm) * 2.0 / f64::from(SOUND_CM_PER_US)).round() as u64;
                Some((ECHO_LATENCY_US, ECHO_LATENCY_US + pulse))
            }
            Self::Silent => None,
            Self::Stuck => Some((ECHO_LATENCY_US, u64::MAX)),
        }
    }
}

struct WorldState {
    /// Indexed by world bearing in degrees.
    bearings: [Echo; 360],
    /// Vehicle heading in world degrees; the servo's 90° points along it.
    heading_deg: f64,
    turn_rate_deg_per_s: f64,
    servo: Angle,
    trigger_high: bool,
    trigger_fall_us: Option<u64>,
    wheels: (bool, bool),
    wheels_since_us: u64,
    pings: u32,
    servo_moves: u32,
}

impl WorldState {
    /// Integrate pivot rotation up to `now_us`.
    fn settle(&mut self, now_us: u64) {
        let dt_s = now_us.saturating_sub(self.wheels_since_us) as f64 / 1e6;
        let direction = match self.wheels {
            (false, true) => 1.0,
            (true, false) => -1.0,
            _ => 0.0,
        };
        self.heading_deg = (self.heading_deg + direction * self.turn_rate_deg_per_s * dt_s).rem_euclid(360.0);
        self.wheels_since_us = now_us;
    }

    fn echo_ahead(&self) -> Echo {
        let bearing = self.heading_deg + f64::from(self.servo.degrees()) - 90.0;
        let idx = (bearing.round() as i64).rem_euclid(360) as usize;
        self.bearings[idx]
    }
}

/// Shared simulated chassis.  Cloning shares the same world.
pub struct SimWorld<C> {
    state: Arc<Mutex<WorldState>>,
    clock: C,
}

impl<C: Clone> Clone for SimWorld<C> {
    fn clone(&self) -> Self {
        Self { state: Arc::clone(&self.state), clock: self.clock.clone() }
    }
}

impl<C: Clock + Clone> SimWorld<C> {
    /// Empty world, heading 0, servo centred, no rotation.
    pub fn new(clock: C) -> Self {
        let now = clock.now_us();
        Self {
            state: Arc::new(Mutex::new(WorldState {
                bearings: [Echo::Silent; 360],
                heading_deg: 0.0,
                turn_rate_deg_per_s: 0.0,
                servo: Angle::CENTER,
                trigger_high: false,
                trigger_fall_us: None,
                wheels: (false, false),
                wheels_since_us: now,
                pings: 0,
                servo_moves: 0,
            })),
            clock,
        }
    }

    /// A room with a wall close on the right and open space elsewhere.
    /// Pivots at 90°/s so turns change what the sensor sees.
    pub fn demo(clock: C) -> Self {
        let world = Self::new(clock);
        world.set_range(0, 359, Echo::Reflect { cm: 180.0 });
        world.set_range(300, 359, Echo::Reflect { cm: 14.0 });
        world.set_range(0, 30, Echo::Reflect { cm: 45.0 });
        world.set_range(130, 138, Echo::Silent);
        world.set_turn_rate(90.0);
        world
    }

    fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the echo for world bearings `from..=to` (degrees, mod 360).
    pub fn set_range(&self, from: u16, to: u16, echo: Echo) {
        let mut s = self.lock();
        for b in from..=to {
            s.bearings[usize::from(b % 360)] = echo;
        }
    }

    /// Set the echo for servo angles `from..=to` as seen from heading 0.
    pub fn set_relative(&self, from: u8, to: u8, echo: Echo) {
        let bearing = |deg: u8| (i32::from(deg) - 90).rem_euclid(360) as u16;
        let mut s = self.lock();
        for deg in from..=to.min(180) {
            s.bearings[usize::from(bearing(deg))] = echo;
        }
    }

    pub fn set_turn_rate(&self, deg_per_s: f64) {
        self.lock().turn_rate_deg_per_s = deg_per_s;
    }

    pub fn heading_deg(&self) -> f64 {
        let now = self.clock.now_us();
        let mut s = self.lock();
        s.settle(now);
        s.heading_deg
    }

    pub fn servo(&self) -> Angle {
        self.lock().servo
    }

    pub fn wheels(&self) -> (bool, bool) {
        self.lock().wheels
    }

    /// Trigger pulses seen so far.
    pub fn pings(&self) -> u32 {
        self.lock().pings
    }

    pub fn servo_moves(&self) -> u32 {
        self.lock().servo_moves
    }

    pub fn trigger(&self) -> SimTrigger<C> {
        SimTrigger(self.clone())
    }

    pub fn echo(&self) -> SimEcho<C> {
        SimEcho(self.clone())
    }

    pub fn servo_port(&self) -> SimServo<C> {
        SimServo(self.clone())
    }

    pub fn left_motor(&self) -> SimMotorPin<C> {
        SimMotorPin { world: self.clone(), left: true }
    }

    pub fn right_motor(&self) -> SimMotorPin<C> {
        SimMotorPin { world: self.clone(), left: false }
    }
}

// ───────────────────────────────────────────────────────────────
// Pins and ports
// ───────────────────────────────────────────────────────────────

pub struct SimTrigger<C>(SimWorld<C>);

impl<C> ErrorType for SimTrigger<C> {
    type Error = Infallible;
}

impl<C: Clock + Clone> OutputPin for SimTrigger<C> {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        let now = self.0.clock.now_us();
        let mut s = self.0.lock();
        if s.trigger_high {
            s.trigger_high = false;
            s.trigger_fall_us = Some(now);
            s.pings = s.pings.wrapping_add(1);
        }
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.0.lock().trigger_high = true;
        Ok(())
    }
}

pub struct SimEcho<C>(SimWorld<C>);

impl<C> ErrorType for SimEcho<C> {
    type Error = Infallible;
}

impl<C: Clock + Clone> InputPin for SimEcho<C> {
    fn is_high(&mut self) -> core::result::Result<bool, Infallible> {
        let now = self.0.clock.now_us();
        let mut s = self.0.lock();
        s.settle(now);
        let Some(fall) = s.trigger_fall_us else {
            return Ok(false);
        };
        let Some((rise, end)) = s.echo_ahead().window() else {
            return Ok(false);
        };
        let dt = now.saturating_sub(fall);
        Ok(dt >= rise && dt < end)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Infallible> {
        self.is_high().map(|h| !h)
    }
}

pub struct SimServo<C>(SimWorld<C>);

impl<C: Clock + Clone> ServoPort for SimServo<C> {
    fn set_angle(&mut self, angle: Angle) -> Result<()> {
        let mut s = self.0.lock();
        s.servo = angle;
        s.servo_moves = s.servo_moves.wrapping_add(1);
        Ok(())
    }
}

/// One wheel-enable line.
pub struct SimMotorPin<C> {
    world: SimWorld<C>,
    left: bool,
}

impl<C: Clock + Clone> SimMotorPin<C> {
    fn write(&mut self, on: bool) {
        let now = self.world.clock.now_us();
        let mut s = self.world.lock();
        s.settle(now);
        if self.left {
            s.wheels.0 = on;
        } else {
            s.wheels.1 = on;
        }
    }
}

impl<C> ErrorType for SimMotorPin<C> {
    type Error = Infallible;
}

impl<C: Clock + Clone> OutputPin for SimMotorPin<C> {
    fn set_low(&mut self) -> core::result::Result<(), Infallible> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> core::result::Result<(), Infallible> {
        self.write(true);
        Ok(())
    }
}
