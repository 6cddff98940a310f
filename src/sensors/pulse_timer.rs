//! HC-SR04 echo pulse timer.
//!
//! ```text
//!  TRIG  ──┐    ┌──────────┐
//!          └────┘  10 µs   └──────────────────────────────────
//!            2 µs
//!  ECHO  ─────────────────────────┐              ┌──────────
//!                                 └──────────────┘
//!                           rise (start)    fall (end)
//!                              ◀──── pulse width ────▶
//! ```
//!
//! Each edge wait has its own budget of `ceil(timeout_us / POLL_INTERVAL_US)`
//! polls, with a `POLL_INTERVAL_US` delay between polls.  The budget is a
//! counter, not a deadline, so a stalled clock can never make the wait
//! unbounded.  The edge timestamps come from the [`Clock`] port and are
//! subtracted with wrapping arithmetic.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::Clock;
use crate::error::{Edge, SensorError};

/// Delay between consecutive echo polls.
pub const POLL_INTERVAL_US: u32 = 1;
/// Trigger held low before the pulse.
pub const TRIGGER_SETTLE_US: u32 = 2;
/// Trigger pulse width required by the HC-SR04.
pub const TRIGGER_PULSE_US: u32 = 10;

/// Number of polls one edge wait may spend.
pub const fn poll_budget(timeout_us: u32) -> u32 {
    timeout_us.div_ceil(POLL_INTERVAL_US)
}

pub struct PulseTimer<T, E, D, C> {
    trigger: T,
    echo: E,
    delay: D,
    clock: C,
}

impl<T, E, D, C> PulseTimer<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: Clock,
{
    pub fn new(trigger: T, echo: E, delay: D, clock: C) -> Self {
        Self { trigger, echo, delay, clock }
    }

    /// Fire one trigger pulse and time the echo.
    ///
    /// Returns the pulse width in microseconds.  Fails if either edge does
    /// not arrive within `timeout_us`, or if the echo rose and fell between
    /// two clock reads.
    pub fn measure_pulse(&mut self, timeout_us: u32) -> Result<u32, SensorError> {
        self.fire_trigger()?;

        self.wait_for_level(true, timeout_us, Edge::Rising)?;
        let start = self.clock.now_us();

        self.wait_for_level(false, timeout_us, Edge::Falling)?;
        let end = self.clock.now_us();

        let width = end.wrapping_sub(start);
        if width == 0 {
            return Err(SensorError::ZeroLengthPulse);
        }
        Ok(u32::try_from(width).unwrap_or(u32::MAX))
    }

    fn fire_trigger(&mut self) -> Result<(), SensorError> {
        self.trigger.set_low().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high().map_err(|_| SensorError::PinFault)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| SensorError::PinFault)
    }

    fn wait_for_level(&mut self, high: bool, timeout_us: u32, edge: Edge) -> Result<(), SensorError> {
        let mut remaining = poll_budget(timeout_us);
        loop {
            if self.echo.is_high().map_err(|_| SensorError::PinFault)? == high {
                return Ok(());
            }
            if remaining == 0 {
                return Err(SensorError::EchoTimeout(edge));
            }
            remaining -= 1;
            self.delay.delay_us(POLL_INTERVAL_US);
        }
    }
}
