//! Wheel pair driver.
//!
//! Two on/off enable lines, one per side.  Both lines are written on every
//! update; the recorded state only changes once both writes succeed.  If
//! either write fails, both lines are pulled low so the chassis never
//! keeps pivoting on a half-applied command.

use embedded_hal::digital::OutputPin;
use log::{error, warn};

use crate::app::ports::DrivePort;
use crate::error::{ActuatorError, Result};

pub struct WheelDriver<L, R> {
    left: L,
    right: R,
    state: (bool, bool),
}

impl<L: OutputPin, R: OutputPin> WheelDriver<L, R> {
    /// Takes ownership of the enable pins and switches both off.
    pub fn new(left: L, right: R) -> Self {
        let mut d = Self { left, right, state: (false, false) };
        if d.write(false, false).is_err() {
            warn!("wheel pins rejected initial low");
        }
        d
    }

    fn write(&mut self, left: bool, right: bool) -> core::result::Result<(), ActuatorError> {
        let l = self.left.set_state(left.into());
        let r = self.right.set_state(right.into());
        if l.is_err() || r.is_err() {
            return Err(ActuatorError::GpioWriteFailed);
        }
        Ok(())
    }
}

impl<L: OutputPin, R: OutputPin> DrivePort for WheelDriver<L, R> {
    fn set_wheels(&mut self, left: bool, right: bool) -> Result<()> {
        if let Err(e) = self.write(left, right) {
            error!("wheel write ({left}, {right}) failed, stopping");
            let left_stuck = self.left.set_low().is_err();
            let right_stuck = self.right.set_low().is_err();
            if left_stuck || right_stuck {
                error!("wheel stop failed (left={left_stuck}, right={right_stuck}), line may still be driven");
            }
            self.state = (false, false);
            return Err(e.into());
        }
        self.state = (left, right);
        Ok(())
    }

    fn wheels(&self) -> (bool, bool) {
        self.state
    }
}
