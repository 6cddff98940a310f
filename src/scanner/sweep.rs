//! Triangle-wave angle generator.
//!
//! ```text
//!  180 ┤        ╱╲        ╱
//!      │      ╱    ╲    ╱
//!    0 ┼──╱────────╲╱──────▶ step
//! ```
//!
//! The current angle is always in `0..=180`.  Direction flips only after
//! a boundary angle has been measured, and the step after a flip is the
//! full step size back toward the interior (clamped at the boundary).

use crate::sensors::Angle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sweep {
    angle: Angle,
    /// Signed step; never zero.
    step: i16,
}

impl Sweep {
    /// Start at `start`, moving toward 180 unless already there.
    pub fn new(start: Angle, step_deg: u8) -> Self {
        let magnitude = i16::from(step_deg.max(1));
        let step = if start == Angle::MAX { -magnitude } else { magnitude };
        Self { angle: start, step }
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    /// Signed step that the next [`advance`](Self::advance) will apply.
    pub fn step(&self) -> i16 {
        self.step
    }

    /// Move to the next angle.  Returns `true` if the direction flipped,
    /// i.e. the angle just measured was the end of a sweep.
    pub fn advance(&mut self) -> bool {
        let reversed = (self.step > 0 && self.angle == Angle::MAX)
            || (self.step < 0 && self.angle == Angle::MIN);
        if reversed {
            self.step = -self.step;
        }
        self.angle = Angle::clamped(i16::from(self.angle.degrees()) + self.step);
        reversed
    }
}
