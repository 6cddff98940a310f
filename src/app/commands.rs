//! Motor commands issued by the decision task.

/// What the wheel pair should do for the current cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorCommand {
    Stop,
    TurnLeft,
    TurnRight,
    Forward,
}

impl MotorCommand {
    /// Decision table over the side sectors.
    ///
    /// | right | left | command   |
    /// |-------|------|-----------|
    /// | yes   | yes  | Stop      |
    /// | yes   | no   | TurnLeft  |
    /// | no    | yes  | TurnRight |
    /// | no    | no   | Forward   |
    pub const fn from_blocked(right_blocked: bool, left_blocked: bool) -> Self {
        match (right_blocked, left_blocked) {
            (true, true) => Self::Stop,
            (true, false) => Self::TurnLeft,
            (false, true) => Self::TurnRight,
            (false, false) => Self::Forward,
        }
    }

    /// `(left, right)` wheel enables.  Turning pivots on the stopped wheel.
    pub const fn wheels(self) -> (bool, bool) {
        match self {
            Self::Stop => (false, false),
            Self::TurnLeft => (false, true),
            Self::TurnRight => (true, false),
            Self::Forward => (true, true),
        }
    }

    /// Anything other than `Forward` is held as an avoidance maneuver.
    pub const fn is_maneuver(self) -> bool {
        !matches!(self, Self::Forward)
    }
}
