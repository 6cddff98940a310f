//! Port traits: the hexagonal boundary between the control core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Ranger / Scanner / Decider
//! ```
//!
//! Pin-level I/O goes through the `embedded-hal` 1.0 traits directly
//! (`OutputPin`, `InputPin`, `DelayNs`).  The traits below cover what
//! `embedded-hal` has no vocabulary for: a monotonic microsecond clock,
//! the servo, the wheel pair, and the diagnostic sink.

use crate::error::Result;
use crate::sensors::Angle;

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: hardware timer → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source used to timestamp echo edges.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Servo port (driven adapter: domain → PWM)
// ───────────────────────────────────────────────────────────────

/// Positions the sensor mount.  The angle-to-pulse-width conversion and
/// the 50 Hz refresh belong to the adapter.
pub trait ServoPort {
    fn set_angle(&mut self, angle: Angle) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Drive port (driven adapter: domain → wheel enables)
// ───────────────────────────────────────────────────────────────

/// Two on/off wheel drivers.
///
/// Both outputs are always written in the same call so a decision can
/// never leave one wheel updated and the other stale.
pub trait DrivePort {
    fn set_wheels(&mut self, left: bool, right: bool) -> Result<()>;

    /// Last pair that was fully applied.
    fn wheels(&self) -> (bool, bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The tasks emit structured [`RoverEvent`](super::events::RoverEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RoverEvent);
}
