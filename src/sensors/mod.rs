//! Ultrasonic ranging subsystem: the pulse timer, the ranger, and the
//! value types that flow from the sensor to the decision task.

pub mod pulse_timer;
pub mod ranger;

use core::fmt;

use serde::{Deserialize, Serialize};

/// Lowest servo angle (degrees).
pub const ANGLE_MIN: u8 = 0;
/// Highest servo angle (degrees).
pub const ANGLE_MAX: u8 = 180;

/// Round-trip speed of sound used for the echo conversion (cm/µs).
pub const SOUND_CM_PER_US: f32 = 0.034;

/// Servo / sensor heading in whole degrees, always within `0..=180`.
///
/// 0° points to the vehicle's right, 90° straight ahead, 180° left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Angle(u8);

impl Angle {
    pub const MIN: Self = Self(ANGLE_MIN);
    pub const MAX: Self = Self(ANGLE_MAX);
    pub const CENTER: Self = Self(90);

    /// `None` if `deg` is outside `0..=180`.
    pub const fn new(deg: u8) -> Option<Self> {
        if deg <= ANGLE_MAX { Some(Self(deg)) } else { None }
    }

    /// Saturate any signed degree value into the domain.
    pub fn clamped(deg: i16) -> Self {
        Self(deg.clamp(ANGLE_MIN as i16, ANGLE_MAX as i16) as u8)
    }

    pub const fn degrees(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Angle {
    type Error = &'static str;

    fn try_from(deg: u8) -> Result<Self, Self::Error> {
        Self::new(deg).ok_or("angle out of range 0..=180")
    }
}

impl From<Angle> for u8 {
    fn from(a: Angle) -> Self {
        a.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\u{00b0}", self.0)
    }
}

/// One angle-tagged ranging result.
///
/// `valid == false` means the reading failed; `distance_cm` then holds the
/// configured sentinel and must not be read as a real distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSample {
    pub angle: Angle,
    pub distance_cm: f32,
    pub valid: bool,
}

impl DistanceSample {
    pub fn measured(angle: Angle, distance_cm: f32) -> Self {
        Self { angle, distance_cm, valid: true }
    }

    pub fn failed(angle: Angle, sentinel_cm: f32) -> Self {
        Self { angle, distance_cm: sentinel_cm, valid: false }
    }

    /// The distance if this is a genuine reading.
    pub fn distance(&self) -> Option<f32> {
        self.valid.then_some(self.distance_cm)
    }
}

/// Convert an echo pulse width to a one-way distance.
///
/// Sound covers 0.034 cm per µs; the pulse spans the round trip, so the
/// obstacle sits at half that distance.
pub fn pulse_to_cm(pulse_us: u32) -> f32 {
    pulse_us as f32 * SOUND_CM_PER_US / 2.0
}
