//! System configuration parameters
//!
//! All tunable parameters for the rover.  Sector boundaries and the
//! obstacle threshold differ between chassis builds, so they live here
//! rather than as constants in the decision logic.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::scanner::sweep::Sweep;
use crate::sensors::{ANGLE_MAX, ANGLE_MIN, Angle};

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Sweep ---
    /// Servo step between ranging cycles (degrees, 1–90)
    pub sweep_step_deg: u8,
    /// Time the servo is given to reach the new angle (milliseconds)
    pub servo_settle_ms: u32,
    /// Angle the servo is parked at on boot (degrees)
    pub servo_center_deg: u8,

    // --- Ranging ---
    /// Budget for each echo edge wait (microseconds)
    pub echo_timeout_us: u32,
    /// Pause after every ranging cycle before the next trigger (milliseconds)
    pub ranging_interval_ms: u32,
    /// Distance reported by failed readings (cm)
    pub sentinel_distance_cm: f32,

    // --- Decision ---
    /// A valid sample at or below this distance blocks its sector (cm)
    pub obstacle_threshold_cm: f32,
    /// Lowest angle counted as "front" (degrees, inclusive)
    pub front_min_deg: u8,
    /// Highest angle counted as "front" (degrees, inclusive)
    pub front_max_deg: u8,
    /// How long a turn/stop is held before scanning resumes (milliseconds)
    pub avoid_duration_ms: u32,

    // --- Link ---
    /// Maximum time the scanner waits for queue space (milliseconds)
    pub publish_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Sweep
            sweep_step_deg: 4,
            servo_settle_ms: 25,
            servo_center_deg: 90,

            // Ranging
            echo_timeout_us: 20_000, // ~340 cm round trip
            ranging_interval_ms: 25,
            sentinel_distance_cm: 400.0,

            // Decision
            obstacle_threshold_cm: 20.0,
            front_min_deg: 88,
            front_max_deg: 92,
            avoid_duration_ms: 500,

            // Link
            publish_timeout_ms: 10,
        }
    }
}

impl SystemConfig {
    /// Reject values the tasks cannot run with.
    ///
    /// Called once at boot; a failure here aborts before any task starts.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_step_deg == 0 || self.sweep_step_deg > 90 {
            return Err(Error::Config("sweep_step_deg must be 1..=90"));
        }
        if self.servo_center_deg > ANGLE_MAX {
            return Err(Error::Config("servo_center_deg must be 0..=180"));
        }
        if self.echo_timeout_us == 0 {
            return Err(Error::Config("echo_timeout_us must be non-zero"));
        }
        if !(self.obstacle_threshold_cm > 0.0) {
            return Err(Error::Config("obstacle_threshold_cm must be positive"));
        }
        if !(self.sentinel_distance_cm > self.obstacle_threshold_cm) {
            return Err(Error::Config(
                "sentinel_distance_cm must be above obstacle_threshold_cm",
            ));
        }
        if self.front_min_deg > self.front_max_deg
            || self.front_min_deg == ANGLE_MIN
            || self.front_max_deg >= ANGLE_MAX
        {
            return Err(Error::Config(
                "front sector must sit strictly inside 0..=180 with min <= max",
            ));
        }
        if self.samples_per_sweep() > crate::link::QUEUE_CAPACITY {
            return Err(Error::Config("one sweep must fit the sample queue"));
        }
        if !self.sweep_reaches_front() {
            return Err(Error::Config(
                "sweep_step_deg must land in the front sector in both directions",
            ));
        }
        Ok(())
    }

    /// Whether the upward and the downward pass each measure at least one
    /// angle inside `front_min_deg..=front_max_deg`.
    pub fn sweep_reaches_front(&self) -> bool {
        let front = self.front_min_deg..=self.front_max_deg;
        let mut sweep = Sweep::new(Angle::MIN, self.sweep_step_deg);
        let (mut up, mut down) = (false, false);
        // One pass each way; the pattern repeats after that.
        for _ in 0..2 * self.samples_per_sweep() {
            let hit = front.contains(&sweep.angle().degrees());
            if sweep.step() > 0 {
                up |= hit;
            } else {
                down |= hit;
            }
            sweep.advance();
        }
        up && down
    }

    /// Number of samples one sweep from boundary to boundary produces.
    pub fn samples_per_sweep(&self) -> usize {
        let span = (ANGLE_MAX - ANGLE_MIN) as usize;
        let step = self.sweep_step_deg.max(1) as usize;
        span.div_ceil(step) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::QUEUE_CAPACITY;

    #[test]
    fn default_config_is_sane() {
        let c = SystemConfig::default();
        assert!(c.validate().is_ok());
        assert!(c.front_min_deg <= c.servo_center_deg && c.servo_center_deg <= c.front_max_deg);
        assert!(c.sentinel_distance_cm > c.obstacle_threshold_cm);
        assert!(c.publish_timeout_ms > 0);
    }

    #[test]
    fn serde_roundtrip() {
        let c = SystemConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn zero_step_rejected() {
        let c = SystemConfig { sweep_step_deg: 0, ..SystemConfig::default() };
        assert_eq!(c.validate(), Err(Error::Config("sweep_step_deg must be 1..=90")));
    }

    #[test]
    fn inverted_front_sector_rejected() {
        let c = SystemConfig {
            front_min_deg: 95,
            front_max_deg: 85,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn sentinel_inside_threshold_rejected() {
        let c = SystemConfig {
            obstacle_threshold_cm: 500.0,
            ..SystemConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn step_that_skips_the_front_sector_rejected() {
        // 84 then 96 going up
        let c = SystemConfig { sweep_step_deg: 12, ..SystemConfig::default() };
        assert!(!c.sweep_reaches_front());
        assert_eq!(
            c.validate(),
            Err(Error::Config("sweep_step_deg must land in the front sector in both directions"))
        );
    }

    #[test]
    fn small_steps_reach_the_front_sector() {
        for step in 1..=5u8 {
            let c = SystemConfig { sweep_step_deg: step, ..SystemConfig::default() };
            assert!(c.validate().is_ok(), "step {step}");
        }
    }

    #[test]
    fn wider_front_sector_admits_wider_step() {
        let narrow = SystemConfig { sweep_step_deg: 20, ..SystemConfig::default() };
        assert!(narrow.validate().is_err());
        let wide = SystemConfig {
            sweep_step_deg: 20,
            front_min_deg: 75,
            front_max_deg: 105,
            ..SystemConfig::default()
        };
        assert!(wide.validate().is_ok());
    }

    #[test]
    fn one_sweep_always_fits_the_queue() {
        for step in 1..=90u8 {
            let c = SystemConfig { sweep_step_deg: step, ..SystemConfig::default() };
            assert!(c.samples_per_sweep() <= QUEUE_CAPACITY, "step {step}");
        }
        let c = SystemConfig { sweep_step_deg: 1, ..SystemConfig::default() };
        assert_eq!(c.samples_per_sweep(), 181);
        let c = SystemConfig { sweep_step_deg: 4, ..SystemConfig::default() };
        assert_eq!(c.samples_per_sweep(), 46);
    }
}
