//! SG90-class hobby servo on an LEDC channel.
//!
//! 50 Hz frame; 0.5 ms pulse at 0°, 2.5 ms at 180°, linear between.

use crate::app::ports::ServoPort;
use crate::drivers::hw_init;
use crate::error::{ActuatorError, Result};
use crate::pins;
use crate::sensors::{ANGLE_MAX, Angle};

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;
const DUTY_MAX: u32 = (1 << pins::SERVO_PWM_RESOLUTION_BITS) - 1;

/// Pulse width for `angle`, in microseconds.
pub fn pulse_width_us(angle: Angle) -> u32 {
    let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
    pins::SERVO_MIN_PULSE_US + span * u32::from(angle.degrees()) / u32::from(ANGLE_MAX)
}

/// LEDC duty value for a pulse width at the configured resolution.
pub fn duty_for_pulse(pulse_us: u32) -> u32 {
    ((pulse_us as u64 * (DUTY_MAX as u64 + 1)) / FRAME_US as u64).min(DUTY_MAX as u64) as u32
}

pub struct ServoDriver {
    channel: u32,
    angle: Option<Angle>,
}

impl ServoDriver {
    pub fn new() -> Self {
        Self { channel: hw_init::LEDC_CH_SERVO, angle: None }
    }

    /// Last angle successfully commanded.
    pub fn angle(&self) -> Option<Angle> {
        self.angle
    }
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoPort for ServoDriver {
    fn set_angle(&mut self, angle: Angle) -> Result<()> {
        let duty = duty_for_pulse(pulse_width_us(angle));
        if !hw_init::ledc_set(self.channel, duty) {
            return Err(ActuatorError::PwmWriteFailed.into());
        }
        self.angle = Some(angle);
        Ok(())
    }
}
