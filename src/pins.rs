//! GPIO / peripheral pin assignments for the rover board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Servo (sensor mount)
// ---------------------------------------------------------------------------

/// LEDC PWM output to the SG90 signal line.
pub const SERVO_PWM_GPIO: i32 = 16;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC duty resolution for the servo channel (bits).
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Pulse width at 0° (microseconds).
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180° (microseconds).
pub const SERVO_MAX_PULSE_US: u32 = 2_500;

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic sensor
// ---------------------------------------------------------------------------

/// Digital output: trigger pulse.
pub const SONAR_TRIG_GPIO: i32 = 10;
/// Digital input: echo pulse (level-shifted to 3.3 V).
pub const SONAR_ECHO_GPIO: i32 = 11;

// ---------------------------------------------------------------------------
// Wheel drivers (on/off enables)
// ---------------------------------------------------------------------------

pub const MOTOR_LEFT_GPIO: i32 = 2;
pub const MOTOR_RIGHT_GPIO: i32 = 3;
