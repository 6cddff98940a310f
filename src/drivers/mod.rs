//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod gpio;
pub mod hw_init;
pub mod servo;
pub mod task_pin;
pub mod wheels;
