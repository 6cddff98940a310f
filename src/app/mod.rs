//! Application core: decision logic with no direct I/O.
//!
//! The obstacle map, motor commands and the decision task live here.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod commands;
pub mod decider;
pub mod events;
pub mod obstacle_map;
pub mod ports;
