//! Rover obstacle-avoidance firmware library.
//!
//! Exposes the control tasks and their building blocks for integration
//! testing and the host simulation.  All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod link;
pub mod pins;
pub mod scanner;
pub mod sensors;

pub mod adapters;
pub mod drivers;
