//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the tasks against the
//! simulated chassis.  All tests run on the host with no real hardware.

#![cfg(not(target_os = "espidf"))]

mod mock_hw;
mod pipeline_tests;
mod scenario_tests;
