//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                  | Connects to               |
//! |------------|-----------------------------|---------------------------|
//! | `log_sink` | EventSink                   | Serial / stderr log       |
//! | `time`     | Clock, DelayNs              | ESP32 system timer / std  |
//! | `sim`      | ServoPort, OutputPin, Clock | Simulated chassis (host)  |
//! |            | InputPin, DelayNs           |                           |

pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim;
pub mod time;
