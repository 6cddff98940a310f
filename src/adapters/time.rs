//! Time adapters.
//!
//! - **`target_os = "espidf"`**: [`SystemClock`] wraps `esp_timer_get_time()`
//!   (microsecond precision, monotonic).  Busy-wait microsecond delays
//!   come from `esp_idf_hal::delay::Ets`.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for host-side
//!   simulation.
//!
//! [`ThreadDelay`] sleeps the calling thread on both targets; under
//! ESP-IDF that is a FreeRTOS task delay, so lower-priority tasks run.

use embedded_hal::delay::DelayNs;

use crate::app::ports::Clock;

/// Monotonic microsecond clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Seconds since boot.
    pub fn uptime_secs(&self) -> u64 {
        self.now_us() / 1_000_000
    }
}

impl Clock for SystemClock {
    #[cfg(target_os = "espidf")]
    fn now_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    fn now_us(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_micros()).unwrap_or(u64::MAX)
    }
}

/// Delay that yields the thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
