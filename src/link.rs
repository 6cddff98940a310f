//! Inter-task link.
//!
//! ```text
//!             range_request: Signal<Angle>
//!   Scanner ─────────────────────────────────▶ Ranger
//!           ◀─────────────────────────────────
//!             range_reply:   Signal<DistanceSample>
//!
//!             samples: Channel<DistanceSample, 181>
//!   Scanner ─────────────────────────────────▶ Decider
//!             sweep_done:    Signal<()>
//!           ─────────────────────────────────▶
//!             resume:        Signal<()>
//!           ◀─────────────────────────────────
//! ```
//!
//! Every payload travels by value.  The tasks share no mutable state
//! besides this struct, and the primitives inside it are
//! `embassy-sync` types over a critical-section mutex, so the link can
//! live in a `static` and be used from any thread.  Blocking waits go
//! through `futures_lite::future::block_on`.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_sync::signal::Signal;
use embedded_hal::delay::DelayNs;
use futures_lite::future::block_on;

use crate::error::LinkError;
use crate::sensors::{Angle, DistanceSample};

/// Sample queue depth.  One full sweep at 1° steps is 181 samples.
pub const QUEUE_CAPACITY: usize = 181;

type Mutex = CriticalSectionRawMutex;

pub struct Link {
    samples: Channel<Mutex, DistanceSample, QUEUE_CAPACITY>,
    range_request: Signal<Mutex, Angle>,
    range_reply: Signal<Mutex, DistanceSample>,
    sweep_done: Signal<Mutex, ()>,
    resume: Signal<Mutex, ()>,
}

impl Link {
    pub const fn new() -> Self {
        Self {
            samples: Channel::new(),
            range_request: Signal::new(),
            range_reply: Signal::new(),
            sweep_done: Signal::new(),
            resume: Signal::new(),
        }
    }

    // ── Scanner ↔ Ranger ──────────────────────────────────────

    pub fn request_range(&self, angle: Angle) {
        self.range_reply.reset();
        self.range_request.signal(angle);
    }

    pub fn wait_range_request(&self) -> Angle {
        block_on(self.range_request.wait())
    }

    pub fn reply_range(&self, sample: DistanceSample) {
        self.range_reply.signal(sample);
    }

    pub fn wait_range_reply(&self) -> DistanceSample {
        block_on(self.range_reply.wait())
    }

    // ── Scanner → Decider ─────────────────────────────────────

    /// Enqueue `sample`, retrying once per millisecond while the queue is
    /// full.  After `timeout_ms` retries the sample is handed back.
    pub fn publish(
        &self,
        sample: DistanceSample,
        timeout_ms: u32,
        delay: &mut impl DelayNs,
    ) -> Result<(), LinkError> {
        let mut pending = sample;
        let mut remaining = timeout_ms;
        loop {
            match self.samples.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(TrySendError::Full(back)) => {
                    if remaining == 0 {
                        return Err(LinkError::QueueFull);
                    }
                    remaining -= 1;
                    pending = back;
                    delay.delay_ms(1);
                }
            }
        }
    }

    pub fn finish_sweep(&self) {
        self.sweep_done.signal(());
    }

    pub fn wait_resume(&self) {
        block_on(self.resume.wait());
    }

    // ── Decider ───────────────────────────────────────────────

    pub fn wait_sweep_done(&self) {
        block_on(self.sweep_done.wait());
    }

    /// Move everything queued into `out`, oldest first, until the queue is
    /// empty or `out` is full.  Returns how many samples were moved.
    pub fn drain<const N: usize>(&self, out: &mut heapless::Vec<DistanceSample, N>) -> usize {
        let mut moved = 0;
        while !out.is_full() {
            let Ok(sample) = self.samples.try_receive() else {
                break;
            };
            // capacity checked above
            let _ = out.push(sample);
            moved += 1;
        }
        moved
    }

    pub fn release_scanner(&self) {
        self.resume.signal(());
    }

    /// Resume has been signalled and not yet consumed by the scanner.
    pub fn scanner_released(&self) -> bool {
        self.resume.signaled()
    }

    pub fn queued(&self) -> usize {
        self.samples.len()
    }
}

impl Default for Link {
    fn default() -> Self {
        Self::new()
    }
}
