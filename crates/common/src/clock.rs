//! Clock and update-throttle utilities.
//!
//! The tracking loop runs at camera frame rate, but the audio backend is an
//! expensive OS automation call. This module provides:
//! - A monotonic clock anchored at session start
//! - An update throttle that rations backend invocations

use std::time::Instant;

/// A monotonic clock anchored at the moment the session started.
#[derive(Debug, Clone)]
pub struct TrackingClock {
    epoch: Instant,
}

impl TrackingClock {
    /// Create a new tracking clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }
}

/// Minimum-interval gate for audio backend updates.
///
/// Timestamps are passed in explicitly so throttling logic can be tested
/// without sleeping. The first call always fires.
#[derive(Debug)]
pub struct UpdateThrottle {
    min_interval_ns: u64,
    last_update_ns: Option<u64>,
}

impl UpdateThrottle {
    /// Create a throttle with the given minimum interval in milliseconds.
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ns: min_interval_ms * 1_000_000,
            last_update_ns: None,
        }
    }

    /// Check whether enough time has passed for another backend update.
    /// Returns true and records the timestamp if so.
    pub fn try_update(&mut self, current_ns: u64) -> bool {
        match self.last_update_ns {
            None => {
                self.last_update_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.min_interval_ns => {
                self.last_update_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Record an update that bypassed the gate (used by `reset`).
    pub fn force_update(&mut self, current_ns: u64) {
        self.last_update_ns = Some(current_ns);
    }
}
