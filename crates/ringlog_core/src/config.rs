//! Log device configuration.

use crate::error::{RingError, RingResult};
use std::time::Duration;

/// Default maximum number of held entries.
pub const DEFAULT_CAPACITY: usize = 10;

/// Default record terminator.
pub const DEFAULT_TERMINATOR: u8 = b'\n';

/// Configuration for creating a log device.
///
/// All values are fixed once the device is created; the ring is never
/// resized.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Maximum number of entries held before the oldest is evicted.
    pub capacity: usize,

    /// Byte that completes a record.
    pub terminator: u8,

    /// Whether reads from a cursor positioned before an eviction fail with
    /// [`RingError::StaleCursor`] instead of returning shifted data.
    pub detect_stale_cursors: bool,

    /// How often a blocked session checks its interrupt flag while waiting
    /// for the device gate.
    pub interrupt_poll_interval: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            terminator: DEFAULT_TERMINATOR,
            detect_stale_cursors: false,
            interrupt_poll_interval: Duration::from_millis(10),
        }
    }
}

impl DeviceConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of held entries.
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the record terminator.
    #[must_use]
    pub const fn terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Sets whether stale cursors are reported.
    #[must_use]
    pub const fn detect_stale_cursors(mut self, value: bool) -> Self {
        self.detect_stale_cursors = value;
        self
    }

    /// Sets the interrupt polling interval.
    #[must_use]
    pub const fn interrupt_poll_interval(mut self, interval: Duration) -> Self {
        self.interrupt_poll_interval = interval;
        self
    }

    /// Checks that the configuration can back a device.
    ///
    /// # Errors
    ///
    /// Returns [`RingError::InvalidConfig`] if the capacity is zero or the
    /// poll interval is zero.
    pub fn validate(&self) -> RingResult<()> {
        if self.capacity == 0 {
            return Err(RingError::invalid_config("capacity must be at least 1"));
        }
        if self.interrupt_poll_interval.is_zero() {
            return Err(RingError::invalid_config(
                "interrupt poll interval must be non-zero",
            ));
        }
        Ok(())
    }
}
