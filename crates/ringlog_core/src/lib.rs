//! # RingLog Core
//!
//! A bounded, append-coalescing circular log buffer behind a
//! character-device style read/write/seek interface.
//!
//! Writers deliver arbitrary byte chunks. Chunks accumulate until a
//! terminator byte (newline by default) completes a record; only complete
//! records become visible to readers. The ring holds a fixed number of
//! entries, and committing into a full ring evicts the oldest.
//!
//! ## Design Principles
//!
//! - Fixed arena of slots with wrapping indices; no growth past capacity
//! - One device object shared by `Arc`, with its gate as an explicit field
//! - Every operation is serialized through that gate, which can be
//!   interrupted while waiting
//! - Readers copy bytes out; no reference to entry storage escapes
//!
//! ## Components
//!
//! - [`RingStore`] - fixed-capacity ring with commit-with-eviction
//! - [`WriteAccumulator`] - coalesces partial writes into entries
//! - [`locate_by_cursor`] / [`locate_by_index`] - offset translation
//! - [`LogDevice`] - the shared, gated device
//! - [`Session`] - per-open handle with its own cursor
//!
//! ## Example
//!
//! ```rust
//! use ringlog_core::{DeviceConfig, LogDevice};
//!
//! let device = LogDevice::new(DeviceConfig::new().capacity(3)).unwrap();
//! let mut session = device.open();
//!
//! for line in [&b"AAAA\n"[..], b"BB\n", b"C\n", b"DD\n"] {
//!     session.write(line).unwrap();
//! }
//!
//! // "AAAA\n" was evicted; entry 1 is now "C\n"
//! assert_eq!(session.seek_to(1, 0).unwrap(), 3);
//! let (data, cursor) = session.read_at(3, 100).unwrap();
//! assert_eq!(data, b"C\n");
//! assert_eq!(cursor, 5);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod accumulator;
mod config;
mod device;
mod entry;
mod error;
mod gate;
mod offset;
mod session;
mod stats;
mod store;

pub use accumulator::{Appended, WriteAccumulator};
pub use config::{DeviceConfig, DEFAULT_CAPACITY, DEFAULT_TERMINATOR};
pub use device::{LogDevice, ReadOutcome};
pub use entry::Entry;
pub use error::{RingError, RingResult};
pub use gate::{Gate, Interrupt};
pub use offset::{locate_by_cursor, locate_by_index, Location};
pub use session::{Session, SessionId};
pub use stats::{DeviceStats, StatsSnapshot};
pub use store::{HeldEntries, RingStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
