//! CLI command implementations.

pub mod inspect;
pub mod replay;

use ringlog_core::{DeviceConfig, LogDevice, Session};
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Where input comes from and how it is delivered to the device.
#[derive(Debug)]
pub struct Feed {
    /// Ring capacity.
    pub capacity: usize,
    /// Input file, or stdin when `None`.
    pub input: Option<PathBuf>,
    /// Bytes per write call.
    pub chunk_size: usize,
}

impl Feed {
    /// Creates a device and writes the whole input into it in chunks.
    ///
    /// Returns the device and the writer session, still open so that an
    /// unterminated tail stays visible as pending.
    pub fn load(&self) -> Result<(Arc<LogDevice>, Session), Box<dyn std::error::Error>> {
        if self.chunk_size == 0 {
            return Err("chunk size must be at least 1".into());
        }

        let device = LogDevice::new(DeviceConfig::new().capacity(self.capacity))?;
        let mut writer = device.open();

        let mut source: Box<dyn Read> = match &self.input {
            Some(path) => Box::new(File::open(path)?),
            None => Box::new(io::stdin().lock()),
        };

        let mut buf = vec![0u8; self.chunk_size];
        let mut total = 0usize;
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            total += writer.write(&buf[..n])?;
        }

        info!(bytes = total, capacity = self.capacity, "input replayed");
        Ok((device, writer))
    }
}
