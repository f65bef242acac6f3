//! Bridge-mode handshake
//!
//! The remote boots into a text console. Sending [`TRIGGER`] switches it to
//! bridge mode; everything it prints until the [`READY`] byte (prompt echo,
//! banners, line noise) is discarded.

use crate::channel::Channel;
use crate::error::{FernvaleError, Result};
use crate::protocol::{READY, TRIGGER};

use std::io::{Read, Write};

/// How long to wait for the ready byte
///
/// The default waits forever, like the firmware tooling this bridge was
/// built for. A bound is the number of bytes read while waiting, the ready
/// byte included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadyPolicy {
    /// Maximum bytes to scan, or `None` to block until ready
    pub max_bytes: Option<usize>,
}

impl ReadyPolicy {
    /// Block until the ready byte arrives
    pub const fn unbounded() -> Self {
        Self { max_bytes: None }
    }

    /// Give up after `max_bytes` bytes without a ready byte
    pub const fn bounded(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }
}

/// Send the trigger line and wait for the ready byte
///
/// Returns the number of bytes read, the ready byte included.
pub fn handshake<S: Read + Write>(channel: &mut Channel<S>, policy: ReadyPolicy) -> Result<usize> {
    channel.write_exact(TRIGGER)?;
    channel.flush()?;

    let mut scanned = 0usize;
    loop {
        if policy.max_bytes.is_some_and(|max| scanned >= max) {
            return Err(FernvaleError::ReadyNotSeen(scanned));
        }

        let byte = channel.read_byte()?;
        scanned += 1;
        if byte == READY {
            log::debug!("fernvale: Found 'ready' signal after {} bytes", scanned);
            return Ok(scanned);
        }
    }
}
