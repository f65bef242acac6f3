//! Reliable byte channel
//!
//! [`Channel`] turns a raw `Read + Write` stream (a serial device, a socket,
//! a test double) into exact-count transfers: either every requested byte
//! moves or an error is returned. There is no partial success.
//!
//! "Try again" conditions (`WouldBlock`, `TimedOut`) are not errors: the call
//! is repeated after `retry_delay` without consuming any data, with no upper
//! bound on the number of retries. `Interrupted` is retried immediately.

use crate::error::{FernvaleError, Result};

use std::io::{self, ErrorKind, Read, Write};
use std::time::Duration;

/// Default pause between retries of a transient condition
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_micros(100);

/// Exact-count reader/writer over a byte stream
#[derive(Debug)]
pub struct Channel<S> {
    stream: S,
    retry_delay: Duration,
    bytes_sent: u64,
    bytes_received: u64,
}

impl<S: Read + Write> Channel<S> {
    /// Wrap a stream with the default retry delay
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            retry_delay: DEFAULT_RETRY_DELAY,
            bytes_sent: 0,
            bytes_received: 0,
        }
    }

    /// Set the pause between retries (zero yields the thread instead)
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Write all of `buf`
    ///
    /// Short writes continue from the first unsent byte. A write that accepts
    /// zero bytes means the remote went away.
    pub fn write_exact(&mut self, mut buf: &[u8]) -> Result<()> {
        while !buf.is_empty() {
            match self.stream.write(buf) {
                Ok(0) => return Err(FernvaleError::ChannelClosed),
                Ok(n) => {
                    self.bytes_sent += n as u64;
                    buf = &buf[n..];
                }
                Err(e) => self.recover(e)?,
            }
        }
        Ok(())
    }

    /// Flush the underlying stream
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.stream.flush() {
                Ok(()) => return Ok(()),
                Err(e) => self.recover(e)?,
            }
        }
    }

    /// Read exactly one byte
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        loop {
            match self.stream.read(&mut byte) {
                Ok(0) => return Err(FernvaleError::ChannelClosed),
                Ok(_) => {
                    self.bytes_received += 1;
                    log::trace!("fernvale: rx 0x{:02x}", byte[0]);
                    return Ok(byte[0]);
                }
                Err(e) => self.recover(e)?,
            }
        }
    }

    /// Fill `buf` completely
    ///
    /// Bytes are requested one at a time so nothing beyond `buf.len()` is
    /// ever pulled off the stream.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    /// Total bytes accepted by the stream so far
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Total bytes received from the stream so far
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Get a reference to the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Get a mutable reference to the underlying stream
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Decide whether an I/O error is retried or reported
    fn recover(&self, e: io::Error) -> Result<()> {
        match e.kind() {
            ErrorKind::Interrupted => Ok(()),
            ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                if self.retry_delay.is_zero() {
                    std::thread::yield_now();
                } else {
                    std::thread::sleep(self.retry_delay);
                }
                Ok(())
            }
            ErrorKind::UnexpectedEof | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
                Err(FernvaleError::ChannelClosed)
            }
            _ => Err(FernvaleError::ChannelError(e)),
        }
    }
}
