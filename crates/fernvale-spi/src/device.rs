//! Fernvale bridge session
//!
//! This module provides the `Fernvale` struct, which owns the byte channel to
//! the bridge firmware, enforces the session state machine and implements
//! the `SpiMaster` trait.

use crate::channel::Channel;
use crate::codec;
use crate::config::FernvaleConfig;
use crate::error::{FernvaleError, Result};
use crate::handshake::{handshake, ReadyPolicy};
use crate::protocol::{MAX_DATA_READ, MAX_DATA_WRITE};

use core::fmt;
use fernvale_core::error::{Error as CoreError, Result as CoreResult};
use fernvale_core::programmer::{default_execute, SpiFeatures, SpiMaster};
use fernvale_core::spi::SpiCommand;
use std::io::{Read, Write};

/// Lifecycle of a bridge session
///
/// ```text
/// Uninitialized --handshake--> Ready --shutdown--> ShuttingDown --> Closed
/// ```
///
/// Any channel failure moves the session straight to `Closed`: without
/// sequence numbers there is no way to resynchronise with the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Stream is open but the remote has not signalled readiness
    Uninitialized,
    /// Transactions may be sent
    Ready,
    /// The shutdown frame is being sent
    ShuttingDown,
    /// Nothing more may be sent
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting down",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Fernvale programmer
///
/// This struct represents a session with the fernvale bridge firmware and
/// implements the `SpiMaster` trait for communicating with SPI flash chips.
pub struct Fernvale<S: Read + Write> {
    channel: Channel<S>,
    state: SessionState,
    ready: ReadyPolicy,
    transactions: u64,
}

impl<S: Read + Write> Fernvale<S> {
    /// Create a session over `stream` and perform the handshake
    pub fn new(stream: S, config: &FernvaleConfig) -> Result<Self> {
        let mut fernvale = Self::uninitialized(stream, config);
        fernvale.initialize()?;
        Ok(fernvale)
    }

    /// Wrap `stream` without talking to the remote yet
    pub fn uninitialized(stream: S, config: &FernvaleConfig) -> Self {
        Self {
            channel: Channel::new(stream).with_retry_delay(config.retry_delay),
            state: SessionState::Uninitialized,
            ready: config.ready,
            transactions: 0,
        }
    }

    /// Switch the remote into bridge mode and wait until it is ready
    pub fn initialize(&mut self) -> Result<()> {
        self.require(SessionState::Uninitialized, "initialize")?;

        match handshake(&mut self.channel, self.ready) {
            Ok(_) => {
                self.state = SessionState::Ready;
                log::debug!("fernvale: Session ready");
                Ok(())
            }
            Err(e) => {
                if e.is_channel_failure() {
                    self.state = SessionState::Closed;
                }
                Err(e)
            }
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of transactions completed in this session
    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    /// Get a reference to the underlying byte channel
    pub fn channel(&self) -> &Channel<S> {
        &self.channel
    }

    /// Execute one SPI transaction and return the `read_count` bytes read
    pub fn execute_spi_command(&mut self, write: &[u8], read_count: usize) -> Result<Vec<u8>> {
        // Validate before allocating the response buffer
        crate::protocol::FrameHeader::for_transfer(write.len(), read_count)?;
        let mut read_buf = vec![0u8; read_count];
        self.transfer(write, &mut read_buf)?;
        Ok(read_buf)
    }

    /// Execute one SPI transaction, filling `read_buf` completely
    ///
    /// A transaction with nothing to write and nothing to read is skipped:
    /// its frame would be the shutdown sentinel.
    pub fn transfer(&mut self, write: &[u8], read_buf: &mut [u8]) -> Result<()> {
        self.require(SessionState::Ready, "transfer")?;

        if write.is_empty() && read_buf.is_empty() {
            log::debug!("fernvale: Skipping empty transaction");
            return Ok(());
        }

        match codec::transact(&mut self.channel, write, read_buf) {
            Ok(()) => {
                self.transactions += 1;
                Ok(())
            }
            Err(e) => {
                if e.is_channel_failure() {
                    log::error!("fernvale: {}; session closed", e);
                    self.state = SessionState::Closed;
                }
                Err(e)
            }
        }
    }

    /// Send the shutdown frame and close the session
    ///
    /// Calling this again, or on a session that never became ready, does
    /// nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.state {
            SessionState::Ready => {
                self.state = SessionState::ShuttingDown;
                let result = codec::send_shutdown(&mut self.channel);
                self.state = SessionState::Closed;
                log::debug!(
                    "fernvale: Shut down after {} transactions ({} bytes out, {} bytes in)",
                    self.transactions,
                    self.channel.bytes_sent(),
                    self.channel.bytes_received()
                );
                result
            }
            SessionState::Uninitialized => {
                self.state = SessionState::Closed;
                Ok(())
            }
            SessionState::ShuttingDown | SessionState::Closed => Ok(()),
        }
    }

    fn require(&self, expected: SessionState, operation: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(FernvaleError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl<S: Read + Write> Drop for Fernvale<S> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::warn!("fernvale: Failed to send shutdown frame: {}", e);
        }
    }
}

impl<S: Read + Write> SpiMaster for Fernvale<S> {
    fn features(&self) -> SpiFeatures {
        // Address bytes are opaque payload, so 4-byte addressing just works
        SpiFeatures::FOUR_BYTE_ADDR
    }

    fn max_read_len(&self) -> usize {
        MAX_DATA_READ
    }

    fn max_write_len(&self) -> usize {
        MAX_DATA_WRITE
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> CoreResult<()> {
        if cmd.header_len() + cmd.write_data.len() > MAX_DATA_WRITE
            || cmd.read_buf.len() > MAX_DATA_READ
        {
            return Err(CoreError::TransferTooLarge);
        }

        default_execute(cmd, self.features(), |write_data, read_buf| {
            self.transfer(write_data, read_buf).map_err(CoreError::from)
        })
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(std::time::Duration::from_micros(us as u64));
    }
}
