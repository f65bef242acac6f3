//! Error types for fernvale bridge operations

use crate::device::SessionState;
use fernvale_core::error::Error as CoreError;
use thiserror::Error;

/// Fernvale-specific errors
#[derive(Debug, Error)]
pub enum FernvaleError {
    /// The serial device could not be opened for read/write
    #[error("Unable to open serial device {path}: {source}. Use fernvale_spi:dev=/dev/ttyUSB0")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The serial device could not be switched to raw mode at the link speed
    ///
    /// This error is fatal: callers are expected to terminate the process.
    #[error("Failed to configure {path} ({step}): {source}")]
    ConfigFailed {
        path: String,
        step: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The remote closed the stream
    #[error("Channel closed by remote")]
    ChannelClosed,

    /// Any other I/O failure on the stream
    #[error("Channel I/O error: {0}")]
    ChannelError(#[source] std::io::Error),

    /// A transaction does not fit the single-byte length fields of a frame
    #[error("Transfer too large: {write_len} bytes out, {read_len} bytes in (max {max} each way)")]
    TransferTooLarge {
        write_len: usize,
        read_len: usize,
        max: usize,
    },

    /// The operation is not allowed in the current session state
    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The remote did not send the ready byte within the configured limit
    #[error("No ready signal after {0} bytes")]
    ReadyNotSeen(usize),

    /// Invalid programmer parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl FernvaleError {
    /// Returns true for errors that must terminate the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ConfigFailed { .. })
    }

    /// Returns true if the byte stream itself failed
    ///
    /// After such an error the framing state of the remote is unknown and the
    /// session can no longer be used.
    pub fn is_channel_failure(&self) -> bool {
        matches!(self, Self::ChannelClosed | Self::ChannelError(_))
    }
}

impl From<FernvaleError> for CoreError {
    fn from(e: FernvaleError) -> Self {
        match e {
            FernvaleError::TransferTooLarge { .. } => CoreError::TransferTooLarge,
            FernvaleError::InvalidState { .. } => CoreError::ProgrammerNotReady,
            FernvaleError::ChannelClosed | FernvaleError::ChannelError(_) => CoreError::IoError,
            _ => CoreError::ProgrammerError,
        }
    }
}

/// Result type for fernvale operations
pub type Result<T> = std::result::Result<T, FernvaleError>;
