//! Error types for fernvale-core
//!
//! This module provides a no_std compatible error type shared by every
//! programmer implementation. Programmer crates keep their own richer error
//! types and map them onto this one at the `SpiMaster` boundary.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // SPI errors
    /// SPI transfer failed
    SpiTransferFailed,
    /// Opcode is not supported by the programmer or chip
    OpcodeNotSupported,
    /// Transaction does not fit into a single programmer transfer
    TransferTooLarge,

    // Address/size errors
    /// Address is beyond flash chip size
    AddressOutOfBounds,
    /// Provided buffer is too small for the operation
    BufferTooSmall,

    // Protection errors
    /// Flash chip is write protected (write enable latch not set)
    WriteProtected,

    // Programmer errors
    /// Programmer is not ready (not initialized or already shut down)
    ProgrammerNotReady,
    /// General programmer error
    ProgrammerError,
    /// Requested I/O mode is not supported by the programmer
    IoModeNotSupported,

    // I/O errors
    /// I/O error occurred on the link to the programmer
    IoError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpiTransferFailed => write!(f, "SPI transfer failed"),
            Self::OpcodeNotSupported => write!(f, "SPI opcode not supported"),
            Self::TransferTooLarge => write!(f, "transfer exceeds programmer limits"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteProtected => write!(f, "flash chip is write protected"),
            Self::ProgrammerNotReady => write!(f, "programmer not ready"),
            Self::ProgrammerError => write!(f, "programmer error"),
            Self::IoModeNotSupported => write!(f, "I/O mode not supported by programmer"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
