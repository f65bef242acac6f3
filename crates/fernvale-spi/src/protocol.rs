//! Fernvale bridge wire format
//!
//! ```text
//! Handshake:    host -> "spi flashrom\n"
//!               remote -> <any bytes> ... 0x05
//! Transaction:  host -> write_len:u8 read_len:u8 <write_len bytes>
//!               remote -> <read_len bytes>
//! Shutdown:     host -> 0x00 0x00
//! ```
//!
//! Frames carry no sequence numbers or checksums; the link must be a
//! dedicated, lossless, in-order byte stream.

use crate::error::{FernvaleError, Result};

/// Line that switches the remote console into bridge mode
pub const TRIGGER: &[u8] = b"spi flashrom\n";

/// Byte the remote sends once it is ready to accept frames
pub const READY: u8 = 0x05;

/// Frame that tells the remote to leave bridge mode
pub const SHUTDOWN_FRAME: [u8; 2] = [0x00, 0x00];

/// Largest length representable in a frame header
pub const MAX_FRAME_LEN: usize = u8::MAX as usize;

/// Largest SPI read the remote firmware handles per transaction
pub const MAX_DATA_READ: usize = 128;

/// Largest SPI write the remote firmware handles per transaction
pub const MAX_DATA_WRITE: usize = 128;

/// Device used when no `dev=` parameter is given
pub const DEFAULT_DEVICE: &str = "/dev/fernvale";

/// Fixed link speed for this host platform family
#[cfg(target_os = "linux")]
pub const BAUD_RATE: u32 = 921_600;
/// Fixed link speed for this host platform family
#[cfg(not(target_os = "linux"))]
pub const BAUD_RATE: u32 = 230_400;

/// Length prefix of a transaction frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Number of payload bytes following the header
    pub write_len: u8,
    /// Number of bytes the remote sends back
    pub read_len: u8,
}

impl FrameHeader {
    /// Build a header for a transfer, rejecting lengths above 255
    pub fn for_transfer(write_len: usize, read_len: usize) -> Result<Self> {
        match (u8::try_from(write_len), u8::try_from(read_len)) {
            (Ok(write_len), Ok(read_len)) => Ok(Self {
                write_len,
                read_len,
            }),
            _ => Err(FernvaleError::TransferTooLarge {
                write_len,
                read_len,
                max: MAX_FRAME_LEN,
            }),
        }
    }

    /// Header bytes in wire order
    pub const fn to_bytes(self) -> [u8; 2] {
        [self.write_len, self.read_len]
    }

    /// Parse a header received from the host
    pub const fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            write_len: bytes[0],
            read_len: bytes[1],
        }
    }

    /// True for the `0x00 0x00` shutdown sentinel
    pub const fn is_shutdown(&self) -> bool {
        self.write_len == 0 && self.read_len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_limits() {
        let header = FrameHeader::for_transfer(255, 0).unwrap();
        assert_eq!(header.to_bytes(), [0xFF, 0x00]);

        let err = FrameHeader::for_transfer(256, 3).unwrap_err();
        assert!(matches!(
            err,
            FernvaleError::TransferTooLarge {
                write_len: 256,
                read_len: 3,
                ..
            }
        ));
        assert!(FrameHeader::for_transfer(1, 300).is_err());
    }

    #[test]
    fn test_shutdown_sentinel() {
        assert!(FrameHeader::from_bytes(SHUTDOWN_FRAME).is_shutdown());
        assert!(!FrameHeader::from_bytes([0x00, 0x01]).is_shutdown());
    }
}
