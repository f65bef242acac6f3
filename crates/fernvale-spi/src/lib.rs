//! fernvale-spi - SPI over a serial bridge
//!
//! This crate talks to the fernvale bridge firmware: a microcontroller
//! console that, once told `spi flashrom`, tunnels SPI transactions between
//! a serial link and a flash chip on its own pins.
//!
//! # Protocol Overview
//!
//! After a one-time handshake (trigger line out, ready byte `0x05` back),
//! every SPI transaction is a frame of `write_len`, `read_len` and
//! `write_len` payload bytes; the firmware answers with exactly `read_len`
//! bytes. A `0x00 0x00` frame ends the session. See [`protocol`].
//!
//! # Layers
//!
//! - [`channel`] - exact-count reads and writes over any `Read + Write`
//! - [`handshake`] - bridge-mode trigger and ready scan
//! - [`codec`] - frame encoding for one transaction
//! - [`device`] - the [`Fernvale`] session, which implements `SpiMaster`
//! - [`transport`] - raw-mode serial device setup (unix only)
//!
//! # Example
//!
//! ```no_run
//! use fernvale_spi::FernvaleConfig;
//! use fernvale_core::protocol;
//!
//! let config = FernvaleConfig::new("/dev/ttyUSB0");
//! let mut fernvale = fernvale_spi::open_device(&config)?;
//!
//! let (mfr, dev) = protocol::read_jedec_id(&mut fernvale)?;
//! println!("JEDEC ID: {:02X} {:04X}", mfr, dev);
//!
//! fernvale.shutdown()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod channel;
pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod handshake;
pub mod protocol;
#[cfg(unix)]
pub mod transport;

#[cfg(test)]
mod testing;

// Re-exports
pub use channel::Channel;
pub use config::{parse_options, FernvaleConfig};
pub use device::{Fernvale, SessionState};
pub use error::{FernvaleError, Result};
pub use handshake::ReadyPolicy;
pub use protocol::FrameHeader;

#[cfg(unix)]
pub use transport::SerialTransport;

/// Open the serial device named in `config` and complete the handshake
#[cfg(unix)]
pub fn open_device(config: &FernvaleConfig) -> Result<Fernvale<SerialTransport>> {
    let transport = SerialTransport::open(&config.device)?;
    Fernvale::new(transport, config)
}

/// Open a fernvale bridge and return a boxed SpiMaster
///
/// This is a convenience function for use in the CLI programmer dispatch.
///
/// # Arguments
///
/// * `options` - Slice of (key, value) pairs from programmer string parsing
#[cfg(unix)]
pub fn open_fernvale(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn fernvale_core::programmer::SpiMaster>, FernvaleError> {
    let config = parse_options(options)?;
    let fernvale = open_device(&config)?;
    Ok(Box::new(fernvale))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_open_fernvale_reports_device() {
        let err = open_fernvale(&[("dev", "/nonexistent/ttyFV0")])
            .err()
            .unwrap();
        assert!(matches!(
            err,
            FernvaleError::OpenFailed { ref path, .. } if path == "/nonexistent/ttyFV0"
        ));
    }

    #[test]
    fn test_open_fernvale_rejects_bad_options() {
        let err = open_fernvale(&[("ready_limit", "0")]).err().unwrap();
        assert!(matches!(err, FernvaleError::InvalidParameter(_)));
    }
}
