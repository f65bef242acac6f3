//! Serial device transport
//!
//! Opens the tty that leads to the bridge firmware and puts it into raw
//! mode at the platform's fixed link speed. No baud negotiation happens;
//! the firmware expects exactly [`BAUD_RATE`](crate::protocol::BAUD_RATE).

use crate::error::{FernvaleError, Result};
use crate::protocol::BAUD_RATE;

use nix::sys::termios::{self, BaudRate, SetArg};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};

#[cfg(target_os = "linux")]
const LINK_SPEED: BaudRate = BaudRate::B921600;
#[cfg(not(target_os = "linux"))]
const LINK_SPEED: BaudRate = BaudRate::B230400;

/// Raw-mode serial device
#[derive(Debug)]
pub struct SerialTransport {
    file: File,
    path: String,
}

impl SerialTransport {
    /// Open `path` read/write and configure it for raw transfers
    ///
    /// Fails with [`FernvaleError::OpenFailed`] if the device cannot be
    /// opened and with the fatal [`FernvaleError::ConfigFailed`] if its
    /// terminal attributes cannot be read or applied.
    pub fn open(path: &str) -> Result<Self> {
        log::debug!("fernvale: Opening device {}", path);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| FernvaleError::OpenFailed {
                path: path.to_string(),
                source: e,
            })?;

        configure_raw(&file, path)?;
        log::info!("Opened serial port {} at {} baud", path, BAUD_RATE);

        Ok(Self {
            file,
            path: path.to_string(),
        })
    }

    /// Device path this transport was opened from
    pub fn path(&self) -> &str {
        &self.path
    }
}

fn configure_raw(file: &File, path: &str) -> Result<()> {
    let config_err = |step: &'static str| {
        move |e: nix::Error| FernvaleError::ConfigFailed {
            path: path.to_string(),
            step,
            source: io::Error::from(e),
        }
    };

    let mut attrs = termios::tcgetattr(file).map_err(config_err("get attributes"))?;
    termios::cfsetispeed(&mut attrs, LINK_SPEED).map_err(config_err("set input speed"))?;
    termios::cfsetospeed(&mut attrs, LINK_SPEED).map_err(config_err("set output speed"))?;
    termios::cfmakeraw(&mut attrs);
    termios::tcsetattr(file, SetArg::TCSANOW, &attrs).map_err(config_err("set attributes"))?;

    Ok(())
}

impl Read for SerialTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for SerialTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_device() {
        let err = SerialTransport::open("/nonexistent/fernvale").unwrap_err();
        assert!(matches!(err, FernvaleError::OpenFailed { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_non_tty_is_config_error() {
        // /dev/null opens fine but has no terminal attributes
        let err = SerialTransport::open("/dev/null").unwrap_err();
        assert!(matches!(err, FernvaleError::ConfigFailed { .. }));
        assert!(err.is_fatal());
    }
}
