//! Session configuration and programmer option parsing

use crate::channel::DEFAULT_RETRY_DELAY;
use crate::error::{FernvaleError, Result};
use crate::handshake::ReadyPolicy;
use crate::protocol::DEFAULT_DEVICE;

use std::time::Duration;

/// Configuration for opening a fernvale bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FernvaleConfig {
    /// Serial device path (default: `/dev/fernvale`)
    pub device: String,
    /// How long to wait for the ready byte
    pub ready: ReadyPolicy,
    /// Pause between retries of a would-block condition
    pub retry_delay: Duration,
}

impl Default for FernvaleConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            ready: ReadyPolicy::unbounded(),
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl FernvaleConfig {
    /// Create a configuration for `device`; an empty path selects the default
    pub fn new(device: impl Into<String>) -> Self {
        Self::default().with_device(device)
    }

    /// Set the device path; an empty path selects the default
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        let device = device.into();
        self.device = if device.is_empty() {
            DEFAULT_DEVICE.to_string()
        } else {
            device
        };
        self
    }

    /// Give up on the handshake after `max_bytes` bytes without a ready byte
    pub fn with_ready_limit(mut self, max_bytes: usize) -> Self {
        self.ready = ReadyPolicy::bounded(max_bytes);
        self
    }

    /// Set the pause between retries of a would-block condition
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

/// Parse programmer options into a configuration
///
/// Recognised options:
///
/// - `dev=/dev/ttyUSB0` - serial device (empty or missing: `/dev/fernvale`)
/// - `ready_limit=4096` - bytes to scan for the ready signal before failing
///   (default: wait forever)
/// - `retry_us=100` - pause in microseconds when the device would block
pub fn parse_options(options: &[(&str, &str)]) -> Result<FernvaleConfig> {
    let mut config = FernvaleConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config = config.with_device(*value);
            }
            "ready_limit" => {
                let limit: usize = value.parse().map_err(|_| {
                    FernvaleError::InvalidParameter(format!("Invalid ready_limit value: {}", value))
                })?;
                if limit == 0 {
                    return Err(FernvaleError::InvalidParameter(
                        "ready_limit must be at least 1".to_string(),
                    ));
                }
                config = config.with_ready_limit(limit);
            }
            "retry_us" => {
                let us: u64 = value.parse().map_err(|_| {
                    FernvaleError::InvalidParameter(format!("Invalid retry_us value: {}", value))
                })?;
                config = config.with_retry_delay(Duration::from_micros(us));
            }
            _ => {
                log::warn!("fernvale: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config.device, "/dev/fernvale");
        assert_eq!(config.ready, ReadyPolicy::unbounded());
        assert_eq!(config.retry_delay, DEFAULT_RETRY_DELAY);
    }

    #[test]
    fn test_empty_dev_uses_default() {
        let config = parse_options(&[("dev", "")]).unwrap();
        assert_eq!(config.device, DEFAULT_DEVICE);
        assert_eq!(FernvaleConfig::new("").device, DEFAULT_DEVICE);
    }

    #[test]
    fn test_all_options() {
        let config = parse_options(&[
            ("dev", "/dev/ttyUSB0"),
            ("ready_limit", "512"),
            ("retry_us", "0"),
            ("spispeed", "1000"),
        ])
        .unwrap();
        assert_eq!(config.device, "/dev/ttyUSB0");
        assert_eq!(config.ready, ReadyPolicy::bounded(512));
        assert_eq!(config.retry_delay, Duration::ZERO);
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_options(&[("ready_limit", "lots")]).is_err());
        assert!(parse_options(&[("ready_limit", "0")]).is_err());
        assert!(parse_options(&[("retry_us", "-1")]).is_err());
    }
}
