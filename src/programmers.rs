//! Programmer registration and dispatch
//!
//! This module provides a centralized registry for all programmers, with support
//! for feature-gated inclusion and dynamic help text generation.

use fernvale_core::programmer::SpiMaster;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(all(feature = "fernvale-spi", unix))]
    programmers.push(ProgrammerInfo {
        name: "fernvale_spi",
        aliases: &["fernvale"],
        description: "Fernvale serial SPI bridge (dev=<tty>,ready_limit=<bytes>,retry_us=<us>)",
    });

    #[cfg(all(feature = "dummy", unix))]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "Bridge firmware emulator with in-memory flash (size=<bytes>,image=<file>)",
    });

    programmers
}

/// Generate help text listing all available programmers
pub fn programmer_help() -> String {
    let programmers = available_programmers();

    if programmers.is_empty() {
        return "No programmers available (recompile with programmer features enabled)".to_string();
    }

    let mut help = String::from("Available programmers:\n");

    for p in &programmers {
        help.push_str(&format!("  {:14} - {}\n", p.name, p.description));
        if !p.aliases.is_empty() {
            help.push_str(&format!("  {:14}   aliases: {}\n", "", p.aliases.join(", ")));
        }
    }

    help
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Map a programmer name or alias to its canonical name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
        .map(|p| p.name)
}

/// Execute a function with the specified programmer
///
/// The programmer string can be just the name (e.g., "fernvale_spi") or
/// include parameters (e.g., "fernvale_spi:dev=/dev/ttyUSB0").
///
/// The bridge session is shut down after `f` returns, whether or not it
/// succeeded.
#[allow(unused_variables)]
pub fn with_programmer<F>(programmer: &str, f: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(&mut dyn SpiMaster) -> Result<(), Box<dyn std::error::Error>>,
{
    // Parse programmer name and options
    let (name, options) = parse_programmer_string(programmer);

    // First check if the programmer is available at all
    let canonical_name = match find_programmer(name) {
        Some(n) => n,
        None => {
            return Err(unknown_programmer_error(name));
        }
    };

    // Dispatch to the appropriate programmer
    match canonical_name {
        #[cfg(all(feature = "fernvale-spi", unix))]
        "fernvale_spi" => {
            let config = fernvale_spi::parse_options(&options)
                .map_err(|e| format!("Invalid fernvale_spi parameters: {}", e))?;

            log::info!("Opening fernvale bridge on {}...", config.device);

            let mut fernvale = match fernvale_spi::open_device(&config) {
                Ok(fernvale) => fernvale,
                Err(e) if e.is_fatal() => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            let result = f(&mut fernvale);
            if let Err(e) = fernvale.shutdown() {
                log::warn!("Failed to shut down bridge: {}", e);
            }
            result
        }

        #[cfg(all(feature = "dummy", unix))]
        "dummy" => dummy::run(&options, f),

        _ => Err(unknown_programmer_error(name)),
    }
}

/// The `dummy` programmer: a real bridge session against emulated firmware
#[cfg(all(feature = "dummy", unix))]
mod dummy {
    use super::parse_size;
    use fernvale_core::programmer::SpiMaster;
    use fernvale_dummy::{BridgeFirmware, DummyConfig, DummyFlash};
    use fernvale_spi::Fernvale;
    use std::os::unix::net::UnixStream;
    use std::thread;

    const BANNER: &[u8] = b"\r\nfernvale> spi flashrom\r\n";

    pub fn run<F>(options: &[(&str, &str)], f: F) -> Result<(), Box<dyn std::error::Error>>
    where
        F: FnOnce(&mut dyn SpiMaster) -> Result<(), Box<dyn std::error::Error>>,
    {
        let mut flash_config = DummyConfig::default();
        let mut image = None;
        let mut bridge_options = Vec::new();

        for &(key, value) in options {
            match key {
                "size" => {
                    flash_config.size = parse_size(value)
                        .map_err(|e| format!("Invalid dummy size '{}': {}", value, e))?
                        as usize;
                }
                "image" => image = Some(std::fs::read(value)?),
                _ => bridge_options.push((key, value)),
            }
        }

        let config = fernvale_spi::parse_options(&bridge_options)
            .map_err(|e| format!("Invalid dummy parameters: {}", e))?;

        let flash = match image {
            Some(data) => DummyFlash::with_data(flash_config, &data),
            None => DummyFlash::new(flash_config),
        };

        log::info!(
            "Starting bridge emulator ({} KiB flash)...",
            flash.config().size / 1024
        );

        let (host, mut remote) = UnixStream::pair()?;
        let firmware = thread::spawn(move || {
            let mut firmware = BridgeFirmware::new(flash).with_banner(BANNER);
            firmware.serve(&mut remote)
        });

        let mut fernvale = Fernvale::new(host, &config)?;
        let result = f(&mut fernvale);
        if let Err(e) = fernvale.shutdown() {
            log::warn!("Failed to shut down bridge: {}", e);
        }
        // Closing the host end lets the emulator finish even without a shutdown frame
        drop(fernvale);

        match firmware.join() {
            Ok(Ok(outcome)) => log::debug!(
                "dummy: Emulator served {} frames (shutdown frame: {})",
                outcome.frames,
                outcome.shutdown
            ),
            Ok(Err(e)) => log::warn!("dummy: Emulator stopped: {}", e),
            Err(_) => log::warn!("dummy: Emulator thread panicked"),
        }

        result
    }
}

/// Parse a string as a hex or decimal u32, with an optional K/M suffix
#[allow(dead_code)]
pub fn parse_size(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let (digits, multiplier) = if let Some(n) = s.strip_suffix(['K', 'k']) {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix(['M', 'm']) {
        (n, 1024 * 1024)
    } else {
        (s, 1)
    };

    let value = crate::cli::parse_hex_u32(digits)?;
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Value too large: {}", s))
}

/// Parse a programmer string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_programmer_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

fn unknown_programmer_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown programmer: {}\n\n", name);
    msg.push_str(&programmer_help());
    msg.push_str("\nUse 'fernvale list-programmers' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_programmer_string() {
        assert_eq!(parse_programmer_string("dummy"), ("dummy", vec![]));
        assert_eq!(
            parse_programmer_string("fernvale_spi:dev=/dev/ttyUSB0,ready_limit=64"),
            (
                "fernvale_spi",
                vec![("dev", "/dev/ttyUSB0"), ("ready_limit", "64")]
            )
        );
        // Options without a value are dropped
        assert_eq!(
            parse_programmer_string("fernvale_spi:dev=,verbose"),
            ("fernvale_spi", vec![("dev", "")])
        );
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4096"), Ok(4096));
        assert_eq!(parse_size("0x10000"), Ok(0x10000));
        assert_eq!(parse_size("64K"), Ok(64 * 1024));
        assert_eq!(parse_size("16M"), Ok(16 * 1024 * 1024));
        assert!(parse_size("8192M").is_err());
        assert!(parse_size("big").is_err());
    }

    #[cfg(all(feature = "fernvale-spi", feature = "dummy", unix))]
    #[test]
    fn test_find_programmer() {
        assert_eq!(find_programmer("fernvale"), Some("fernvale_spi"));
        assert_eq!(find_programmer("dummy"), Some("dummy"));
        assert_eq!(find_programmer("serprog"), None);
    }

    #[cfg(all(feature = "dummy", unix))]
    #[test]
    fn test_dummy_programmer_round_trip() {
        let mut id = None;
        with_programmer("dummy:size=64K,retry_us=0", |master| {
            id = Some(fernvale_core::protocol::read_jedec_id(master)?);
            Ok(())
        })
        .unwrap();
        assert_eq!(id, Some((0xEF, 0x4018)));
    }
}
