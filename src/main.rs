//! fernvale - SPI flash access through a serial bridge
//!
//! Talks to the fernvale bridge firmware, which tunnels SPI transactions
//! over a serial line to a flash chip wired to the microcontroller.
//!
//! # Architecture
//!
//! Every command runs against a `SpiMaster` chosen with `-p`:
//! - **fernvale_spi** - the bridge on a real serial device
//! - **dummy** - the same bridge session, talking to an in-process firmware
//!   emulator backed by an in-memory flash chip

mod cli;
mod commands;
mod programmers;

use clap::Parser;
use cli::{Cli, Commands};
use programmers::with_programmer;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Verbosity picks the default filter; RUST_LOG still wins
    let default_filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Probe { programmer } => with_programmer(&programmer, commands::run_probe),
        Commands::Read {
            programmer,
            output,
            start,
            length,
        } => with_programmer(&programmer, |master| {
            commands::run_read(master, start, length, &output)
        }),
        Commands::Raw {
            programmer,
            write,
            read,
        } => {
            let data = commands::parse_hex_bytes(&write)?;
            with_programmer(&programmer, |master| commands::run_raw(master, &data, read))
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
    }
}
