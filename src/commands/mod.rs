//! CLI command implementations
//!
//! Every command takes the selected programmer as a `&mut dyn SpiMaster`, so
//! the same code drives the real bridge and the emulator.

mod list;
mod probe;
mod raw;
mod read;

pub use list::list_programmers;
pub use probe::run_probe;
pub use raw::{parse_hex_bytes, run_raw};
pub use read::run_read;
