//! Common SPI flash command sequences
//!
//! These helpers work with any [`SpiMaster`](crate::programmer::SpiMaster)
//! and only use commands every SPI NOR flash understands.

mod spi25;

pub use spi25::*;
