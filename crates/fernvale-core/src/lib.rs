//! fernvale-core - SPI command types and programmer traits
//!
//! This crate holds everything that is independent of how SPI transactions
//! reach the flash chip: the [`SpiCommand`](spi::SpiCommand) description of a
//! single transaction, the [`SpiMaster`](programmer::SpiMaster) trait that
//! programmers implement, standard JEDEC opcodes and a handful of common
//! command sequences built on top of them.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation (boxed masters, `default_execute`)
//!
//! # Example
//!
//! ```ignore
//! use fernvale_core::{protocol, programmer::SpiMaster};
//!
//! fn show_id<M: SpiMaster>(master: &mut M) -> fernvale_core::Result<()> {
//!     let (mfr, dev) = protocol::read_jedec_id(master)?;
//!     println!("JEDEC ID: {:02X} {:04X}", mfr, dev);
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod programmer;
pub mod protocol;
pub mod spi;

pub use error::{Error, Result};
