//! Programmer traits and abstractions
//!
//! This module defines the trait every programmer implements to run SPI
//! transactions against a flash chip.

mod traits;

pub use traits::*;
