//! Programmer trait definitions
//!
//! All programmers in this workspace are blocking: `execute` returns once the
//! transaction has completed on the wire or failed.

use crate::error::Result;
use crate::spi::SpiCommand;
use bitflags::bitflags;

bitflags! {
    /// SPI master feature flags
    ///
    /// These flags indicate what capabilities a programmer supports.
    /// Naming follows the convention from flashprog for compatibility.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiFeatures: u32 {
        /// Supports 4-byte addressing commands
        const FOUR_BYTE_ADDR = 1 << 0;
        /// Can read two bits at once (1-1-2 mode)
        const DUAL_IN        = 1 << 2;
        /// Can transfer two bits at once (1-2-2 mode)
        const DUAL_IO        = 1 << 3;
        /// Can read four bits at once (1-1-4 mode)
        const QUAD_IN        = 1 << 4;
        /// Can transfer four bits at once (1-4-4 mode)
        const QUAD_IO        = 1 << 5;

        /// Shorthand for dual mode (both DUAL_IN and DUAL_IO)
        const DUAL = Self::DUAL_IN.bits() | Self::DUAL_IO.bits();
        /// Shorthand for quad mode (both QUAD_IN and QUAD_IO)
        const QUAD = Self::QUAD_IN.bits() | Self::QUAD_IO.bits();
    }
}

impl Default for SpiFeatures {
    fn default() -> Self {
        SpiFeatures::empty()
    }
}

/// SPI Master trait
///
/// This trait represents a programmer that can execute SPI commands.
/// `max_read_len` and `max_write_len` bound the number of bytes of a single
/// transaction in each direction, including the command header on the write
/// side; callers split larger operations (see [`crate::protocol::read_data`]).
pub trait SpiMaster {
    /// Get the features supported by this programmer
    fn features(&self) -> SpiFeatures;

    /// Get the maximum number of bytes that can be read in a single transaction
    fn max_read_len(&self) -> usize;

    /// Get the maximum number of bytes that can be written in a single transaction
    fn max_write_len(&self) -> usize;

    /// Execute a single SPI command
    ///
    /// The command contains all the information needed for the transaction:
    /// - `opcode`: The SPI command opcode
    /// - `address`: Optional address (with width)
    /// - `io_mode`: The I/O mode to use
    /// - `dummy_cycles`: Number of dummy clock cycles after address
    /// - `write_data`: Data to write after the header
    /// - `read_buf`: Buffer to read data into
    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()>;

    /// Check if an opcode is supported by this programmer
    fn probe_opcode(&self, _opcode: u8) -> bool {
        true
    }

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

#[cfg(feature = "alloc")]
impl<M: SpiMaster + ?Sized> SpiMaster for alloc::boxed::Box<M> {
    fn features(&self) -> SpiFeatures {
        (**self).features()
    }

    fn max_read_len(&self) -> usize {
        (**self).max_read_len()
    }

    fn max_write_len(&self) -> usize {
        (**self).max_write_len()
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        (**self).execute(cmd)
    }

    fn probe_opcode(&self, opcode: u8) -> bool {
        (**self).probe_opcode(opcode)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

/// Helper function for implementing `SpiMaster::execute()`.
///
/// Most programmer implementations follow the same pattern:
/// 1. Check I/O mode is supported
/// 2. Build a write buffer from the command header + write data
/// 3. Call an internal transfer method
///
/// This function handles steps 1 and 2, delegating step 3 to the provided
/// closure. The closure receives the write data and the read buffer to fill
/// directly.
///
/// # Example
///
/// ```ignore
/// fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> CoreResult<()> {
///     default_execute(cmd, self.features(), |write_data, read_buf| {
///         self.transfer(write_data, read_buf)
///             .map_err(|_| CoreError::ProgrammerError)
///     })
/// }
/// ```
#[cfg(feature = "alloc")]
pub fn default_execute<F>(
    cmd: &mut SpiCommand<'_>,
    features: SpiFeatures,
    transfer_fn: F,
) -> Result<()>
where
    F: FnOnce(&[u8], &mut [u8]) -> Result<()>,
{
    use crate::spi::check_io_mode_supported;

    check_io_mode_supported(cmd.io_mode, features)?;

    let header_len = cmd.header_len();
    let mut write_data = alloc::vec![0u8; header_len + cmd.write_data.len()];
    cmd.encode_header(&mut write_data);
    write_data[header_len..].copy_from_slice(cmd.write_data);

    transfer_fn(&write_data, cmd.read_buf)
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::spi::{opcodes, IoMode};

    #[test]
    fn test_default_execute_flattens_command() {
        let data = [0xAA, 0xBB];
        let mut cmd = SpiCommand::write_3b(opcodes::PP, 0x00_1000, &data);
        let mut seen = alloc::vec::Vec::new();
        default_execute(&mut cmd, SpiFeatures::empty(), |w, r| {
            seen.extend_from_slice(w);
            assert!(r.is_empty());
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, [opcodes::PP, 0x00, 0x10, 0x00, 0xAA, 0xBB]);
    }

    #[test]
    fn test_default_execute_rejects_io_mode() {
        let mut buf = [0u8; 4];
        let mut cmd = SpiCommand::read_3b(opcodes::READ, 0, &mut buf).with_io_mode(IoMode::DualOut);
        let result = default_execute(&mut cmd, SpiFeatures::empty(), |_, _| Ok(()));
        assert_eq!(result, Err(Error::IoModeNotSupported));
    }
}
