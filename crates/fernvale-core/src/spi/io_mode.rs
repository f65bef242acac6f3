//! SPI I/O modes

use crate::error::{Error, Result};
use crate::programmer::SpiFeatures;

/// I/O mode for SPI transactions
///
/// The fernvale bridge only shifts data on a single line, but commands carry
/// the mode so that a master can reject anything it cannot drive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IoMode {
    /// Standard SPI: 1-1-1 (cmd, addr, data all on single line)
    #[default]
    Single,
    /// Dual Output: 1-1-2 (data phase on 2 lines)
    DualOut,
    /// Dual I/O: 1-2-2 (addr and data on 2 lines)
    DualIo,
    /// Quad Output: 1-1-4 (data phase on 4 lines)
    QuadOut,
    /// Quad I/O: 1-4-4 (addr and data on 4 lines)
    QuadIo,
}

impl IoMode {
    /// Returns the number of data lines used for the data phase
    pub const fn data_lines(&self) -> u8 {
        match self {
            Self::Single => 1,
            Self::DualOut | Self::DualIo => 2,
            Self::QuadOut | Self::QuadIo => 4,
        }
    }

    /// Feature flag a master must advertise to run this mode
    pub const fn required_feature(&self) -> SpiFeatures {
        match self {
            Self::Single => SpiFeatures::empty(),
            Self::DualOut => SpiFeatures::DUAL_IN,
            Self::DualIo => SpiFeatures::DUAL_IO,
            Self::QuadOut => SpiFeatures::QUAD_IN,
            Self::QuadIo => SpiFeatures::QUAD_IO,
        }
    }
}

/// Check if a programmer supports the requested I/O mode
///
/// Returns `Ok(())` if the mode is supported, or `Err(IoModeNotSupported)` if not.
pub fn check_io_mode_supported(mode: IoMode, features: SpiFeatures) -> Result<()> {
    if features.contains(mode.required_feature()) {
        Ok(())
    } else {
        Err(Error::IoModeNotSupported)
    }
}
