//! Address width types

/// Address width for SPI commands
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// No address phase
    #[default]
    None,
    /// 3-byte (24-bit) address - supports up to 16 MiB
    ThreeByte,
    /// 4-byte (32-bit) address - supports up to 4 GiB
    FourByte,
}

impl AddressWidth {
    /// Returns the number of address bytes
    pub const fn bytes(&self) -> usize {
        match self {
            Self::None => 0,
            Self::ThreeByte => 3,
            Self::FourByte => 4,
        }
    }

    /// Encode an address big-endian into the first `bytes()` bytes of `buf`
    pub fn encode(&self, address: u32, buf: &mut [u8]) {
        let n = self.bytes();
        let be = address.to_be_bytes();
        buf[..n].copy_from_slice(&be[4 - n..]);
    }

    /// Decode a big-endian address from the first `bytes()` bytes of `buf`
    ///
    /// Returns `None` if `buf` is too short.
    pub fn decode(&self, buf: &[u8]) -> Option<u32> {
        let n = self.bytes();
        if buf.len() < n {
            return None;
        }
        Some(buf[..n].iter().fold(0u32, |acc, &b| (acc << 8) | b as u32))
    }
}
