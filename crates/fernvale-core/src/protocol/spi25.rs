//! SPI25 protocol helpers
//!
//! This module implements the common SPI flash command sequences
//! as defined by JEDEC.

use crate::error::{Error, Result};
use crate::programmer::SpiMaster;
use crate::spi::{opcodes, SpiCommand};

/// Header length of a 3-byte addressed READ (opcode + address)
const READ_HEADER_LEN: usize = 4;

/// Read the JEDEC ID from a flash chip
///
/// Returns (manufacturer_id, device_id) on success.
pub fn read_jedec_id<M: SpiMaster + ?Sized>(master: &mut M) -> Result<(u8, u16)> {
    let mut buf = [0u8; 3];
    let mut cmd = SpiCommand::read_reg(opcodes::RDID, &mut buf);
    master.execute(&mut cmd)?;

    let manufacturer = buf[0];
    let device = ((buf[1] as u16) << 8) | (buf[2] as u16);

    Ok((manufacturer, device))
}

/// Read the status register 1
pub fn read_status1<M: SpiMaster + ?Sized>(master: &mut M) -> Result<u8> {
    let mut buf = [0u8; 1];
    let mut cmd = SpiCommand::read_reg(opcodes::RDSR, &mut buf);
    master.execute(&mut cmd)?;
    Ok(buf[0])
}

/// Send the Write Enable command
pub fn write_enable<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WREN);
    master.execute(&mut cmd)
}

/// Send the Write Disable command
pub fn write_disable<M: SpiMaster + ?Sized>(master: &mut M) -> Result<()> {
    let mut cmd = SpiCommand::simple(opcodes::WRDI);
    master.execute(&mut cmd)
}

/// Read `buf.len()` bytes starting at `addr` using 3-byte READ commands
///
/// The read is split so that no single transaction exceeds the master's
/// `max_read_len()`. `on_chunk` is called with the number of bytes read so
/// far after every chunk.
pub fn read_data<M, F>(master: &mut M, addr: u32, buf: &mut [u8], mut on_chunk: F) -> Result<()>
where
    M: SpiMaster + ?Sized,
    F: FnMut(usize),
{
    if master.max_write_len() < READ_HEADER_LEN {
        return Err(Error::TransferTooLarge);
    }
    let chunk_size = master.max_read_len();
    if chunk_size == 0 {
        return Err(Error::BufferTooSmall);
    }

    let end = addr as u64 + buf.len() as u64;
    if end > 1 << 24 {
        return Err(Error::AddressOutOfBounds);
    }

    let mut done = 0usize;
    for chunk in buf.chunks_mut(chunk_size) {
        let len = chunk.len();
        let chunk_addr = addr + done as u32;
        log::trace!("read_data: 0x{:06X} +{}", chunk_addr, len);
        let mut cmd = SpiCommand::read_3b(opcodes::READ, chunk_addr, chunk);
        master.execute(&mut cmd)?;
        done += len;
        on_chunk(done);
    }

    Ok(())
}
