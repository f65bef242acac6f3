//! fernvale-dummy - In-memory flash emulator for testing
//!
//! This crate provides a flash chip that lives in memory and the remote end
//! of the fernvale bridge protocol, so the whole stack can be exercised
//! without hardware.
//!
//! - [`DummyFlash`] answers raw SPI transactions the way a 25-series NOR
//!   flash would, and can also be used directly as a `SpiMaster`.
//! - [`remote::BridgeFirmware`] plays the microcontroller: it waits for the
//!   trigger line, signals ready and serves frames against a `DummyFlash`.

pub mod remote;

use fernvale_core::error::{Error, Result};
use fernvale_core::programmer::{default_execute, SpiFeatures, SpiMaster};
use fernvale_core::spi::{opcodes, AddressWidth, SpiCommand};

pub use remote::{BridgeFirmware, ServeOutcome};

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC device ID
    pub device_id: u16,
    /// Flash size in bytes
    pub size: usize,
    /// Page size for programming
    pub page_size: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0xEF, // Winbond
            device_id: 0x4018,     // W25Q128FV
            size: 16 * 1024 * 1024,
            page_size: 256,
        }
    }
}

/// Dummy flash chip
///
/// Emulates a flash chip in memory for testing purposes.
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    status_reg1: u8,
    status_reg2: u8,
    status_reg3: u8,
    in_4byte_mode: bool,
}

impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self {
            config,
            data,
            status_reg1: 0,
            status_reg2: 0,
            status_reg3: 0,
            in_4byte_mode: false,
        }
    }

    /// Create a new dummy flash with default configuration (W25Q128FV)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    fn write_enabled(&self) -> bool {
        self.status_reg1 & opcodes::SR1_WEL != 0
    }

    fn set_write_enabled(&mut self, enabled: bool) {
        if enabled {
            self.status_reg1 |= opcodes::SR1_WEL;
        } else {
            self.status_reg1 &= !opcodes::SR1_WEL;
        }
    }

    /// Address width of commands whose width follows the current mode
    fn mode_width(&self) -> AddressWidth {
        if self.in_4byte_mode {
            AddressWidth::FourByte
        } else {
            AddressWidth::ThreeByte
        }
    }

    /// Run one SPI transaction as seen on the bus
    ///
    /// `write` holds everything shifted out (opcode, address, dummy bytes,
    /// data); `read` is filled with what the chip shifts back. Bytes the chip
    /// does not drive read as 0xFF.
    pub fn transfer(&mut self, write: &[u8], read: &mut [u8]) -> Result<()> {
        read.fill(0xFF);
        let Some((&opcode, rest)) = write.split_first() else {
            return Ok(());
        };

        match opcode {
            opcodes::RDID => {
                let id = [
                    self.config.manufacturer_id,
                    (self.config.device_id >> 8) as u8,
                    self.config.device_id as u8,
                ];
                for (slot, byte) in read.iter_mut().zip(id) {
                    *slot = byte;
                }
                Ok(())
            }

            opcodes::RDSR => Self::fill_register(read, self.status_reg1),
            opcodes::RDSR2 => Self::fill_register(read, self.status_reg2),
            opcodes::RDSR3 => Self::fill_register(read, self.status_reg3),

            opcodes::WRSR => {
                if self.write_enabled() {
                    if let Some(&sr1) = rest.first() {
                        self.status_reg1 = sr1 & !(opcodes::SR1_WEL | opcodes::SR1_WIP);
                    }
                    if let Some(&sr2) = rest.get(1) {
                        self.status_reg2 = sr2;
                    }
                }
                self.set_write_enabled(false);
                Ok(())
            }

            opcodes::WREN => {
                self.set_write_enabled(true);
                Ok(())
            }
            opcodes::WRDI => {
                self.set_write_enabled(false);
                Ok(())
            }

            opcodes::READ => self.handle_read(rest, self.mode_width(), 0, read),
            opcodes::FAST_READ => self.handle_read(rest, self.mode_width(), 1, read),
            opcodes::READ_4B => self.handle_read(rest, AddressWidth::FourByte, 0, read),
            opcodes::FAST_READ_4B => self.handle_read(rest, AddressWidth::FourByte, 1, read),

            opcodes::PP => self.handle_page_program(rest, self.mode_width()),
            opcodes::PP_4B => self.handle_page_program(rest, AddressWidth::FourByte),

            opcodes::SE_20 => self.handle_erase(rest, self.mode_width(), 4 * 1024),
            opcodes::BE_52 => self.handle_erase(rest, self.mode_width(), 32 * 1024),
            opcodes::BE_D8 => self.handle_erase(rest, self.mode_width(), 64 * 1024),
            opcodes::SE_21 => self.handle_erase(rest, AddressWidth::FourByte, 4 * 1024),
            opcodes::BE_DC => self.handle_erase(rest, AddressWidth::FourByte, 64 * 1024),
            opcodes::CE_60 | opcodes::CE_C7 => self.handle_chip_erase(),

            opcodes::EN4B => {
                self.in_4byte_mode = true;
                Ok(())
            }
            opcodes::EX4B => {
                self.in_4byte_mode = false;
                Ok(())
            }

            opcodes::RSTEN => Ok(()),
            opcodes::RST => {
                self.in_4byte_mode = false;
                self.set_write_enabled(false);
                Ok(())
            }

            _ => Err(Error::OpcodeNotSupported),
        }
    }

    fn fill_register(read: &mut [u8], value: u8) -> Result<()> {
        // Status registers repeat for as long as the clock runs
        read.fill(value);
        Ok(())
    }

    fn decode_address(&self, args: &[u8], width: AddressWidth) -> Result<usize> {
        width
            .decode(args)
            .map(|addr| addr as usize)
            .ok_or(Error::BufferTooSmall)
    }

    fn handle_read(
        &mut self,
        args: &[u8],
        width: AddressWidth,
        dummy_bytes: usize,
        read: &mut [u8],
    ) -> Result<()> {
        if args.len() < width.bytes() + dummy_bytes {
            return Err(Error::BufferTooSmall);
        }
        let addr = self.decode_address(args, width)?;
        let len = read.len();

        if addr + len > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        read.copy_from_slice(&self.data[addr..addr + len]);
        Ok(())
    }

    fn handle_page_program(&mut self, args: &[u8], width: AddressWidth) -> Result<()> {
        if !self.write_enabled() {
            return Err(Error::WriteProtected);
        }

        let addr = self.decode_address(args, width)?;
        let data = &args[width.bytes()..];

        if addr + data.len() > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        // Programming wraps within the page and can only change 1 -> 0
        let page_size = self.config.page_size;
        let page_start = addr - addr % page_size;
        for (i, &byte) in data.iter().enumerate() {
            let offset = page_start + (addr - page_start + i) % page_size;
            self.data[offset] &= byte;
        }

        self.set_write_enabled(false);
        Ok(())
    }

    fn handle_erase(&mut self, args: &[u8], width: AddressWidth, erase_size: usize) -> Result<()> {
        if !self.write_enabled() {
            return Err(Error::WriteProtected);
        }

        let addr = self.decode_address(args, width)?;

        // Align address to erase boundary
        let aligned_addr = addr & !(erase_size - 1);

        if aligned_addr + erase_size > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }

        self.data[aligned_addr..aligned_addr + erase_size].fill(0xFF);

        self.set_write_enabled(false);
        Ok(())
    }

    fn handle_chip_erase(&mut self) -> Result<()> {
        if !self.write_enabled() {
            return Err(Error::WriteProtected);
        }

        self.data.fill(0xFF);

        self.set_write_enabled(false);
        Ok(())
    }
}

impl SpiMaster for DummyFlash {
    fn features(&self) -> SpiFeatures {
        SpiFeatures::FOUR_BYTE_ADDR
    }

    fn max_read_len(&self) -> usize {
        4096
    }

    fn max_write_len(&self) -> usize {
        self.config.page_size + 5
    }

    fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
        default_execute(cmd, self.features(), |write, read| self.transfer(write, read))
    }

    fn delay_us(&mut self, _us: u32) {
        // No delay needed for in-memory operations
    }
}
