//! Probe command implementation

use fernvale_core::programmer::SpiMaster;
use fernvale_core::protocol;
use fernvale_core::spi::opcodes;

/// Vendor names for the JEDEC manufacturer IDs seen most often on SPI NOR
fn manufacturer_name(id: u8) -> Option<&'static str> {
    match id {
        0x01 => Some("Spansion/Cypress"),
        0x1F => Some("Atmel/Adesto"),
        0x20 => Some("Micron/ST"),
        0x9D => Some("ISSI"),
        0xBF => Some("SST"),
        0xC2 => Some("Macronix"),
        0xC8 => Some("GigaDevice"),
        0xEF => Some("Winbond"),
        _ => None,
    }
}

/// Read and print the JEDEC ID and status register 1
pub fn run_probe(master: &mut dyn SpiMaster) -> Result<(), Box<dyn std::error::Error>> {
    let (mfr, dev) = protocol::read_jedec_id(master)?;

    if (mfr == 0x00 && dev == 0x0000) || (mfr == 0xFF && dev == 0xFFFF) {
        return Err(format!("No flash chip responded (JEDEC ID {:02X} {:04X})", mfr, dev).into());
    }

    let status = protocol::read_status1(master)?;

    println!("Found flash chip:");
    println!(
        "  Vendor:   {}",
        manufacturer_name(mfr).unwrap_or("unknown")
    );
    println!("  JEDEC ID: {:02X} {:04X}", mfr, dev);
    println!("  Status:   0x{:02X}", status);
    if status & opcodes::SR1_WIP != 0 {
        println!("  (write in progress)");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fernvale_core::error::Result;
    use fernvale_core::programmer::{default_execute, SpiFeatures};
    use fernvale_core::spi::SpiCommand;

    /// Master whose bus floats high, as with no chip attached
    struct FloatingBus;

    impl SpiMaster for FloatingBus {
        fn features(&self) -> SpiFeatures {
            SpiFeatures::empty()
        }

        fn max_read_len(&self) -> usize {
            64
        }

        fn max_write_len(&self) -> usize {
            64
        }

        fn execute(&mut self, cmd: &mut SpiCommand<'_>) -> Result<()> {
            default_execute(cmd, self.features(), |_, read| {
                read.fill(0xFF);
                Ok(())
            })
        }

        fn delay_us(&mut self, _us: u32) {}
    }

    #[test]
    fn test_manufacturer_name() {
        assert_eq!(manufacturer_name(0xEF), Some("Winbond"));
        assert_eq!(manufacturer_name(0x42), None);
    }

    #[test]
    fn test_probe_without_chip() {
        assert!(run_probe(&mut FloatingBus).is_err());
    }
}
