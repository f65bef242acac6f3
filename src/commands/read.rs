//! Read command implementation

use fernvale_core::programmer::SpiMaster;
use fernvale_core::protocol;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run the read command
pub fn run_read(
    master: &mut dyn SpiMaster,
    start: u32,
    length: u32,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    if length == 0 {
        return Err("Nothing to read: --length is 0".into());
    }

    println!("Reading {} bytes from 0x{:06X}", length, start);

    let data = read_flash_with_progress(master, start, length as usize)?;

    // Write to file
    let mut file = File::create(output)?;
    file.write_all(&data)?;

    println!("Wrote {} bytes to {:?}", data.len(), output);

    Ok(())
}

/// Read `length` bytes starting at `start` with a progress bar
pub fn read_flash_with_progress(
    master: &mut dyn SpiMaster,
    start: u32,
    length: usize,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut data = vec![0u8; length];

    let pb = ProgressBar::new(length as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let result = protocol::read_data(master, start, &mut data, |done| {
        pb.set_position(done as u64)
    });

    match result {
        Ok(()) => {
            pb.finish_with_message("Read complete");
            Ok(data)
        }
        Err(e) => {
            pb.abandon();
            Err(Box::new(e))
        }
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use fernvale_dummy::{DummyConfig, DummyFlash};

    #[test]
    fn test_read_range() {
        let image: Vec<u8> = (0..8192u32).map(|i| (i % 251) as u8).collect();
        let mut flash = DummyFlash::with_data(
            DummyConfig {
                size: image.len(),
                ..Default::default()
            },
            &image,
        );

        let data = read_flash_with_progress(&mut flash, 0x100, 5000).unwrap();
        assert_eq!(data, &image[0x100..0x100 + 5000]);
    }

    #[test]
    fn test_read_past_24bit_space() {
        let mut flash = DummyFlash::new_default();
        assert!(read_flash_with_progress(&mut flash, 0xFF_FF00, 0x200).is_err());
    }
}
