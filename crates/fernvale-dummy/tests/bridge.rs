//! End-to-end tests: fernvale-spi host against the emulated bridge firmware

#![cfg(unix)]

use fernvale_core::programmer::SpiMaster;
use fernvale_core::protocol;
use fernvale_core::spi::{opcodes, SpiCommand};
use fernvale_dummy::{BridgeFirmware, DummyConfig, DummyFlash, ServeOutcome};
use fernvale_spi::protocol::{READY, TRIGGER};
use fernvale_spi::{Fernvale, FernvaleConfig, FernvaleError, SessionState};
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::thread::{self, JoinHandle};
use std::time::Duration;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 + 3) as u8).collect()
}

fn spawn_firmware(
    flash: DummyFlash,
) -> (UnixStream, JoinHandle<(BridgeFirmware, ServeOutcome)>) {
    let (host, mut remote) = UnixStream::pair().unwrap();
    let handle = thread::spawn(move || {
        let mut firmware = BridgeFirmware::new(flash).with_banner(b"\r\nfernvale> ");
        let outcome = firmware.serve(&mut remote).unwrap();
        (firmware, outcome)
    });
    (host, handle)
}

fn config() -> FernvaleConfig {
    FernvaleConfig::default().with_retry_delay(Duration::ZERO)
}

#[test]
fn test_probe_and_shutdown() {
    let (host, handle) = spawn_firmware(DummyFlash::new_default());

    let mut fv = Fernvale::new(host, &config()).unwrap();
    assert_eq!(fv.state(), SessionState::Ready);

    let (mfr, dev) = protocol::read_jedec_id(&mut fv).unwrap();
    assert_eq!((mfr, dev), (0xEF, 0x4018));

    fv.shutdown().unwrap();
    assert_eq!(fv.state(), SessionState::Closed);

    let (_, outcome) = handle.join().unwrap();
    assert_eq!(
        outcome,
        ServeOutcome {
            frames: 1,
            shutdown: true
        }
    );
}

#[test]
fn test_read_is_chunked() {
    let config_flash = DummyConfig {
        size: 64 * 1024,
        ..Default::default()
    };
    let contents = pattern(config_flash.size);
    let (host, handle) = spawn_firmware(DummyFlash::with_data(config_flash, &contents));

    let mut fv = Fernvale::new(host, &config()).unwrap();
    let mut buf = vec![0u8; 1000];
    let mut progress = Vec::new();
    protocol::read_data(&mut fv, 0x1234, &mut buf, |done| progress.push(done)).unwrap();

    assert_eq!(buf, &contents[0x1234..0x1234 + 1000]);
    // 1000 bytes in 128-byte transactions
    assert_eq!(progress.len(), 8);
    assert_eq!(progress.last(), Some(&1000));
    assert_eq!(fv.transactions(), 8);

    drop(fv);
    let (_, outcome) = handle.join().unwrap();
    assert!(outcome.shutdown, "drop must send the shutdown frame");
    assert_eq!(outcome.frames, 8);
}

#[test]
fn test_program_through_bridge() {
    let flash = DummyFlash::new(DummyConfig {
        size: 64 * 1024,
        ..Default::default()
    });
    let (host, handle) = spawn_firmware(flash);

    let mut fv = Fernvale::new(host, &config()).unwrap();
    let data = pattern(64);

    protocol::write_enable(&mut fv).unwrap();
    let mut cmd = SpiCommand::write_3b(opcodes::PP, 0x2000, &data);
    fv.execute(&mut cmd).unwrap();

    let readback = fv
        .execute_spi_command(&[opcodes::READ, 0x00, 0x20, 0x00], 64)
        .unwrap();
    assert_eq!(readback, data);

    fv.shutdown().unwrap();
    let (firmware, outcome) = handle.join().unwrap();
    assert_eq!(outcome.frames, 3);
    assert_eq!(&firmware.flash().data()[0x2000..0x2040], &data[..]);
}

#[test]
fn test_oversized_command_never_reaches_remote() {
    let (host, handle) = spawn_firmware(DummyFlash::new_default());
    let mut fv = Fernvale::new(host, &config()).unwrap();

    let err = fv.execute_spi_command(&[0u8; 256], 0).unwrap_err();
    assert!(matches!(err, FernvaleError::TransferTooLarge { .. }));
    assert_eq!(fv.state(), SessionState::Ready);

    let mut buf = [0u8; 129];
    let mut cmd = SpiCommand::read_3b(opcodes::READ, 0, &mut buf);
    assert!(fv.execute(&mut cmd).is_err());

    fv.shutdown().unwrap();
    let (_, outcome) = handle.join().unwrap();
    assert_eq!(outcome.frames, 0);
    assert!(outcome.shutdown);
}

#[test]
fn test_remote_disconnect_closes_session() {
    let (host, mut remote) = UnixStream::pair().unwrap();
    let handle = thread::spawn(move || {
        let mut trigger = vec![0u8; TRIGGER.len()];
        remote.read_exact(&mut trigger).unwrap();
        remote.write_all(&[READY]).unwrap();
        trigger
        // remote dropped here
    });

    let mut fv = Fernvale::new(host, &config()).unwrap();
    assert_eq!(handle.join().unwrap(), TRIGGER);

    let err = fv.execute_spi_command(&[opcodes::RDID], 3).unwrap_err();
    assert!(err.is_channel_failure());
    assert_eq!(fv.state(), SessionState::Closed);

    let err = fv.execute_spi_command(&[opcodes::RDID], 3).unwrap_err();
    assert!(matches!(
        err,
        FernvaleError::InvalidState {
            state: SessionState::Closed,
            ..
        }
    ));
}
