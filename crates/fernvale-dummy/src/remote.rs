//! Emulated bridge firmware
//!
//! [`BridgeFirmware`] is the remote end of the fernvale link: a console that
//! ignores everything until it sees the trigger line, then tunnels frames to
//! a [`DummyFlash`] until it receives the shutdown frame.

use crate::DummyFlash;
use fernvale_spi::protocol::{FrameHeader, READY, TRIGGER};
use std::io::{self, ErrorKind, Read, Write};

/// Result of one bridge session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServeOutcome {
    /// Number of transaction frames answered
    pub frames: u64,
    /// True if the host ended the session with the shutdown frame
    ///
    /// False means the stream reached end-of-file between frames.
    pub shutdown: bool,
}

/// Remote side of a fernvale bridge, backed by an in-memory flash
pub struct BridgeFirmware {
    flash: DummyFlash,
    banner: Vec<u8>,
}

impl BridgeFirmware {
    /// Create firmware serving `flash`
    pub fn new(flash: DummyFlash) -> Self {
        Self {
            flash,
            banner: Vec::new(),
        }
    }

    /// Console output sent between the trigger and the ready byte
    pub fn with_banner(mut self, banner: &[u8]) -> Self {
        self.banner = banner.to_vec();
        self
    }

    /// Get a reference to the emulated flash
    pub fn flash(&self) -> &DummyFlash {
        &self.flash
    }

    /// Consume the firmware and return the emulated flash
    pub fn into_flash(self) -> DummyFlash {
        self.flash
    }

    /// Serve one bridge session on `stream`
    ///
    /// Returns once the shutdown frame arrives or the host closes the stream
    /// between frames. End-of-file before the trigger or inside a frame is
    /// reported as `UnexpectedEof`.
    pub fn serve<S: Read + Write>(&mut self, stream: &mut S) -> io::Result<ServeOutcome> {
        wait_for_trigger(stream)?;
        log::debug!("bridge: Trigger received");

        stream.write_all(&self.banner)?;
        stream.write_all(&[READY])?;
        stream.flush()?;

        let mut outcome = ServeOutcome::default();
        loop {
            let mut header = [0u8; 2];
            match stream.read_exact(&mut header) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    log::debug!("bridge: Host closed the stream");
                    return Ok(outcome);
                }
                Err(e) => return Err(e),
            }

            let header = FrameHeader::from_bytes(header);
            if header.is_shutdown() {
                log::debug!("bridge: Shutdown after {} frames", outcome.frames);
                outcome.shutdown = true;
                return Ok(outcome);
            }

            let mut write = vec![0u8; header.write_len as usize];
            stream.read_exact(&mut write)?;

            let mut response = vec![0u8; header.read_len as usize];
            if let Err(e) = self.flash.transfer(&write, &mut response) {
                // The host still expects read_len bytes
                log::warn!("bridge: Flash rejected transaction: {}", e);
                response.fill(0xFF);
            }

            stream.write_all(&response)?;
            stream.flush()?;
            outcome.frames += 1;
        }
    }
}

/// Consume console input up to and including the trigger line
fn wait_for_trigger<S: Read>(stream: &mut S) -> io::Result<()> {
    let mut tail: Vec<u8> = Vec::with_capacity(TRIGGER.len());
    let mut byte = [0u8; 1];

    loop {
        stream.read_exact(&mut byte)?;
        if tail.len() == TRIGGER.len() {
            tail.remove(0);
        }
        tail.push(byte[0]);
        if tail == TRIGGER {
            return Ok(());
        }
    }
}
