//! Scripted in-memory stream for unit tests

use std::collections::VecDeque;
use std::io::{self, ErrorKind, Read, Write};

/// A byte stream whose remote side is fully scripted up front
///
/// Reads drain `input` one call at a time and return `Ok(0)` once it is
/// empty. Writes land in `output`, at most `write_chunk` bytes per call.
/// Queued faults are returned before any data is moved.
#[derive(Debug, Default)]
pub struct MockStream {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
    pub write_chunk: Option<usize>,
    pub read_faults: VecDeque<ErrorKind>,
    pub write_faults: VecDeque<ErrorKind>,
    pub write_closed: bool,
    pub read_calls: usize,
    pub write_calls: usize,
}

impl MockStream {
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_calls += 1;
        if let Some(kind) = self.read_faults.pop_front() {
            return Err(kind.into());
        }
        let n = buf.len().min(self.input.len());
        for slot in &mut buf[..n] {
            *slot = self.input.pop_front().unwrap_or_default();
        }
        Ok(n)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_calls += 1;
        if let Some(kind) = self.write_faults.pop_front() {
            return Err(kind.into());
        }
        if self.write_closed {
            return Ok(0);
        }
        let n = self.write_chunk.map_or(buf.len(), |c| c.min(buf.len()));
        self.output.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
