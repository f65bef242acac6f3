//! Transaction frame codec
//!
//! One SPI transaction is sent as `write_len`, `read_len`, then the payload;
//! the remote answers with exactly `read_len` bytes. The three fields go out
//! as separate writes, matching a remote parser that consumes one length
//! byte at a time.

use crate::channel::Channel;
use crate::error::Result;
use crate::protocol::{FrameHeader, SHUTDOWN_FRAME};

use std::io::{Read, Write};

/// Run one transaction: send `write`, fill `read_buf` with the response
///
/// Lengths are validated before anything is written, so an oversized
/// transaction never puts a partial frame on the wire.
pub fn transact<S: Read + Write>(
    channel: &mut Channel<S>,
    write: &[u8],
    read_buf: &mut [u8],
) -> Result<()> {
    let header = FrameHeader::for_transfer(write.len(), read_buf.len())?;

    channel.write_exact(&[header.write_len])?;
    channel.write_exact(&[header.read_len])?;
    channel.write_exact(write)?;
    channel.flush()?;
    log::trace!("fernvale: Wrote {} bytes: {:02x?}", write.len(), write);

    channel.read_exact(read_buf)?;
    log::trace!("fernvale: Read {} bytes: {:02x?}", read_buf.len(), read_buf);

    Ok(())
}

/// Send the shutdown frame; the remote sends nothing back
pub fn send_shutdown<S: Read + Write>(channel: &mut Channel<S>) -> Result<()> {
    channel.write_exact(&SHUTDOWN_FRAME)?;
    channel.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FernvaleError;
    use crate::testing::MockStream;
    use std::time::Duration;

    fn channel(stream: MockStream) -> Channel<MockStream> {
        Channel::new(stream).with_retry_delay(Duration::ZERO)
    }

    #[test]
    fn test_jedec_id_frame() {
        let mut ch = channel(MockStream::with_input(&[0xEF, 0x40, 0x18]));
        let mut id = [0u8; 3];

        transact(&mut ch, &[0x9F], &mut id).unwrap();
        assert_eq!(id, [0xEF, 0x40, 0x18]);
        assert_eq!(ch.get_ref().output, [0x01, 0x03, 0x9F]);
    }

    #[test]
    fn test_length_prefixes_for_all_sizes() {
        for (write_len, read_len) in [(0, 255), (255, 0), (128, 128), (7, 1)] {
            let response: Vec<u8> = (0..read_len).map(|i| i as u8).collect();
            let payload = vec![0xA5; write_len];
            let mut ch = channel(MockStream::with_input(&response));
            let mut buf = vec![0u8; read_len];

            transact(&mut ch, &payload, &mut buf).unwrap();
            let out = &ch.get_ref().output;
            assert_eq!(out[0] as usize, write_len);
            assert_eq!(out[1] as usize, read_len);
            assert_eq!(&out[2..], payload.as_slice());
            assert_eq!(buf, response);
        }
    }

    #[test]
    fn test_oversize_writes_nothing() {
        let mut ch = channel(MockStream::default());
        let payload = [0u8; 256];

        let err = transact(&mut ch, &payload, &mut []).unwrap_err();
        assert!(matches!(err, FernvaleError::TransferTooLarge { .. }));
        assert_eq!(ch.get_ref().write_calls, 0);

        let mut big = [0u8; 256];
        assert!(transact(&mut ch, &[0x03], &mut big).is_err());
        assert_eq!(ch.get_ref().write_calls, 0);
    }

    #[test]
    fn test_partial_writes_deliver_whole_frame() {
        let mut stream = MockStream::with_input(&[0x00]);
        stream.write_chunk = Some(1);
        let mut ch = channel(stream);
        let mut status = [0u8; 1];

        transact(&mut ch, &[0x02, 0x00, 0x10, 0x00, 0xDE, 0xAD], &mut status).unwrap();
        assert_eq!(
            ch.get_ref().output,
            [0x06, 0x01, 0x02, 0x00, 0x10, 0x00, 0xDE, 0xAD]
        );
    }

    #[test]
    fn test_short_response_is_error() {
        let mut ch = channel(MockStream::with_input(&[0xEF]));
        let mut id = [0u8; 3];

        assert!(matches!(
            transact(&mut ch, &[0x9F], &mut id),
            Err(FernvaleError::ChannelClosed)
        ));
    }

    #[test]
    fn test_shutdown_frame() {
        let mut ch = channel(MockStream::default());
        send_shutdown(&mut ch).unwrap();
        assert_eq!(ch.get_ref().output, [0x00, 0x00]);
    }
}
