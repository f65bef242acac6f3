//! Raw transaction command

use fernvale_core::programmer::SpiMaster;
use fernvale_core::spi::SpiCommand;

/// Parse a byte string such as "9f", "03 00 10 00", "0x03,0x00" or "030010"
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();

    for token in s.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);

        if digits.is_empty() || !digits.is_ascii() || digits.len() % 2 != 0 {
            return Err(format!("Invalid hex bytes: '{}'", token));
        }
        for i in (0..digits.len()).step_by(2) {
            let byte = u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("Invalid hex bytes '{}': {}", token, e))?;
            bytes.push(byte);
        }
    }

    Ok(bytes)
}

fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Send `write` (opcode first) and print `read_count` response bytes
pub fn run_raw(
    master: &mut dyn SpiMaster,
    write: &[u8],
    read_count: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some((&opcode, rest)) = write.split_first() else {
        return Err("Raw transaction needs at least an opcode byte".into());
    };

    let mut response = vec![0u8; read_count];
    let mut cmd = SpiCommand {
        write_data: rest,
        read_buf: &mut response,
        ..SpiCommand::simple(opcode)
    };
    master.execute(&mut cmd)?;

    log::debug!("raw: > {}", format_hex(write));
    if response.is_empty() {
        println!("OK");
    } else {
        println!("{}", format_hex(&response));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("9f"), Ok(vec![0x9F]));
        assert_eq!(parse_hex_bytes("03 00 10 00"), Ok(vec![0x03, 0x00, 0x10, 0x00]));
        assert_eq!(parse_hex_bytes("0x03,0x00"), Ok(vec![0x03, 0x00]));
        assert_eq!(parse_hex_bytes("030010"), Ok(vec![0x03, 0x00, 0x10]));
        assert_eq!(parse_hex_bytes(""), Ok(vec![]));
    }

    #[test]
    fn test_parse_hex_bytes_invalid() {
        assert!(parse_hex_bytes("9").is_err());
        assert!(parse_hex_bytes("zz").is_err());
        assert!(parse_hex_bytes("0x").is_err());
    }

    #[test]
    fn test_format_hex() {
        assert_eq!(format_hex(&[0xEF, 0x40, 0x18]), "EF 40 18");
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_raw_needs_opcode() {
        let mut flash = fernvale_dummy::DummyFlash::new_default();
        assert!(run_raw(&mut flash, &[], 3).is_err());
        assert!(run_raw(&mut flash, &[0x9F], 3).is_ok());
    }
}
