// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! Parses a text capture of a reader session.
//!
//! A capture is whatever a terminal program logged while talking to the
//! reader: the startup banner, the menu, any `Switching to ...`
//! acknowledgements, and one or more hex-format dumps (`XX ` tokens).
//! Binary-format dumps are not parseable as text and are rejected token by
//! token.

use cc40_core::FULL_ADDRESS_SPACE;
use thiserror::Error;

pub const VERSION_PREFIX: &str = "CC40CartReader Version: ";
const ROM_SIZE_PREFIX: &str = "ROM Size is $";
const RAM_SIZE_PREFIX: &str = "RAM Size is $";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("capture contains no '{0}' banner line")]
    MissingBanner(&'static str),
    #[error("bad size field '${0}': expected hex, at most $10000")]
    BadSize(String),
    #[error("bad hex token '{0}' in dump data")]
    BadHexToken(String),
}

/// One `P25.x (does not) affect(s) XXX contents` banner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankFinding {
    pub line: String,
    pub chip: String,
    pub affects: bool,
}

/// Everything recovered from a session capture.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Capture {
    pub version: Option<String>,
    pub rom_size: Option<u32>,
    pub ram_size: Option<u32>,
    pub findings: Vec<BankFinding>,
    /// Decoded dump bytes, in capture order.
    pub data: Vec<u8>,
}

impl Capture {
    pub fn parse(text: &str) -> Result<Capture, CaptureError> {
        let mut capture = Capture::default();

        for raw in text.lines() {
            let line = raw.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            if let Some(version) = line.strip_prefix(VERSION_PREFIX) {
                capture.version = Some(version.to_string());
            } else if let Some(size) = line.strip_prefix(ROM_SIZE_PREFIX) {
                capture.rom_size = Some(parse_size_field(size)?);
            } else if let Some(size) = line.strip_prefix(RAM_SIZE_PREFIX) {
                capture.ram_size = Some(parse_size_field(size)?);
            } else if let Some(finding) = parse_bank_finding(line) {
                capture.findings.push(finding);
            } else if is_menu_line(line) {
                continue;
            } else {
                decode_hex_tokens(line, &mut capture.data)?;
            }
        }

        if capture.version.is_none() {
            return Err(CaptureError::MissingBanner(VERSION_PREFIX));
        }
        Ok(capture)
    }

    /// The finding for one line/chip pair, if the banner reported it.
    pub fn finding(&self, line: &str, chip: &str) -> Option<&BankFinding> {
        self.findings
            .iter()
            .find(|f| f.line == line && f.chip == chip)
    }
}

fn parse_size_field(field: &str) -> Result<u32, CaptureError> {
    let size = u32::from_str_radix(field, 16)
        .map_err(|_| CaptureError::BadSize(field.to_string()))?;
    if size == 0 || size > FULL_ADDRESS_SPACE {
        return Err(CaptureError::BadSize(field.to_string()));
    }
    Ok(size)
}

fn parse_bank_finding(line: &str) -> Option<BankFinding> {
    if !line.starts_with("P25.") || !line.ends_with(" contents") {
        return None;
    }
    let body = line.strip_suffix(" contents")?;
    if let Some((name, chip)) = body.split_once(" does not affect ") {
        return Some(BankFinding {
            line: name.to_string(),
            chip: chip.to_string(),
            affects: false,
        });
    }
    let (name, chip) = body.split_once(" affects ")?;
    Some(BankFinding {
        line: name.to_string(),
        chip: chip.to_string(),
        affects: true,
    })
}

fn is_menu_line(line: &str) -> bool {
    matches!(
        line,
        "Read Cartridge:"
            | "h: Output Data in HEX format"
            | "b: Output Data in binary format (default)"
            | "o: Read ROM"
            | "a: Read RAM"
            | "Switching to hex output"
            | "Switching to binary output"
    )
}

fn decode_hex_tokens(line: &str, data: &mut Vec<u8>) -> Result<(), CaptureError> {
    for token in line.split_ascii_whitespace() {
        if token.len() != 2 {
            return Err(CaptureError::BadHexToken(token.to_string()));
        }
        let byte = u8::from_str_radix(token, 16)
            .map_err(|_| CaptureError::BadHexToken(token.to_string()))?;
        data.push(byte);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SESSION: &str = "\r\n\
        CC40CartReader Version: 0.1.0\r\n\
        ROM Size is $2000\r\n\
        RAM Size is $0800\r\n\
        P25.2 affects ROM contents\r\n\
        P25.3 does not affect ROM contents\r\n\
        P25.2 does not affect RAM contents\r\n\
        P25.3 does not affect RAM contents\r\n\
        Read Cartridge:\r\n\
        h: Output Data in HEX format\r\n\
        b: Output Data in binary format (default)\r\n\
        o: Read ROM\r\n\
        a: Read RAM\r\n\
        Switching to hex output\r\n\
        10 20 30 40 ";

    #[test]
    fn test_parse_full_session() {
        let capture = Capture::parse(SESSION).unwrap();
        assert_eq!(capture.version.as_deref(), Some("0.1.0"));
        assert_eq!(capture.rom_size, Some(8192));
        assert_eq!(capture.ram_size, Some(2048));
        assert_eq!(capture.findings.len(), 4);
        assert_eq!(capture.data, [0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn test_bank_findings() {
        let capture = Capture::parse(SESSION).unwrap();
        assert!(capture.finding("P25.2", "ROM").unwrap().affects);
        assert!(!capture.finding("P25.3", "ROM").unwrap().affects);
        assert!(!capture.finding("P25.2", "RAM").unwrap().affects);
        assert!(capture.finding("P25.2", "VDP").is_none());
    }

    #[test]
    fn test_full_address_space_size_field() {
        let text = "CC40CartReader Version: 0.1.0\r\nROM Size is $10000\r\n";
        let capture = Capture::parse(text).unwrap();
        assert_eq!(capture.rom_size, Some(65536));
    }

    #[test]
    fn test_bad_size_field() {
        let text = "CC40CartReader Version: 0.1.0\r\nROM Size is $20000\r\n";
        assert_eq!(
            Capture::parse(text),
            Err(CaptureError::BadSize("20000".to_string()))
        );
    }

    #[test]
    fn test_bad_hex_token() {
        let text = "CC40CartReader Version: 0.1.0\r\n10 2G 30 ";
        assert_eq!(
            Capture::parse(text),
            Err(CaptureError::BadHexToken("2G".to_string()))
        );
    }

    #[test]
    fn test_missing_banner() {
        assert_eq!(
            Capture::parse("10 20 30 "),
            Err(CaptureError::MissingBanner(VERSION_PREFIX))
        );
    }

    #[test]
    fn test_newline_only_captures_accepted() {
        let text = "CC40CartReader Version: 0.1.0\nROM Size is $1000\n10 20 ";
        let capture = Capture::parse(text).unwrap();
        assert_eq!(capture.rom_size, Some(4096));
        assert_eq!(capture.data, [0x10, 0x20]);
    }
}
