// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cc40-info")]
#[command(about = "CC40 cartridge reader session capture tool")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Outputs the information the reader reported during a captured
    /// session, including:
    /// - Reader name and firmware version
    /// - Detected ROM and RAM sizes
    /// - Which bank-select lines (P25.2/P25.3) affect each chip
    /// - Number of dumped bytes present in the capture
    #[command(verbatim_doc_comment)]
    Info {
        /// Capture of a reader serial session (text, hex-format dump)
        capture: PathBuf,
    },
    /// Decodes the hex-format dump in a captured session back into a
    /// binary image file.  The capture should contain a single dump
    /// ('o' or 'a'); back-to-back dumps come out concatenated.
    Extract {
        /// Capture of a reader serial session (text, hex-format dump)
        capture: PathBuf,
        /// Output image file
        #[arg(short, long)]
        output: PathBuf,
        /// Fail unless the decoded image is exactly this many bytes
        /// (accepts decimal, or hex with a 0x or $ prefix)
        #[arg(long, value_parser = parse_size)]
        expect_size: Option<u32>,
    },
}

fn parse_size(s: &str) -> Result<u32, String> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix('$')) {
        (hex, 16)
    } else {
        (s, 10)
    };
    u32::from_str_radix(digits, radix).map_err(|_| format!("Invalid size: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_decimal_and_hex() {
        assert_eq!(parse_size("8192"), Ok(8192));
        assert_eq!(parse_size("0x2000"), Ok(8192));
        assert_eq!(parse_size("$2000"), Ok(8192));
        assert!(parse_size("2000h").is_err());
    }
}
