// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! Serial output surface.
//!
//! The transport is an external collaborator.  The core only needs a
//! blocking, infallible byte sink: there is no error taxonomy on this path,
//! matching the wire protocol, so `putc` cannot fail.

/// Dump output encoding.  Selected by command, [`OutputFormat::Binary`] by
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputFormat {
    Hex,
    #[default]
    Binary,
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Blocking byte sink with the small formatting helpers the session needs.
pub trait SerialSink {
    /// Writes one byte.  Blocks until the transport accepts it.
    fn putc(&mut self, byte: u8);

    fn puts(&mut self, s: &str) {
        for &byte in s.as_bytes() {
            self.putc(byte);
        }
    }

    /// Writes a byte as two uppercase hex digits.
    fn puthex(&mut self, byte: u8) {
        self.putc(HEX_DIGITS[usize::from(byte >> 4)]);
        self.putc(HEX_DIGITS[usize::from(byte & 0x0F)]);
    }

    fn putcrlf(&mut self) {
        self.puts("\r\n");
    }
}
