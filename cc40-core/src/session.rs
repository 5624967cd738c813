// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! Serial session: startup banner and the command loop.
//!
//! The wire protocol is fixed text; every literal here is part of the
//! external contract and must not change.  Input is a plain byte iterator
//! so tests can feed a finite script while the firmware supplies an endless
//! stream of UART reads.

use embedded_hal::delay::DelayNs;

use crate::bus::{Cartridge, CartridgePort, ChipSelect};
use crate::detect::{BankSensitivity, CartridgeProfile, FULL_ADDRESS_SPACE};
use crate::dump::dump;
use crate::serial::{OutputFormat, SerialSink};

pub const DEVICE_NAME: &str = "CC40CartReader";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One keystroke of the serial protocol.  Case-sensitive; anything
/// unrecognised is a no-op and leaves all state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `h` - switch dump output to hex.
    HexFormat,
    /// `b` - switch dump output to binary (the default).
    BinaryFormat,
    /// `o` - dump the ROM chip.
    ReadRom,
    /// `a` - dump the RAM chip.
    ReadRam,
    NoOp,
}

impl Command {
    pub fn from_byte(byte: u8) -> Command {
        match byte {
            b'h' => Command::HexFormat,
            b'b' => Command::BinaryFormat,
            b'o' => Command::ReadRom,
            b'a' => Command::ReadRam,
            _ => Command::NoOp,
        }
    }
}

/// Renders a detected size after its `... Size is $` label.
///
/// Sizes are two hex bytes, high then low.  The full 65536-byte space needs
/// seventeen bits, so a literal `1` is emitted ahead of the low sixteen.
fn put_size(sink: &mut impl SerialSink, label: &str, size: u32) {
    sink.puts(label);
    if size == FULL_ADDRESS_SPACE {
        sink.putc(b'1');
    }
    sink.puthex((size >> 8) as u8);
    sink.puthex(size as u8);
    sink.putcrlf();
}

fn put_bank_report(sink: &mut impl SerialSink, line: &str, chip: ChipSelect, affects: bool) {
    sink.puts(line);
    if affects {
        sink.puts(" affects ");
    } else {
        sink.puts(" does not affect ");
    }
    match chip {
        ChipSelect::Rom => sink.puts("ROM"),
        ChipSelect::Ram => sink.puts("RAM"),
    }
    sink.puts(" contents");
    sink.putcrlf();
}

fn put_bank_reports(sink: &mut impl SerialSink, chip: ChipSelect, banks: BankSensitivity) {
    put_bank_report(sink, "P25.2", chip, banks.affects_a);
    put_bank_report(sink, "P25.3", chip, banks.affects_b);
}

/// Startup banner: name and version, both detected sizes, the four
/// bank-line findings, then the command menu.  Written once.
pub fn banner(sink: &mut impl SerialSink, profile: &CartridgeProfile) {
    sink.putcrlf();
    sink.puts(DEVICE_NAME);
    sink.puts(" Version: ");
    sink.puts(VERSION);
    sink.putcrlf();

    put_size(sink, "ROM Size is $", profile.rom.size);
    put_size(sink, "RAM Size is $", profile.ram.size);

    put_bank_reports(sink, ChipSelect::Rom, profile.rom.banks);
    put_bank_reports(sink, ChipSelect::Ram, profile.ram.banks);

    sink.puts("Read Cartridge:");
    sink.putcrlf();
    sink.puts("h: Output Data in HEX format");
    sink.putcrlf();
    sink.puts("b: Output Data in binary format (default)");
    sink.putcrlf();
    sink.puts("o: Read ROM");
    sink.putcrlf();
    sink.puts("a: Read RAM");
    sink.putcrlf();
}

/// The command loop.  Blocks on the input iterator; runs until it ends,
/// which the live UART source never does.  The output format is the only
/// state mutated here.
pub fn run<P, D, S, I>(
    cart: &mut Cartridge<P, D>,
    profile: &CartridgeProfile,
    sink: &mut S,
    input: I,
) where
    P: CartridgePort,
    D: DelayNs,
    S: SerialSink,
    I: IntoIterator<Item = u8>,
{
    let mut format = OutputFormat::default();
    for byte in input {
        match Command::from_byte(byte) {
            Command::HexFormat => {
                sink.puts("Switching to hex output");
                sink.putcrlf();
                format = OutputFormat::Hex;
            }
            Command::BinaryFormat => {
                sink.puts("Switching to binary output");
                sink.putcrlf();
                format = OutputFormat::Binary;
            }
            Command::ReadRom => dump(cart, ChipSelect::Rom, &profile.rom, format, sink),
            Command::ReadRam => dump(cart, ChipSelect::Ram, &profile.ram, format, sink),
            Command::NoOp => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::ChipProfile;
    use crate::sim::{NoDelay, SimCartridge, SimChip};

    #[derive(Default)]
    struct CaptureSink(Vec<u8>);

    impl SerialSink for CaptureSink {
        fn putc(&mut self, byte: u8) {
            self.0.push(byte);
        }
    }

    impl CaptureSink {
        fn text(&self) -> &str {
            core::str::from_utf8(&self.0).unwrap()
        }
    }

    fn profile(rom_size: u32, ram_size: u32) -> CartridgeProfile {
        CartridgeProfile {
            rom: ChipProfile { size: rom_size, banks: BankSensitivity::default() },
            ram: ChipProfile { size: ram_size, banks: BankSensitivity::default() },
        }
    }

    fn bytes_cart() -> Cartridge<SimCartridge, NoDelay> {
        let port = SimCartridge::new(
            SimChip::Bytes(&[0x10, 0x20, 0x30, 0x40]),
            SimChip::Constant(0),
        );
        Cartridge::new(port, NoDelay)
    }

    #[test]
    fn test_command_mapping() {
        assert_eq!(Command::from_byte(b'h'), Command::HexFormat);
        assert_eq!(Command::from_byte(b'b'), Command::BinaryFormat);
        assert_eq!(Command::from_byte(b'o'), Command::ReadRom);
        assert_eq!(Command::from_byte(b'a'), Command::ReadRam);
        // Case sensitive.
        assert_eq!(Command::from_byte(b'H'), Command::NoOp);
        assert_eq!(Command::from_byte(b'O'), Command::NoOp);
        assert_eq!(Command::from_byte(0x00), Command::NoOp);
        assert_eq!(Command::from_byte(0xFF), Command::NoOp);
    }

    #[test]
    fn test_banner_sizes() {
        let mut sink = CaptureSink::default();
        banner(&mut sink, &profile(8192, 2048));
        let text = sink.text();
        assert!(text.contains("CC40CartReader Version: "));
        assert!(text.contains("ROM Size is $2000\r\n"));
        assert!(text.contains("RAM Size is $0800\r\n"));
    }

    #[test]
    fn test_banner_full_size_emits_seventeenth_bit() {
        let mut sink = CaptureSink::default();
        banner(&mut sink, &profile(FULL_ADDRESS_SPACE, 1));
        let text = sink.text();
        assert!(text.contains("ROM Size is $10000\r\n"));
        assert!(text.contains("RAM Size is $0001\r\n"));
    }

    #[test]
    fn test_banner_bank_reports_and_menu() {
        let mut sink = CaptureSink::default();
        let mut p = profile(8192, 2048);
        p.rom.banks = BankSensitivity { affects_a: true, affects_b: false };
        banner(&mut sink, &p);
        let text = sink.text();
        assert!(text.contains("P25.2 affects ROM contents\r\n"));
        assert!(text.contains("P25.3 does not affect ROM contents\r\n"));
        assert!(text.contains("P25.2 does not affect RAM contents\r\n"));
        assert!(text.contains("P25.3 does not affect RAM contents\r\n"));
        assert!(text.contains("Read Cartridge:\r\n"));
        assert!(text.contains("h: Output Data in HEX format\r\n"));
        assert!(text.contains("b: Output Data in binary format (default)\r\n"));
        assert!(text.contains("o: Read ROM\r\n"));
        assert!(text.contains("a: Read RAM\r\n"));
    }

    #[test]
    fn test_unrecognised_bytes_are_ignored() {
        let mut cart = bytes_cart();
        let mut sink = CaptureSink::default();
        // Garbage before and after a dump; format stays binary throughout.
        let input = [b'x', b'?', 0xFF, b'o', b'Z'];
        run(&mut cart, &profile(4, 4), &mut sink, input);
        assert_eq!(sink.0, [0x10, 0x20, 0x30, 0x40]);
    }

    #[test]
    fn test_format_switch_then_dump() {
        let mut cart = bytes_cart();
        let mut sink = CaptureSink::default();
        run(&mut cart, &profile(4, 4), &mut sink, *b"ho");
        assert_eq!(
            sink.text(),
            "Switching to hex output\r\n10 20 30 40 "
        );
    }

    #[test]
    fn test_format_switch_back_to_binary() {
        let mut cart = bytes_cart();
        let mut sink = CaptureSink::default();
        run(&mut cart, &profile(4, 4), &mut sink, *b"hbo");
        assert_eq!(
            sink.0,
            b"Switching to hex output\r\nSwitching to binary output\r\n\x10\x20\x30\x40"
        );
    }

    #[test]
    fn test_finite_input_terminates_loop() {
        let mut cart = bytes_cart();
        let mut sink = CaptureSink::default();
        run(&mut cart, &profile(4, 4), &mut sink, core::iter::empty());
        assert!(sink.0.is_empty());
    }
}
