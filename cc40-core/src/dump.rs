// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! Dump engine.
//!
//! Iterates a chip's detected address range across every bank the detection
//! phase found reachable, emitting each byte straight to the sink.  No
//! buffering and no flow control here: the sink blocks as needed.

use embedded_hal::delay::DelayNs;

use crate::bus::{BankLines, Cartridge, CartridgePort, ChipSelect};
use crate::detect::{BankSensitivity, ChipProfile};
use crate::serial::{OutputFormat, SerialSink};

/// Bank indices visited for a given sensitivity result.  Line A is driven by
/// bit 0 of the index, line B by bit 1, so an unaffecting line stays low
/// throughout.
pub fn bank_indices(banks: BankSensitivity) -> &'static [u8] {
    match (banks.affects_a, banks.affects_b) {
        (false, false) => &[0],
        (true, false) => &[0, 1],
        (false, true) => &[0, 2],
        (true, true) => &[0, 1, 2, 3],
    }
}

/// Streams the chip's contents: bank-major, address-ascending.
///
/// Hex format emits `XX ` per byte (two uppercase digits and a trailing
/// space, no line breaks or grouping); binary format emits the raw byte
/// with no framing.
pub fn dump<P, D, S>(
    cart: &mut Cartridge<P, D>,
    chip: ChipSelect,
    profile: &ChipProfile,
    format: OutputFormat,
    sink: &mut S,
) where
    P: CartridgePort,
    D: DelayNs,
    S: SerialSink,
{
    for &bank in bank_indices(profile.banks) {
        let lines = BankLines::from_bank_index(bank);
        for addr in 0..profile.size {
            let data = cart.read_byte(chip, lines, addr as u16);
            match format {
                OutputFormat::Hex => {
                    sink.puthex(data);
                    sink.putc(b' ');
                }
                OutputFormat::Binary => sink.putc(data),
            }
        }
    }
}
