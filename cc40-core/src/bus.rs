// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! Cartridge bus access.
//!
//! [`CartridgePort`] is the line-level capability interface: one method per
//! socket signal.  Implementations just move a level onto a wire; all
//! polarity and sequencing decisions live in [`Cartridge`], which owns the
//! port together with a delay source and performs the timed read cycle.

use bitflags::bitflags;
use embedded_hal::delay::DelayNs;

/// Settle time between raising the clock and sampling the data bus.  Signals
/// have to propagate through the bus latches and level shifters.
pub const READ_SETTLE_US: u32 = 6;

/// How long the reset line is held active during bring-up.
pub const RESET_HOLD_US: u32 = 100;

/// Which device's enable line is asserted for a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipSelect {
    Rom,
    Ram,
}

impl core::fmt::Display for ChipSelect {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ChipSelect::Rom => write!(f, "ROM"),
            ChipSelect::Ram => write!(f, "RAM"),
        }
    }
}

bitflags! {
    /// The two bank-select control lines.  On the cartridge port these are
    /// P25.2 (line A) and P25.3 (line B).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BankLines: u8 {
        const A = 1 << 0;
        const B = 1 << 1;
    }
}

impl BankLines {
    /// Maps a bank index to its line levels: line A is driven by bit 0 of
    /// the index, line B by bit 1.
    pub fn from_bank_index(index: u8) -> Self {
        BankLines::from_bits_truncate(index)
    }
}

/// Line-level access to the cartridge socket.
///
/// Every setter takes the logical level to drive onto the wire (`true` =
/// high).  Active-low polarity is the caller's business: implementations
/// must not invert anything.
///
/// The socket lines are process-wide exclusive state.  All methods take
/// `&mut self`, so exclusive access (and with it the non-interleaving the
/// read cycle depends on) is enforced by ownership rather than by a lock.
pub trait CartridgePort {
    /// Drives the 16-bit address bus.
    fn set_address(&mut self, addr: u16);
    /// Drives bank-select line A (P25.2).
    fn set_bank_a(&mut self, high: bool);
    /// Drives bank-select line B (P25.3).
    fn set_bank_b(&mut self, high: bool);
    /// Drives the ROM chip-enable line (active low).
    fn set_cs_rom(&mut self, high: bool);
    /// Drives the RAM chip-enable line (active low).
    fn set_cs_ram(&mut self, high: bool);
    /// Drives output-enable (active low).
    fn set_oe(&mut self, high: bool);
    /// Drives write-enable (active low, never asserted by this crate).
    fn set_we(&mut self, high: bool);
    /// Drives the data latch gate (active low: low lets data flow through).
    fn set_latch(&mut self, high: bool);
    /// Drives the bus clock line.
    fn set_clock(&mut self, high: bool);
    /// Drives the cartridge reset line (active low).
    fn set_reset(&mut self, high: bool);
    /// Samples the 8-bit data bus.
    fn read_data(&mut self) -> u8;
}

/// A cartridge socket: a [`CartridgePort`] plus a delay source.
///
/// The delay is injected (any [`DelayNs`]) so that tests run with zero delay
/// while the firmware keeps exact timing.
pub struct Cartridge<P, D> {
    port: P,
    delay: D,
}

impl<P: CartridgePort, D: DelayNs> Cartridge<P, D> {
    pub fn new(port: P, delay: D) -> Self {
        Cartridge { port, delay }
    }

    /// Board bring-up.  Holds the cartridge in reset, parks every control
    /// line at its inactive level, waits for the rails to settle, then
    /// releases reset.  Must run once before any read.
    pub fn reset(&mut self) {
        self.port.set_reset(false);

        self.port.set_address(0);
        self.port.set_cs_rom(true);
        self.port.set_cs_ram(true);
        self.port.set_oe(true);
        self.port.set_we(true);
        self.port.set_latch(true);
        self.port.set_clock(false);
        self.port.set_bank_a(false);
        self.port.set_bank_b(false);

        self.delay.delay_us(RESET_HOLD_US);
        self.port.set_reset(true);
    }

    /// Reads one byte from the selected chip.
    ///
    /// The line ordering is load-bearing: address and bank lines first, then
    /// chip-enable, output-enable and latch low, clock high, a settle delay,
    /// sample, and tear-down in the reverse sense.  The chip's timing
    /// depends on this exact order.
    ///
    /// Total over its whole input domain: an absent or miswired chip yields
    /// stable-but-meaningless data, never a fault.
    pub fn read_byte(&mut self, chip: ChipSelect, banks: BankLines, addr: u16) -> u8 {
        self.port.set_address(addr);
        self.port.set_bank_a(banks.contains(BankLines::A));
        self.port.set_bank_b(banks.contains(BankLines::B));
        match chip {
            ChipSelect::Rom => self.port.set_cs_rom(false),
            ChipSelect::Ram => self.port.set_cs_ram(false),
        }
        self.port.set_oe(false);
        self.port.set_latch(false);
        self.port.set_clock(true);
        self.delay.delay_us(READ_SETTLE_US);
        let data = self.port.read_data();
        self.port.set_bank_a(false);
        self.port.set_bank_b(false);
        match chip {
            ChipSelect::Rom => self.port.set_cs_rom(true),
            ChipSelect::Ram => self.port.set_cs_ram(true),
        }
        self.port.set_oe(true);
        self.port.set_latch(true);
        self.port.set_clock(false);
        data
    }

    /// Raw access to the underlying port, for callers that need line-level
    /// control outside a read cycle.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}
