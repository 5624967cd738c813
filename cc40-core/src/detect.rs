// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! Capacity and bank-line detection.
//!
//! Cartridge devices carry no size register.  A device with true capacity N
//! ignores address bits beyond N, so address A and A + k*N alias to the same
//! cell.  [`Cartridge::detect_size`] exploits that mirroring with a
//! descending power-of-two probe.  [`Cartridge::probe_banks`] checks which
//! of the two bank-select lines actually switches visible content.
//!
//! Both results are computed exactly once at startup and cached in an
//! immutable [`CartridgeProfile`].

use embedded_hal::delay::DelayNs;
use static_assertions::const_assert_eq;

use crate::bus::{BankLines, Cartridge, CartridgePort, ChipSelect};

/// Sentinel size: the full 16-bit address space, no mirroring observed.
pub const FULL_ADDRESS_SPACE: u32 = 65536;

/// First (largest) mirroring probe, half the address space.
pub(crate) const FIRST_PROBE: u16 = 32768;

const_assert_eq!((FIRST_PROBE as u32) * 2, FULL_ADDRESS_SPACE);

/// Which bank-select lines change the content visible at address 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BankSensitivity {
    pub affects_a: bool,
    pub affects_b: bool,
}

/// Detection results for one chip.  Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipProfile {
    /// Detected capacity in bytes.  Always a power of two in [1, 65536].
    pub size: u32,
    pub banks: BankSensitivity,
}

/// Detection results for the whole cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CartridgeProfile {
    pub rom: ChipProfile,
    pub ram: ChipProfile,
}

impl CartridgeProfile {
    pub fn chip(&self, chip: ChipSelect) -> &ChipProfile {
        match chip {
            ChipSelect::Rom => &self.rom,
            ChipSelect::Ram => &self.ram,
        }
    }
}

impl<P: CartridgePort, D: DelayNs> Cartridge<P, D> {
    /// Mirroring test: true iff bytes `[0, block)` equal bytes
    /// `[block, 2*block)`, pair by pair, with both bank lines held low.
    ///
    /// Succeeds for any `block` that is an exact multiple of the device's
    /// true capacity; a smaller block generically fails because real
    /// content is not self-repeating at that granularity.
    pub fn compare_block(&mut self, chip: ChipSelect, block: u16) -> bool {
        for i in 0..block {
            let low = self.read_byte(chip, BankLines::empty(), i);
            let high = self.read_byte(chip, BankLines::empty(), i.wrapping_add(block));
            if low != high {
                return false;
            }
        }
        true
    }

    /// Infers the chip's capacity.
    ///
    /// Probes `{32768, 16384, .., 1}` in decreasing order, recording each
    /// probe for which [`Self::compare_block`] holds, and stops at the
    /// first failure.  Returns the smallest mirroring granularity found,
    /// or [`FULL_ADDRESS_SPACE`] if even the first probe fails.
    ///
    /// Known limitation, kept from the original firmware: a device whose
    /// content is uniform at every scale (an empty socket reads a constant
    /// from the floating bus) satisfies the comparison at `probe == 1`
    /// indefinitely, and this loop never gets past it.  On such hardware
    /// detection spins forever and the reader never reaches its command
    /// loop.
    pub fn detect_size(&mut self, chip: ChipSelect) -> u32 {
        let mut size = FULL_ADDRESS_SPACE;
        let mut probe = FIRST_PROBE;
        loop {
            if self.compare_block(chip, probe) {
                size = u32::from(probe);
                if probe > 1 {
                    probe /= 2;
                }
            } else {
                break;
            }
        }
        size
    }

    /// Checks each bank line against a fresh baseline read at address 0.
    ///
    /// The two lines are probed independently (baseline vs A-only, baseline
    /// vs B-only), never against each other.
    pub fn probe_banks(&mut self, chip: ChipSelect) -> BankSensitivity {
        let affects_a = self.read_byte(chip, BankLines::empty(), 0)
            != self.read_byte(chip, BankLines::A, 0);
        let affects_b = self.read_byte(chip, BankLines::empty(), 0)
            != self.read_byte(chip, BankLines::B, 0);
        BankSensitivity { affects_a, affects_b }
    }

    /// Startup detection phase: sizes first, then bank probes, for both
    /// chips.  Runs once; the profile is read-only afterwards.
    pub fn detect(&mut self) -> CartridgeProfile {
        let rom_size = self.detect_size(ChipSelect::Rom);
        let ram_size = self.detect_size(ChipSelect::Ram);
        CartridgeProfile {
            rom: ChipProfile {
                size: rom_size,
                banks: self.probe_banks(ChipSelect::Rom),
            },
            ram: ChipProfile {
                size: ram_size,
                banks: self.probe_banks(ChipSelect::Ram),
            },
        }
    }
}
