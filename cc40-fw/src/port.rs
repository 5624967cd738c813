// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! GPIO binding of the cartridge socket.
//!
//! The RP2040 doesn't have enough pins to drive the 16-bit address bus
//! directly alongside the data bus and nine control lines, so the address
//! lines sit behind two daisy-chained 74HC595 shift registers driven by
//! three pins.  The data bus uses `Flex` pins held in input mode; the
//! cartridge side always drives it during a read cycle.

use cc40_core::CartridgePort;
use embassy_rp::gpio::{Flex, Output};

pub struct RpCartridgePort<'d> {
    // 74HC595 pair: serial data, shift clock, storage (output) latch.
    shift_data: Output<'d>,
    shift_clock: Output<'d>,
    shift_latch: Output<'d>,
    data: [Flex<'d>; 8],
    cs_rom: Output<'d>,
    cs_ram: Output<'d>,
    oe: Output<'d>,
    we: Output<'d>,
    latch: Output<'d>,
    clock: Output<'d>,
    reset: Output<'d>,
    bank_a: Output<'d>,
    bank_b: Output<'d>,
}

fn drive(pin: &mut Output<'_>, high: bool) {
    if high {
        pin.set_high();
    } else {
        pin.set_low();
    }
}

impl<'d> RpCartridgePort<'d> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shift_data: Output<'d>,
        shift_clock: Output<'d>,
        shift_latch: Output<'d>,
        mut data: [Flex<'d>; 8],
        cs_rom: Output<'d>,
        cs_ram: Output<'d>,
        oe: Output<'d>,
        we: Output<'d>,
        latch: Output<'d>,
        clock: Output<'d>,
        reset: Output<'d>,
        bank_a: Output<'d>,
        bank_b: Output<'d>,
    ) -> Self {
        for pin in &mut data {
            pin.set_as_input();
        }
        RpCartridgePort {
            shift_data,
            shift_clock,
            shift_latch,
            data,
            cs_rom,
            cs_ram,
            oe,
            we,
            latch,
            clock,
            reset,
            bank_a,
            bank_b,
        }
    }
}

impl CartridgePort for RpCartridgePort<'_> {
    fn set_address(&mut self, addr: u16) {
        // MSB first: after 16 shifts A15 has travelled into the far
        // register and A0 sits nearest the serial input.
        for bit in (0..16).rev() {
            drive(&mut self.shift_data, (addr >> bit) & 1 != 0);
            self.shift_clock.set_high();
            self.shift_clock.set_low();
        }
        // Move the shifted word onto the output pins.
        self.shift_latch.set_high();
        self.shift_latch.set_low();
    }

    fn set_bank_a(&mut self, high: bool) {
        drive(&mut self.bank_a, high);
    }

    fn set_bank_b(&mut self, high: bool) {
        drive(&mut self.bank_b, high);
    }

    fn set_cs_rom(&mut self, high: bool) {
        drive(&mut self.cs_rom, high);
    }

    fn set_cs_ram(&mut self, high: bool) {
        drive(&mut self.cs_ram, high);
    }

    fn set_oe(&mut self, high: bool) {
        drive(&mut self.oe, high);
    }

    fn set_we(&mut self, high: bool) {
        drive(&mut self.we, high);
    }

    fn set_latch(&mut self, high: bool) {
        drive(&mut self.latch, high);
    }

    fn set_clock(&mut self, high: bool) {
        drive(&mut self.clock, high);
    }

    fn set_reset(&mut self, high: bool) {
        drive(&mut self.reset, high);
    }

    fn read_data(&mut self) -> u8 {
        let mut value = 0u8;
        for (bit, pin) in self.data.iter_mut().enumerate() {
            if pin.is_high() {
                value |= 1 << bit;
            }
        }
        value
    }
}
