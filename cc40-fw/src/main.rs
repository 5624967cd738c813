// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! CC40 cartridge reader firmware.
//!
//! Brings up the socket, runs the detection phase once, writes the banner
//! over UART0 and then serves single-character commands forever.  All bus
//! work is synchronous and single-threaded; the UART is the only
//! suspension point.
//!
//! Pin assignment:
//! - GPIO0/1: UART0 TX/RX (57600 8N1, the session transport)
//! - GPIO2/3/4: 74HC595 serial data / shift clock / storage latch (A0-A15)
//! - GPIO6-13: cartridge data bus D0-D7
//! - GPIO14/15: /CS ROM, /CS RAM
//! - GPIO16/17: /OE, /WE
//! - GPIO18/19: data latch gate, bus clock
//! - GPIO20: /RESET
//! - GPIO21/22: bank-select P25.2, P25.3

#![no_std]
#![no_main]

use defmt::info;
use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_rp::gpio::{Flex, Level, Output};
use embassy_rp::uart::{self, Uart};
use embassy_time::Delay;

use cc40_core::{Cartridge, SerialSink, session};

mod port;
use port::RpCartridgePort;

const BAUD_RATE: u32 = 57600;

struct UartSink<'d> {
    tx: uart::UartTx<'d, uart::Blocking>,
}

impl SerialSink for UartSink<'_> {
    fn putc(&mut self, byte: u8) {
        // The session contract has no error path; a wedged transport just
        // stalls the reader.
        let _ = self.tx.blocking_write(&[byte]);
    }
}

/// Endless command source: blocks on the UART until a byte arrives.
struct UartInput<'d> {
    rx: uart::UartRx<'d, uart::Blocking>,
}

impl Iterator for UartInput<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        loop {
            if self.rx.blocking_read(&mut byte).is_ok() {
                return Some(byte[0]);
            }
            // Framing/parity/overrun noise: drop it and keep listening.
        }
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    let mut config = uart::Config::default();
    config.baudrate = BAUD_RATE;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, config);
    let (tx, rx) = uart.split();
    let mut sink = UartSink { tx };
    let input = UartInput { rx };

    let socket = RpCartridgePort::new(
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, Level::Low),
        [
            Flex::new(p.PIN_6),
            Flex::new(p.PIN_7),
            Flex::new(p.PIN_8),
            Flex::new(p.PIN_9),
            Flex::new(p.PIN_10),
            Flex::new(p.PIN_11),
            Flex::new(p.PIN_12),
            Flex::new(p.PIN_13),
        ],
        Output::new(p.PIN_14, Level::High), // /CS ROM
        Output::new(p.PIN_15, Level::High), // /CS RAM
        Output::new(p.PIN_16, Level::High), // /OE
        Output::new(p.PIN_17, Level::High), // /WE
        Output::new(p.PIN_18, Level::High), // data latch gate
        Output::new(p.PIN_19, Level::Low),  // bus clock
        Output::new(p.PIN_20, Level::Low),  // /RESET, held until bring-up
        Output::new(p.PIN_21, Level::Low),  // P25.2
        Output::new(p.PIN_22, Level::Low),  // P25.3
    );

    let mut cart = Cartridge::new(socket, Delay);

    info!("{=str} v{=str}: socket bring-up", session::DEVICE_NAME, session::VERSION);
    cart.reset();

    // Detection hangs here on an empty socket, exactly like the command
    // loop would on a dead UART.
    info!("detecting cartridge");
    let profile = cart.detect();
    info!(
        "ROM {=u32} bytes, RAM {=u32} bytes, ROM banks a={=bool} b={=bool}, RAM banks a={=bool} b={=bool}",
        profile.rom.size,
        profile.ram.size,
        profile.rom.banks.affects_a,
        profile.rom.banks.affects_b,
        profile.ram.banks.affects_a,
        profile.ram.banks.affects_b,
    );

    session::banner(&mut sink, &profile);
    session::run(&mut cart, &profile, &mut sink, input);
}
