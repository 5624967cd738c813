// Copyright (C) 2025 RETRO Innovations
//
// GPL-2.0 License

//! cc40-core
//!
//! Core logic for the CC40 cartridge reader: drives the parallel cartridge
//! socket of a Texas Instruments CC-40, infers the capacity and bank-select
//! behaviour of the attached ROM/RAM devices, and streams their contents
//! over a serial link.
//!
//! This is a `no_std` compatible library.  The hardware is abstracted behind
//! [`bus::CartridgePort`] (one line-level operation per socket signal), so
//! the same detection and dump code runs against real GPIO in the firmware
//! and against [`sim::SimCartridge`] in tests.
//!
//! Typical firmware usage:
//!
//! ```rust ignore
//! use cc40_core::{Cartridge, session};
//!
//! let mut cart = Cartridge::new(port, delay);
//! cart.reset();
//! let profile = cart.detect();
//! session::banner(&mut sink, &profile);
//! session::run(&mut cart, &profile, &mut sink, input);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bus;
pub mod detect;
pub mod dump;
pub mod serial;
pub mod session;
pub mod sim;

pub use bus::{BankLines, Cartridge, CartridgePort, ChipSelect};
pub use detect::{BankSensitivity, CartridgeProfile, ChipProfile, FULL_ADDRESS_SPACE};
pub use dump::dump;
pub use serial::{OutputFormat, SerialSink};
pub use session::Command;
