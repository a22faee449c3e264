//! Firmware library for a six-digit Nixie clock driven through a chain of shift registers.
//!
//! One display task owns the register bus ([`nixie::DisplayScheduler`]); every other part of
//! the clock (the hourly chime, the motion sensor, the control surface) reaches it through a
//! [`nixie::Nixie`] handle.
#![no_std]

// Must come first so the logging macros are visible in every module below.
#[macro_use]
mod fmt;

mod error;

pub mod audio;
pub mod clock;
pub mod control;
pub mod effects;
pub mod frame;
#[cfg(feature = "pico1")]
pub mod hardware;
pub mod leds;
pub mod nixie;
pub mod settings;
pub mod shift_register;
pub mod time_format;
pub mod triggers;
pub mod unix_seconds;

// Re-export commonly used items
pub use error::{Error, Result};
pub use frame::Frame;
pub use nixie::{DisplayScheduler, Nixie, NixieStatic};
