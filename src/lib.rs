//! Blocking driver for the PCA9685 16-channel, 12-bit PWM/servo controller.
//!
//! The driver works on any [`embedded_hal::i2c::I2c`] bus with any
//! [`embedded_hal::delay::DelayNs`] (for example `embassy_time::Delay`).
//! See [`Pca9685`] for usage.
//!
//! # Glossary
//!
//! - **Tick:** 1/4096th of a PWM cycle. Channel on/off points are tick counts.
//! - **Prescale:** 8-bit divisor that sets the cycle frequency relative to the
//!   oscillator: `freq = oscillator / (4096 * (prescale + 1))`.
//! - **Fully on / fully off:** the reserved tick pairs `(4096, 0)` and
//!   `(0, 4096)` that hold an output high or low.
//! - **Auto-increment:** chip mode in which a multi-byte write advances the
//!   register address, so one burst programs a whole channel.
//! - **External clock:** the EXTCLK pin replaces the internal oscillator.
//!
//! # Features
//!
//! - `defmt`: log through [`defmt`](https://docs.rs/defmt) and derive
//!   `defmt::Format` on public data types.
//! - `embedded`: everything the on-target demo needs (RP2040 + embassy).
#![no_std]

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

pub mod bus;
pub mod config;
mod error;
pub mod pca9685;
pub mod pwm;
pub mod registers;

// Re-export the main types (used throughout)
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::pca9685::Pca9685;
pub use crate::pwm::ChannelPwm;
pub use crate::registers::OutputDrive;
