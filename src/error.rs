//! Error type shared by every driver operation.

use derive_more::{Display, Error, From};
use embedded_hal::i2c::ErrorKind;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by the PCA9685 driver.
///
/// Out-of-range frequencies and duty values are never errors; they saturate to
/// the nearest valid value instead.
#[derive(Debug, Display, Error, From, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A bus transaction did not complete.
    #[display("I2C transaction failed: {_0:?}")]
    #[from]
    I2c(#[error(not(source))] ErrorKind),

    /// The bus handle is not open; call `init` or `init_barebones` first.
    #[display("I2C bus handle is not open")]
    BusClosed,

    /// The prescale register read back as 0 (or could not be read).
    #[display("prescale register read back as 0")]
    InvalidPrescaleRead,

    /// The chip has 16 channels, numbered 0 through 15.
    #[display("channel {_0} is out of range (0..=15)")]
    ChannelOutOfRange(#[error(not(source))] u8),
}

impl Error {
    /// Reduce any HAL-specific I2C error to its portable [`ErrorKind`].
    pub(crate) fn from_i2c<E: embedded_hal::i2c::Error>(error: &E) -> Self {
        Self::I2c(error.kind())
    }
}
