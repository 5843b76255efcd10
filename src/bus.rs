//! The controller's exclusively owned I2C handle.

use embedded_hal::i2c::I2c;

use crate::{Error, Result};

/// An I2C bus bound to one device address, with an explicit open/closed state.
///
/// The controller opens it in `init`, closes and reopens it on re-init, and
/// every transfer on a closed handle fails with [`Error::BusClosed`].
pub struct BusDevice<I2C> {
    i2c: I2C,
    address: u8,
    open: bool,
}

impl<I2C: I2c> BusDevice<I2C> {
    /// Bind `i2c` to `address`. The handle starts closed.
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            open: false,
        }
    }

    /// Open the handle. With `probe`, first check that something acknowledges
    /// the address by sending an empty write.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if the probe is not acknowledged; the handle stays closed.
    pub fn open(&mut self, probe: bool) -> Result<()> {
        if probe {
            self.i2c
                .write(self.address, &[])
                .map_err(|err| Error::from_i2c(&err))?;
        }
        self.open = true;
        Ok(())
    }

    /// Close the handle. Idempotent.
    pub const fn close(&mut self) {
        self.open = false;
    }

    /// Whether transfers are currently allowed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// The 7-bit device address.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Write `bytes` (register address first) in one transaction.
    ///
    /// # Errors
    ///
    /// [`Error::BusClosed`] or [`Error::I2c`].
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.i2c
            .write(self.address, bytes)
            .map_err(|err| Error::from_i2c(&err))
    }

    /// Write `bytes`, then read `buffer.len()` bytes with a repeated start.
    ///
    /// # Errors
    ///
    /// [`Error::BusClosed`] or [`Error::I2c`].
    pub fn write_read(&mut self, bytes: &[u8], buffer: &mut [u8]) -> Result<()> {
        self.ensure_open()?;
        self.i2c
            .write_read(self.address, bytes, buffer)
            .map_err(|err| Error::from_i2c(&err))
    }

    /// Give the bus back, closing the handle.
    pub fn release(self) -> I2C {
        self.i2c
    }

    const fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::BusClosed)
        }
    }
}
