//! PCA9685 register map and mode-register bitmasks.
//!
//! Addresses are fixed by the chip. The mode registers are always updated
//! read-modify-write, so [`Mode1`] and [`Mode2`] keep any bit they do not name.

use bitflags::bitflags;

/// Mode register 1: sleep, restart, auto-increment, external clock.
pub const MODE1: u8 = 0x00;
/// Mode register 2: output drive and inversion.
pub const MODE2: u8 = 0x01;
/// I2C sub-address 1.
pub const SUBADR1: u8 = 0x02;
/// I2C sub-address 2.
pub const SUBADR2: u8 = 0x03;
/// I2C sub-address 3.
pub const SUBADR3: u8 = 0x04;
/// LED all-call I2C address.
pub const ALLCALLADR: u8 = 0x05;
/// First byte of channel 0's tick registers. Each channel occupies 4 bytes.
pub const LED0_ON_L: u8 = 0x06;
/// First byte of the broadcast "all channels" tick registers.
pub const ALLLED_ON_L: u8 = 0xFA;
/// Clock prescaler.
pub const PRESCALE: u8 = 0xFE;
/// Reserved test mode register. Never write it.
pub const TESTMODE: u8 = 0xFF;

/// Bytes per channel in the tick register block.
pub(crate) const CHANNEL_STRIDE: u8 = 4;

bitflags! {
    /// Bits of [`MODE1`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode1: u8 {
        /// Restart enabled.
        const RESTART = 0x80;
        /// Use the EXTCLK pin clock. Only honored while asleep.
        const EXTCLK = 0x40;
        /// Register auto-increment, needed for multi-byte channel writes.
        const AUTO_INCREMENT = 0x20;
        /// Low power mode; oscillator off.
        const SLEEP = 0x10;
        /// Respond to I2C sub-address 1.
        const SUB1 = 0x08;
        /// Respond to I2C sub-address 2.
        const SUB2 = 0x04;
        /// Respond to I2C sub-address 3.
        const SUB3 = 0x02;
        /// Respond to the LED all-call address.
        const ALLCALL = 0x01;
    }
}

bitflags! {
    /// Bits of [`MODE2`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Mode2: u8 {
        /// Invert output logic state.
        const INVRT = 0x10;
        /// Outputs change on ACK instead of STOP.
        const OCH = 0x08;
        /// Totem pole outputs (cleared: open drain).
        const OUTDRV = 0x04;
        /// Output-not-enabled mode, high bit.
        const OUTNE1 = 0x02;
        /// Output-not-enabled mode, low bit.
        const OUTNE0 = 0x01;
    }
}

impl Mode1 {
    /// Interpret a raw register value, keeping every bit.
    #[must_use]
    pub const fn from_register(value: u8) -> Self {
        Self::from_bits_retain(value)
    }

    /// Whether the oscillator is off.
    #[must_use]
    pub const fn is_sleeping(self) -> bool {
        self.contains(Self::SLEEP)
    }

    /// Whether multi-byte writes advance the register address.
    #[must_use]
    pub const fn is_auto_increment(self) -> bool {
        self.contains(Self::AUTO_INCREMENT)
    }

    /// Whether the external clock input is selected.
    #[must_use]
    pub const fn is_external_clock(self) -> bool {
        self.contains(Self::EXTCLK)
    }

    /// The value to write before touching the prescaler: restart cleared, sleep set.
    #[must_use]
    pub const fn to_sleep(self) -> Self {
        self.difference(Self::RESTART).union(Self::SLEEP)
    }

    /// The value that ends a prescale sequence: restart and auto-increment forced on.
    #[must_use]
    pub const fn to_restarted(self) -> Self {
        self.union(Self::RESTART).union(Self::AUTO_INCREMENT)
    }

    /// Sleep cleared, auto-increment set.
    #[must_use]
    pub const fn to_awake(self) -> Self {
        self.difference(Self::SLEEP).union(Self::AUTO_INCREMENT)
    }
}

/// How the outputs are driven, set through [`Mode2::OUTDRV`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputDrive {
    /// Outputs only sink current.
    ///
    /// LEDs with integrated zener diodes should only be driven in this mode.
    OpenDrain,
    /// Outputs both source and sink current (push-pull).
    TotemPole,
}

impl Mode2 {
    /// Interpret a raw register value, keeping every bit.
    #[must_use]
    pub const fn from_register(value: u8) -> Self {
        Self::from_bits_retain(value)
    }

    /// The current drive mode.
    #[must_use]
    pub const fn output_drive(self) -> OutputDrive {
        if self.contains(Self::OUTDRV) {
            OutputDrive::TotemPole
        } else {
            OutputDrive::OpenDrain
        }
    }

    /// This value with only the drive bit changed.
    #[must_use]
    pub const fn with_output_drive(self, drive: OutputDrive) -> Self {
        match drive {
            OutputDrive::TotemPole => self.union(Self::OUTDRV),
            OutputDrive::OpenDrain => self.difference(Self::OUTDRV),
        }
    }
}

/// First register of `channel`'s 4-byte tick block. The caller checks the range.
pub(crate) const fn channel_register(channel: u8) -> u8 {
    LED0_ON_L + CHANNEL_STRIDE * channel
}
