//! Runtime configuration for a [`crate::Pca9685`].

/// Factory I2C address with all address pins low.
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Nominal frequency of the internal oscillator.
///
/// Real chips vary by a few percent; measure yours and pass it through
/// [`Config::with_oscillator_hz`] if pulse widths must be exact.
pub const DEFAULT_OSCILLATOR_HZ: u32 = 25_000_000;

/// Output frequency programmed by [`crate::Pca9685::init`] on the internal oscillator.
pub const DEFAULT_FREQUENCY_HZ: f32 = 1000.0;

/// Number of PWM channels.
pub const CHANNEL_COUNT: u8 = 16;

/// Bus address and oscillator assumption for one chip.
///
/// # Example
///
/// ```
/// use pca9685_envoy::Config;
///
/// let config = Config::new().with_address(0x41).with_oscillator_hz(27_000_000);
/// assert_eq!(config.address, 0x41);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit I2C address.
    pub address: u8,
    /// Oscillator frequency (Hz) assumed by prescale and pulse-width math.
    pub oscillator_hz: u32,
}

impl Config {
    /// Defaults: address `0x40`, 25 MHz oscillator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            oscillator_hz: DEFAULT_OSCILLATOR_HZ,
        }
    }

    /// Set the 7-bit I2C address.
    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the assumed oscillator frequency.
    #[must_use]
    pub const fn with_oscillator_hz(mut self, oscillator_hz: u32) -> Self {
        self.oscillator_hz = oscillator_hz;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
