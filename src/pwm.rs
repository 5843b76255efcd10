//! Prescale math and tick-pair encoding.
//!
//! Everything here is pure: no bus access, no state. The controller in
//! [`crate::pca9685`] feeds it the oscillator assumption and last-read prescale.

/// Ticks in one PWM cycle.
pub const TICKS_PER_CYCLE: u16 = 4096;

/// Largest duty value accepted by [`ChannelPwm::from_duty`]. Larger values saturate.
pub const MAX_DUTY: u16 = TICKS_PER_CYCLE - 1;

/// Smallest prescale the chip accepts.
pub const PRESCALE_MIN: u8 = 3;

/// Largest prescale the chip accepts.
pub const PRESCALE_MAX: u8 = 255;

/// Lowest output frequency [`crate::Pca9685::set_frequency`] will program.
pub const MIN_FREQUENCY_HZ: f32 = 1.0;

/// Highest output frequency [`crate::Pca9685::set_frequency`] will program.
///
/// The datasheet ceiling is lower (about 1526 Hz on the internal oscillator);
/// the prescale clamp keeps the chip safe regardless.
pub const MAX_FREQUENCY_HZ: f32 = 3500.0;

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Clamp a requested frequency into [`MIN_FREQUENCY_HZ`, `MAX_FREQUENCY_HZ`].
///
/// NaN saturates to the minimum.
#[must_use]
pub fn clamp_frequency(freq_hz: f32) -> f32 {
    freq_hz.max(MIN_FREQUENCY_HZ).min(MAX_FREQUENCY_HZ)
}

/// Prescale divisor for `freq_hz` given the oscillator frequency.
///
/// `round(oscillator / (freq * 4096)) - 1`, clamped to
/// [`PRESCALE_MIN`, `PRESCALE_MAX`]. Rounding is add-half-then-truncate and
/// the `- 1` is applied after it.
///
/// ```
/// use pca9685_envoy::pwm::prescale_for;
///
/// assert_eq!(prescale_for(25_000_000, 50.0), 121);
/// assert_eq!(prescale_for(25_000_000, 1000.0), 5);
/// ```
#[must_use]
pub fn prescale_for(oscillator_hz: u32, freq_hz: f32) -> u8 {
    let divisor = f64::from(oscillator_hz) / (f64::from(freq_hz) * f64::from(TICKS_PER_CYCLE));
    let prescale = (divisor + 0.5) - 1.0;
    // `max` first so NaN lands on the minimum.
    prescale
        .max(f64::from(PRESCALE_MIN))
        .min(f64::from(PRESCALE_MAX)) as u8
}

/// Length of one tick in microseconds.
///
/// The chip's counter runs `prescale + 1` oscillator cycles per tick.
#[must_use]
pub fn tick_duration_us(oscillator_hz: u32, prescale: u8) -> f64 {
    MICROS_PER_SECOND * (f64::from(prescale) + 1.0) / f64::from(oscillator_hz)
}

/// On/off tick pair for one channel.
///
/// Values are 12-bit positions in the 4096-tick cycle. Two reserved pairs,
/// [`FULL_ON`](Self::FULL_ON) and [`FULL_OFF`](Self::FULL_OFF), hold the output
/// permanently high or low.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelPwm {
    /// Tick at which the output turns on.
    pub on: u16,
    /// Tick at which the output turns off.
    pub off: u16,
}

impl ChannelPwm {
    /// Output held high.
    pub const FULL_ON: Self = Self::new(TICKS_PER_CYCLE, 0);

    /// Output held low.
    pub const FULL_OFF: Self = Self::new(0, TICKS_PER_CYCLE);

    /// A raw tick pair. Not validated; the chip tolerates anything.
    #[must_use]
    pub const fn new(on: u16, off: u16) -> Self {
        Self { on, off }
    }

    /// Map a duty value (0..=4095, saturating) to a tick pair.
    ///
    /// Not inverted, 4095 is fully on and 0 fully off. Inverted (for loads
    /// wired to sink to ground), 0 is fully on and 4095 fully off. Everything
    /// in between turns on at tick 0.
    ///
    /// ```
    /// use pca9685_envoy::pwm::ChannelPwm;
    ///
    /// assert_eq!(ChannelPwm::from_duty(4095, false), ChannelPwm::FULL_ON);
    /// assert_eq!(ChannelPwm::from_duty(0, true), ChannelPwm::FULL_ON);
    /// assert_eq!(ChannelPwm::from_duty(1000, true), ChannelPwm::new(0, 3095));
    /// ```
    #[must_use]
    pub const fn from_duty(value: u16, invert: bool) -> Self {
        let value = if value > MAX_DUTY { MAX_DUTY } else { value };
        match (invert, value) {
            (false, MAX_DUTY) | (true, 0) => Self::FULL_ON,
            (false, 0) | (true, MAX_DUTY) => Self::FULL_OFF,
            (false, _) => Self::new(0, value),
            (true, _) => Self::new(0, MAX_DUTY - value),
        }
    }

    /// A pulse of `microseconds` starting at tick 0, rounded to the nearest tick.
    ///
    /// ```
    /// use pca9685_envoy::pwm::ChannelPwm;
    ///
    /// // 50 Hz: prescale 121 gives 4.88 µs per tick.
    /// assert_eq!(ChannelPwm::from_microseconds(1500, 121, 25_000_000), ChannelPwm::new(0, 307));
    /// ```
    #[must_use]
    pub fn from_microseconds(microseconds: u16, prescale: u8, oscillator_hz: u32) -> Self {
        let ticks = f64::from(microseconds) / tick_duration_us(oscillator_hz, prescale);
        // Saturating float-to-int cast; ticks is never negative.
        Self::new(0, (ticks + 0.5) as u16)
    }

    /// Register bytes in chip order: `[on_l, on_h, off_l, off_h]`.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 4] {
        let [on_l, on_h] = self.on.to_le_bytes();
        let [off_l, off_h] = self.off.to_le_bytes();
        [on_l, on_h, off_l, off_h]
    }

    /// Decode register bytes read back from the chip.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 4]) -> Self {
        let [on_l, on_h, off_l, off_h] = bytes;
        Self::new(
            u16::from_le_bytes([on_l, on_h]),
            u16::from_le_bytes([off_l, off_h]),
        )
    }

    /// The 5-byte burst that programs this pair starting at `register`.
    #[must_use]
    pub(crate) const fn burst(self, register: u8) -> [u8; 5] {
        let [on_l, on_h, off_l, off_h] = self.to_le_bytes();
        [register, on_l, on_h, off_l, off_h]
    }
}
