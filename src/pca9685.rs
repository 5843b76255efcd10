//! A device abstraction for the PCA9685 16-channel PWM/servo controller.
//!
//! See [`Pca9685`] for usage.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::bus::BusDevice;
use crate::config::{CHANNEL_COUNT, Config, DEFAULT_FREQUENCY_HZ};
use crate::pwm::{self, ChannelPwm};
use crate::registers::{self, ALLLED_ON_L, MODE1, MODE2, Mode1, Mode2, OutputDrive, PRESCALE};
use crate::{Error, Result};

/// Time the chip needs to finish an internal reset.
const RESET_DELAY_MS: u32 = 10;

/// Time for the oscillator to settle after sleep or a prescale change.
const SETTLE_DELAY_MS: u32 = 5;

/// A device abstraction for the PCA9685 PWM/servo controller.
///
/// The controller owns the I2C bus and a blocking delay. Every operation blocks
/// until its bus transactions finish; mode changes also wait out the chip's
/// fixed settling times.
///
/// # Example
///
/// ```rust,no_run
/// # fn example<I2C, D>(i2c: I2C, delay: D) -> pca9685_envoy::Result<()>
/// # where I2C: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs {
/// use pca9685_envoy::Pca9685;
///
/// let mut pwm = Pca9685::new(i2c, delay);
/// pwm.init(None)?;                      // soft reset, 1000 Hz
/// pwm.set_frequency(50.0)?;             // servo frame rate
/// pwm.set_channel_microseconds(0, 1500)?; // center a servo on channel 0
/// pwm.set_channel_duty(1, 2048, false)?;  // 50% on channel 1
/// pwm.all_off()?;
/// # Ok(())
/// # }
/// ```
pub struct Pca9685<I2C, D> {
    bus: BusDevice<I2C>,
    delay: D,
    config: Config,
    oscillator_hz: u32,
    // Last prescale read from the chip. 0 means unknown.
    prescale: u8,
}

impl<I2C: I2c, D: DelayNs> Pca9685<I2C, D> {
    /// Create a controller at the default address with the nominal oscillator.
    ///
    /// Nothing is sent on the bus until [`init`](Self::init) or
    /// [`init_barebones`](Self::init_barebones).
    pub const fn new(i2c: I2C, delay: D) -> Self {
        Self::with_config(i2c, delay, Config::new())
    }

    /// Create a controller with an explicit address and oscillator assumption.
    pub const fn with_config(i2c: I2C, delay: D, config: Config) -> Self {
        Self {
            bus: BusDevice::new(i2c, config.address),
            delay,
            config,
            oscillator_hz: config.oscillator_hz,
            prescale: 0,
        }
    }

    /// Stop using the chip and hand back the bus and delay.
    pub fn release(self) -> (I2C, D) {
        (self.bus.release(), self.delay)
    }

    /// Reset the chip and program its clock.
    ///
    /// With `Some(prescale)` the chip is switched to the EXTCLK pin using that
    /// prescale literally; with `None` (or `Some(0)`) it stays on the internal
    /// oscillator at 1000 Hz. Calling this again closes and reopens the bus handle.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if the chip does not acknowledge its address or a mode
    /// read fails, [`Error::InvalidPrescaleRead`] if the prescale cannot be read back.
    pub fn init(&mut self, external_clock_prescale: Option<u8>) -> Result<()> {
        info!("Pca9685: init at address {=u8:#x}", self.bus.address());
        self.bus.close();
        self.bus.open(true)?;
        self.reset();

        self.oscillator_hz = self.config.oscillator_hz;
        match external_clock_prescale.filter(|&prescale| prescale != 0) {
            Some(prescale) => self.set_external_clock(prescale)?,
            None => self.set_frequency(DEFAULT_FREQUENCY_HZ)?,
        }

        info!("Pca9685: ready, prescale {}", self.prescale);
        Ok(())
    }

    /// Attach to a chip that is already running, without resetting it or
    /// changing its frequency, so current channel outputs are undisturbed.
    ///
    /// Wakes the chip and enables auto-increment, writing MODE1 only if that
    /// changes it.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if MODE1 cannot be read.
    pub fn init_barebones(&mut self) -> Result<()> {
        info!("Pca9685: barebones init at address {=u8:#x}", self.bus.address());
        self.bus.close();
        self.bus.open(false)?;

        let old_mode = self.read_mode1()?;
        let new_mode = old_mode.to_awake();
        if new_mode != old_mode {
            self.write_best_effort(MODE1, new_mode.bits());
        }

        self.oscillator_hz = self.config.oscillator_hz;
        // Needed by pulse-width math; the chip keeps running if this fails.
        if self.refresh_prescale().is_err() {
            warn!("Pca9685: prescale unknown after barebones init");
        }
        Ok(())
    }

    /// Soft reset: set RESTART and wait for the chip to come back.
    pub fn reset(&mut self) {
        debug!("Pca9685: soft reset");
        self.write_best_effort(MODE1, Mode1::RESTART.bits());
        self.delay.delay_ms(RESET_DELAY_MS);
    }

    /// Put the chip into low-power sleep. Outputs stop after the current cycle.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if MODE1 cannot be read.
    pub fn sleep(&mut self) -> Result<()> {
        let mode = self.read_mode1()?;
        self.write_best_effort(MODE1, mode.union(Mode1::SLEEP).bits());
        self.delay.delay_ms(SETTLE_DELAY_MS);
        debug!("Pca9685: asleep");
        Ok(())
    }

    /// Wake the chip from sleep.
    ///
    /// Oscillator start-up takes a few hundred microseconds and is not waited on.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if MODE1 cannot be read.
    pub fn wake_up(&mut self) -> Result<()> {
        let mode = self.read_mode1()?;
        self.write_best_effort(MODE1, mode.difference(Mode1::SLEEP).bits());
        debug!("Pca9685: awake");
        Ok(())
    }

    /// Set the PWM frequency for all channels.
    ///
    /// `freq_hz` saturates to 1..=3500 Hz. The chip is put to sleep while the
    /// prescaler is written, then restarted with auto-increment on. The
    /// prescale the chip actually applied is read back and remembered.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if MODE1 cannot be read, [`Error::InvalidPrescaleRead`]
    /// if the prescale cannot be read back.
    pub fn set_frequency(&mut self, freq_hz: f32) -> Result<()> {
        let clamped_hz = pwm::clamp_frequency(freq_hz);
        let prescale = self.compute_prescale(clamped_hz);
        debug!(
            "Pca9685: set_frequency({}) -> {} Hz, prescale {}",
            freq_hz, clamped_hz, prescale
        );

        let old_mode = self.read_mode1()?;
        self.write_best_effort(MODE1, old_mode.to_sleep().bits());
        self.write_best_effort(PRESCALE, prescale);
        self.write_best_effort(MODE1, old_mode.bits());
        self.delay.delay_ms(SETTLE_DELAY_MS);
        self.write_best_effort(MODE1, old_mode.to_restarted().bits());

        self.refresh_prescale()?;
        if self.prescale != prescale {
            info!(
                "Pca9685: chip applied prescale {} (requested {})",
                self.prescale, prescale
            );
        }
        Ok(())
    }

    /// Switch to the EXTCLK pin and program `prescale` as given.
    ///
    /// EXTCLK is only honored while asleep, so sleep is committed in its own
    /// write before the clock bit is set. The clock source stays external until
    /// the next power cycle. The prescale the chip applied is read back and
    /// remembered.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if MODE1 cannot be read, [`Error::InvalidPrescaleRead`]
    /// if the prescale cannot be read back.
    pub fn set_external_clock(&mut self, prescale: u8) -> Result<()> {
        info!("Pca9685: external clock, prescale {}", prescale);
        let old_mode = self.read_mode1()?;
        let sleeping = old_mode.to_sleep();
        self.write_best_effort(MODE1, sleeping.bits());

        let external = sleeping.union(Mode1::EXTCLK);
        self.write_best_effort(MODE1, external.bits());
        self.write_best_effort(PRESCALE, prescale);
        self.delay.delay_ms(SETTLE_DELAY_MS);

        let running = external.difference(Mode1::SLEEP).to_restarted();
        self.write_best_effort(MODE1, running.bits());

        self.refresh_prescale()
    }

    /// Prescale that `freq_hz` maps to under the current oscillator assumption.
    ///
    /// The frequency itself is not clamped here; the result always is.
    #[must_use]
    pub fn compute_prescale(&self, freq_hz: f32) -> u8 {
        pwm::prescale_for(self.oscillator_hz, freq_hz)
    }

    /// Whether programming `freq_hz` would leave the prescaler unchanged.
    ///
    /// Use it to skip a [`set_frequency`](Self::set_frequency) and the output
    /// glitch that comes with it.
    #[must_use]
    pub fn is_frequency_set(&self, freq_hz: f32) -> bool {
        self.compute_prescale(freq_hz) == self.prescale
    }

    /// Program a channel's on and off ticks directly.
    ///
    /// Ticks are not validated. `(4096, 0)` and `(0, 4096)` are the fully-on
    /// and fully-off sentinels.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelOutOfRange`] for channels above 15, otherwise any bus error.
    pub fn set_channel_raw(&mut self, channel: u8, on: u16, off: u16) -> Result<()> {
        self.set_channel_pwm(channel, ChannelPwm::new(on, off))
    }

    /// Program a channel from a [`ChannelPwm`] pair.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelOutOfRange`] for channels above 15, otherwise any bus error.
    pub fn set_channel_pwm(&mut self, channel: u8, pwm: ChannelPwm) -> Result<()> {
        let register = checked_channel_register(channel)?;
        trace!("Pca9685: channel {} on {} off {}", channel, pwm.on, pwm.off);
        self.bus.write(&pwm.burst(register))
    }

    /// Set a channel to `value` ticks out of 4096, with 0 and 4095 meaning
    /// fully off and fully on (swapped when `invert` is set).
    ///
    /// `value` saturates at 4095. See [`ChannelPwm::from_duty`].
    ///
    /// # Errors
    ///
    /// [`Error::ChannelOutOfRange`] for channels above 15, otherwise any bus error.
    pub fn set_channel_duty(&mut self, channel: u8, value: u16, invert: bool) -> Result<()> {
        self.set_channel_pwm(channel, ChannelPwm::from_duty(value, invert))
    }

    /// Set a channel to a pulse of `microseconds`, starting at tick 0.
    ///
    /// Resolution is one tick (about 4.9 µs at 50 Hz), and the result is only
    /// as accurate as the oscillator assumption.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelOutOfRange`] for channels above 15, otherwise any bus error.
    pub fn set_channel_microseconds(&mut self, channel: u8, microseconds: u16) -> Result<()> {
        let pwm = ChannelPwm::from_microseconds(microseconds, self.prescale, self.oscillator_hz);
        debug!(
            "Pca9685: channel {} {} us -> {} ticks",
            channel, microseconds, pwm.off
        );
        self.set_channel_pwm(channel, pwm)
    }

    /// Read a channel's on and off ticks back from the chip.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelOutOfRange`] for channels above 15, otherwise any bus error.
    pub fn channel_pwm(&mut self, channel: u8) -> Result<ChannelPwm> {
        let register = checked_channel_register(channel)?;
        let mut buffer = [0u8; 4];
        self.bus.write_read(&[register], &mut buffer)?;
        Ok(ChannelPwm::from_le_bytes(buffer))
    }

    /// Program every channel with the same tick pair in one broadcast write.
    ///
    /// # Errors
    ///
    /// Any bus error.
    pub fn set_all_raw(&mut self, on: u16, off: u16) -> Result<()> {
        self.bus.write(&ChannelPwm::new(on, off).burst(ALLLED_ON_L))
    }

    /// Turn every channel fully off in one broadcast write.
    ///
    /// # Errors
    ///
    /// Any bus error.
    pub fn all_off(&mut self) -> Result<()> {
        let ChannelPwm { on, off } = ChannelPwm::FULL_OFF;
        self.set_all_raw(on, off)
    }

    /// Choose totem-pole (push-pull) or open-drain outputs.
    ///
    /// # Errors
    ///
    /// [`Error::I2c`] if MODE2 cannot be read.
    pub fn set_output_drive(&mut self, drive: OutputDrive) -> Result<()> {
        let mode = Mode2::from_register(self.read_register(MODE2)?);
        self.write_best_effort(MODE2, mode.with_output_drive(drive).bits());
        debug!("Pca9685: output drive {}", drive);
        Ok(())
    }

    /// Read the prescale register.
    ///
    /// # Errors
    ///
    /// Any bus error.
    pub fn read_prescale(&mut self) -> Result<u8> {
        self.read_register(PRESCALE)
    }

    /// The prescale last read from the chip, or 0 if it has never been read
    /// successfully.
    #[must_use]
    pub const fn prescale(&self) -> u8 {
        self.prescale
    }

    /// The oscillator frequency (Hz) used by the frequency and pulse-width math.
    ///
    /// The chip cannot report its own oscillator speed; this is an assumption.
    #[must_use]
    pub const fn oscillator_frequency(&self) -> u32 {
        self.oscillator_hz
    }

    /// Change the oscillator assumption, for example after measuring a chip.
    ///
    /// `init` and `init_barebones` restore the configured value.
    pub const fn set_oscillator_frequency(&mut self, oscillator_hz: u32) {
        self.oscillator_hz = oscillator_hz;
    }

    /// The 7-bit I2C address.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.bus.address()
    }

    /// Whether the bus handle is open, i.e. an init has succeeded.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.bus.is_open()
    }

    /// Read one register.
    ///
    /// # Errors
    ///
    /// Any bus error.
    pub fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut buffer = [0u8; 1];
        self.bus.write_read(&[register], &mut buffer)?;
        let [value] = buffer;
        Ok(value)
    }

    /// Write one register.
    ///
    /// # Errors
    ///
    /// Any bus error.
    pub fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.bus.write(&[register, value])
    }

    fn read_mode1(&mut self) -> Result<Mode1> {
        self.read_register(MODE1).map(Mode1::from_register)
    }

    // Mode and prescale writes inside sequences do not report failure; the
    // prescale read-back at the end of a sequence is the check.
    fn write_best_effort(&mut self, register: u8, value: u8) {
        if self.write_register(register, value).is_err() {
            warn!(
                "Pca9685: write of {=u8:#x} to register {=u8:#x} failed",
                value, register
            );
        }
    }

    // A failed read is stored as 0, which is never a valid prescale.
    fn refresh_prescale(&mut self) -> Result<()> {
        self.prescale = self.read_prescale().unwrap_or(0);
        if self.prescale == 0 {
            warn!("Pca9685: prescale read failed");
            return Err(Error::InvalidPrescaleRead);
        }
        Ok(())
    }
}

fn checked_channel_register(channel: u8) -> Result<u8> {
    if channel < CHANNEL_COUNT {
        Ok(registers::channel_register(channel))
    } else {
        Err(Error::ChannelOutOfRange(channel))
    }
}
