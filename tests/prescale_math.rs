#![allow(missing_docs)]
//! Host-level tests for the pure prescale, tick, and mode-bit math.

use pca9685_envoy::pwm::{
    ChannelPwm, MAX_FREQUENCY_HZ, MIN_FREQUENCY_HZ, PRESCALE_MAX, PRESCALE_MIN, clamp_frequency,
    prescale_for, tick_duration_us,
};
use pca9685_envoy::registers::{Mode1, Mode2, OutputDrive};

const OSCILLATOR_HZ: u32 = 25_000_000;

#[test]
fn prescale_for_50_hz_is_121() {
    // round(25_000_000 / (50 * 4096)) - 1 = round(122.07) - 1
    assert_eq!(prescale_for(OSCILLATOR_HZ, 50.0), 121);
}

#[test]
fn prescale_for_default_frequency_is_5() {
    assert_eq!(prescale_for(OSCILLATOR_HZ, 1000.0), 5);
}

#[test]
fn prescale_subtracts_one_after_rounding() {
    // 25 MHz / (60 * 4096) = 101.73 -> 102.23 -> 101.23 -> 101
    assert_eq!(prescale_for(OSCILLATOR_HZ, 60.0), 101);
    // 25 MHz / (200 * 4096) = 30.52 -> 31.02 -> 30.02 -> 30
    assert_eq!(prescale_for(OSCILLATOR_HZ, 200.0), 30);
}

#[test]
fn prescale_stays_in_range_for_every_supported_frequency() {
    for freq in 1..=3500_u16 {
        let prescale = prescale_for(OSCILLATOR_HZ, f32::from(freq));
        assert!(
            (PRESCALE_MIN..=PRESCALE_MAX).contains(&prescale),
            "{freq} Hz gave prescale {prescale}"
        );
    }
}

#[test]
fn prescale_clamps_at_both_ends() {
    assert_eq!(prescale_for(OSCILLATOR_HZ, 1.0), PRESCALE_MAX);
    assert_eq!(prescale_for(OSCILLATOR_HZ, 3500.0), PRESCALE_MIN);
    assert_eq!(prescale_for(OSCILLATOR_HZ, 0.0), PRESCALE_MAX);
    assert_eq!(prescale_for(OSCILLATOR_HZ, f32::NAN), PRESCALE_MIN);
}

#[test]
fn prescale_never_increases_with_frequency() {
    let mut previous = prescale_for(OSCILLATOR_HZ, 1.0);
    for tenth_hz in 10..=35_000_u32 {
        let freq = tenth_hz as f32 / 10.0;
        let prescale = prescale_for(OSCILLATOR_HZ, freq);
        assert!(prescale <= previous, "{freq} Hz: {prescale} > {previous}");
        previous = prescale;
    }
}

#[test]
fn prescale_tracks_oscillator_assumption() {
    // 27 MHz / (50 * 4096) = 131.84 -> 132.34 -> 131.34
    assert_eq!(prescale_for(27_000_000, 50.0), 131);
}

#[test]
fn clamp_frequency_saturates() {
    assert_eq!(clamp_frequency(0.0).to_bits(), MIN_FREQUENCY_HZ.to_bits());
    assert_eq!(clamp_frequency(-5.0).to_bits(), MIN_FREQUENCY_HZ.to_bits());
    assert_eq!(clamp_frequency(f32::NAN).to_bits(), MIN_FREQUENCY_HZ.to_bits());
    assert_eq!(clamp_frequency(50.0).to_bits(), 50.0_f32.to_bits());
    assert_eq!(clamp_frequency(10_000.0).to_bits(), MAX_FREQUENCY_HZ.to_bits());
}

#[test]
fn tick_duration_uses_prescale_plus_one() {
    // 1_000_000 * 122 / 25_000_000 = 4.88 us
    let tick_us = tick_duration_us(OSCILLATOR_HZ, 121);
    assert!((tick_us - 4.88).abs() < 1e-9, "{tick_us}");
}

#[test]
fn microseconds_round_to_nearest_tick() {
    assert_eq!(
        ChannelPwm::from_microseconds(1500, 121, OSCILLATOR_HZ),
        ChannelPwm::new(0, 307)
    );
    // 1000 / 4.88 = 204.9 -> 205
    assert_eq!(
        ChannelPwm::from_microseconds(1000, 121, OSCILLATOR_HZ),
        ChannelPwm::new(0, 205)
    );
    assert_eq!(
        ChannelPwm::from_microseconds(0, 121, OSCILLATOR_HZ),
        ChannelPwm::new(0, 0)
    );
}

#[test]
fn duty_extremes_map_to_sentinels() {
    assert_eq!(ChannelPwm::from_duty(4095, false), ChannelPwm::new(4096, 0));
    assert_eq!(ChannelPwm::from_duty(0, true), ChannelPwm::new(4096, 0));
    assert_eq!(ChannelPwm::from_duty(0, false), ChannelPwm::new(0, 4096));
    assert_eq!(ChannelPwm::from_duty(4095, true), ChannelPwm::new(0, 4096));
}

#[test]
fn duty_saturates_above_4095() {
    assert_eq!(ChannelPwm::from_duty(5000, false), ChannelPwm::FULL_ON);
    assert_eq!(ChannelPwm::from_duty(u16::MAX, true), ChannelPwm::FULL_OFF);
}

#[test]
fn duty_between_extremes_turns_on_at_zero() {
    assert_eq!(ChannelPwm::from_duty(1, false), ChannelPwm::new(0, 1));
    assert_eq!(ChannelPwm::from_duty(1000, false), ChannelPwm::new(0, 1000));
    assert_eq!(ChannelPwm::from_duty(1000, true), ChannelPwm::new(0, 3095));
    assert_eq!(ChannelPwm::from_duty(4094, true), ChannelPwm::new(0, 1));
}

#[test]
fn tick_pair_bytes_are_little_endian() {
    assert_eq!(ChannelPwm::FULL_OFF.to_le_bytes(), [0x00, 0x00, 0x00, 0x10]);
    assert_eq!(ChannelPwm::FULL_ON.to_le_bytes(), [0x00, 0x10, 0x00, 0x00]);
    assert_eq!(
        ChannelPwm::new(0x0210, 0x0103).to_le_bytes(),
        [0x10, 0x02, 0x03, 0x01]
    );
    assert_eq!(
        ChannelPwm::from_le_bytes([0x23, 0x05, 0x34, 0x06]),
        ChannelPwm::new(0x0523, 0x0634)
    );
}

#[test]
fn mode1_sleep_variant_clears_restart_and_sets_sleep() {
    let awake = Mode1::from_register(0xA1);
    assert_eq!(awake.to_sleep().bits(), 0x31);
    assert!(awake.to_sleep().is_sleeping());
    assert!(awake.is_auto_increment());
}

#[test]
fn mode1_restart_variant_keeps_unrelated_bits() {
    assert_eq!(Mode1::from_register(0x11).to_restarted().bits(), 0xB1);
    assert_eq!(Mode1::from_register(0x51).to_awake().bits(), 0x61);
    assert!(Mode1::from_register(0x51).is_external_clock());
}

#[test]
fn mode2_output_drive_only_touches_outdrv() {
    let mode = Mode2::from_register(0x15);
    assert_eq!(mode.output_drive(), OutputDrive::TotemPole);
    assert_eq!(mode.with_output_drive(OutputDrive::OpenDrain).bits(), 0x11);
    assert_eq!(
        Mode2::from_register(0x00)
            .with_output_drive(OutputDrive::TotemPole)
            .bits(),
        0x04
    );
    // Bits the type does not name survive a round trip.
    assert_eq!(
        Mode2::from_register(0xE0)
            .with_output_drive(OutputDrive::TotemPole)
            .bits(),
        0xE4
    );
}
