#![no_std]
#![no_main]
#![allow(clippy::unwrap_used, reason = "inner_main only returns on error")]

use core::convert::Infallible;
use embassy_executor::Spawner;
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Delay, Timer};
use pca9685_envoy::{OutputDrive, Pca9685, Result};
use {defmt::info, defmt_rtt as _, panic_probe as _};

// Servo on channel 0, LED (sinking to ground) on channel 15.
const SERVO_CHANNEL: u8 = 0;
const LED_CHANNEL: u8 = 15;

#[embassy_executor::main]
async fn main(spawner: Spawner) -> ! {
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(_spawner: Spawner) -> Result<Infallible> {
    let p = embassy_rp::init(Default::default());

    // PCA9685 breakout on I2C0: SDA = GPIO 4, SCL = GPIO 5.
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c::Config::default());
    let mut pca9685 = Pca9685::new(i2c, Delay);

    pca9685.init(None)?;
    pca9685.set_output_drive(OutputDrive::TotemPole)?;
    if !pca9685.is_frequency_set(50.0) {
        pca9685.set_frequency(50.0)?;
    }
    info!("PCA9685 ready, prescale {}", pca9685.prescale());

    // Sweep the servo from 1000 µs to 2000 µs and back, dimming the LED with it.
    loop {
        for step in (0..=10_u16).chain((0..10).rev()) {
            let microseconds = 1000 + step * 100;
            pca9685.set_channel_microseconds(SERVO_CHANNEL, microseconds)?;
            pca9685.set_channel_duty(LED_CHANNEL, step * 409, true)?;
            Timer::after_millis(100).await;
        }
    }
}
