//! A six-digit Nixie clock with an hourly slot-machine roll.
//!
//! Runs on a Raspberry Pi Pico RP2040. Build with `cargo firmware`, flash with `cargo flash`.
#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "Single-threaded")]

use core::convert::Infallible;

use defmt::{info, warn};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_rp::gpio;
use embassy_time::{Instant, Timer};
use nixie_clock::audio::{AudioCue, AudioLink};
use nixie_clock::clock::WallClock;
use nixie_clock::control::Control;
use nixie_clock::hardware::Hardware;
use nixie_clock::leds::{self, LedLink, LedStatic};
use nixie_clock::settings::Settings;
use nixie_clock::triggers::{self, EffectTrigger};
use nixie_clock::unix_seconds::UnixSeconds;
use nixie_clock::{Nixie, NixieStatic, Result};
use panic_probe as _;

// Compile-time configuration from build.rs
const UTC_OFFSET_MINUTES: &str = env!("UTC_OFFSET_MINUTES");
const TIME_FMT: &str = env!("TIME_FMT");
const CLOCK_SEED_UNIX_SECONDS: &str = env!("CLOCK_SEED_UNIX_SECONDS");

static CLOCK: WallClock = WallClock::new();
static NIXIE_STATIC: NixieStatic = Nixie::new_static();
static LED_STATIC: LedStatic = LedLink::new_static();
static AUDIO_CUE: AudioCue = AudioLink::new_static();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = match inner_main(spawner).await {
        Ok(never) => match never {},
        Err(err) => err,
    };
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let Hardware {
        bus,
        output_enable: _output_enable,
        mut high_voltage,
        motion,
    } = Hardware::default();

    let seed = Instant::now().as_ticks() ^ 0x6e69_7869_655f_636c;
    let nixie = Nixie::new(&NIXIE_STATIC, bus, &CLOCK, seed, spawner)?;
    let leds = LedLink::new(&LED_STATIC);
    let audio = AudioLink::new(&AUDIO_CUE);
    let trigger = EffectTrigger::new(nixie, leds, audio);
    let control = Control::new(trigger, leds, &CLOCK);

    let mut settings = Settings::with_defaults()?;
    for (key, value) in [("time_fmt", TIME_FMT), ("utc_offset_minutes", UTC_OFFSET_MINUTES)] {
        if let Err(err) = control.update_setting(&mut settings, key, value) {
            warn!("Build setting {} ignored: {}", key, defmt::Display2Format(&err));
        }
    }
    control.load(&settings);

    match CLOCK_SEED_UNIX_SECONDS.parse::<i64>() {
        Ok(0) | Err(_) => info!("Clock not seeded; waiting for time sync"),
        Ok(unix_seconds) => CLOCK.set_time(UnixSeconds(unix_seconds)),
    }

    // Let the display task blank the tubes before they get any voltage.
    Timer::after_millis(10).await;
    high_voltage.set_high();
    info!("High voltage enabled");

    spawner.spawn(hourly_task(trigger))?;
    spawner.spawn(motion_task(trigger, motion))?;
    spawner.spawn(led_log_task(leds))?;
    spawner.spawn(led_mode_task(leds))?;
    spawner.spawn(audio_log_task(audio))?;

    // First frame without waiting for the heartbeat.
    trigger.show_time();

    info!("Nixie clock running");
    loop {
        Timer::after(nixie_clock::clock::ONE_HOUR).await;
        info!("Still ticking; {} display commands pending", nixie.pending());
    }
}

#[embassy_executor::task]
async fn hourly_task(trigger: EffectTrigger<'static>) -> ! {
    triggers::run_hourly(trigger, &CLOCK).await
}

#[embassy_executor::task]
async fn motion_task(trigger: EffectTrigger<'static>, sensor: gpio::Input<'static>) -> ! {
    triggers::run_motion(trigger, sensor).await
}

// The strip and the MP3 player are separate boards; until they are attached, show what
// they would have been asked to do.
#[embassy_executor::task]
async fn led_log_task(leds: LedLink<'static>) -> ! {
    loop {
        let command = leds.receive().await;
        info!("LED command: {}", defmt::Debug2Format(&command));
    }
}

#[embassy_executor::task]
async fn led_mode_task(leds: LedLink<'static>) -> ! {
    leds::run_mode_ticker(leds).await
}

#[embassy_executor::task]
async fn audio_log_task(audio: AudioLink<'static>) -> ! {
    loop {
        let sound = audio.wait().await;
        info!("Audio cue: {}", sound.file_name());
    }
}
