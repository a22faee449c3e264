//! Entry points that start effects: the hourly chime, the motion sensor, and the combined
//! "slot machine with lights and sound" used by both.
//!
//! The display task only animates the digits. Fanning out to the LED strip and the audio
//! player happens here, at the trigger site, before the display command is queued.

#![allow(clippy::future_not_send, reason = "single-threaded")]

use embassy_time::{Duration, Instant, Timer};
use embedded_hal_async::digital::Wait;

use crate::audio::{AudioLink, Sound};
use crate::clock::{ONE_HOUR, TimeSample, TimeSource};
use crate::leds::{LedCommand, LedLink};
use crate::nixie::Nixie;

/// Edges on the motion input closer together than this are treated as one.
pub const MOTION_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Everything an effect trigger needs to reach.
#[derive(Clone, Copy)]
pub struct EffectTrigger<'a> {
    nixie: Nixie<'a>,
    leds: LedLink<'a>,
    audio: AudioLink<'a>,
}

impl<'a> EffectTrigger<'a> {
    #[must_use]
    pub const fn new(nixie: Nixie<'a>, leds: LedLink<'a>, audio: AudioLink<'a>) -> Self {
        Self { nixie, leds, audio }
    }

    /// Start the LED chase and the chime, then queue the slot-machine roll.
    ///
    /// Best effort throughout: any part whose queue is full is skipped.
    pub fn slot_machine_with_fanout(&self) {
        info!("Starting slot machine effect with LEDs and audio");
        self.leds.send(LedCommand::SlotMode);
        self.audio.play(Sound::GoodFoot);
        self.nixie.slot_machine();
    }

    /// Queue an immediate time refresh.
    pub fn show_time(&self) {
        self.nixie.show_time();
    }

    #[must_use]
    pub const fn nixie(&self) -> Nixie<'a> {
        self.nixie
    }
}

/// Time from `sample` to the top of the next hour. Exactly on the hour, that is a full hour.
#[must_use]
pub fn until_next_hour(sample: TimeSample) -> Duration {
    let elapsed = u64::from(sample.minutes) * 60 + u64::from(sample.seconds);
    match 3600_u64.checked_sub(elapsed) {
        Some(0) | None => ONE_HOUR,
        Some(seconds) => Duration::from_secs(seconds),
    }
}

/// Fire the slot-machine effect at the top of every hour.
pub async fn run_hourly<C: TimeSource>(trigger: EffectTrigger<'_>, clock: C) -> ! {
    info!("Hourly trigger started");
    loop {
        Timer::after(until_next_hour(clock.now())).await;
        info!("Hour changed!");
        trigger.slot_machine_with_fanout();
    }
}

/// Collapses a burst of motion edges into one event.
#[derive(Debug, Clone, Copy)]
pub struct MotionDebouncer {
    window: Duration,
    last_accepted: Option<Instant>,
}

impl MotionDebouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: None,
        }
    }

    /// Whether an edge at `now` counts as new motion. The first edge always does.
    pub fn accept(&mut self, now: Instant) -> bool {
        let fresh = self
            .last_accepted
            .is_none_or(|last| now.saturating_duration_since(last) > self.window);
        if fresh {
            self.last_accepted = Some(now);
        }
        fresh
    }
}

impl Default for MotionDebouncer {
    fn default() -> Self {
        Self::new(MOTION_DEBOUNCE)
    }
}

/// Fire the slot-machine effect on each (debounced) rising edge of the motion sensor.
pub async fn run_motion<P: Wait>(trigger: EffectTrigger<'_>, mut sensor: P) -> ! {
    info!("Motion trigger started");
    let mut debouncer = MotionDebouncer::default();
    loop {
        if sensor.wait_for_rising_edge().await.is_err() {
            warn!("Motion input error; retrying");
            Timer::after(MOTION_DEBOUNCE).await;
            continue;
        }
        if debouncer.accept(Instant::now()) {
            info!("Motion detected");
            trigger.slot_machine_with_fanout();
        }
    }
}
