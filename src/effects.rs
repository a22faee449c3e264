//! Frame producers: the steady time display and the slot-machine roll.

use embassy_time::{Duration, Timer};
use oorandom::Rand32;

use crate::clock::TimeSample;
use crate::frame::{DIGIT_SLOT_COUNT, Frame};
use crate::shift_register::FrameBus;
use crate::time_format::TimeFormat;

/// Frames in one slot-machine roll.
pub const SLOT_MACHINE_FRAMES: u16 = 120;
/// Pause between slot-machine frames. With [`SLOT_MACHINE_FRAMES`] the roll lasts six seconds.
pub const SLOT_MACHINE_FRAME_DELAY: Duration = Duration::from_millis(50);

/// Builds the frame that shows `sample` in `format`.
///
/// The separators are lit on even seconds and dark on odd ones, and stay dark whenever
/// `separator_enabled` is false.
#[must_use]
pub fn steady_time_frame(sample: TimeSample, format: TimeFormat, separator_enabled: bool) -> Frame {
    let show_separator = separator_enabled && sample.seconds % 2 == 0;
    Frame::encode(
        format.display_hours(sample.hours),
        sample.minutes,
        sample.seconds,
        show_separator,
    )
}

/// Six independent digits, each 0–9.
pub fn random_digits(rng: &mut Rand32) -> [u8; DIGIT_SLOT_COUNT] {
    core::array::from_fn(|_| {
        #[expect(clippy::cast_possible_truncation, reason = "value is below 10")]
        let digit = rng.rand_range(0..10) as u8;
        digit
    })
}

/// The "spinning tumblers" animation: a bounded run of random-digit frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotMachine {
    pub frames: u16,
    pub frame_delay: Duration,
}

impl Default for SlotMachine {
    fn default() -> Self {
        Self {
            frames: SLOT_MACHINE_FRAMES,
            frame_delay: SLOT_MACHINE_FRAME_DELAY,
        }
    }
}

impl SlotMachine {
    /// Plays the whole roll on `bus`. It cannot be cancelled; the caller resumes the time
    /// display afterwards.
    pub async fn run<B: FrameBus>(&self, bus: &mut B, rng: &mut Rand32) {
        debug!("Slot machine: {} frames", self.frames);
        for _ in 0..self.frames {
            bus.transmit(Frame::from_digits(random_digits(rng), false))
                .await;
            Timer::after(self.frame_delay).await;
        }
    }
}
