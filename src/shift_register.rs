//! Bit-banged driver for the display's chain of serial-in, parallel-out shift registers.
//!
//! The chain has three inputs: data, shift clock and latch. Bits are clocked in
//! most-significant first; nothing reaches the display until the latch is pulsed, so a
//! half-shifted frame is never visible.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::frame::Frame;

/// Settle time after each shift-clock edge, in nanoseconds.
pub const BIT_SETTLE_NS: u32 = 2_000;
/// Width of the latch pulse, in nanoseconds.
pub const LATCH_SETTLE_NS: u32 = 5_000;

/// Something that can put a [`Frame`] on the display.
///
/// Only the display task calls this, one frame at a time; implementations need no locking.
#[expect(async_fn_in_trait, reason = "single-threaded executor; no Send bound needed")]
pub trait FrameBus {
    async fn transmit(&mut self, frame: Frame);
}

/// Per-edge delays for [`ShiftRegisterBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    pub bit_settle_ns: u32,
    pub latch_settle_ns: u32,
}

impl Default for BusTiming {
    fn default() -> Self {
        Self {
            bit_settle_ns: BIT_SETTLE_NS,
            latch_settle_ns: LATCH_SETTLE_NS,
        }
    }
}

/// Owns the data, clock and latch lines of the register chain.
///
/// Pins are infallible outputs (as they are on the RP2040); the delay is cooperative, so other
/// tasks run during each settle.
pub struct ShiftRegisterBus<P, D> {
    data: P,
    clock: P,
    latch: P,
    delay: D,
    timing: BusTiming,
}

impl<P, D> ShiftRegisterBus<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    /// Takes ownership of the three lines and drives clock and latch low.
    pub fn new(data: P, mut clock: P, mut latch: P, delay: D, timing: BusTiming) -> Self {
        let Ok(()) = clock.set_low();
        let Ok(()) = latch.set_low();
        Self {
            data,
            clock,
            latch,
            delay,
            timing,
        }
    }

    async fn shift_bit(&mut self, high: bool) {
        let Ok(()) = self.data.set_state(high.into());
        let Ok(()) = self.clock.set_high();
        self.delay.delay_ns(self.timing.bit_settle_ns).await;
        let Ok(()) = self.clock.set_low();
        self.delay.delay_ns(self.timing.bit_settle_ns).await;
    }

    async fn pulse_latch(&mut self) {
        let Ok(()) = self.latch.set_high();
        self.delay.delay_ns(self.timing.latch_settle_ns).await;
        let Ok(()) = self.latch.set_low();
    }
}

impl<P, D> FrameBus for ShiftRegisterBus<P, D>
where
    P: OutputPin<Error = Infallible>,
    D: DelayNs,
{
    async fn transmit(&mut self, frame: Frame) {
        let bits = frame.bits();
        for index in (0..u64::BITS).rev() {
            self.shift_bit((bits >> index) & 1 == 1).await;
        }
        self.pulse_latch().await;
    }
}
