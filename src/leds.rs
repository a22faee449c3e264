//! The ambient LED strip, as seen from the rest of the clock: a command queue plus the
//! mode and color the strip should rest at.
//!
//! The strip driver itself (WS2812 timing, hue cycling) is a separate task that drains
//! [`LedLink::receive`].

use core::sync::atomic::{AtomicU8, AtomicU32, Ordering};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use embassy_time::{Duration, Timer};
use smart_leds::RGB8;

use crate::{Error, Result};

/// RGB color representation re-exported from `smart_leds`.
pub type Rgb = RGB8;

/// Commands that can wait for the strip driver. Further commands are dropped.
pub const LED_QUEUE_CAPACITY: usize = 10;

/// Spacing of [`LedCommand::SpectrumStep`]s while the strip is in spectrum mode.
pub const SPECTRUM_STEP_PERIOD: Duration = Duration::from_millis(40);
/// How often the mode is re-checked outside spectrum mode.
pub const MODE_POLL_PERIOD: Duration = Duration::from_millis(200);

/// Requests for the strip driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    /// Fill the strip with one color.
    SetColor(Rgb),
    /// Play the chase that accompanies the slot-machine roll, then restore the resting color.
    SlotMode,
    /// Advance the spectrum cycle by one step.
    SpectrumStep,
    /// Re-apply the resting color from RAM.
    ReloadConfig,
}

/// What the strip shows between effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    /// The stored color, unchanged.
    #[default]
    Static,
    /// A slow walk around the color wheel.
    Spectrum,
}

impl LedMode {
    /// Parses the `led_mode` setting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] for anything but `"static"` or `"spectrum"`.
    pub fn from_setting(value: &str) -> Result<Self> {
        match value.trim() {
            "static" => Ok(Self::Static),
            "spectrum" => Ok(Self::Spectrum),
            _ => Err(Error::InvalidSetting { key: "led_mode" }),
        }
    }

    #[must_use]
    pub const fn as_setting(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Spectrum => "spectrum",
        }
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Static => 0,
            Self::Spectrum => 1,
        }
    }

    const fn from_u8(value: u8) -> Self {
        if value == 1 { Self::Spectrum } else { Self::Static }
    }
}

type LedCommands = Channel<CriticalSectionRawMutex, LedCommand, LED_QUEUE_CAPACITY>;

/// Resources shared between the strip driver and its [`LedLink`] handles.
pub struct LedStatic {
    commands: LedCommands,
    mode: AtomicU8,
    // 0x00RRGGBB
    color: AtomicU32,
}

/// Handle for sending work to the LED strip driver.
#[derive(Clone, Copy)]
pub struct LedLink<'a>(&'a LedStatic);

impl<'a> LedLink<'a> {
    /// Create [`LedLink`] resources: static mode, strip dark.
    #[must_use]
    pub const fn new_static() -> LedStatic {
        LedStatic {
            commands: Channel::new(),
            mode: AtomicU8::new(0),
            color: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub const fn new(led_static: &'a LedStatic) -> Self {
        Self(led_static)
    }

    /// Queue a command without waiting; dropped if the driver is behind.
    pub fn send(&self, command: LedCommand) {
        if let Err(TrySendError::Full(_)) = self.0.commands.try_send(command) {
            warn!("LED queue full; dropping command");
        }
    }

    /// Next command for the strip driver.
    pub async fn receive(&self) -> LedCommand {
        self.0.commands.receive().await
    }

    /// Change the resting mode.
    pub fn set_mode(&self, mode: LedMode) {
        self.0.mode.store(mode.to_u8(), Ordering::Relaxed);
        info!("LED mode set to: {}", mode.as_setting());
    }

    #[must_use]
    pub fn mode(&self) -> LedMode {
        LedMode::from_u8(self.0.mode.load(Ordering::Relaxed))
    }

    /// Store the resting color; in static mode it is applied at once.
    pub fn set_color(&self, color: Rgb) {
        let packed = (u32::from(color.r) << 16) | (u32::from(color.g) << 8) | u32::from(color.b);
        self.0.color.store(packed, Ordering::Relaxed);
        if self.mode() == LedMode::Static {
            self.send(LedCommand::SetColor(color));
        }
    }

    /// The stored resting color.
    #[must_use]
    pub fn color(&self) -> Rgb {
        let packed = self.0.color.load(Ordering::Relaxed);
        let [_, r, g, b] = packed.to_be_bytes();
        Rgb { r, g, b }
    }
}

/// Drive the resting mode: step the spectrum while it is selected, and restore the stored
/// color once when it is left.
pub async fn run_mode_ticker(leds: LedLink<'_>) -> ! {
    info!("LED mode ticker started");
    let mut was_spectrum = false;
    loop {
        if leds.mode() == LedMode::Spectrum {
            leds.send(LedCommand::SpectrumStep);
            was_spectrum = true;
            Timer::after(SPECTRUM_STEP_PERIOD).await;
        } else {
            if was_spectrum {
                leds.send(LedCommand::ReloadConfig);
                was_spectrum = false;
            }
            Timer::after(MODE_POLL_PERIOD).await;
        }
    }
}
