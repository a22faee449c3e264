//! 12-hour / 24-hour display preference and the atomic cell that shares it across tasks.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::{Error, Result};

/// How hours are shown on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeFormat {
    /// 1 through 12.
    Twelve,
    /// 0 through 23.
    #[default]
    TwentyFour,
}

impl TimeFormat {
    /// Maps a 0–23 hour to the value shown in this format.
    ///
    /// In 12-hour mode midnight and noon both read 12.
    #[must_use]
    pub const fn display_hours(self, hours: u8) -> u8 {
        match self {
            Self::TwentyFour => hours,
            Self::Twelve => match hours % 12 {
                0 => 12,
                hours => hours,
            },
        }
    }

    /// Parses the `time_fmt` setting: `"0"` is 12-hour, `"1"` is 24-hour.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSetting`] for any other value.
    pub fn from_setting(value: &str) -> Result<Self> {
        match value.trim() {
            "0" => Ok(Self::Twelve),
            "1" => Ok(Self::TwentyFour),
            _ => Err(Error::InvalidSetting { key: "time_fmt" }),
        }
    }

    /// The `time_fmt` setting value for this format.
    #[must_use]
    pub const fn as_setting(self) -> &'static str {
        match self {
            Self::Twelve => "0",
            Self::TwentyFour => "1",
        }
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Twelve => 12,
            Self::TwentyFour => 24,
        }
    }

    const fn from_u8(value: u8) -> Self {
        if value == 12 {
            Self::Twelve
        } else {
            Self::TwentyFour
        }
    }
}

/// A [`TimeFormat`] stored in a single atomic byte.
///
/// Written by the control surface, read by the display task on every render. A reader sees
/// either the old or the new format, never a mix.
pub struct TimeFormatCell(AtomicU8);

impl TimeFormatCell {
    #[must_use]
    pub const fn new(format: TimeFormat) -> Self {
        Self(AtomicU8::new(format.to_u8()))
    }

    pub fn set(&self, format: TimeFormat) {
        self.0.store(format.to_u8(), Ordering::Relaxed);
    }

    #[must_use]
    pub fn get(&self) -> TimeFormat {
        TimeFormat::from_u8(self.0.load(Ordering::Relaxed))
    }
}
