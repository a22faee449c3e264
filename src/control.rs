//! The calls the HTTP control server makes into the clock.
//!
//! Routing and request parsing live with the server. This module validates a setting,
//! stores it, and pushes the new value to whichever device owns it.

use crate::clock::WallClock;
use crate::leds::{LedCommand, LedLink, LedMode, Rgb};
use crate::settings::{ConfigLookup, Settings};
use crate::time_format::TimeFormat;
use crate::triggers::EffectTrigger;
use crate::{Error, Result};

/// Control-surface handle over the display, the clock, the LED strip and audio.
#[derive(Clone, Copy)]
pub struct Control<'a> {
    trigger: EffectTrigger<'a>,
    leds: LedLink<'a>,
    clock: &'a WallClock,
}

impl<'a> Control<'a> {
    #[must_use]
    pub const fn new(trigger: EffectTrigger<'a>, leds: LedLink<'a>, clock: &'a WallClock) -> Self {
        Self {
            trigger,
            leds,
            clock,
        }
    }

    /// Bring RAM state in line with stored configuration. Called at boot.
    ///
    /// Missing or unparsable keys keep their current value; a warning is logged for the latter.
    pub fn load(&self, config: &impl ConfigLookup) {
        for key in ["time_fmt", "colon", "led_mode", "utc_offset_minutes"] {
            if let Some(value) = config.get(key)
                && self.apply(key, value).is_err()
            {
                warn!("Ignoring stored {}: {}", key, value);
            }
        }
        if let Some(color) = stored_color(config) {
            self.leds.set_color(color);
        }
    }

    /// Validate, store and apply one setting.
    ///
    /// Keys the clock does not act on (such as `ntp` or `city`) are stored as given.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSetting`] if the value does not parse for its key (nothing is stored),
    /// or a storage error from [`Settings::set`].
    pub fn update_setting(&self, settings: &mut Settings, key: &str, value: &str) -> Result<()> {
        validate(key, value)?;
        settings.set(key, value)?;
        self.apply(key, value)?;
        if matches!(key, "r" | "g" | "b")
            && let Some(color) = stored_color(settings)
        {
            self.leds.set_color(color);
        }
        self.leds.send(LedCommand::ReloadConfig);
        Ok(())
    }

    /// Change the LED resting mode without storing it (the `/led_mode?mode=` request).
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSetting`] for an unknown mode.
    pub fn set_led_mode(&self, mode: &str) -> Result<()> {
        self.leds.set_mode(LedMode::from_setting(mode)?);
        Ok(())
    }

    /// Run the slot-machine effect with lights and sound.
    pub fn trigger_effect(&self) {
        self.trigger.slot_machine_with_fanout();
    }

    fn apply(&self, key: &str, value: &str) -> Result<()> {
        match key {
            "time_fmt" => self.trigger.nixie().set_format(TimeFormat::from_setting(value)?),
            "colon" => self
                .trigger
                .nixie()
                .set_separator_enabled(parse_flag("colon", value)?),
            "led_mode" => self.leds.set_mode(LedMode::from_setting(value)?),
            "utc_offset_minutes" => self.clock.set_offset_minutes(parse_utc_offset(value)?),
            _ => {}
        }
        Ok(())
    }
}

fn validate(key: &str, value: &str) -> Result<()> {
    match key {
        "time_fmt" => TimeFormat::from_setting(value).map(drop),
        "colon" => parse_flag("colon", value).map(drop),
        "led_mode" => LedMode::from_setting(value).map(drop),
        "r" => parse_channel("r", value).map(drop),
        "g" => parse_channel("g", value).map(drop),
        "b" => parse_channel("b", value).map(drop),
        "utc_offset_minutes" => parse_utc_offset(value).map(drop),
        _ => Ok(()),
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool> {
    match value.trim() {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(Error::InvalidSetting { key }),
    }
}

fn parse_channel(key: &'static str, value: &str) -> Result<u8> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidSetting { key })
}

/// Minutes east of UTC, limited to the offsets in use worldwide.
///
/// # Errors
///
/// [`Error::InvalidSetting`] if `value` is not an integer in -720..=840.
pub fn parse_utc_offset(value: &str) -> Result<i32> {
    const MIN_OFFSET_MINUTES: i32 = -12 * 60;
    const MAX_OFFSET_MINUTES: i32 = 14 * 60;
    value
        .trim()
        .parse()
        .ok()
        .filter(|minutes| (MIN_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(minutes))
        .ok_or(Error::InvalidSetting {
            key: "utc_offset_minutes",
        })
}

fn stored_color(config: &impl ConfigLookup) -> Option<Rgb> {
    let channel = |key: &'static str| config.get(key).and_then(|v| parse_channel(key, v).ok());
    Some(Rgb {
        r: channel("r")?,
        g: channel("g")?,
        b: channel("b")?,
    })
}
