//! In-RAM key/value settings, seeded with the clock's factory defaults.
//!
//! Persisting these is the storage collaborator's job; this module only defines the lookup
//! contract ([`ConfigLookup`]) and a fixed-capacity store that satisfies it.

use heapless::{LinearMap, String};

use crate::{Error, Result};

/// Longest setting key, in bytes.
pub const KEY_CAPACITY: usize = 24;
/// Longest setting value, in bytes.
pub const VALUE_CAPACITY: usize = 32;
/// Most settings the store can hold.
pub const SETTINGS_CAPACITY: usize = 16;

/// Factory defaults written on first boot.
pub const DEFAULTS: [(&str, &str); 10] = [
    ("ntp", "pool.ntp.org"),
    ("colon", "1"),
    ("city", "Los Angeles"),
    ("timezone", "PST8PDT,M3.2.0,M11.1.0"),
    ("time_fmt", "1"),
    ("utc_offset_minutes", "0"),
    ("led_mode", "static"),
    ("r", "0"),
    ("g", "0"),
    ("b", "0"),
];

/// Read access to configuration by key.
pub trait ConfigLookup {
    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<&str>;
}

type Key = String<KEY_CAPACITY>;
type Value = String<VALUE_CAPACITY>;

/// Fixed-capacity settings store.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    entries: LinearMap<Key, Value, SETTINGS_CAPACITY>,
}

impl Settings {
    /// An empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: LinearMap::new(),
        }
    }

    /// A store holding [`DEFAULTS`].
    ///
    /// # Errors
    ///
    /// Only if the capacities above are too small for the defaults.
    pub fn with_defaults() -> Result<Self> {
        let mut settings = Self::new();
        for (key, value) in DEFAULTS {
            settings.set(key, value)?;
        }
        Ok(settings)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SettingTooLong`] if either string exceeds its capacity and
    /// [`Error::SettingsFull`] if `key` is new and the store is full.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = Key::try_from(key).map_err(|()| Error::SettingTooLong)?;
        let value = Value::try_from(value).map_err(|()| Error::SettingTooLong)?;
        self.entries
            .insert(key, value)
            .map_err(|_| Error::SettingsFull)?;
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl ConfigLookup for Settings {
    fn get(&self, key: &str) -> Option<&str> {
        self.iter()
            .find(|(stored, _)| *stored == key)
            .map(|(_, value)| value)
    }
}
