//! Wall-clock time as the display sees it.
//!
//! The display only ever asks "what time is it now?" through [`TimeSource`]. On the board that
//! question is answered by [`WallClock`], which the network time collaborator keeps in sync via
//! [`WallClock::set_time`].

use core::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use embassy_time::{Duration, Instant};
use time::{OffsetDateTime, UtcOffset};

use crate::unix_seconds::UnixSeconds;

/// Duration representing one second.
pub const ONE_SECOND: Duration = Duration::from_secs(1);
/// Duration representing one hour.
pub const ONE_HOUR: Duration = Duration::from_secs(60 * 60);

/// Hour, minute and second of the local time of day. Read fresh for every render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeSample {
    /// 0–23
    pub hours: u8,
    /// 0–59
    pub minutes: u8,
    /// 0–59
    pub seconds: u8,
}

impl TimeSample {
    #[must_use]
    pub const fn new(hours: u8, minutes: u8, seconds: u8) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

impl From<&OffsetDateTime> for TimeSample {
    fn from(dt: &OffsetDateTime) -> Self {
        let (hours, minutes, seconds) = dt.to_hms();
        Self::new(hours, minutes, seconds)
    }
}

/// Anything that can report the current local time of day.
pub trait TimeSource {
    fn now(&self) -> TimeSample;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> TimeSample {
        (**self).now()
    }
}

/// Boot-relative wall clock.
///
/// Stores the Unix time at which the processor booted and adds [`Instant::now()`] to it. All
/// state is atomic so the clock can live in a `static` shared by the display task and the time
/// sync collaborator.
///
/// # Example
///
/// ```
/// use nixie_clock::clock::{TimeSource, WallClock};
/// use nixie_clock::unix_seconds::UnixSeconds;
///
/// static CLOCK: WallClock = WallClock::new();
///
/// // Not yet synced: reads midnight.
/// assert!(!CLOCK.is_set());
///
/// // 2024-01-01 12:34:56 UTC, shown one hour east of UTC.
/// CLOCK.set_offset_minutes(60);
/// CLOCK.set_time(UnixSeconds(1_704_112_496));
/// assert_eq!(CLOCK.now().hours, 13);
/// ```
pub struct WallClock {
    // Unix seconds when the processor booted (0 = not set)
    boot_unix_seconds: AtomicU32,
    offset_minutes: AtomicI32,
}

impl WallClock {
    /// Create an unsynced clock at UTC.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            boot_unix_seconds: AtomicU32::new(0),
            offset_minutes: AtomicI32::new(0),
        }
    }

    /// Set the current time from a Unix timestamp.
    pub fn set_time(&self, unix_seconds: UnixSeconds) {
        // boot_time = ntp_time - uptime
        let uptime_secs = i64::try_from(Instant::now().as_secs()).unwrap_or(i64::MAX);
        let boot_unix = unix_seconds.as_i64().saturating_sub(uptime_secs);
        let boot_unix = u32::try_from(boot_unix).unwrap_or(0).max(1);
        self.boot_unix_seconds.store(boot_unix, Ordering::Relaxed);
        info!(
            "Clock time set: {} (boot time: {})",
            unix_seconds.as_i64(),
            boot_unix
        );
    }

    /// Update the UTC offset used for local time.
    pub fn set_offset_minutes(&self, minutes: i32) {
        self.offset_minutes.store(minutes, Ordering::Relaxed);
        info!("Clock UTC offset updated to {} minutes", minutes);
    }

    /// Get the current UTC offset in minutes.
    #[must_use]
    pub fn offset_minutes(&self) -> i32 {
        self.offset_minutes.load(Ordering::Relaxed)
    }

    /// Whether [`set_time`](Self::set_time) has been called.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.boot_unix_seconds.load(Ordering::Relaxed) != 0
    }

    /// Get the current local date and time. Before the first sync this is midnight, 1970-01-01.
    #[must_use]
    pub fn now_datetime(&self) -> OffsetDateTime {
        let boot_unix = self.boot_unix_seconds.load(Ordering::Relaxed);
        if boot_unix == 0 {
            return OffsetDateTime::UNIX_EPOCH;
        }

        let elapsed_secs = i64::try_from(Instant::now().as_secs()).unwrap_or(i64::MAX);
        let unix_seconds = UnixSeconds(i64::from(boot_unix).saturating_add(elapsed_secs));
        let offset = UtcOffset::from_whole_seconds(self.offset_minutes().saturating_mul(60))
            .unwrap_or(UtcOffset::UTC);

        unix_seconds
            .to_offset_datetime(offset)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> TimeSample {
        TimeSample::from(&self.now_datetime())
    }
}
