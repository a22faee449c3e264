//! Sound cues for the audio playback collaborator.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// The clips stored on the clock's filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sound {
    HitMe,
    /// The hourly chime.
    GoodFoot,
}

impl Sound {
    /// File name of the clip, relative to the audio mount point.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::HitMe => "HitMe.mp3",
            Self::GoodFoot => "GetOnGoodFoot.mp3",
        }
    }
}

/// Signal type used to cue the audio player. A newer cue replaces one not yet taken.
pub type AudioCue = Signal<CriticalSectionRawMutex, Sound>;

/// Handle for cueing sounds.
#[derive(Clone, Copy)]
pub struct AudioLink<'a>(&'a AudioCue);

impl<'a> AudioLink<'a> {
    /// Create [`AudioLink`] resources.
    #[must_use]
    pub const fn new_static() -> AudioCue {
        Signal::new()
    }

    #[must_use]
    pub const fn new(cue: &'a AudioCue) -> Self {
        Self(cue)
    }

    /// Ask the player to start `sound`. Returns immediately.
    pub fn play(&self, sound: Sound) {
        debug!("Audio cue: {}", sound.file_name());
        self.0.signal(sound);
    }

    /// Wait for the next cue. Used by the audio player task.
    pub async fn wait(&self) -> Sound {
        self.0.wait().await
    }

    /// Take a pending cue without waiting.
    #[must_use]
    pub fn try_take(&self) -> Option<Sound> {
        self.0.try_take()
    }
}
