use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// The display core never fails; these errors come from the configuration boundary
/// and from spawning device tasks on the board.
#[derive(Debug, Display, Error)]
pub enum Error {
    // `#[error(not(source))]` below tells `derive_more` that `embassy_executor::SpawnError` does
    // not implement Rust's `core::error::Error` trait.
    /// An embassy task could not be spawned (its pool is exhausted).
    #[cfg(feature = "pico1")]
    #[display("{_0:?}")]
    TaskSpawn(#[error(not(source))] embassy_executor::SpawnError),

    /// A known setting was given a value it cannot hold.
    #[display("invalid value for setting {key:?}")]
    InvalidSetting { key: &'static str },

    /// A setting key or value is longer than the store can hold.
    #[display("setting key or value too long")]
    SettingTooLong,

    /// The settings store has no room for another key.
    #[display("settings store is full")]
    SettingsFull,
}

#[cfg(feature = "pico1")]
impl From<embassy_executor::SpawnError> for Error {
    fn from(err: embassy_executor::SpawnError) -> Self {
        Self::TaskSpawn(err)
    }
}
