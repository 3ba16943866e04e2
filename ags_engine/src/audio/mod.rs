//! Clip metadata and the fixed channel pool.

pub mod backend;
pub mod channels;
pub mod clips;

use thiserror::Error;

pub use backend::{AudioBackend, AudioEvent, PlayRequest, RecordingBackend};
pub use channels::{
    AmbientSound, AudioSystem, ChannelRole, ChannelSnapshot, ChannelState, AMBIENT_CHANNEL,
    CHANNEL_COUNT, CROSSFADE_CHANNEL, GENERAL_CHANNELS, MUSIC_CHANNEL, SPEECH_CHANNEL,
    STOP_ALL_SOUNDS,
};
pub use clips::ClipTable;

pub type Result<T> = std::result::Result<T, AudioError>;

/// Caller mistakes. A missing or unplayable clip is not one of them: those
/// requests are logged and return no channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("channel {channel} does not exist")]
    InvalidChannel { channel: usize },

    #[error("channel {channel} cannot carry an ambient sound")]
    ReservedChannel { channel: usize },

    #[error("volume {volume} is outside 0..=255")]
    InvalidVolume { volume: i32 },
}
