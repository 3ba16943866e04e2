use std::collections::BTreeSet;
use std::fmt;
use std::{cell::RefCell, rc::Rc};

use ags_formats::game::AudioClipInfo;
use serde::Serialize;

/// What the channel pool asks the mixer to start.
#[derive(Debug, Clone, Copy)]
pub struct PlayRequest<'a> {
    pub clip: &'a AudioClipInfo,
    pub priority: i32,
    pub volume: i32,
    pub repeat: bool,
    /// Room position of an ambient sound.
    pub position: Option<(i32, i32)>,
}

/// Boundary to the mixer that decodes and outputs streams.
pub trait AudioBackend {
    /// Start a stream on `channel`. Returns false when the clip's data
    /// cannot be opened.
    fn play(&self, _channel: usize, _request: &PlayRequest<'_>) -> bool {
        true
    }
    fn stop(&self, _channel: usize) {}
    /// Whether the stream last started on `channel` is still running.
    fn is_playing(&self, _channel: usize) -> bool {
        true
    }
}

impl fmt::Debug for dyn AudioBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AudioBackend")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioEvent {
    Play {
        channel: usize,
        clip: String,
        file: String,
        priority: i32,
        volume: i32,
        repeat: bool,
        position: Option<(i32, i32)>,
    },
    Stop {
        channel: usize,
    },
}

#[derive(Debug, Default)]
struct RecordingState {
    events: Vec<AudioEvent>,
    finished: BTreeSet<usize>,
    unreadable: BTreeSet<String>,
}

/// Backend that plays nothing and records what it was asked to do.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    state: Rc<RefCell<RecordingState>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AudioEvent> {
        self.state.borrow().events.clone()
    }

    /// Make the stream on `channel` report that it ended.
    pub fn finish(&self, channel: usize) {
        self.state.borrow_mut().finished.insert(channel);
    }

    /// Make every later attempt to play `file_name` fail.
    pub fn make_unreadable(&self, file_name: &str) {
        self.state
            .borrow_mut()
            .unreadable
            .insert(file_name.to_ascii_lowercase());
    }
}

impl AudioBackend for RecordingBackend {
    fn play(&self, channel: usize, request: &PlayRequest<'_>) -> bool {
        let mut state = self.state.borrow_mut();
        if state
            .unreadable
            .contains(&request.clip.file_name.to_ascii_lowercase())
        {
            return false;
        }
        state.finished.remove(&channel);
        state.events.push(AudioEvent::Play {
            channel,
            clip: request.clip.script_name.clone(),
            file: request.clip.file_name.clone(),
            priority: request.priority,
            volume: request.volume,
            repeat: request.repeat,
            position: request.position,
        });
        true
    }

    fn stop(&self, channel: usize) {
        self.state
            .borrow_mut()
            .events
            .push(AudioEvent::Stop { channel });
    }

    fn is_playing(&self, channel: usize) -> bool {
        !self.state.borrow().finished.contains(&channel)
    }
}

#[cfg(test)]
mod tests {
    use ags_formats::game::{AudioFileType, Bundling};

    use super::*;

    fn clip() -> AudioClipInfo {
        AudioClipInfo {
            id: 0,
            script_name: "aSound1".into(),
            file_name: "sound1.wav".into(),
            bundling: Bundling::InGameArchive,
            clip_type: 3,
            file_type: AudioFileType::Wav,
            repeat: false,
            priority: 10,
            volume: 100,
        }
    }

    #[test]
    fn recording_backend_tracks_audio_events() {
        let backend = RecordingBackend::new();
        let clip = clip();
        let request = PlayRequest {
            clip: &clip,
            priority: 10,
            volume: 100,
            repeat: false,
            position: None,
        };
        assert!(backend.play(3, &request));
        assert!(backend.is_playing(3));
        backend.finish(3);
        assert!(!backend.is_playing(3));
        backend.stop(3);

        assert_eq!(
            backend.events(),
            vec![
                AudioEvent::Play {
                    channel: 3,
                    clip: "aSound1".into(),
                    file: "sound1.wav".into(),
                    priority: 10,
                    volume: 100,
                    repeat: false,
                    position: None,
                },
                AudioEvent::Stop { channel: 3 },
            ]
        );
    }

    #[test]
    fn unreadable_files_fail_to_start() {
        let backend = RecordingBackend::new();
        backend.make_unreadable("SOUND1.WAV");
        let clip = clip();
        let request = PlayRequest {
            clip: &clip,
            priority: 10,
            volume: 100,
            repeat: false,
            position: None,
        };
        assert!(!backend.play(4, &request));
        assert!(backend.events().is_empty());
    }
}
