use std::ops::Range;

use log::{debug, warn};
use serde::Serialize;

use super::backend::{AudioBackend, PlayRequest};
use super::clips::ClipTable;
use super::{AudioError, Result};

pub const CHANNEL_COUNT: usize = 9;
pub const SPEECH_CHANNEL: usize = 0;
pub const AMBIENT_CHANNEL: usize = 1;
pub const MUSIC_CHANNEL: usize = 2;
pub const CROSSFADE_CHANNEL: usize = CHANNEL_COUNT - 1;
/// Channels legacy sound requests compete for.
pub const GENERAL_CHANNELS: Range<usize> = 3..CROSSFADE_CHANNEL;

/// Sound number that stops every general purpose channel.
pub const STOP_ALL_SOUNDS: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelRole {
    Speech,
    Ambient,
    Music,
    General,
    Crossfade,
}

impl ChannelRole {
    pub fn of(channel: usize) -> Self {
        match channel {
            SPEECH_CHANNEL => ChannelRole::Speech,
            AMBIENT_CHANNEL => ChannelRole::Ambient,
            MUSIC_CHANNEL => ChannelRole::Music,
            CROSSFADE_CHANNEL => ChannelRole::Crossfade,
            _ => ChannelRole::General,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChannelState {
    #[default]
    Idle,
    Playing { clip: usize, priority: i32 },
}

/// Looping positional sound attached to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmbientSound {
    pub clip: usize,
    pub volume: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChannelSnapshot {
    pub index: usize,
    pub role: ChannelRole,
    #[serde(flatten)]
    pub state: ChannelState,
    pub clip_name: Option<String>,
    pub ambient: Option<AmbientSound>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Channel {
    state: ChannelState,
    ambient: Option<AmbientSound>,
}

struct Binding {
    clip: Option<usize>,
    priority: Option<i32>,
    volume: Option<i32>,
    repeat: Option<bool>,
    position: Option<(i32, i32)>,
}

impl Binding {
    fn clip(clip: Option<usize>) -> Self {
        Self {
            clip,
            priority: None,
            volume: None,
            repeat: None,
            position: None,
        }
    }
}

/// Fixed pool of playback channels and the policy deciding which request
/// gets one.
#[derive(Debug)]
pub struct AudioSystem {
    clips: ClipTable,
    channels: [Channel; CHANNEL_COUNT],
    backend: Box<dyn AudioBackend>,
    music_enabled: bool,
}

impl AudioSystem {
    pub fn new(clips: ClipTable, backend: Box<dyn AudioBackend>) -> Self {
        Self {
            clips,
            channels: [Channel::default(); CHANNEL_COUNT],
            backend,
            music_enabled: true,
        }
    }

    /// With music disabled, music requests are ignored and any current
    /// music stops.
    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
        if !enabled {
            self.stop(MUSIC_CHANNEL);
        }
    }

    pub fn clips(&self) -> &ClipTable {
        &self.clips
    }

    /// Play legacy sound `sound` on a general purpose channel.
    ///
    /// An idle channel is taken first. Otherwise the busy channel with the
    /// lowest priority is taken if `priority` is at least as high; ties go to
    /// the new sound. Returns `None` when the request is dropped, the sound
    /// does not exist, or `sound` is [`STOP_ALL_SOUNDS`].
    pub fn play_sound(&mut self, sound: i32, priority: i32) -> Option<usize> {
        if sound == STOP_ALL_SOUNDS {
            for channel in GENERAL_CHANNELS {
                self.stop(channel);
            }
            return None;
        }
        let clip = self.clips.sound(sound);
        self.place(clip, priority, sound)
    }

    /// Same arbitration as [`AudioSystem::play_sound`], for a clip id.
    pub fn play_clip(&mut self, clip: usize, priority: i32) -> Option<usize> {
        let known = (clip < self.clips.len()).then_some(clip);
        self.place(known, priority, clip as i32)
    }

    fn place(&mut self, clip: Option<usize>, priority: i32, requested: i32) -> Option<usize> {
        let Some(channel) = self.pick_channel(priority) else {
            debug!("no channel for sound {requested} at priority {priority}");
            return None;
        };
        let binding = Binding {
            priority: Some(priority),
            ..Binding::clip(clip)
        };
        self.bind(channel, binding, requested)
    }

    fn pick_channel(&self, priority: i32) -> Option<usize> {
        let mut lowest: Option<(usize, i32)> = None;
        for channel in GENERAL_CHANNELS {
            match self.live_state(channel) {
                ChannelState::Idle => return Some(channel),
                ChannelState::Playing { priority: busy, .. } => {
                    if lowest.map_or(true, |(_, current)| busy < current) {
                        lowest = Some((channel, busy));
                    }
                }
            }
        }
        let (channel, busy) = lowest?;
        (priority >= busy).then_some(channel)
    }

    /// Channel state with streams the backend has finished counted as idle.
    fn live_state(&self, channel: usize) -> ChannelState {
        match self.channels[channel].state {
            ChannelState::Playing { .. } if !self.backend.is_playing(channel) => {
                ChannelState::Idle
            }
            state => state,
        }
    }

    /// Stop `channel` (and its ambient sound), then start the binding on it.
    fn bind(&mut self, channel: usize, binding: Binding, requested: i32) -> Option<usize> {
        self.stop(channel);
        let Some(index) = binding.clip else {
            warn!("sound {requested} does not exist; channel {channel} left silent");
            return None;
        };
        let clip = self.clips.get(index)?;
        let priority = binding.priority.unwrap_or(clip.priority.into());
        let request = PlayRequest {
            clip,
            priority,
            volume: binding.volume.unwrap_or(clip.volume.into()),
            repeat: binding.repeat.unwrap_or(clip.repeat),
            position: binding.position,
        };
        if !self.backend.play(channel, &request) {
            warn!(
                "could not start {} ({}) on channel {channel}",
                clip.script_name, clip.file_name
            );
            return None;
        }
        self.channels[channel].state = ChannelState::Playing {
            clip: index,
            priority,
        };
        Some(channel)
    }

    fn stop(&mut self, channel: usize) -> bool {
        let slot = &mut self.channels[channel];
        slot.ambient = None;
        match std::mem::take(&mut slot.state) {
            ChannelState::Idle => false,
            ChannelState::Playing { .. } => {
                self.backend.stop(channel);
                true
            }
        }
    }

    fn check_channel(channel: usize) -> Result<()> {
        if channel >= CHANNEL_COUNT {
            return Err(AudioError::InvalidChannel { channel });
        }
        Ok(())
    }

    /// Play legacy sound `sound` on a specific channel, replacing whatever it
    /// was playing. Priority is the clip's default.
    pub fn play_on_channel(&mut self, sound: i32, channel: usize) -> Result<Option<usize>> {
        Self::check_channel(channel)?;
        let clip = self.clips.sound(sound);
        Ok(self.bind(channel, Binding::clip(clip), sound))
    }

    pub fn play_music(&mut self, music: i32) -> Option<usize> {
        if !self.music_enabled {
            debug!("music disabled, ignoring music {music}");
            return None;
        }
        let clip = self.clips.music(music);
        self.bind(MUSIC_CHANNEL, Binding::clip(clip), music)
    }

    pub fn stop_music(&mut self) -> bool {
        self.stop(MUSIC_CHANNEL)
    }

    pub fn stop_channel(&mut self, channel: usize) -> Result<bool> {
        Self::check_channel(channel)?;
        Ok(self.stop(channel))
    }

    /// Start a looping ambient sound on `channel`. Speech and crossfade
    /// channels cannot carry ambient sounds.
    pub fn play_ambient(
        &mut self,
        channel: usize,
        sound: i32,
        volume: i32,
        x: i32,
        y: i32,
    ) -> Result<Option<usize>> {
        Self::check_channel(channel)?;
        if matches!(
            ChannelRole::of(channel),
            ChannelRole::Speech | ChannelRole::Crossfade
        ) {
            return Err(AudioError::ReservedChannel { channel });
        }
        if !(0..=255).contains(&volume) {
            return Err(AudioError::InvalidVolume { volume });
        }
        let clip = self.clips.sound(sound);
        let binding = Binding {
            volume: Some(volume),
            repeat: Some(true),
            position: (x != 0 || y != 0).then_some((x, y)),
            ..Binding::clip(clip)
        };
        let bound = self.bind(channel, binding, sound);
        if let (Some(channel), Some(clip)) = (bound, clip) {
            self.channels[channel].ambient = Some(AmbientSound { clip, volume, x, y });
        }
        Ok(bound)
    }

    pub fn stop_ambient(&mut self, channel: usize) -> Result<bool> {
        Self::check_channel(channel)?;
        if self.channels[channel].ambient.is_none() {
            return Ok(false);
        }
        Ok(self.stop(channel))
    }

    pub fn channel_state(&self, channel: usize) -> Option<ChannelState> {
        (channel < CHANNEL_COUNT).then(|| self.channels[channel].state)
    }

    pub fn ambient(&self, channel: usize) -> Option<AmbientSound> {
        self.channels.get(channel)?.ambient
    }

    pub fn is_playing(&self, channel: usize) -> bool {
        channel < CHANNEL_COUNT
            && matches!(self.live_state(channel), ChannelState::Playing { .. })
    }

    /// Mark channels whose stream ended as idle. Returns the channels reaped.
    pub fn update(&mut self) -> Vec<usize> {
        let mut reaped = Vec::new();
        for channel in 0..CHANNEL_COUNT {
            let slot = &mut self.channels[channel];
            if matches!(slot.state, ChannelState::Playing { .. })
                && !self.backend.is_playing(channel)
            {
                slot.state = ChannelState::Idle;
                slot.ambient = None;
                reaped.push(channel);
            }
        }
        reaped
    }

    pub fn snapshot(&self) -> Vec<ChannelSnapshot> {
        self.channels
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                let clip_name = match slot.state {
                    ChannelState::Playing { clip, .. } => {
                        self.clips.get(clip).map(|clip| clip.script_name.clone())
                    }
                    ChannelState::Idle => None,
                };
                ChannelSnapshot {
                    index,
                    role: ChannelRole::of(index),
                    state: slot.state,
                    clip_name,
                    ambient: slot.ambient,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use ags_formats::game::Bundling;

    use super::*;
    use crate::audio::{AudioEvent, RecordingBackend};

    fn system() -> (AudioSystem, RecordingBackend) {
        let names: Vec<String> = (1..=9)
            .map(|n| format!("sound{n}.wav"))
            .chain(["music1.ogg".to_string()])
            .collect();
        let clips = ClipTable::enumerate_legacy(
            names
                .iter()
                .map(|name| (name.as_str(), Bundling::InGameArchive)),
        );
        let backend = RecordingBackend::new();
        (AudioSystem::new(clips, Box::new(backend.clone())), backend)
    }

    fn priority_of(system: &AudioSystem, channel: usize) -> Option<i32> {
        match system.channel_state(channel)? {
            ChannelState::Playing { priority, .. } => Some(priority),
            ChannelState::Idle => None,
        }
    }

    /// Fill the general channels with priorities 10, 20, 30, 40, 50.
    fn busy_system() -> (AudioSystem, RecordingBackend) {
        let (mut system, backend) = system();
        for (sound, priority) in (1..=5).zip([10, 20, 30, 40, 50]) {
            assert_eq!(
                system.play_sound(sound, priority),
                Some(GENERAL_CHANNELS.start + sound as usize - 1)
            );
        }
        (system, backend)
    }

    #[test]
    fn idle_channels_are_taken_in_order() {
        let (mut system, _) = system();
        assert_eq!(system.play_sound(1, 10), Some(3));
        assert_eq!(system.play_sound(2, 1), Some(4));
        assert_eq!(system.channel_state(SPEECH_CHANNEL), Some(ChannelState::Idle));
        assert_eq!(system.channel_state(MUSIC_CHANNEL), Some(ChannelState::Idle));
        assert_eq!(
            system.channel_state(CROSSFADE_CHANNEL),
            Some(ChannelState::Idle)
        );
    }

    #[test]
    fn higher_priority_evicts_the_lowest_busy_channel() {
        let (mut system, backend) = busy_system();
        assert_eq!(system.play_sound(6, 35), Some(3));
        assert_eq!(priority_of(&system, 3), Some(35));
        for (channel, priority) in (4..8).zip([20, 30, 40, 50]) {
            assert_eq!(priority_of(&system, channel), Some(priority));
        }
        let events = backend.events();
        assert_eq!(
            &events[events.len() - 2..],
            &[
                AudioEvent::Stop { channel: 3 },
                AudioEvent::Play {
                    channel: 3,
                    clip: "aSound6".into(),
                    file: "sound6.wav".into(),
                    priority: 35,
                    volume: 100,
                    repeat: false,
                    position: None,
                },
            ]
        );
    }

    #[test]
    fn lower_priority_is_dropped() {
        let (mut system, backend) = busy_system();
        let before = backend.events().len();
        assert_eq!(system.play_sound(6, 5), None);
        assert_eq!(backend.events().len(), before);
        for (channel, priority) in (3..8).zip([10, 20, 30, 40, 50]) {
            assert_eq!(priority_of(&system, channel), Some(priority));
        }
    }

    #[test]
    fn equal_priority_evicts() {
        let (mut system, _) = busy_system();
        assert_eq!(system.play_sound(6, 10), Some(3));
        assert_eq!(
            system.channel_state(3),
            Some(ChannelState::Playing {
                clip: system.clips().sound(6).unwrap(),
                priority: 10
            })
        );
    }

    #[test]
    fn stop_all_clears_general_channels_only() {
        let (mut system, _) = busy_system();
        assert_eq!(system.play_music(1), Some(MUSIC_CHANNEL));
        assert_eq!(system.play_sound(STOP_ALL_SOUNDS, 100), None);
        for channel in GENERAL_CHANNELS {
            assert_eq!(system.channel_state(channel), Some(ChannelState::Idle));
        }
        assert!(system.is_playing(MUSIC_CHANNEL));
    }

    #[test]
    fn unknown_sound_silences_the_chosen_channel() {
        let (mut system, _) = busy_system();
        system.play_ambient(3, 1, 200, 0, 0).unwrap();
        assert!(system.ambient(3).is_some());
        // channel 3 is now the ambient one at the clip's own priority (10)
        assert_eq!(system.play_sound(99, 10), None);
        assert_eq!(system.channel_state(3), Some(ChannelState::Idle));
        assert_eq!(system.ambient(3), None);
    }

    #[test]
    fn finished_streams_free_their_channel() {
        let (mut system, backend) = busy_system();
        backend.finish(5);
        // the finished channel counts as idle even before update
        assert_eq!(system.play_sound(6, 1), Some(5));
        backend.finish(4);
        assert_eq!(system.update(), vec![4]);
        assert_eq!(system.channel_state(4), Some(ChannelState::Idle));
    }

    #[test]
    fn unreadable_clip_fails_the_bind() {
        let (mut system, backend) = system();
        backend.make_unreadable("sound2.wav");
        assert_eq!(system.play_sound(2, 10), None);
        assert_eq!(system.channel_state(3), Some(ChannelState::Idle));
        assert_eq!(system.play_sound(1, 10), Some(3));
    }

    #[test]
    fn ambient_sounds_loop_at_a_position() {
        let (mut system, backend) = system();
        assert_eq!(system.play_ambient(AMBIENT_CHANNEL, 4, 180, 120, 90), Ok(Some(1)));
        assert_eq!(
            system.ambient(AMBIENT_CHANNEL),
            Some(AmbientSound {
                clip: system.clips().sound(4).unwrap(),
                volume: 180,
                x: 120,
                y: 90
            })
        );
        assert!(matches!(
            backend.events().last(),
            Some(AudioEvent::Play {
                repeat: true,
                position: Some((120, 90)),
                volume: 180,
                ..
            })
        ));
        assert_eq!(system.stop_ambient(AMBIENT_CHANNEL), Ok(true));
        assert_eq!(system.stop_ambient(AMBIENT_CHANNEL), Ok(false));
        assert_eq!(
            system.play_ambient(SPEECH_CHANNEL, 4, 100, 0, 0),
            Err(AudioError::ReservedChannel { channel: 0 })
        );
        assert_eq!(
            system.play_ambient(2, 4, 300, 0, 0),
            Err(AudioError::InvalidVolume { volume: 300 })
        );
    }

    #[test]
    fn explicit_channels_are_validated() {
        let (mut system, _) = system();
        assert_eq!(
            system.play_on_channel(1, CHANNEL_COUNT),
            Err(AudioError::InvalidChannel { channel: 9 })
        );
        assert_eq!(system.play_on_channel(1, SPEECH_CHANNEL), Ok(Some(0)));
        assert_eq!(system.stop_channel(SPEECH_CHANNEL), Ok(true));
        assert_eq!(system.stop_channel(SPEECH_CHANNEL), Ok(false));
    }

    #[test]
    fn disabled_music_is_ignored() {
        let (mut system, backend) = system();
        assert_eq!(system.play_music(1), Some(MUSIC_CHANNEL));
        system.set_music_enabled(false);
        assert!(!system.is_playing(MUSIC_CHANNEL));
        let before = backend.events().len();
        assert_eq!(system.play_music(1), None);
        assert_eq!(backend.events().len(), before);
        // sounds are unaffected
        assert_eq!(system.play_sound(1, 10), Some(3));
    }

    #[test]
    fn snapshot_names_roles_and_clips() {
        let (mut system, _) = system();
        system.play_music(1);
        let snapshot = system.snapshot();
        assert_eq!(snapshot.len(), CHANNEL_COUNT);
        assert_eq!(snapshot[MUSIC_CHANNEL].role, ChannelRole::Music);
        assert_eq!(snapshot[MUSIC_CHANNEL].clip_name.as_deref(), Some("aMusic1"));
        assert_eq!(snapshot[CROSSFADE_CHANNEL].role, ChannelRole::Crossfade);
        let json = serde_json::to_value(&snapshot[MUSIC_CHANNEL]).unwrap();
        assert_eq!(json["state"], "playing");
    }
}
