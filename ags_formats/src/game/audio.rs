use serde::Serialize;

use crate::error::Result;
use crate::reader::Cursor;
use crate::writer::Writer;

pub const AUDIO_CLIP_TYPE_SIZE: usize = 20;
pub const AUDIO_CLIP_SIZE: usize = 64;
const SCRIPT_NAME_LEN: usize = 30;
const FILE_NAME_LEN: usize = 15;

pub mod offsets {
    pub const ID: u32 = 0;
    pub const SCRIPT_NAME: u32 = 4;
    pub const FILE_NAME: u32 = 34;
    pub const BUNDLING: u32 = 49;
    pub const TYPE: u32 = 50;
    pub const FILE_TYPE: u32 = 51;
    pub const REPEAT: u32 = 52;
    pub const PRIORITY: u32 = 54;
    pub const VOLUME: u32 = 56;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFileType {
    Ogg,
    Mp3,
    Wav,
    Voc,
    Midi,
    Mod,
    Unknown(u8),
}

impl AudioFileType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => AudioFileType::Ogg,
            2 => AudioFileType::Mp3,
            3 => AudioFileType::Wav,
            4 => AudioFileType::Voc,
            5 => AudioFileType::Midi,
            6 => AudioFileType::Mod,
            other => AudioFileType::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            AudioFileType::Ogg => 1,
            AudioFileType::Mp3 => 2,
            AudioFileType::Wav => 3,
            AudioFileType::Voc => 4,
            AudioFileType::Midi => 5,
            AudioFileType::Mod => 6,
            AudioFileType::Unknown(other) => other,
        }
    }

    /// Guess the type from a file extension, as done for games that predate
    /// the clip table.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Some(match ext.to_ascii_lowercase().as_str() {
            "ogg" => AudioFileType::Ogg,
            "mp3" => AudioFileType::Mp3,
            "wav" => AudioFileType::Wav,
            "voc" => AudioFileType::Voc,
            "mid" | "midi" => AudioFileType::Midi,
            "mod" | "xm" | "s3m" | "it" => AudioFileType::Mod,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bundling {
    InGameArchive,
    InAudioVox,
    Other(u8),
}

impl Bundling {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Bundling::InGameArchive,
            2 => Bundling::InAudioVox,
            other => Bundling::Other(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            Bundling::InGameArchive => 1,
            Bundling::InAudioVox => 2,
            Bundling::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AudioClipType {
    pub id: i32,
    pub reserved_channels: i32,
    pub volume_reduction_while_speech: i32,
    pub crossfade_speed: i32,
}

impl AudioClipType {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let clip_type = Self {
            id: cursor.read_i32()?,
            reserved_channels: cursor.read_i32()?,
            volume_reduction_while_speech: cursor.read_i32()?,
            crossfade_speed: cursor.read_i32()?,
        };
        cursor.skip(4)?;
        Ok(clip_type)
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i32(self.id)
            .i32(self.reserved_channels)
            .i32(self.volume_reduction_while_speech)
            .i32(self.crossfade_speed)
            .i32(0);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioClipInfo {
    pub id: i32,
    pub script_name: String,
    pub file_name: String,
    pub bundling: Bundling,
    pub clip_type: u8,
    pub file_type: AudioFileType,
    pub repeat: bool,
    pub priority: i16,
    pub volume: i16,
}

impl AudioClipInfo {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        let id = cursor.read_i32()?;
        let script_name = cursor.read_fixed_string(SCRIPT_NAME_LEN)?;
        let file_name = cursor.read_fixed_string(FILE_NAME_LEN)?;
        let bundling = Bundling::from_raw(cursor.read_u8()?);
        let clip_type = cursor.read_u8()?;
        let file_type = AudioFileType::from_raw(cursor.read_u8()?);
        let repeat = cursor.read_u8()? != 0;
        cursor.skip(1)?;
        let priority = cursor.read_i16()?;
        let volume = cursor.read_i16()?;
        cursor.skip(2 + 4)?;
        Ok(Self {
            id,
            script_name,
            file_name,
            bundling,
            clip_type,
            file_type,
            repeat,
            priority,
            volume,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i32(self.id)
            .fixed_str(&self.script_name, SCRIPT_NAME_LEN)
            .fixed_str(&self.file_name, FILE_NAME_LEN)
            .u8(self.bundling.raw())
            .u8(self.clip_type)
            .u8(self.file_type.raw())
            .u8(self.repeat as u8)
            .zeros(1)
            .i16(self.priority)
            .i16(self.volume)
            .zeros(2 + 4);
    }
}

/// Clip types, clips and the score sound of a 3.2+ game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTables {
    pub clip_types: Vec<AudioClipType>,
    pub clips: Vec<AudioClipInfo>,
    pub score_clip: i32,
}

impl Default for AudioTables {
    fn default() -> Self {
        Self {
            clip_types: Vec::new(),
            clips: Vec::new(),
            score_clip: -1,
        }
    }
}

impl AudioTables {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.enter("audio clip types");
        let type_count = cursor.read_count()?;
        cursor.expect_records(type_count, AUDIO_CLIP_TYPE_SIZE)?;
        let clip_types = (0..type_count)
            .map(|_| AudioClipType::read(cursor))
            .collect::<Result<_>>()?;

        cursor.enter("audio clips");
        let clip_count = cursor.read_count()?;
        cursor.expect_records(clip_count, AUDIO_CLIP_SIZE)?;
        let clips = (0..clip_count)
            .map(|_| AudioClipInfo::read(cursor))
            .collect::<Result<_>>()?;

        cursor.enter("score clip");
        let score_clip = cursor.read_i32()?;
        Ok(Self {
            clip_types,
            clips,
            score_clip,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.i32(self.clip_types.len() as i32);
        for clip_type in &self.clip_types {
            clip_type.write(out);
        }
        out.i32(self.clips.len() as i32);
        for clip in &self.clips {
            clip.write(out);
        }
        out.i32(self.score_clip);
    }
}
