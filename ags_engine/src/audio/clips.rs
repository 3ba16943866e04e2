use std::collections::BTreeMap;

use ags_formats::game::{AudioClipInfo, AudioClipType, AudioFileType, AudioTables, Bundling};
use log::debug;

/// Clip types synthesised for games without a clip table.
pub const LEGACY_AMBIENT_TYPE: u8 = 1;
pub const LEGACY_MUSIC_TYPE: u8 = 2;
pub const LEGACY_SOUND_TYPE: u8 = 3;

const LEGACY_MUSIC_PRIORITY: i16 = 50;
const LEGACY_SOUND_PRIORITY: i16 = 10;
const DEFAULT_VOLUME: i16 = 100;

/// Every clip the game can play, indexed by clip id.
#[derive(Debug, Clone, Default)]
pub struct ClipTable {
    clip_types: Vec<AudioClipType>,
    clips: Vec<AudioClipInfo>,
    score_clip: Option<usize>,
}

impl ClipTable {
    pub fn from_tables(tables: &AudioTables) -> Self {
        let score_clip = usize::try_from(tables.score_clip)
            .ok()
            .filter(|index| *index < tables.clips.len());
        Self {
            clip_types: tables.clip_types.clone(),
            clips: tables.clips.clone(),
            score_clip,
        }
    }

    /// Build clips from `musicN.*` and `soundN.*` file names, the way games
    /// predating the clip table find their audio. `files` pairs each name
    /// with where it was found.
    pub fn enumerate_legacy<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Bundling)>,
    {
        let mut found: BTreeMap<(u8, u32), (String, AudioFileType, Bundling)> = BTreeMap::new();
        for (name, bundling) in files {
            let Some((clip_type, number, file_type)) = parse_legacy_name(name) else {
                continue;
            };
            if found.contains_key(&(clip_type, number)) {
                debug!("ignoring {name}: another file already provides that number");
                continue;
            }
            found.insert((clip_type, number), (name.to_string(), file_type, bundling));
        }

        let clips = found
            .into_iter()
            .enumerate()
            .map(|(id, ((clip_type, number), (file_name, file_type, bundling)))| {
                let music = clip_type == LEGACY_MUSIC_TYPE;
                AudioClipInfo {
                    id: id as i32,
                    script_name: if music {
                        format!("aMusic{number}")
                    } else {
                        format!("aSound{number}")
                    },
                    file_name,
                    bundling,
                    clip_type,
                    file_type,
                    repeat: music,
                    priority: if music {
                        LEGACY_MUSIC_PRIORITY
                    } else {
                        LEGACY_SOUND_PRIORITY
                    },
                    volume: DEFAULT_VOLUME,
                }
            })
            .collect();

        let clip_types = [LEGACY_AMBIENT_TYPE, LEGACY_MUSIC_TYPE, LEGACY_SOUND_TYPE]
            .into_iter()
            .map(|id| AudioClipType {
                id: id.into(),
                reserved_channels: i32::from(id == LEGACY_MUSIC_TYPE),
                ..AudioClipType::default()
            })
            .collect();

        Self {
            clip_types,
            clips,
            score_clip: None,
        }
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn clips(&self) -> &[AudioClipInfo] {
        &self.clips
    }

    pub fn clip_types(&self) -> &[AudioClipType] {
        &self.clip_types
    }

    pub fn get(&self, index: usize) -> Option<&AudioClipInfo> {
        self.clips.get(index)
    }

    pub fn clip_type(&self, id: u8) -> Option<&AudioClipType> {
        self.clip_types
            .iter()
            .find(|clip_type| clip_type.id == i32::from(id))
    }

    pub fn score_clip(&self) -> Option<usize> {
        self.score_clip
    }

    pub fn find(&self, script_name: &str) -> Option<usize> {
        self.clips
            .iter()
            .position(|clip| clip.script_name.eq_ignore_ascii_case(script_name))
    }

    /// Clip behind the legacy sound number `number`.
    pub fn sound(&self, number: i32) -> Option<usize> {
        self.find(&format!("aSound{number}"))
    }

    /// Clip behind the legacy music number `number`.
    pub fn music(&self, number: i32) -> Option<usize> {
        self.find(&format!("aMusic{number}"))
    }
}

fn parse_legacy_name(name: &str) -> Option<(u8, u32, AudioFileType)> {
    let lower = name.to_ascii_lowercase();
    let (stem, ext) = lower.rsplit_once('.')?;
    let file_type = AudioFileType::from_extension(ext)?;
    let (clip_type, digits) = if let Some(digits) = stem.strip_prefix("music") {
        (LEGACY_MUSIC_TYPE, digits)
    } else if let Some(digits) = stem.strip_prefix("sound") {
        (LEGACY_SOUND_TYPE, digits)
    } else {
        return None;
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((clip_type, digits.parse().ok()?, file_type))
}
