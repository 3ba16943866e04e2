use serde::Serialize;

use crate::error::Result;
use crate::reader::Cursor;
use crate::writer::Writer;

pub const GAME_NAME_LEN: usize = 50;
pub const OPTION_COUNT: usize = 100;
pub const PALETTE_SIZE: usize = 256;
pub const MAX_GLOBAL_MESSAGES: usize = 500;
const RESERVED_WORDS: usize = 17;

/// Indices into [`GameHeader::options`] that the rest of the runtime reads.
pub mod option {
    pub const DEBUG_MODE: usize = 0;
    pub const SCORE_SOUND: usize = 1;
    pub const WALK_ON_LOOK: usize = 2;
    pub const DIALOG_ICONS: usize = 3;
    pub const ANTI_GLIDE: usize = 4;
    pub const TWO_CURSORS: usize = 5;
    pub const NO_WALK_MODE: usize = 6;
    pub const LETTERBOX: usize = 7;
    pub const NO_SCALE_FONTS: usize = 8;
    pub const SPEECH_TYPE: usize = 9;
    pub const PIXEL_PERFECT: usize = 10;
    pub const NO_WALK_MODE_2: usize = 11;
    pub const SPLIT_RESOURCES: usize = 12;
    pub const ROTATE_CHARS: usize = 13;
    pub const FADE_TYPE: usize = 14;
    pub const HANDLE_INV_CLICKS: usize = 15;
    pub const MOUSE_WHEEL: usize = 16;
    pub const DIALOG_NUMBERED: usize = 17;
    pub const DIALOG_UPWARDS: usize = 18;
    pub const CROSSFADE_MUSIC: usize = 19;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteUsage {
    GameWide,
    Locked,
    Background,
    Other(u8),
}

impl PaletteUsage {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => PaletteUsage::GameWide,
            1 => PaletteUsage::Locked,
            2 => PaletteUsage::Background,
            other => PaletteUsage::Other(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            PaletteUsage::GameWide => 0,
            PaletteUsage::Locked => 1,
            PaletteUsage::Background => 2,
            PaletteUsage::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub usage: PaletteUsage,
}

/// Fixed-size scalar part of the descriptor that precedes every section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameHeader {
    pub name: String,
    pub options: Vec<i32>,
    #[serde(skip)]
    pub palette: Vec<PaletteEntry>,
    pub player_character: i32,
    pub total_score: i32,
    pub dialog_message_count: i32,
    pub color_depth: i32,
    pub target_win: i32,
    pub dialog_bullet: i32,
    pub hotdot: i16,
    pub hotdot_outer: i16,
    pub unique_id: i32,
    pub default_resolution: i32,
    pub default_lipsync_frame: i32,
    pub inv_hotdot_sprite: i32,
}

impl Default for GameHeader {
    fn default() -> Self {
        Self {
            name: String::new(),
            options: vec![0; OPTION_COUNT],
            palette: vec![
                PaletteEntry {
                    r: 0,
                    g: 0,
                    b: 0,
                    usage: PaletteUsage::GameWide,
                };
                PALETTE_SIZE
            ],
            player_character: 0,
            total_score: 0,
            dialog_message_count: 0,
            color_depth: 1,
            target_win: 0,
            dialog_bullet: 0,
            hotdot: 0,
            hotdot_outer: 0,
            unique_id: 0,
            default_resolution: 1,
            default_lipsync_frame: 0,
            inv_hotdot_sprite: 0,
        }
    }
}

/// Element counts and presence words declared by the header. They drive the
/// sections that follow and are not kept in the model: the decoded vectors
/// carry the same information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HeaderCounts {
    pub views: usize,
    pub characters: usize,
    pub inventory_items: usize,
    pub dialogs: usize,
    pub fonts: usize,
    pub guis: usize,
    pub cursors: usize,
    pub messages_present: Vec<bool>,
    pub has_dictionary: bool,
    pub has_global_script: bool,
    pub has_compiled_script: bool,
}

impl GameHeader {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<(Self, HeaderCounts)> {
        cursor.enter("game header");
        let name = cursor.read_fixed_string(GAME_NAME_LEN)?;
        let options = cursor.read_i32_vec(OPTION_COUNT)?;

        cursor.enter("palette");
        let usage = cursor.read_bytes(PALETTE_SIZE)?;
        let mut palette = Vec::with_capacity(PALETTE_SIZE);
        for &raw_usage in usage {
            let [r, g, b, _pad] = cursor.read_array::<4>()?;
            palette.push(PaletteEntry {
                r,
                g,
                b,
                usage: PaletteUsage::from_raw(raw_usage),
            });
        }

        cursor.enter("game header");
        let mut counts = HeaderCounts {
            views: cursor.read_count()?,
            characters: cursor.read_count()?,
            ..HeaderCounts::default()
        };
        let player_character = cursor.read_i32()?;
        let total_score = cursor.read_i32()?;
        counts.inventory_items = usize::try_from(cursor.read_i16()?).map_err(|_| {
            crate::error::Error::corrupt("game header", "negative inventory item count")
        })?;
        cursor.skip(2)?;
        counts.dialogs = cursor.read_count()?;
        let dialog_message_count = cursor.read_i32()?;
        counts.fonts = cursor.read_count()?;
        let color_depth = cursor.read_i32()?;
        let target_win = cursor.read_i32()?;
        let dialog_bullet = cursor.read_i32()?;
        let hotdot = cursor.read_i16()?;
        let hotdot_outer = cursor.read_i16()?;
        let unique_id = cursor.read_i32()?;
        counts.guis = cursor.read_count()?;
        counts.cursors = cursor.read_count()?;
        let default_resolution = cursor.read_i32()?;
        let default_lipsync_frame = cursor.read_i32()?;
        let inv_hotdot_sprite = cursor.read_i32()?;
        cursor.skip(RESERVED_WORDS * 4)?;

        cursor.enter("message table");
        counts.messages_present = (0..MAX_GLOBAL_MESSAGES)
            .map(|_| cursor.read_bool32())
            .collect::<Result<_>>()?;
        counts.has_dictionary = cursor.read_bool32()?;
        counts.has_global_script = cursor.read_bool32()?;
        let _characters_pointer = cursor.read_i32()?;
        counts.has_compiled_script = cursor.read_bool32()?;

        Ok((
            GameHeader {
                name,
                options,
                palette,
                player_character,
                total_score,
                dialog_message_count,
                color_depth,
                target_win,
                dialog_bullet,
                hotdot,
                hotdot_outer,
                unique_id,
                default_resolution,
                default_lipsync_frame,
                inv_hotdot_sprite,
            },
            counts,
        ))
    }

    pub(crate) fn write(&self, out: &mut Writer, counts: &HeaderCounts) {
        out.fixed_str(&self.name, GAME_NAME_LEN);
        for index in 0..OPTION_COUNT {
            out.i32(self.options.get(index).copied().unwrap_or(0));
        }
        for index in 0..PALETTE_SIZE {
            let usage = self
                .palette
                .get(index)
                .map(|entry| entry.usage)
                .unwrap_or(PaletteUsage::GameWide);
            out.u8(usage.raw());
        }
        for index in 0..PALETTE_SIZE {
            match self.palette.get(index) {
                Some(entry) => out.u8(entry.r).u8(entry.g).u8(entry.b).u8(0),
                None => out.zeros(4),
            };
        }
        out.i32(counts.views as i32)
            .i32(counts.characters as i32)
            .i32(self.player_character)
            .i32(self.total_score)
            .i16(counts.inventory_items as i16)
            .zeros(2)
            .i32(counts.dialogs as i32)
            .i32(self.dialog_message_count)
            .i32(counts.fonts as i32)
            .i32(self.color_depth)
            .i32(self.target_win)
            .i32(self.dialog_bullet)
            .i16(self.hotdot)
            .i16(self.hotdot_outer)
            .i32(self.unique_id)
            .i32(counts.guis as i32)
            .i32(counts.cursors as i32)
            .i32(self.default_resolution)
            .i32(self.default_lipsync_frame)
            .i32(self.inv_hotdot_sprite)
            .zeros(RESERVED_WORDS * 4);
        for index in 0..MAX_GLOBAL_MESSAGES {
            let present = counts.messages_present.get(index).copied().unwrap_or(false);
            out.i32(present as i32);
        }
        out.i32(counts.has_dictionary as i32)
            .i32(counts.has_global_script as i32)
            .i32(1)
            .i32(counts.has_compiled_script as i32);
    }

    pub fn option(&self, index: usize) -> i32 {
        self.options.get(index).copied().unwrap_or(0)
    }
}

/// Save-game identity stored by 3.x games.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveMetadata {
    pub guid: String,
    pub save_extension: String,
    pub save_folder: String,
}

impl SaveMetadata {
    pub(crate) fn read(cursor: &mut Cursor<'_>) -> Result<Self> {
        cursor.enter("save metadata");
        Ok(Self {
            guid: cursor.read_fixed_string(40)?,
            save_extension: cursor.read_fixed_string(20)?,
            save_folder: cursor.read_fixed_string(50)?,
        })
    }

    pub(crate) fn write(&self, out: &mut Writer) {
        out.fixed_str(&self.guid, 40)
            .fixed_str(&self.save_extension, 20)
            .fixed_str(&self.save_folder, 50);
    }
}
