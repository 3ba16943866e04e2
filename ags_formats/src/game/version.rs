//! Format versions and the per-version feature tables.
//!
//! Every optional field or alternate encoding in the descriptor is gated on a
//! feature flag, and the flags are derived from the version exactly once via
//! the tables below. Section decoders never compare version numbers directly.

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;

/// Game descriptor version stored after the file signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GameDataVersion(pub u32);

impl GameDataVersion {
    pub const V250: Self = Self(18);
    pub const V251: Self = Self(19);
    pub const V253: Self = Self(20);
    pub const V254: Self = Self(21);
    pub const V255: Self = Self(22);
    pub const V256: Self = Self(24);
    pub const V260: Self = Self(25);
    pub const V261: Self = Self(26);
    pub const V262: Self = Self(27);
    pub const V270: Self = Self(31);
    pub const V272: Self = Self(32);
    pub const V300: Self = Self(35);
    pub const V301: Self = Self(36);
    pub const V310: Self = Self(37);
    pub const V311: Self = Self(39);
    pub const V312: Self = Self(40);
    pub const V320: Self = Self(41);
    pub const V321: Self = Self(42);
    pub const V330: Self = Self(43);
    pub const V331: Self = Self(44);
    pub const V340: Self = Self(45);
    pub const V341: Self = Self(48);
    pub const V350: Self = Self(50);

    pub const OLDEST: Self = Self::V250;
    pub const NEWEST: Self = Self::V350;

    pub fn is_supported(self) -> bool {
        (Self::OLDEST..=Self::NEWEST).contains(&self)
    }

    /// Editor release that introduced this data version, if it is a known one.
    pub fn release(self) -> Option<&'static str> {
        Some(match self.0 {
            18 => "2.50",
            19 => "2.51",
            20 => "2.53",
            21 => "2.54",
            22 => "2.55",
            24 => "2.56",
            25 => "2.60",
            26 => "2.61",
            27 => "2.62",
            31 => "2.70",
            32 => "2.72",
            35 => "3.0.0",
            36 => "3.0.1",
            37 => "3.1.0",
            39 => "3.1.1",
            40 => "3.1.2",
            41 => "3.2.0",
            42 => "3.2.1",
            43 => "3.3.0",
            44 => "3.3.1",
            45..=47 => "3.4.0",
            48 | 49 => "3.4.1",
            50 => "3.5.0",
            _ => return None,
        })
    }
}

impl fmt::Display for GameDataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.release() {
            Some(release) => write!(f, "{} ({release})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Version range in which a feature is present.
#[derive(Debug, Clone, Copy)]
enum Presence<V> {
    Since(V),
    After(V),
    Until(V),
}

impl<V: PartialOrd> Presence<V> {
    fn applies(&self, version: &V) -> bool {
        match self {
            Presence::Since(min) => version >= min,
            Presence::After(min) => version > min,
            Presence::Until(max) => version <= max,
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GameFeatures: u32 {
        /// guid, save-game extension and folder after the base header
        const SAVE_METADATA = 1 << 0;
        /// sprite flag table is length-prefixed instead of 6000 entries
        const COUNTED_SPRITE_FLAGS = 1 << 1;
        /// cursors carry an animation view
        const CURSOR_VIEWS = 1 << 2;
        /// interactions are script function names rather than command trees
        const SCRIPT_INTERACTIONS = 1 << 3;
        /// dialogs are compiled into their own script
        const DIALOG_SCRIPT = 1 << 4;
        const SCRIPT_MODULES = 1 << 5;
        /// views store variable loop and frame counts
        const VARIABLE_VIEWS = 1 << 6;
        /// unexplained fixed-size block after the views in early files
        const LEGACY_SOUND_BLOCK = 1 << 7;
        const LIPSYNC = 1 << 8;
        /// global messages are length-prefixed and encrypted
        const ENCRYPTED_MESSAGES = 1 << 9;
        /// dialogs carry bytecode, encrypted source and speech lines
        const LEGACY_DIALOG_CODE = 1 << 10;
        /// plugins, custom properties and script names
        const EXTENDED_METADATA = 1 << 11;
        const AUDIO_CLIPS = 1 << 12;
    }
}

const GAME_FEATURE_TABLE: &[(GameFeatures, Presence<GameDataVersion>)] = &[
    (GameFeatures::SAVE_METADATA, Presence::Since(GameDataVersion::V300)),
    (GameFeatures::COUNTED_SPRITE_FLAGS, Presence::Since(GameDataVersion::V256)),
    (GameFeatures::CURSOR_VIEWS, Presence::Since(GameDataVersion::V251)),
    (GameFeatures::SCRIPT_INTERACTIONS, Presence::After(GameDataVersion::V272)),
    (GameFeatures::DIALOG_SCRIPT, Presence::After(GameDataVersion::V310)),
    (GameFeatures::SCRIPT_MODULES, Presence::Since(GameDataVersion::V270)),
    (GameFeatures::VARIABLE_VIEWS, Presence::Since(GameDataVersion::V272)),
    (GameFeatures::LEGACY_SOUND_BLOCK, Presence::Until(GameDataVersion::V251)),
    (GameFeatures::LIPSYNC, Presence::Since(GameDataVersion::V254)),
    (GameFeatures::ENCRYPTED_MESSAGES, Presence::Since(GameDataVersion::V261)),
    (GameFeatures::LEGACY_DIALOG_CODE, Presence::Until(GameDataVersion::V310)),
    (GameFeatures::EXTENDED_METADATA, Presence::Since(GameDataVersion::V260)),
    (GameFeatures::AUDIO_CLIPS, Presence::Since(GameDataVersion::V320)),
];

impl GameFeatures {
    pub fn for_version(version: GameDataVersion) -> Self {
        GAME_FEATURE_TABLE
            .iter()
            .filter(|(_, presence)| presence.applies(&version))
            .fold(GameFeatures::empty(), |acc, (feature, _)| acc | *feature)
    }
}

/// Version of the GUI section, stored independently of the game version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GuiVersion(pub u32);

impl GuiVersion {
    pub const INITIAL: Self = Self(0);
    pub const V214: Self = Self(100);
    pub const V222: Self = Self(101);
    pub const V230: Self = Self(102);
    pub const SLIDER_IMAGES: Self = Self(104);
    pub const V260: Self = Self(105);
    pub const CONTROL_NAMES: Self = Self(106);
    pub const LIST_SELECTED_BG: Self = Self(107);
    pub const EVENT_HANDLERS: Self = Self(108);
    pub const INV_WINDOW_LAYOUT: Self = Self(109);
    pub const V270: Self = Self(110);
    pub const V272A: Self = Self(111);
    pub const V272B: Self = Self(112);
    pub const V272C: Self = Self(113);
    pub const V272D: Self = Self(114);
    pub const V272E: Self = Self(115);
    pub const V330: Self = Self(116);
    pub const V331: Self = Self(117);
    pub const V340: Self = Self(118);
    pub const V350: Self = Self(119);

    pub const CURRENT: Self = Self::V350;
}

impl fmt::Display for GuiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GuiFeatures: u32 {
        const SLIDERS = 1 << 0;
        const TEXT_BOXES = 1 << 1;
        const LIST_BOXES = 1 << 2;
        /// slider handle and background images
        const SLIDER_IMAGES = 1 << 3;
        const CONTROL_NAMES = 1 << 4;
        const LIST_SELECTED_BG = 1 << 5;
        const EVENT_HANDLERS = 1 << 6;
        const INV_WINDOW_LAYOUT = 1 << 7;
        const BUTTON_ALIGNMENT = 1 << 8;
        const LIST_ALIGNMENT = 1 << 9;
        /// label text is length-prefixed instead of a 200-byte field
        const LABEL_PREFIXED_TEXT = 1 << 10;
        /// list boxes may store a saved-game index per item
        const LIST_SAVE_INDEX = 1 << 11;
    }
}

const GUI_FEATURE_TABLE: &[(GuiFeatures, Presence<GuiVersion>)] = &[
    (GuiFeatures::SLIDERS, Presence::Since(GuiVersion::V214)),
    (GuiFeatures::TEXT_BOXES, Presence::Since(GuiVersion::V222)),
    (GuiFeatures::LIST_BOXES, Presence::Since(GuiVersion::V230)),
    (GuiFeatures::SLIDER_IMAGES, Presence::Since(GuiVersion::SLIDER_IMAGES)),
    (GuiFeatures::CONTROL_NAMES, Presence::Since(GuiVersion::CONTROL_NAMES)),
    (GuiFeatures::LIST_SELECTED_BG, Presence::Since(GuiVersion::LIST_SELECTED_BG)),
    (GuiFeatures::EVENT_HANDLERS, Presence::Since(GuiVersion::EVENT_HANDLERS)),
    (GuiFeatures::INV_WINDOW_LAYOUT, Presence::Since(GuiVersion::INV_WINDOW_LAYOUT)),
    (GuiFeatures::BUTTON_ALIGNMENT, Presence::Since(GuiVersion::V272A)),
    (GuiFeatures::LIST_ALIGNMENT, Presence::Since(GuiVersion::V272B)),
    (GuiFeatures::LABEL_PREFIXED_TEXT, Presence::Since(GuiVersion::V272C)),
    (GuiFeatures::LIST_SAVE_INDEX, Presence::Since(GuiVersion::V272D)),
];

impl GuiFeatures {
    pub fn for_version(version: GuiVersion) -> Self {
        GUI_FEATURE_TABLE
            .iter()
            .filter(|(_, presence)| presence.applies(&version))
            .fold(GuiFeatures::empty(), |acc, (feature, _)| acc | *feature)
    }
}
