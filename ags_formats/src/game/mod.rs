//! Decoder for the game descriptor (`ac2game.dta` / `game28.dta`).
//!
//! The descriptor is a flat little-endian stream of sections whose presence
//! and layout depend on the data version. [`GameFeatures`] is computed once
//! from the version and every section decoder consults it instead of the raw
//! number.

pub mod audio;
pub mod character;
pub mod dialog;
pub mod gui;
pub mod header;
pub mod interaction;
pub mod items;
pub mod props;
pub mod script;
pub mod version;
pub mod view;

use log::debug;
use serde::Serialize;

use crate::clib::ClibArchive;
use crate::error::{Error, Result};
use crate::reader::Cursor;
use crate::writer::Writer;

pub use audio::{AudioClipInfo, AudioClipType, AudioFileType, AudioTables, Bundling};
pub use character::CharacterInfo;
pub use dialog::{DialogOption, DialogTopic, LegacyDialogCode};
pub use gui::{ControlKind, ControlRef, GuiCollection, GuiGroup};
pub use header::{GameHeader, PaletteEntry, PaletteUsage, SaveMetadata};
pub use interaction::Interactions;
pub use items::{FontInfo, InventoryItem, MouseCursor};
pub use props::{PluginInfo, PropertyInfo, PropertyType, PropertyValues};
pub use script::CompiledScript;
pub use version::{GameDataVersion, GameFeatures, GuiFeatures, GuiVersion};
pub use view::{View, ViewFrame, ViewLoop};

use header::HeaderCounts;

pub const GAME_SIGNATURE: &[u8; 30] = b"Adventure Creator Game File v2";
/// Descriptor names looked up in the master archive, newest first.
pub const GAME_DATA_NAMES: [&str; 2] = ["game28.dta", "ac2game.dta"];

const LEGACY_SPRITE_FLAGS: usize = 6000;
const MAX_SPRITES: usize = 30000;
const LEGACY_SOUND_RECORD_SIZE: usize = 0x204;
const LIPSYNC_LETTER_GROUPS: usize = 20;
const LIPSYNC_LETTERS_LEN: usize = 50;
const MESSAGE_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryWord {
    pub word: String,
    pub id: i16,
}

/// Everything the descriptor declares about a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameModel {
    pub version: GameDataVersion,
    pub engine_version: String,
    pub header: GameHeader,
    pub save_metadata: Option<SaveMetadata>,
    pub fonts: Vec<FontInfo>,
    #[serde(skip)]
    pub sprite_flags: Vec<u8>,
    /// Index 0 is the engine's unused placeholder item.
    pub inventory_items: Vec<InventoryItem>,
    pub cursors: Vec<MouseCursor>,
    pub interactions: Interactions,
    pub dictionary: Option<Vec<DictionaryWord>>,
    pub global_script: Option<CompiledScript>,
    pub dialog_script: Option<CompiledScript>,
    pub script_modules: Vec<CompiledScript>,
    pub views: Vec<View>,
    pub characters: Vec<CharacterInfo>,
    pub lipsync_letters: Vec<String>,
    /// Global messages by slot; `None` for unused slots.
    pub messages: Vec<Option<String>>,
    pub dialogs: Vec<DialogTopic>,
    pub speech_lines: Vec<String>,
    pub gui: GuiCollection,
    pub plugins: Vec<PluginInfo>,
    pub property_schema: Vec<PropertyInfo>,
    pub character_properties: Vec<PropertyValues>,
    pub inventory_properties: Vec<PropertyValues>,
    pub view_names: Vec<String>,
    pub inventory_script_names: Vec<String>,
    pub dialog_script_names: Vec<String>,
    pub audio: Option<AudioTables>,
}

impl GameModel {
    /// Empty model with the sections the version requires present.
    pub fn new(version: GameDataVersion) -> Self {
        let features = GameFeatures::for_version(version);
        let interactions = if features.contains(GameFeatures::SCRIPT_INTERACTIONS) {
            Interactions::default()
        } else {
            Interactions::Legacy {
                characters: Vec::new(),
                inventory: Vec::new(),
                variables: Vec::new(),
            }
        };
        Self {
            version,
            engine_version: String::new(),
            header: GameHeader::default(),
            save_metadata: features
                .contains(GameFeatures::SAVE_METADATA)
                .then(|| SaveMetadata {
                    guid: String::new(),
                    save_extension: String::new(),
                    save_folder: String::new(),
                }),
            fonts: Vec::new(),
            sprite_flags: Vec::new(),
            inventory_items: Vec::new(),
            cursors: Vec::new(),
            interactions,
            dictionary: None,
            global_script: None,
            dialog_script: features
                .contains(GameFeatures::DIALOG_SCRIPT)
                .then(CompiledScript::default),
            script_modules: Vec::new(),
            views: Vec::new(),
            characters: Vec::new(),
            lipsync_letters: if features.contains(GameFeatures::LIPSYNC) {
                vec![String::new(); LIPSYNC_LETTER_GROUPS]
            } else {
                Vec::new()
            },
            messages: vec![None; header::MAX_GLOBAL_MESSAGES],
            dialogs: Vec::new(),
            speech_lines: Vec::new(),
            gui: GuiCollection::default(),
            plugins: Vec::new(),
            property_schema: Vec::new(),
            character_properties: Vec::new(),
            inventory_properties: Vec::new(),
            view_names: Vec::new(),
            inventory_script_names: Vec::new(),
            dialog_script_names: Vec::new(),
            audio: features
                .contains(GameFeatures::AUDIO_CLIPS)
                .then(AudioTables::default),
        }
    }

    pub fn features(&self) -> GameFeatures {
        GameFeatures::for_version(self.version)
    }

    /// Locate and decode the descriptor stored in an opened master archive.
    pub fn load_from_archive(archive: &ClibArchive) -> Result<Self> {
        let name = GAME_DATA_NAMES
            .iter()
            .find(|name| archive.exists(name))
            .map(|name| name.to_string())
            .or_else(|| {
                archive
                    .entries()
                    .iter()
                    .find(|entry| entry.name.to_ascii_lowercase().ends_with(".dta"))
                    .map(|entry| entry.name.clone())
            })
            .ok_or_else(|| Error::MissingGameData {
                archive: archive.path().display().to_string(),
            })?;
        debug!("decoding game data from {name}");
        let bytes = archive
            .read_bytes(&name)
            .ok_or_else(|| Error::MissingGameData {
                archive: archive.path().display().to_string(),
            })?;
        Self::decode(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        cursor.enter("signature");
        if cursor.read_bytes(GAME_SIGNATURE.len())? != GAME_SIGNATURE {
            return Err(Error::BadMagic {
                expected: "game data signature",
                offset: 0,
            });
        }
        let version = GameDataVersion(cursor.read_u32()?);
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion {
                format: "game data",
                version: version.0,
            });
        }
        let engine_version = cursor.read_prefixed_string()?;
        let features = GameFeatures::for_version(version);
        debug!("game data version {version}, engine {engine_version}, features {features:?}");

        let (header, counts) = GameHeader::read(&mut cursor)?;

        let save_metadata = if features.contains(GameFeatures::SAVE_METADATA) {
            Some(SaveMetadata::read(&mut cursor)?)
        } else {
            None
        };

        cursor.enter("fonts");
        let font_flags = cursor.read_bytes(counts.fonts)?;
        let font_outlines = cursor.read_bytes(counts.fonts)?;
        let fonts = font_flags
            .iter()
            .zip(font_outlines)
            .map(|(&flags, &outline)| FontInfo {
                flags,
                outline: outline as i8,
            })
            .collect();

        cursor.enter("sprite flags");
        let sprite_count = if features.contains(GameFeatures::COUNTED_SPRITE_FLAGS) {
            let count = cursor.read_count()?;
            if count > MAX_SPRITES {
                return Err(Error::InvalidCount {
                    section: "sprite flags",
                    count: count as i64,
                });
            }
            count
        } else {
            LEGACY_SPRITE_FLAGS
        };
        let sprite_flags = cursor.read_bytes(sprite_count)?.to_vec();

        cursor.enter("inventory items");
        cursor.expect_records(counts.inventory_items, items::INVENTORY_ITEM_SIZE)?;
        let inventory_items = (0..counts.inventory_items)
            .map(|_| InventoryItem::read(&mut cursor))
            .collect::<Result<Vec<_>>>()?;

        cursor.enter("cursors");
        cursor.expect_records(counts.cursors, items::CURSOR_SIZE)?;
        let cursors = (0..counts.cursors)
            .map(|_| MouseCursor::read(&mut cursor, features))
            .collect::<Result<Vec<_>>>()?;

        let interactions = if features.contains(GameFeatures::SCRIPT_INTERACTIONS) {
            Interactions::read_scripts(&mut cursor, counts.characters, counts.inventory_items)?
        } else {
            Interactions::read_legacy(&mut cursor, counts.characters, counts.inventory_items)?
        };

        let dictionary = if counts.has_dictionary {
            cursor.enter("dictionary");
            let count = cursor.read_count()?;
            cursor.expect_records(count, 6)?;
            let words = (0..count)
                .map(|_| {
                    Ok(DictionaryWord {
                        word: cursor.read_encrypted_string()?,
                        id: cursor.read_i16()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Some(words)
        } else {
            None
        };

        cursor.enter("global script");
        let global_script = if counts.has_compiled_script {
            Some(CompiledScript::read(&mut cursor)?)
        } else {
            None
        };
        cursor.enter("dialog script");
        let dialog_script = if features.contains(GameFeatures::DIALOG_SCRIPT) {
            Some(CompiledScript::read(&mut cursor)?)
        } else {
            None
        };
        let script_modules = if features.contains(GameFeatures::SCRIPT_MODULES) {
            cursor.enter("script modules");
            let count = cursor.read_count()?;
            cursor.expect_records(count, 4)?;
            (0..count)
                .map(|_| CompiledScript::read(&mut cursor))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        cursor.enter("views");
        let views = if features.contains(GameFeatures::VARIABLE_VIEWS) {
            cursor.expect_records(counts.views, 2)?;
            (0..counts.views)
                .map(|_| View::read(&mut cursor))
                .collect::<Result<Vec<_>>>()?
        } else {
            cursor.expect_records(counts.views, view::LEGACY_VIEW_SIZE)?;
            (0..counts.views)
                .map(|_| View::read_legacy(&mut cursor))
                .collect::<Result<Vec<_>>>()?
        };

        if features.contains(GameFeatures::LEGACY_SOUND_BLOCK) {
            cursor.enter("legacy sound block");
            let count = cursor.read_count()?;
            cursor.expect_records(count, LEGACY_SOUND_RECORD_SIZE)?;
            cursor.skip(count * LEGACY_SOUND_RECORD_SIZE)?;
        }

        cursor.enter("characters");
        cursor.expect_records(counts.characters, character::CHARACTER_SIZE)?;
        let characters = (0..counts.characters)
            .map(|_| CharacterInfo::read(&mut cursor))
            .collect::<Result<Vec<_>>>()?;

        let lipsync_letters = if features.contains(GameFeatures::LIPSYNC) {
            cursor.enter("lipsync");
            (0..LIPSYNC_LETTER_GROUPS)
                .map(|_| cursor.read_fixed_string(LIPSYNC_LETTERS_LEN))
                .collect::<Result<Vec<_>>>()?
        } else {
            Vec::new()
        };

        cursor.enter("global messages");
        let mut messages = Vec::with_capacity(header::MAX_GLOBAL_MESSAGES);
        for &present in &counts.messages_present {
            let message = match present {
                false => None,
                true if features.contains(GameFeatures::ENCRYPTED_MESSAGES) => {
                    Some(cursor.read_encrypted_string()?)
                }
                true => Some(cursor.read_c_string(MESSAGE_MAX_LEN)?),
            };
            messages.push(message);
        }

        cursor.enter("dialogs");
        cursor.expect_records(counts.dialogs, dialog::DIALOG_SIZE)?;
        let mut dialogs = (0..counts.dialogs)
            .map(|_| DialogTopic::read(&mut cursor))
            .collect::<Result<Vec<_>>>()?;
        let speech_lines = if features.contains(GameFeatures::LEGACY_DIALOG_CODE) {
            cursor.enter("dialog code");
            for dialog in &mut dialogs {
                dialog.read_legacy_code(&mut cursor)?;
            }
            cursor.enter("dialog speech lines");
            dialog::read_speech_lines(&mut cursor, gui::GUI_MAGIC)?
        } else {
            Vec::new()
        };

        let gui = GuiCollection::read(&mut cursor)?;
        if gui.groups.len() != counts.guis {
            return Err(Error::corrupt(
                "gui groups",
                format!(
                    "header declares {} GUIs but the section holds {}",
                    counts.guis,
                    gui.groups.len()
                ),
            ));
        }

        let mut model = GameModel {
            version,
            engine_version,
            header,
            save_metadata,
            fonts,
            sprite_flags,
            inventory_items,
            cursors,
            interactions,
            dictionary,
            global_script,
            dialog_script,
            script_modules,
            views,
            characters,
            lipsync_letters,
            messages,
            dialogs,
            speech_lines,
            gui,
            plugins: Vec::new(),
            property_schema: Vec::new(),
            character_properties: Vec::new(),
            inventory_properties: Vec::new(),
            view_names: Vec::new(),
            inventory_script_names: Vec::new(),
            dialog_script_names: Vec::new(),
            audio: None,
        };

        if features.contains(GameFeatures::EXTENDED_METADATA) {
            model.plugins = props::read_plugins(&mut cursor)?;
            model.property_schema = props::read_schema(&mut cursor)?;
            cursor.enter("character properties");
            model.character_properties = (0..counts.characters)
                .map(|_| props::read_values(&mut cursor))
                .collect::<Result<_>>()?;
            cursor.enter("inventory properties");
            model.inventory_properties = (0..counts.inventory_items)
                .map(|_| props::read_values(&mut cursor))
                .collect::<Result<_>>()?;
            cursor.enter("view names");
            model.view_names = props::read_names(&mut cursor, counts.views)?;
            cursor.enter("inventory script names");
            model.inventory_script_names = props::read_names(&mut cursor, counts.inventory_items)?;
            cursor.enter("dialog script names");
            model.dialog_script_names = props::read_names(&mut cursor, counts.dialogs)?;
        }

        if features.contains(GameFeatures::AUDIO_CLIPS) {
            model.audio = Some(AudioTables::read(&mut cursor)?);
        }

        if !cursor.is_empty() {
            debug!(
                "{} trailing bytes after game data at offset {:#x}",
                cursor.remaining(),
                cursor.position()
            );
        }
        Ok(model)
    }

    /// Serialise the model in the layout of its own data version.
    pub fn encode(&self) -> Result<Vec<u8>> {
        if !self.version.is_supported() {
            return Err(Error::UnsupportedVersion {
                format: "game data",
                version: self.version.0,
            });
        }
        let features = self.features();
        let counts = self.header_counts();
        let mut out = Writer::new();

        out.bytes(GAME_SIGNATURE)
            .u32(self.version.0)
            .prefixed_str(&self.engine_version);
        self.header.write(&mut out, &counts);

        if features.contains(GameFeatures::SAVE_METADATA) {
            let blank = SaveMetadata {
                guid: String::new(),
                save_extension: String::new(),
                save_folder: String::new(),
            };
            self.save_metadata.as_ref().unwrap_or(&blank).write(&mut out);
        }

        for font in &self.fonts {
            out.u8(font.flags);
        }
        for font in &self.fonts {
            out.u8(font.outline as u8);
        }

        if features.contains(GameFeatures::COUNTED_SPRITE_FLAGS) {
            out.i32(self.sprite_flags.len() as i32)
                .bytes(&self.sprite_flags);
        } else {
            let mut flags = self.sprite_flags.clone();
            flags.resize(LEGACY_SPRITE_FLAGS, 0);
            out.bytes(&flags);
        }

        for item in &self.inventory_items {
            item.write(&mut out);
        }
        for mouse_cursor in &self.cursors {
            mouse_cursor.write(&mut out);
        }
        self.interactions.write(
            &mut out,
            !features.contains(GameFeatures::SCRIPT_INTERACTIONS),
            counts.characters,
            counts.inventory_items,
        );

        if let Some(words) = &self.dictionary {
            out.i32(words.len() as i32);
            for word in words {
                out.encrypted_str(&word.word).i16(word.id);
            }
        }
        if let Some(script) = &self.global_script {
            script.write(&mut out);
        }
        if features.contains(GameFeatures::DIALOG_SCRIPT) {
            self.dialog_script
                .clone()
                .unwrap_or_default()
                .write(&mut out);
        }
        if features.contains(GameFeatures::SCRIPT_MODULES) {
            out.i32(self.script_modules.len() as i32);
            for module in &self.script_modules {
                module.write(&mut out);
            }
        }

        for view in &self.views {
            if features.contains(GameFeatures::VARIABLE_VIEWS) {
                view.write(&mut out);
            } else {
                view.write_legacy(&mut out);
            }
        }
        if features.contains(GameFeatures::LEGACY_SOUND_BLOCK) {
            out.i32(0);
        }

        for character in &self.characters {
            character.write(&mut out);
        }
        if features.contains(GameFeatures::LIPSYNC) {
            for index in 0..LIPSYNC_LETTER_GROUPS {
                let letters = self.lipsync_letters.get(index).map(String::as_str);
                out.fixed_str(letters.unwrap_or(""), LIPSYNC_LETTERS_LEN);
            }
        }

        for message in self.messages.iter().take(header::MAX_GLOBAL_MESSAGES).flatten() {
            if features.contains(GameFeatures::ENCRYPTED_MESSAGES) {
                out.encrypted_str(message);
            } else {
                out.c_str(message);
            }
        }

        for dialog in &self.dialogs {
            dialog.write(&mut out);
        }
        if features.contains(GameFeatures::LEGACY_DIALOG_CODE) {
            for dialog in &self.dialogs {
                dialog.write_legacy_code(&mut out);
            }
            dialog::write_speech_lines(&self.speech_lines, &mut out);
        }

        self.gui.write(&mut out);

        if features.contains(GameFeatures::EXTENDED_METADATA) {
            props::write_plugins(&self.plugins, &mut out);
            props::write_schema(&self.property_schema, &mut out);
            let blank = PropertyValues::new();
            for index in 0..counts.characters {
                props::write_values(self.character_properties.get(index).unwrap_or(&blank), &mut out);
            }
            for index in 0..counts.inventory_items {
                props::write_values(self.inventory_properties.get(index).unwrap_or(&blank), &mut out);
            }
            write_padded_names(&self.view_names, counts.views, &mut out);
            write_padded_names(&self.inventory_script_names, counts.inventory_items, &mut out);
            write_padded_names(&self.dialog_script_names, counts.dialogs, &mut out);
        }

        if features.contains(GameFeatures::AUDIO_CLIPS) {
            self.audio.clone().unwrap_or_default().write(&mut out);
        }
        Ok(out.into_bytes())
    }

    fn header_counts(&self) -> HeaderCounts {
        let mut messages_present: Vec<bool> =
            self.messages.iter().map(Option::is_some).collect();
        messages_present.resize(header::MAX_GLOBAL_MESSAGES, false);
        HeaderCounts {
            views: self.views.len(),
            characters: self.characters.len(),
            inventory_items: self.inventory_items.len(),
            dialogs: self.dialogs.len(),
            fonts: self.fonts.len(),
            guis: self.gui.groups.len(),
            cursors: self.cursors.len(),
            messages_present,
            has_dictionary: self.dictionary.is_some(),
            has_global_script: self.global_script.is_some(),
            has_compiled_script: self.global_script.is_some(),
        }
    }

    pub fn message(&self, index: usize) -> Option<&str> {
        self.messages.get(index)?.as_deref()
    }

    pub fn find_character(&self, script_name: &str) -> Option<usize> {
        self.characters
            .iter()
            .position(|character| character.script_name.eq_ignore_ascii_case(script_name))
    }

    pub fn player(&self) -> Option<&CharacterInfo> {
        usize::try_from(self.header.player_character)
            .ok()
            .and_then(|index| self.characters.get(index))
    }
}

fn write_padded_names(names: &[String], count: usize, out: &mut Writer) {
    let mut padded = names.to_vec();
    padded.resize(count, String::new());
    props::write_names(&padded, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::clib::ClibBuilder;
    use crate::game::interaction::{InteractionEvent, InteractionScripts};
    use crate::game::script::ScriptExport;
    use std::fs;
    use tempfile::tempdir;

    /// Small but complete game using every section its version allows.
    fn sample_game(version: GameDataVersion) -> GameModel {
        let features = GameFeatures::for_version(version);
        let mut game = GameModel::new(version);
        game.engine_version = "3.4.1.15".into();
        game.header.name = "Sample Quest".into();
        game.header.player_character = 1;
        game.header.options[header::option::SPLIT_RESOURCES] = 1;
        game.fonts = vec![
            FontInfo {
                flags: 0,
                outline: -1,
            },
            FontInfo {
                flags: 1,
                outline: 0,
            },
        ];
        game.sprite_flags = if features.contains(GameFeatures::COUNTED_SPRITE_FLAGS) {
            vec![0, 1, 0]
        } else {
            let mut flags = vec![0; LEGACY_SPRITE_FLAGS];
            flags[1] = 1;
            flags
        };
        game.inventory_items = vec![
            InventoryItem::default(),
            InventoryItem {
                name: "Key".into(),
                pic: 4,
                ..InventoryItem::default()
            },
        ];
        game.cursors = vec![MouseCursor {
            pic: 2,
            view: if features.contains(GameFeatures::CURSOR_VIEWS) {
                3
            } else {
                -1
            },
            name: "Walk".into(),
            ..MouseCursor::default()
        }];
        game.characters = vec![
            CharacterInfo {
                name: "Narrator".into(),
                script_name: "cNarr".into(),
                ..CharacterInfo::default()
            },
            CharacterInfo {
                name: "Roger".into(),
                script_name: "cRoger".into(),
                x: 100,
                y: 120,
                ..CharacterInfo::default()
            },
        ];
        game.interactions = if features.contains(GameFeatures::SCRIPT_INTERACTIONS) {
            Interactions::Scripts {
                characters: vec![
                    InteractionScripts::default(),
                    InteractionScripts {
                        functions: vec!["cRoger_Look".into()],
                    },
                ],
                inventory: vec![
                    InteractionScripts::default(),
                    InteractionScripts {
                        functions: vec![String::new(), "iKey_Use".into()],
                    },
                ],
            }
        } else {
            Interactions::Legacy {
                characters: vec![
                    None,
                    Some(interaction::Interaction {
                        events: vec![InteractionEvent {
                            event: 1,
                            times_run: 0,
                            response: None,
                        }],
                    }),
                ],
                inventory: vec![None, None],
                variables: vec![interaction::InteractionVariable {
                    name: "door_open".into(),
                    kind: 0,
                    value: 1,
                }],
            }
        };
        game.dictionary = Some(vec![DictionaryWord {
            word: "look".into(),
            id: 1,
        }]);
        game.global_script = Some(CompiledScript {
            exports: vec![ScriptExport {
                name: "game_start".into(),
                address: 0,
            }],
            ..CompiledScript::default()
        });
        if features.contains(GameFeatures::SCRIPT_MODULES) {
            game.script_modules = vec![CompiledScript::default()];
        }
        game.views = vec![View {
            loops: vec![ViewLoop {
                flags: 0,
                frames: vec![ViewFrame {
                    pic: 9,
                    ..ViewFrame::default()
                }],
            }],
        }];
        if features.contains(GameFeatures::LIPSYNC) {
            game.lipsync_letters[0] = "AI".into();
        }
        game.messages[500 - 1] = Some("Last slot".into());
        game.messages[3] = Some("You can't do that.".into());
        game.dialogs = vec![DialogTopic {
            options: vec![DialogOption {
                text: "Who are you?".into(),
                flags: dialog::OPTION_ON,
                entry_point: 0,
            }],
            legacy: features
                .contains(GameFeatures::LEGACY_DIALOG_CODE)
                .then(|| LegacyDialogCode {
                    code: vec![1, 2],
                    source: "@1\nstop".into(),
                }),
            code_size: if features.contains(GameFeatures::LEGACY_DIALOG_CODE) {
                2
            } else {
                0
            },
            ..DialogTopic::default()
        }];
        if features.contains(GameFeatures::LEGACY_DIALOG_CODE) {
            game.speech_lines = vec!["Who are you?".into()];
        }
        game.gui.groups = vec![GuiGroup {
            name: "gStatus".into(),
            ..GuiGroup::default()
        }];
        if features.contains(GameFeatures::EXTENDED_METADATA) {
            game.plugins = vec![PluginInfo {
                name: "ags_snowrain".into(),
                data: vec![7; 16],
            }];
            game.property_schema = vec![PropertyInfo {
                name: "Weight".into(),
                kind: PropertyType::Integer,
                description: String::new(),
                default_value: "0".into(),
            }];
            game.character_properties = vec![PropertyValues::new(); 2];
            game.character_properties[1].insert("Weight".into(), "80".into());
            game.inventory_properties = vec![PropertyValues::new(); 2];
            game.view_names = vec!["ROGERWALK".into()];
            game.inventory_script_names = vec![String::new(), "iKey".into()];
            game.dialog_script_names = vec!["dIntro".into()];
        }
        if let Some(audio) = &mut game.audio {
            audio.clip_types = vec![AudioClipType {
                id: 1,
                reserved_channels: 1,
                ..AudioClipType::default()
            }];
            audio.clips = vec![AudioClipInfo {
                id: 0,
                script_name: "aMusic1".into(),
                file_name: "music1.ogg".into(),
                bundling: Bundling::InAudioVox,
                clip_type: 2,
                file_type: AudioFileType::Ogg,
                repeat: true,
                priority: 50,
                volume: 100,
            }];
            audio.score_clip = 0;
        }
        game
    }

    #[test]
    fn every_version_family_decodes_its_own_layout() {
        for version in [
            GameDataVersion::V250,
            GameDataVersion::V251,
            GameDataVersion::V256,
            GameDataVersion::V261,
            GameDataVersion::V272,
            GameDataVersion::V300,
            GameDataVersion::V310,
            GameDataVersion::V311,
            GameDataVersion::V320,
            GameDataVersion::V341,
            GameDataVersion::V350,
        ] {
            let game = sample_game(version);
            let bytes = game.encode().unwrap();
            let decoded = GameModel::decode(&bytes)
                .unwrap_or_else(|err| panic!("version {version}: {err}"));
            assert_eq!(decoded, game, "version {version}");
        }
    }

    #[test]
    fn versions_outside_the_supported_range_are_rejected() {
        for raw in [17, 51] {
            let mut out = Writer::new();
            out.bytes(GAME_SIGNATURE).u32(raw).prefixed_str("x");
            let err = GameModel::decode(out.as_slice()).unwrap_err();
            assert!(
                matches!(err, Error::UnsupportedVersion { format: "game data", version } if version == raw)
            );
        }
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let mut bytes = sample_game(GameDataVersion::V341).encode().unwrap();
        bytes[0] = b'X';
        let err = GameModel::decode(&bytes).unwrap_err();
        assert!(matches!(err, Error::BadMagic { offset: 0, .. }));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn inflated_inventory_count_names_the_section() {
        let game = sample_game(GameDataVersion::V341);
        let mut bytes = game.encode().unwrap();
        // views, characters, player and total score precede the item count
        let counts_at = GAME_SIGNATURE.len()
            + 4
            + 4
            + game.engine_version.len()
            + 1
            + header::GAME_NAME_LEN
            + header::OPTION_COUNT * 4
            + header::PALETTE_SIZE * 5;
        bytes[counts_at + 16..counts_at + 18].copy_from_slice(&30_000i16.to_le_bytes());
        let err = GameModel::decode(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert!(matches!(
            err,
            Error::SectionOverrun {
                section: "inventory items",
                count: 30_000,
                ..
            }
        ));
        assert!(err.to_string().starts_with("inventory items"), "{err}");
    }

    #[test]
    fn messages_are_encrypted_from_261() {
        let plain = sample_game(GameDataVersion::V260).encode().unwrap();
        let sealed = sample_game(GameDataVersion::V261).encode().unwrap();
        let needle = b"You can't do that.";
        let contains = |haystack: &[u8]| haystack.windows(needle.len()).any(|w| w == needle);
        assert!(contains(&plain));
        assert!(!contains(&sealed));
        let decoded = GameModel::decode(&sealed).unwrap();
        assert_eq!(decoded.message(3), Some("You can't do that."));
        assert_eq!(decoded.message(4), None);
    }

    #[test]
    fn gui_count_must_match_header() {
        let mut game = sample_game(GameDataVersion::V341);
        let bytes = game.encode().unwrap();
        game.gui.groups.push(GuiGroup::default());
        let mut longer = game.encode().unwrap();
        // keep the header of the original file and the GUI section of the new one
        let header_len = GAME_SIGNATURE.len() + 8 + game.engine_version.len() + 1;
        let guis_at = header_len
            + header::GAME_NAME_LEN
            + header::OPTION_COUNT * 4
            + header::PALETTE_SIZE * 5
            + 4 * 4
            + 2
            + 2
            + 4 * 6
            + 2 * 2
            + 4;
        longer[guis_at..guis_at + 4].copy_from_slice(&bytes[guis_at..guis_at + 4]);
        let err = GameModel::decode(&longer).unwrap_err();
        assert!(matches!(err, Error::Corrupt { section: "gui groups", .. }));
    }

    #[test]
    fn descriptor_is_found_inside_the_archive() {
        let game = sample_game(GameDataVersion::V341);
        let mut builder = ClibBuilder::new(20);
        builder
            .add_file("readme.txt", b"hello".to_vec())
            .add_file("AC2GAME.DTA", game.encode().unwrap());
        let built = builder.build().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.ags");
        fs::write(&path, &built.master).unwrap();

        let archive = ClibArchive::open(&path).unwrap();
        let decoded = GameModel::load_from_archive(&archive).unwrap();
        assert_eq!(decoded.header.name, "Sample Quest");
        assert_eq!(decoded.player().map(|c| c.name.as_str()), Some("Roger"));
        assert_eq!(decoded.find_character("CROGER"), Some(1));
    }

    #[test]
    fn archive_without_descriptor_is_reported() {
        let mut builder = ClibBuilder::new(20);
        builder.add_file("readme.txt", b"hello".to_vec());
        let built = builder.build().unwrap();
        let dir = tempdir().unwrap();
        let path = dir.path().join("game.ags");
        fs::write(&path, &built.master).unwrap();

        let archive = ClibArchive::open(&path).unwrap();
        let err = GameModel::load_from_archive(&archive).unwrap_err();
        assert!(matches!(err, Error::MissingGameData { .. }));
    }
}
