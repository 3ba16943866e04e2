#![allow(dead_code)]

use std::fs;
use std::path::Path;

use ags_formats::game::{
    dialog, AudioClipInfo, AudioClipType, AudioFileType, Bundling, CharacterInfo,
    CompiledScript, DialogOption, DialogTopic, FontInfo, GameDataVersion, GameModel, GuiGroup,
    InventoryItem, View, ViewFrame, ViewLoop,
};
use ags_formats::ClibBuilder;
use anyhow::Result;

/// Small game: a narrator and Roger (the player), one inventory item, a
/// dialog, a GUI and a view.
pub fn sample_game(version: GameDataVersion) -> GameModel {
    let mut game = GameModel::new(version);
    game.engine_version = "3.4.1.15".into();
    game.header.name = "Sample Quest".into();
    game.header.player_character = 1;
    game.fonts = vec![FontInfo {
        flags: 0,
        outline: -1,
    }];
    game.inventory_items = vec![
        InventoryItem::default(),
        InventoryItem {
            name: "Key".into(),
            pic: 4,
            ..InventoryItem::default()
        },
    ];
    game.characters = vec![
        CharacterInfo {
            name: "Narrator".into(),
            script_name: "cNarr".into(),
            ..CharacterInfo::default()
        },
        CharacterInfo {
            name: "Roger".into(),
            script_name: "cRoger".into(),
            index: 1,
            x: 100,
            y: 120,
            active_inventory: -1,
            ..CharacterInfo::default()
        },
    ];
    game.global_script = Some(CompiledScript::default());
    game.views = vec![View {
        loops: vec![ViewLoop {
            flags: 0,
            frames: vec![ViewFrame {
                pic: 9,
                ..ViewFrame::default()
            }],
        }],
    }];
    game.messages[3] = Some("You can't do that.".into());
    game.dialogs = vec![DialogTopic {
        options: vec![DialogOption {
            text: "Who are you?".into(),
            flags: dialog::OPTION_ON,
            entry_point: 0,
        }],
        ..DialogTopic::default()
    }];
    game.gui.groups = vec![GuiGroup {
        name: "gStatus".into(),
        width: 320,
        height: 20,
        ..GuiGroup::default()
    }];
    if let Some(audio) = &mut game.audio {
        audio.clip_types = vec![
            AudioClipType {
                id: 1,
                reserved_channels: 1,
                ..AudioClipType::default()
            },
            AudioClipType {
                id: 2,
                ..AudioClipType::default()
            },
        ];
        audio.clips = vec![
            clip(0, "aMusic1", "music1.ogg", Bundling::InAudioVox, 1, 50),
            clip(1, "aSound1", "sound1.wav", Bundling::InGameArchive, 2, 10),
            clip(2, "aSound2", "sound2.wav", Bundling::InGameArchive, 2, 30),
        ];
        audio.score_clip = -1;
    }
    game
}

fn clip(
    id: i32,
    script_name: &str,
    file_name: &str,
    bundling: Bundling,
    clip_type: u8,
    priority: i16,
) -> AudioClipInfo {
    let music = clip_type == 1;
    AudioClipInfo {
        id,
        script_name: script_name.into(),
        file_name: file_name.into(),
        bundling,
        clip_type,
        file_type: if music {
            AudioFileType::Ogg
        } else {
            AudioFileType::Wav
        },
        repeat: music,
        priority,
        volume: 100,
    }
}

pub fn write_archive(path: &Path, files: &[(&str, &[u8])]) -> Result<()> {
    let mut builder = ClibBuilder::new(20);
    for (name, data) in files {
        builder.add_file(name, data.to_vec());
    }
    fs::write(path, builder.build()?.master)?;
    Ok(())
}

/// Lay out a game directory the way a release ships it: `game.ags` holding
/// the descriptor and `sound1.wav`, `audio.vox` holding `music1.ogg`.
/// `sound2.wav` is declared by the clip table but shipped nowhere.
pub fn write_game_dir(dir: &Path, game: &GameModel) -> Result<()> {
    let descriptor = game.encode()?;
    write_archive(
        &dir.join("game.ags"),
        &[("game28.dta", descriptor.as_slice()), ("sound1.wav", &b"RIFF1"[..])],
    )?;
    write_archive(&dir.join("audio.vox"), &[("music1.ogg", &b"OggS"[..])])?;
    Ok(())
}
