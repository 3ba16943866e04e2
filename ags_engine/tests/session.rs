mod common;

use std::fs;

use ags_engine::audio::{AudioEvent, RecordingBackend};
use ags_engine::script::{ScriptError, ScriptValue};
use ags_engine::{EngineConfig, Session};
use ags_formats::game::GameDataVersion;
use anyhow::Result;
use tempfile::tempdir;

use common::{sample_game, write_archive, write_game_dir};

fn config(dir: &std::path::Path) -> EngineConfig {
    EngineConfig {
        game_dir: dir.to_path_buf(),
        ..EngineConfig::default()
    }
}

#[test]
fn opening_a_game_builds_the_runtime_from_its_archives() -> Result<()> {
    let dir = tempdir()?;
    write_game_dir(dir.path(), &sample_game(GameDataVersion::V341))?;

    let session = Session::open(&config(dir.path()), Box::new(RecordingBackend::new()))?;
    let summary = session.summary();
    assert_eq!(summary.game_name, "Sample Quest");
    assert_eq!(summary.data_version, GameDataVersion::V341.to_string());
    assert_eq!(summary.archive_format, 20);
    assert!(summary.master_archive.ends_with("game.ags"));
    assert!(summary.separate_audio_library);
    assert!(!summary.speech);
    assert_eq!(summary.characters, 2);
    assert_eq!(summary.inventory_items, 2);
    assert_eq!(summary.dialogs, 1);
    assert_eq!(summary.guis, 1);
    assert_eq!(summary.views, 1);
    assert_eq!(summary.audio_clips, 3);
    assert!(!summary.legacy_audio);
    assert_eq!(summary.native_functions, session.registry.len());
    assert_eq!(session.missing_clip_files(), vec!["sound2.wav"]);
    Ok(())
}

#[test]
fn scripts_reach_the_decoded_entities() -> Result<()> {
    let dir = tempdir()?;
    write_game_dir(dir.path(), &sample_game(GameDataVersion::V341))?;
    let mut session = Session::open(&config(dir.path()), Box::new(RecordingBackend::new()))?;

    assert_eq!(
        session.call("GetPlayerCharacter", None, &[])?,
        ScriptValue::Int(1)
    );
    let roger = session.call("GetCharacter", None, &[ScriptValue::Int(1)])?;
    let roger = roger.as_object()?.clone();
    assert_eq!(
        session.call("Character::get_X", Some(&roger), &[])?,
        ScriptValue::Int(100)
    );
    session.call("Character::set_X", Some(&roger), &[ScriptValue::Int(140)])?;
    assert_eq!(roger.character().map(|c| c.x), Some(140));
    assert_eq!(
        session.call("Character::get_Name", Some(&roger), &[])?,
        ScriptValue::Str("Roger".into())
    );

    let key = session.call("GetInventoryItem", None, &[ScriptValue::Int(1)])?;
    session.call("Character::AddInventory", Some(&roger), &[key.clone()])?;
    assert_eq!(
        session.call("Character::HasInventory", Some(&roger), &[key])?,
        ScriptValue::Int(1)
    );

    let err = session.call("Character::get_X", None, &[]).unwrap_err();
    assert!(matches!(err, ScriptError::MissingReceiver { .. }));
    assert!(matches!(
        session.call("NoSuchFunction", None, &[]).unwrap_err(),
        ScriptError::UnknownFunction(_)
    ));
    Ok(())
}

#[test]
fn legacy_sounds_compete_for_general_channels() -> Result<()> {
    let dir = tempdir()?;
    write_game_dir(dir.path(), &sample_game(GameDataVersion::V341))?;
    let backend = RecordingBackend::new();
    let mut session = Session::open(&config(dir.path()), Box::new(backend.clone()))?;

    assert_eq!(
        session.call("PlaySound", None, &[ScriptValue::Int(1)])?,
        ScriptValue::Int(3)
    );
    assert_eq!(
        session.call("PlaySound", None, &[ScriptValue::Int(2)])?,
        ScriptValue::Int(4)
    );
    assert_eq!(
        session.call("IsChannelPlaying", None, &[ScriptValue::Int(3)])?,
        ScriptValue::Int(1)
    );
    assert_eq!(
        session.call("PlayMusic", None, &[ScriptValue::Int(1)])?,
        ScriptValue::Int(2)
    );
    assert_eq!(
        session.call("PlaySound", None, &[ScriptValue::Int(99)])?,
        ScriptValue::Int(-1)
    );

    let played: Vec<_> = backend
        .events()
        .into_iter()
        .filter_map(|event| match event {
            AudioEvent::Play { channel, clip, .. } => Some((channel, clip)),
            AudioEvent::Stop { .. } => None,
        })
        .collect();
    assert_eq!(
        played,
        vec![
            (3, "aSound1".to_string()),
            (4, "aSound2".to_string()),
            (2, "aMusic1".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn disabled_music_and_missing_speech_are_reported() -> Result<()> {
    let dir = tempdir()?;
    write_game_dir(dir.path(), &sample_game(GameDataVersion::V341))?;
    write_archive(&dir.path().join("speech.vox"), &[("ROGR1.WAV", &b"RIFF"[..])])?;

    let session = Session::open(&config(dir.path()), Box::new(RecordingBackend::new()))?;
    assert!(session.speech());

    let config = EngineConfig {
        enable_speech: false,
        enable_music: false,
        ..config(dir.path())
    };
    let mut session = Session::open(&config, Box::new(RecordingBackend::new()))?;
    assert!(!session.speech());
    assert_eq!(
        session.call("PlayMusic", None, &[ScriptValue::Int(1)])?,
        ScriptValue::Int(-1)
    );
    Ok(())
}

#[test]
fn games_without_a_clip_table_number_their_audio_files() -> Result<()> {
    let dir = tempdir()?;
    let game = sample_game(GameDataVersion::V310);
    assert!(game.audio.is_none());
    write_game_dir(dir.path(), &game)?;

    let mut session = Session::open(&config(dir.path()), Box::new(RecordingBackend::new()))?;
    let summary = session.summary();
    assert!(summary.legacy_audio);
    assert_eq!(summary.audio_clips, 2);
    assert!(session.missing_clip_files().is_empty());
    assert_eq!(
        session.call("PlaySound", None, &[ScriptValue::Int(1)])?,
        ScriptValue::Int(3)
    );
    assert_eq!(
        session.call("PlayMusic", None, &[ScriptValue::Int(1)])?,
        ScriptValue::Int(2)
    );
    Ok(())
}

#[test]
fn corrupt_descriptors_fail_to_open() -> Result<()> {
    let dir = tempdir()?;
    let mut descriptor = sample_game(GameDataVersion::V341).encode()?;
    descriptor.truncate(descriptor.len() / 2);
    write_archive(&dir.path().join("game.ags"), &[("game28.dta", descriptor.as_slice())])?;

    let err = Session::open(&config(dir.path()), Box::new(RecordingBackend::new())).unwrap_err();
    assert!(format!("{err:#}").contains("decoding game data"));

    fs::remove_file(dir.path().join("game.ags"))?;
    assert!(Session::open(&config(dir.path()), Box::new(RecordingBackend::new())).is_err());
    Ok(())
}
