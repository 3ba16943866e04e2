use std::rc::Rc;

use ags_formats::game::GameModel;
use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::api::standard_registry;
use crate::audio::{AudioBackend, ClipTable};
use crate::config::EngineConfig;
use crate::resources::ResourceSet;
use crate::runtime::Runtime;
use crate::script::{self, FunctionRegistry, ScriptObject, ScriptValue};

/// A loaded game: its archives, the decoded model wrapped in script objects,
/// and the native functions scripts may call.
#[derive(Debug)]
pub struct Session {
    pub resources: ResourceSet,
    pub runtime: Runtime,
    pub registry: FunctionRegistry,
    speech: bool,
}

/// What `Session::open` found, for printing or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub game_name: String,
    pub data_version: String,
    pub master_archive: String,
    pub archive_format: u8,
    pub separate_audio_library: bool,
    pub speech: bool,
    pub characters: usize,
    pub inventory_items: usize,
    pub dialogs: usize,
    pub guis: usize,
    pub views: usize,
    pub audio_clips: usize,
    pub legacy_audio: bool,
    pub native_functions: usize,
}

impl Session {
    pub fn open(config: &EngineConfig, backend: Box<dyn AudioBackend>) -> Result<Self> {
        let resources =
            ResourceSet::load_from_dir(&config.game_dir, config.master_archive.as_deref())?;
        let model = GameModel::load_from_archive(resources.master()).with_context(|| {
            format!(
                "decoding game data in {}",
                resources.master().path().display()
            )
        })?;
        let clips = match &model.audio {
            Some(tables) => ClipTable::from_tables(tables),
            None => ClipTable::enumerate_legacy(resources.legacy_audio_files()),
        };
        let mut runtime = Runtime::with_clips(Rc::new(model), clips, backend);
        runtime.audio.set_music_enabled(config.enable_music);
        let registry = standard_registry().context("building native function registry")?;
        let speech = config.enable_speech && resources.has_speech();
        info!(
            "opened {} ({} native functions)",
            resources.master().path().display(),
            registry.len()
        );
        Ok(Self {
            resources,
            runtime,
            registry,
            speech,
        })
    }

    pub fn model(&self) -> &GameModel {
        self.runtime.model()
    }

    /// Speech is available and enabled.
    pub fn speech(&self) -> bool {
        self.speech
    }

    pub fn call(
        &mut self,
        name: &str,
        receiver: Option<&ScriptObject>,
        args: &[ScriptValue],
    ) -> script::Result<ScriptValue> {
        self.registry.call(&mut self.runtime, name, receiver, args)
    }

    /// Clip files the archives do not contain.
    pub fn missing_clip_files(&self) -> Vec<&str> {
        self.runtime
            .audio
            .clips()
            .clips()
            .iter()
            .filter(|clip| self.resources.clip_bytes(clip).is_none())
            .map(|clip| clip.file_name.as_str())
            .collect()
    }

    pub fn summary(&self) -> SessionSummary {
        let model = self.model();
        SessionSummary {
            game_name: model.header.name.clone(),
            data_version: model.version.to_string(),
            master_archive: self.resources.master().path().display().to_string(),
            archive_format: self.resources.master().header().format_version,
            separate_audio_library: self.resources.separate_audio_library(),
            speech: self.speech,
            characters: model.characters.len(),
            inventory_items: model.inventory_items.len(),
            dialogs: model.dialogs.len(),
            guis: model.gui.groups.len(),
            views: model.views.len(),
            audio_clips: self.runtime.audio.clips().len(),
            legacy_audio: model.audio.is_none(),
            native_functions: self.registry.len(),
        }
    }
}
