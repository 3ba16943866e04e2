use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ags_engine::config::EngineConfig;

#[derive(Parser, Debug)]
#[command(
    about = "Open a game directory, build the script runtime and exercise its audio",
    version
)]
pub struct Args {
    /// Directory holding the game archive and its *.vox libraries
    #[arg(long)]
    pub game_dir: Option<PathBuf>,

    /// JSON file with engine settings; command line flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Master archive file name inside the game directory
    #[arg(long)]
    pub master: Option<String>,

    /// Ignore speech.vox even when present
    #[arg(long)]
    pub no_speech: bool,

    /// Ignore music requests
    #[arg(long)]
    pub no_music: bool,

    /// Legacy sound to play, as NUMBER or NUMBER:PRIORITY (repeatable)
    #[arg(
        long = "play-sound",
        value_name = "SOUND[:PRIORITY]",
        value_parser = parse_sound_request,
        allow_hyphen_values = true
    )]
    pub play_sounds: Vec<SoundRequest>,

    /// Legacy music number to start after the sounds
    #[arg(long)]
    pub play_music: Option<i32>,

    /// Path to write the session summary, channel states and audio events as JSON
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    /// Print the native function names and exit without opening a game
    #[arg(long)]
    pub list_functions: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundRequest {
    pub sound: i32,
    /// Clip default when unset.
    pub priority: Option<i32>,
}

fn parse_sound_request(value: &str) -> Result<SoundRequest> {
    let (sound, priority) = match value.split_once(':') {
        Some((sound, priority)) => (sound, Some(priority)),
        None => (value, None),
    };
    let sound = sound
        .trim()
        .parse()
        .with_context(|| format!("invalid sound number in {value:?}"))?;
    let priority = priority
        .map(|p| p.trim().parse())
        .transpose()
        .with_context(|| format!("invalid priority in {value:?}"))?;
    Ok(SoundRequest { sound, priority })
}

#[derive(Debug)]
pub enum Command {
    ListFunctions,
    Run(RunArgs),
}

#[derive(Debug)]
pub struct RunArgs {
    pub config: EngineConfig,
    pub play_sounds: Vec<SoundRequest>,
    pub play_music: Option<i32>,
    pub report_json: Option<PathBuf>,
}

pub fn parse() -> Result<Command> {
    let args = Args::parse();
    args.into_command()
}

impl Args {
    fn into_command(self) -> Result<Command> {
        if self.list_functions {
            if !self.play_sounds.is_empty() || self.play_music.is_some() {
                bail!("--list-functions cannot be combined with playback requests");
            }
            return Ok(Command::ListFunctions);
        }

        let mut config = EngineConfig::load(self.config.as_deref())?;
        if let Some(game_dir) = self.game_dir {
            config.game_dir = game_dir;
        }
        if self.master.is_some() {
            config.master_archive = self.master;
        }
        if self.no_speech {
            config.enable_speech = false;
        }
        if self.no_music {
            config.enable_music = false;
        }

        Ok(Command::Run(RunArgs {
            config,
            play_sounds: self.play_sounds,
            play_music: self.play_music,
            report_json: self.report_json,
        }))
    }
}
