use std::fs;

use anyhow::{Context, Result};
use serde::Serialize;

use ags_engine::api::standard_registry;
use ags_engine::audio::{AudioEvent, ChannelSnapshot, ChannelState, RecordingBackend};
use ags_engine::script::ScriptValue;
use ags_engine::session::{Session, SessionSummary};

mod cli;
use cli::{Command, RunArgs, SoundRequest};

#[derive(Debug, Serialize)]
struct SoundOutcome {
    sound: i32,
    priority: Option<i32>,
    channel: Option<usize>,
}

#[derive(Serialize)]
struct SessionReport<'a> {
    summary: &'a SessionSummary,
    missing_clip_files: Vec<&'a str>,
    requests: &'a [SoundOutcome],
    channels: Vec<ChannelSnapshot>,
    audio_events: Vec<AudioEvent>,
}

fn main() -> Result<()> {
    let command = cli::parse()?;

    env_logger::init();

    match command {
        Command::ListFunctions => list_functions(),
        Command::Run(args) => run(args),
    }
}

fn list_functions() -> Result<()> {
    let registry = standard_registry().context("building native function registry")?;
    for name in registry.names() {
        println!("{name}");
    }
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let backend = RecordingBackend::new();
    let mut session = Session::open(&args.config, Box::new(backend.clone()))
        .with_context(|| format!("opening game in {}", args.config.game_dir.display()))?;
    for file in session.missing_clip_files() {
        backend.make_unreadable(file);
    }

    let summary = session.summary();
    print_summary(&summary);

    let mut outcomes = Vec::with_capacity(args.play_sounds.len());
    for request in &args.play_sounds {
        let channel = play(&mut session, *request)?;
        match channel {
            Some(channel) => println!("sound {} -> channel {channel}", request.sound),
            None => println!("sound {} -> no channel", request.sound),
        }
        outcomes.push(SoundOutcome {
            sound: request.sound,
            priority: request.priority,
            channel,
        });
    }
    if let Some(music) = args.play_music {
        let result = session
            .call("PlayMusic", None, &[ScriptValue::Int(music)])
            .with_context(|| format!("playing music {music}"))?;
        println!("music {music} -> {}", describe_channel(&result));
    }

    let channels = session.runtime.audio.snapshot();
    for channel in &channels {
        if let ChannelState::Playing { priority, .. } = channel.state {
            println!(
                "  channel {} ({:?}): {} at priority {priority}",
                channel.index,
                channel.role,
                channel.clip_name.as_deref().unwrap_or("?")
            );
        }
    }

    if let Some(path) = args.report_json.as_ref() {
        let report = SessionReport {
            summary: &summary,
            missing_clip_files: session.missing_clip_files(),
            requests: &outcomes,
            channels,
            audio_events: backend.events(),
        };
        let json = serde_json::to_string_pretty(&report)
            .context("serializing session report to JSON")?;
        fs::write(path, json)
            .with_context(|| format!("writing session report to {}", path.display()))?;
        println!("Saved session report to {}", path.display());
    }

    Ok(())
}

/// Requests with an explicit priority bypass the clip default that
/// `PlaySound` applies.
fn play(session: &mut Session, request: SoundRequest) -> Result<Option<usize>> {
    if let Some(priority) = request.priority {
        return Ok(session.runtime.audio.play_sound(request.sound, priority));
    }
    let result = session
        .call("PlaySound", None, &[ScriptValue::Int(request.sound)])
        .with_context(|| format!("playing sound {}", request.sound))?;
    Ok(result
        .as_int()
        .ok()
        .and_then(|channel| usize::try_from(channel).ok()))
}

fn describe_channel(result: &ScriptValue) -> String {
    match result.as_int() {
        Ok(channel) if channel >= 0 => format!("channel {channel}"),
        _ => "no channel".to_string(),
    }
}

fn print_summary(summary: &SessionSummary) {
    println!(
        "{} (data version {}, CLIB v{})",
        if summary.game_name.is_empty() {
            "<unnamed game>"
        } else {
            summary.game_name.as_str()
        },
        summary.data_version,
        summary.archive_format
    );
    println!("  master archive: {}", summary.master_archive);
    println!(
        "  characters: {}, inventory items: {}, dialogs: {}, GUIs: {}, views: {}",
        summary.characters, summary.inventory_items, summary.dialogs, summary.guis, summary.views
    );
    println!(
        "  audio clips: {}{}, separate audio library: {}, speech: {}",
        summary.audio_clips,
        if summary.legacy_audio {
            " (legacy numbering)"
        } else {
            ""
        },
        summary.separate_audio_library,
        summary.speech
    );
    println!("  native functions: {}", summary.native_functions);
}
