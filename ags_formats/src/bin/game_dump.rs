use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ags_formats::{ClibArchive, GameModel};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Decode a game descriptor and summarise it", version)]
struct Args {
    /// Master archive (game executable, .ags) or an extracted .dta file
    input: PathBuf,

    /// Write the decoded model as JSON to this path
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let game = load(&args.input)?;
    print_summary(&game);

    if let Some(path) = args.json.as_ref() {
        let json = serde_json::to_string_pretty(&game).context("serialising game model")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}

fn load(path: &PathBuf) -> Result<GameModel> {
    let is_dta = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dta"));
    if is_dta {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        return GameModel::decode(&bytes).with_context(|| format!("decoding {}", path.display()));
    }

    let archive =
        ClibArchive::open(path).with_context(|| format!("opening archive {}", path.display()))?;
    log::debug!(
        "{} is a {}-entry CLIB archive",
        path.display(),
        archive.entries().len()
    );
    GameModel::load_from_archive(&archive)
        .with_context(|| format!("decoding game data in {}", path.display()))
}

fn print_summary(game: &GameModel) {
    println!("{} (data version {})", game.header.name, game.version);
    if !game.engine_version.is_empty() {
        println!("  engine          {}", game.engine_version);
    }
    println!("  features        {:?}", game.features());
    println!("  characters      {}", game.characters.len());
    println!("  inventory items {}", game.inventory_items.len());
    println!("  views           {}", game.views.len());
    println!("  cursors         {}", game.cursors.len());
    println!("  dialogs         {}", game.dialogs.len());
    println!(
        "  messages        {}",
        game.messages.iter().filter(|m| m.is_some()).count()
    );
    println!(
        "  GUIs            {} (gui version {})",
        game.gui.groups.len(),
        game.gui.version
    );
    println!("  script modules  {}", game.script_modules.len());
    println!("  plugins         {}", game.plugins.len());
    if let Some(audio) = &game.audio {
        println!(
            "  audio clips     {} in {} types",
            audio.clips.len(),
            audio.clip_types.len()
        );
    }
    if let Some(player) = game.player() {
        println!("  player          {} ({})", player.name, player.script_name);
    }
}
