use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Session settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub game_dir: PathBuf,
    /// Master archive file name; found by scanning `game_dir` when unset.
    pub master_archive: Option<String>,
    pub enable_speech: bool,
    pub enable_music: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            game_dir: PathBuf::from("."),
            master_archive: None,
            enable_speech: true,
            enable_music: true,
        }
    }
}

impl EngineConfig {
    /// Defaults, overlaid with the JSON file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_keys_keep_their_defaults() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, r#"{{"game_dir": "/games/sample", "enable_speech": false}}"#)?;
        let config = EngineConfig::load(Some(file.path()))?;
        assert_eq!(config.game_dir, PathBuf::from("/games/sample"));
        assert!(!config.enable_speech);
        assert!(config.enable_music);
        assert_eq!(config.master_archive, None);
        assert_eq!(EngineConfig::load(None)?, EngineConfig::default());
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, r#"{{"game_folder": "/games"}}"#)?;
        let err = EngineConfig::load(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("game_folder"));
        Ok(())
    }
}
