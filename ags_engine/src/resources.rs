use std::fs;
use std::path::{Path, PathBuf};

use ags_formats::game::{AudioClipInfo, Bundling};
use ags_formats::{ClibArchive, ClibEntry};
use anyhow::{bail, Context, Result};
use log::{debug, warn};

const MASTER_EXTENSIONS: [&str; 3] = ["ags", "exe", "dat"];
const AUDIO_LIBRARY: &str = "audio.vox";
const MUSIC_LIBRARY: &str = "music.vox";
const SPEECH_LIBRARY: &str = "speech.vox";

/// The archives a game directory provides: the master archive plus the
/// optional audio and speech libraries.
#[derive(Debug)]
pub struct ResourceSet {
    dir: PathBuf,
    master: ClibArchive,
    audio: Option<ClibArchive>,
    speech: Option<ClibArchive>,
}

impl ResourceSet {
    /// Open the game in `dir`. With `master` set only that file is tried;
    /// otherwise every `*.ags`, `*.exe` and `*.dat` file is tried in name
    /// order and the first valid archive wins.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P, master: Option<&str>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            bail!("{} is not a directory", dir.display());
        }

        let files = list_files(dir)?;
        let master = match master {
            Some(name) => {
                let path = find_case_insensitive(&files, name)
                    .with_context(|| format!("no {name} in {}", dir.display()))?;
                ClibArchive::open(path)
                    .with_context(|| format!("opening master archive {}", path.display()))?
            }
            None => open_first_master(dir, &files)?,
        };
        debug!("master archive {}", master.path().display());

        let audio = [AUDIO_LIBRARY, MUSIC_LIBRARY]
            .iter()
            .find_map(|name| open_library(&files, name));
        let speech = open_library(&files, SPEECH_LIBRARY);

        Ok(Self {
            dir: dir.to_path_buf(),
            master,
            audio,
            speech,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn master(&self) -> &ClibArchive {
        &self.master
    }

    pub fn audio_library(&self) -> Option<&ClibArchive> {
        self.audio.as_ref()
    }

    pub fn speech_library(&self) -> Option<&ClibArchive> {
        self.speech.as_ref()
    }

    /// Music and sounds live in their own library rather than the master.
    pub fn separate_audio_library(&self) -> bool {
        self.audio.is_some()
    }

    pub fn has_speech(&self) -> bool {
        self.speech.is_some()
    }

    fn archives(&self) -> impl Iterator<Item = &ClibArchive> {
        std::iter::once(&self.master)
            .chain(self.audio.as_ref())
            .chain(self.speech.as_ref())
    }

    /// First entry called `name` across the master and the libraries.
    pub fn find_entry(&self, name: &str) -> Option<(&ClibArchive, &ClibEntry)> {
        for archive in self.archives() {
            if let Some(entry) = archive.find_entry(name) {
                return Some((archive, entry));
            }
        }
        None
    }

    pub fn read_bytes(&self, name: &str) -> Option<&[u8]> {
        self.find_entry(name)
            .map(|(archive, entry)| archive.read_entry_bytes(entry))
    }

    /// Data of an audio clip, looked up where its bundling says it lives.
    pub fn clip_bytes(&self, clip: &AudioClipInfo) -> Option<&[u8]> {
        let archive = match clip.bundling {
            Bundling::InAudioVox => self.audio.as_ref()?,
            _ => &self.master,
        };
        archive.read_bytes(&clip.file_name)
    }

    /// Every file name that may hold legacy numbered audio, paired with
    /// where it was found.
    pub fn legacy_audio_files(&self) -> Vec<(&str, Bundling)> {
        let master = self
            .master
            .entries()
            .iter()
            .map(|entry| (entry.name.as_str(), Bundling::InGameArchive));
        let library = self
            .audio
            .iter()
            .flat_map(|archive| archive.entries())
            .map(|entry| (entry.name.as_str(), Bundling::InAudioVox));
        master.chain(library).collect()
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("reading game directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn find_case_insensitive<'a>(files: &'a [PathBuf], name: &str) -> Option<&'a PathBuf> {
    files.iter().find(|path| {
        path.file_name()
            .and_then(|file| file.to_str())
            .map(|file| file.eq_ignore_ascii_case(name))
            .unwrap_or(false)
    })
}

fn open_first_master(dir: &Path, files: &[PathBuf]) -> Result<ClibArchive> {
    let candidates = files.iter().filter(|path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| MASTER_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
            .unwrap_or(false)
    });
    for path in candidates {
        match ClibArchive::open(path) {
            Ok(archive) => return Ok(archive),
            Err(err) => debug!("{} is not a game archive: {err}", path.display()),
        }
    }
    bail!("no game archive found in {}", dir.display())
}

fn open_library(files: &[PathBuf], name: &str) -> Option<ClibArchive> {
    let path = find_case_insensitive(files, name)?;
    match ClibArchive::open(path) {
        Ok(archive) => Some(archive),
        Err(err) => {
            warn!("failed to open {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use ags_formats::ClibBuilder;
    use tempfile::tempdir;

    use super::*;

    fn archive(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut builder = ClibBuilder::new(20);
        for (name, data) in files {
            builder.add_file(name, data.to_vec());
        }
        builder.build().unwrap().master
    }

    #[test]
    fn master_and_libraries_are_found_case_insensitively() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("readme.dat"), b"not an archive")?;
        fs::write(
            dir.path().join("Game.ags"),
            archive(&[("game28.dta", &b"x"[..]), ("sound1.wav", &b"s1"[..])]),
        )?;
        fs::write(
            dir.path().join("AUDIO.VOX"),
            archive(&[("music2.ogg", &b"m2"[..])]),
        )?;

        let resources = ResourceSet::load_from_dir(dir.path(), None)?;
        assert!(resources
            .master()
            .path()
            .ends_with("Game.ags"));
        assert!(resources.separate_audio_library());
        assert!(!resources.has_speech());
        assert_eq!(resources.read_bytes("MUSIC2.OGG"), Some(&b"m2"[..]));
        assert_eq!(
            resources.legacy_audio_files(),
            vec![
                ("game28.dta", Bundling::InGameArchive),
                ("sound1.wav", Bundling::InGameArchive),
                ("music2.ogg", Bundling::InAudioVox),
            ]
        );
        Ok(())
    }

    #[test]
    fn explicit_master_name_is_required_to_exist() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("game.ags"), archive(&[("game28.dta", &b"x"[..])]))?;
        assert!(ResourceSet::load_from_dir(dir.path(), Some("other.ags")).is_err());
        let resources = ResourceSet::load_from_dir(dir.path(), Some("GAME.AGS"))?;
        assert!(resources.find_entry("game28.dta").is_some());
        Ok(())
    }

    #[test]
    fn directories_without_archives_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("notes.exe"), b"MZ")?;
        let err = ResourceSet::load_from_dir(dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("no game archive"));
        assert!(ResourceSet::load_from_dir(dir.path().join("missing"), None).is_err());
        Ok(())
    }
}
