use crate::library::is_hidden;
use anyhow::{Context, Result};
use log::warn;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// The distinct relative paths referenced across every playlist in a
/// directory. Duplicates across playlists collapse; iteration is in
/// path order so runs over the set are deterministic.
#[derive(Debug, Default)]
pub struct PlaylistLineSet {
    entries: BTreeSet<PathBuf>,
}

impl PlaylistLineSet {
    /// Reads every non-hidden regular file under `dir`, one relative
    /// path per line. Blank lines, `#` directives and lines starting
    /// with one of `exclude` are dropped. A playlist that cannot be
    /// read is reported and skipped rather than failing the run.
    pub fn load(dir: &Path, exclude: &[String]) -> Result<PlaylistLineSet> {
        let mut entries = BTreeSet::new();
        let listing =
            fs::read_dir(dir).with_context(|| format!("reading playlist directory {:?}", dir))?;
        for ent in listing {
            let ent = ent?;
            if !ent.file_type()?.is_file() || is_hidden(&ent.file_name()) {
                continue;
            }
            let path = ent.path();
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    warn!("skipping unreadable playlist {:?}: {}", path, err);
                    continue;
                }
            };
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if exclude.iter().any(|prefix| line.starts_with(prefix.as_str())) {
                    continue;
                }
                entries.insert(PathBuf::from(line));
            }
        }
        Ok(PlaylistLineSet { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.entries.iter().map(PathBuf::as_path)
    }

    pub fn contains(&self, rel: &Path) -> bool {
        self.entries.contains(rel)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn collapses_duplicates_across_playlists() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("car"), "Band/Album/01.mp3\nBand/Album/02.mp3\n").unwrap();
        fs::write(tmp.path().join("gym"), "Band/Album/02.mp3\nOther/03.mp3\n").unwrap();

        let set = PlaylistLineSet::load(tmp.path(), &[]).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(Path::new("Band/Album/02.mp3")));
    }

    #[test]
    fn skips_comments_blanks_and_excluded_prefixes() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("all"),
            "#EXTM3U\n\nPodcasts/ep1.mp3\nBand/Album/01.mp3\n  \n",
        )
        .unwrap();

        let exclude = vec!["Podcasts/".to_string()];
        let set = PlaylistLineSet::load(tmp.path(), &exclude).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(Path::new("Band/Album/01.mp3")));
    }

    #[test]
    fn ignores_hidden_playlist_files() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".backup"), "Band/Album/01.mp3\n").unwrap();

        let set = PlaylistLineSet::load(tmp.path(), &[]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(PlaylistLineSet::load(&tmp.path().join("nope"), &[]).is_err());
    }
}
