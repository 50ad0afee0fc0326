use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "m4a"];

pub fn is_hidden(name: &OsStr) -> bool {
    name.to_str().map_or(false, |name| name.starts_with('.'))
}

pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map_or(false, |ext| {
            AUDIO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Every regular file under `dir`, as paths relative to `dir`.
///
/// A directory that does not exist yet is created and indexes as
/// empty, so a blank sync target works on the first run.
pub fn index_files(dir: &Path) -> Result<BTreeSet<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
        return Ok(BTreeSet::new());
    }
    let mut index = BTreeSet::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        index.insert(entry.path().strip_prefix(dir)?.to_path_buf());
    }
    Ok(index)
}

/// An album directory: one root with its audio files and at most one
/// cover image directly inside it.
#[derive(Debug)]
pub struct Collection {
    /// Root relative to the music directory.
    pub root: PathBuf,
    pub tracks: usize,
    pub has_cover: bool,
}

/// Directories under `music_dir` that directly contain audio files,
/// in path order. Hidden directories are not descended into.
pub fn find_collections(music_dir: &Path, cover_name: &str) -> Result<Vec<Collection>> {
    let mut collections = Vec::new();
    let walker = WalkDir::new(music_dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        let mut tracks = 0;
        for child in fs::read_dir(dir).with_context(|| format!("reading {:?}", dir))? {
            let child = child?;
            if child.file_type()?.is_file() && is_audio_file(&child.path()) {
                tracks += 1;
            }
        }
        if tracks == 0 {
            continue;
        }
        collections.push(Collection {
            root: dir.strip_prefix(music_dir)?.to_path_buf(),
            tracks,
            has_cover: dir.join(cover_name).is_file(),
        });
    }
    collections.sort_by(|a, b| a.root.cmp(&b.root));
    Ok(collections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn hidden_names() {
        assert!(is_hidden(OsStr::new(".stfolder")));
        assert!(!is_hidden(OsStr::new("cover.jpg")));
    }

    #[test]
    fn audio_extensions_case_insensitive() {
        assert!(is_audio_file(Path::new("a/b/track.MP3")));
        assert!(is_audio_file(Path::new("track.opus")));
        assert!(!is_audio_file(Path::new("cover.jpg")));
        assert!(!is_audio_file(Path::new("noext")));
    }

    #[test]
    fn index_is_relative_and_recursive() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Band/Album")).unwrap();
        fs::write(root.join("Band/Album/01.mp3"), b"x").unwrap();
        fs::write(root.join("top.mp3"), b"x").unwrap();

        let index = index_files(root).unwrap();
        assert!(index.contains(Path::new("Band/Album/01.mp3")));
        assert!(index.contains(Path::new("top.mp3")));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn missing_dir_is_created_and_empty() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("fresh");
        let index = index_files(&target).unwrap();
        assert!(index.is_empty());
        assert!(target.is_dir());
    }

    #[test]
    fn collections_report_cover_presence() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("Band/With")).unwrap();
        fs::create_dir_all(root.join("Band/Without")).unwrap();
        fs::write(root.join("Band/With/01.mp3"), b"x").unwrap();
        fs::write(root.join("Band/With/cover.jpg"), b"x").unwrap();
        fs::write(root.join("Band/Without/01.flac"), b"x").unwrap();

        let collections = find_collections(root, "cover.jpg").unwrap();
        assert_eq!(collections.len(), 2);
        assert_eq!(collections[0].root, Path::new("Band/With"));
        assert!(collections[0].has_cover);
        assert_eq!(collections[1].root, Path::new("Band/Without"));
        assert!(!collections[1].has_cover);
    }
}
