use crate::config::Config;
use crate::library::{self, is_hidden};
use crate::playlist::PlaylistLineSet;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Where to sync and how destructive to be.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub target_dir: PathBuf,
    /// File name of per-album cover art, e.g. `cover.jpg`.
    pub cover_name: String,
    /// Remove target files no playlist references any more.
    pub delete: bool,
}

/// Mutations performed by one run. All-zero on the second of two
/// back-to-back runs with unchanged inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    /// Fresh links for targets that did not exist.
    pub linked: usize,
    /// Stale targets removed and linked again.
    pub replaced: usize,
    /// Cover files linked or replaced.
    pub covers: usize,
    /// Orphans removed by the delete pass.
    pub deleted: usize,
    /// Directories removed by the prune pass.
    pub pruned: usize,
}

impl SyncStats {
    pub fn mutations(&self) -> usize {
        self.linked + self.replaced + self.covers + self.deleted + self.pruned
    }
}

enum Linked {
    Fresh,
    Replaced,
}

/// Makes a target tree match the set of playlist-referenced files.
///
/// Every step is independently idempotent, so an interrupted run is
/// repaired by running again; there is no rollback.
pub struct Reconciler<'a> {
    music_dir: &'a Path,
    opts: SyncOptions,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a Config, opts: SyncOptions) -> Reconciler<'a> {
        Reconciler {
            music_dir: &config.music_dir,
            opts,
        }
    }

    pub fn run(&self, playlists: &PlaylistLineSet) -> Result<SyncStats> {
        let mut stats = SyncStats::default();
        let mut present = library::index_files(&self.opts.target_dir)?;
        let mut roots = BTreeSet::new();

        for rel in playlists.iter() {
            let source = self.music_dir.join(rel);
            if !source.is_file() {
                warn!("{:?} is in a playlist but not in {:?}", rel, self.music_dir);
                present.remove(rel);
                continue;
            }
            let target = self.opts.target_dir.join(rel);
            match self.ensure_linked(&source, &target)? {
                Some(Linked::Fresh) => stats.linked += 1,
                Some(Linked::Replaced) => stats.replaced += 1,
                None => {}
            }
            present.remove(rel);
            if let Some(parent) = rel.parent() {
                if parent != Path::new("") {
                    roots.insert(parent.to_path_buf());
                }
            }
        }

        for root in &roots {
            let cover_rel = root.join(&self.opts.cover_name);
            let source = self.music_dir.join(&cover_rel);
            if !source.is_file() {
                continue;
            }
            let target = self.opts.target_dir.join(&cover_rel);
            if self.ensure_linked(&source, &target)?.is_some() {
                stats.covers += 1;
            }
            present.remove(&cover_rel);
        }

        if self.opts.delete {
            stats.deleted = self.delete_orphans(&present)?;
            stats.pruned = self.prune_dirs()?;
        }

        info!(
            "synced {} entries into {:?} ({} mutations)",
            playlists.len(),
            self.opts.target_dir,
            stats.mutations()
        );
        Ok(stats)
    }

    /// Links `target` to `source` unless a file of the source's size is
    /// already there. Size equality stands in for content equality;
    /// two different files of the same length count as in sync.
    fn ensure_linked(&self, source: &Path, target: &Path) -> Result<Option<Linked>> {
        let source_len = fs::metadata(source)
            .with_context(|| format!("stat {:?}", source))?
            .len();
        match fs::metadata(target) {
            Ok(meta) if meta.len() == source_len => return Ok(None),
            Ok(_) => {
                fs::remove_file(target).with_context(|| format!("removing stale {:?}", target))?;
                link_or_copy(source, target)?;
                return Ok(Some(Linked::Replaced));
            }
            // Deleted between indexing and now; treat as a fresh link.
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err).with_context(|| format!("stat {:?}", target)),
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        link_or_copy(source, target)?;
        Ok(Some(Linked::Fresh))
    }

    /// Removes everything left in `present` after the link pass, except
    /// hidden paths and files named like the cover art.
    fn delete_orphans(&self, present: &BTreeSet<PathBuf>) -> Result<usize> {
        let cover_name = OsStr::new(&self.opts.cover_name);
        let mut deleted = 0;
        for rel in present {
            if rel.components().any(|c| is_hidden(c.as_os_str())) {
                continue;
            }
            if rel.file_name() == Some(cover_name) {
                continue;
            }
            let path = self.opts.target_dir.join(rel);
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("removed {:?}", rel);
                    deleted += 1;
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err).with_context(|| format!("removing {:?}", path)),
            }
        }
        Ok(deleted)
    }

    /// Bottom-up pass over the target tree. A non-hidden directory
    /// holding nothing but the cover file loses the cover and then the
    /// directory itself; not-empty failures are expected and ignored.
    fn prune_dirs(&self) -> Result<usize> {
        let mut pruned = 0;
        let walker = WalkDir::new(&self.opts.target_dir)
            .contents_first(true)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
        for entry in walker {
            let entry = entry?;
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                continue;
            }
            let dir = entry.path();
            if let Some(cover) = self.lone_cover(dir)? {
                fs::remove_file(&cover)
                    .with_context(|| format!("removing orphaned cover {:?}", cover))?;
            }
            match fs::remove_dir(dir) {
                Ok(()) => {
                    debug!("pruned {:?}", dir);
                    pruned += 1;
                }
                Err(err)
                    if err.kind() == io::ErrorKind::DirectoryNotEmpty
                        || err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err).with_context(|| format!("pruning {:?}", dir)),
            }
        }
        Ok(pruned)
    }

    /// The cover file's path if it is the only thing inside `dir`.
    fn lone_cover(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let mut entries = fs::read_dir(dir).with_context(|| format!("reading {:?}", dir))?;
        let first = match entries.next() {
            Some(ent) => ent?,
            None => return Ok(None),
        };
        if entries.next().is_some() {
            return Ok(None);
        }
        if first.file_type()?.is_file() && first.file_name() == OsStr::new(&self.opts.cover_name) {
            Ok(Some(first.path()))
        } else {
            Ok(None)
        }
    }
}

fn link_or_copy(source: &Path, target: &Path) -> Result<()> {
    if let Err(err) = fs::hard_link(source, target) {
        // Cross-device target; fall back to a plain copy.
        debug!("hardlink to {:?} failed ({}), copying", target, err);
        fs::copy(source, target)
            .with_context(|| format!("copying {:?} to {:?}", source, target))?;
    }
    Ok(())
}
