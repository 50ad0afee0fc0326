use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Directories and host identity for one run.
///
/// Built once in each binary from the environment and passed by
/// reference; nothing in the library reads `env` on its own.
#[derive(Debug, Clone)]
pub struct Config {
    pub music_dir: PathBuf,
    pub playlist_dir: PathBuf,
    pub host: Option<String>,
}

impl Config {
    /// Reads `MUSIC_DIR` (default `$HOME/Music`), `PLAYLIST_DIR`
    /// (default `$MUSIC_DIR/Playlists`) and `MUSIC_HOST`.
    pub fn from_env() -> Result<Config> {
        let home = env::var_os("HOME").context("HOME is not set")?;
        let music_dir = match env::var_os("MUSIC_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(home).join("Music"),
        };
        if !music_dir.is_dir() {
            bail!("music directory {:?} does not exist", music_dir);
        }
        let playlist_dir = match env::var_os("PLAYLIST_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => music_dir.join("Playlists"),
        };
        let host = env::var("MUSIC_HOST").ok().filter(|h| !h.is_empty());
        Ok(Config {
            music_dir,
            playlist_dir,
            host,
        })
    }

    /// Refuses to run on the wrong machine. With `MUSIC_HOST` unset
    /// the guard is disabled.
    pub fn check_host(&self) -> Result<()> {
        let expected = match &self.host {
            Some(host) => host,
            None => return Ok(()),
        };
        let hostname = fs::read_to_string("/etc/hostname")
            .context("MUSIC_HOST is set but /etc/hostname is unreadable")?;
        let hostname = hostname.trim();
        if hostname != expected {
            bail!(
                "running on {:?} but MUSIC_HOST is {:?} (use --bypass to override)",
                hostname,
                expected
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_host_disables_guard() {
        let config = Config {
            music_dir: PathBuf::from("/nonexistent"),
            playlist_dir: PathBuf::from("/nonexistent"),
            host: None,
        };
        assert!(config.check_host().is_ok());
    }
}
