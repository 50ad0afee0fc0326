use anyhow::Result;
use clap::Parser;
use log::info;
use music_scripts::config::Config;
use music_scripts::playlist::PlaylistLineSet;
use music_scripts::sync::{Reconciler, SyncOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = "linkmusic",
    about = "Hardlink every playlist-referenced track into a target directory."
)]
struct Opt {
    /// Sync target directory
    #[clap(parse(from_os_str))]
    target: PathBuf,

    /// Remove target files no playlist references any more
    #[clap(short, long)]
    delete: bool,

    /// Cover art file name propagated per album
    #[clap(long, default_value = "cover.jpg")]
    cover: String,

    /// Drop playlist lines starting with this prefix (repeatable)
    #[clap(short = 'x', long = "exclude")]
    exclude: Vec<String>,

    /// Skip the host identity check
    #[clap(long)]
    bypass: bool,

    /// Only print warnings and errors
    #[clap(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    stderrlog::new()
        .module(module_path!())
        .module("music_scripts")
        .verbosity(if opt.quiet { 1 } else { 2 })
        .init()
        .unwrap();

    let config = Config::from_env()?;
    if !opt.bypass {
        config.check_host()?;
    }

    let playlists = PlaylistLineSet::load(&config.playlist_dir, &opt.exclude)?;
    info!(
        "{} tracks across playlists in {:?}",
        playlists.len(),
        config.playlist_dir
    );

    let reconciler = Reconciler::new(
        &config,
        SyncOptions {
            target_dir: opt.target,
            cover_name: opt.cover,
            delete: opt.delete,
        },
    );
    let stats = reconciler.run(&playlists)?;

    info!(
        "{} linked, {} replaced, {} covers, {} deleted, {} pruned",
        stats.linked, stats.replaced, stats.covers, stats.deleted, stats.pruned
    );

    Ok(())
}
