use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use music_scripts::config::Config;
use music_scripts::prompt;
use music_scripts::tags;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = "car-playlist",
    about = "Copy a playlist's tracks into a flat directory for the car stereo."
)]
struct Opt {
    /// Playlist file to copy from
    #[clap(parse(from_os_str))]
    playlist: PathBuf,

    /// Flat destination directory (the USB stick mount)
    #[clap(parse(from_os_str))]
    dest: PathBuf,

    /// Copy everything without asking
    #[clap(short, long)]
    yes: bool,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    stderrlog::new()
        .module(module_path!())
        .module("music_scripts")
        .verbosity(2)
        .init()
        .unwrap();

    let config = Config::from_env()?;
    let text = fs::read_to_string(&opt.playlist)
        .with_context(|| format!("reading {:?}", opt.playlist))?;
    fs::create_dir_all(&opt.dest).with_context(|| format!("creating {:?}", opt.dest))?;

    // Copies are numbered in confirmation order so the head unit plays
    // them in the order they were picked.
    let mut index = 1;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let source = config.music_dir.join(line);
        if !source.is_file() {
            warn!("{} is not in {:?}", line, config.music_dir);
            continue;
        }
        if !opt.yes && !prompt::confirm(&format!("copy {}?", line), true)? {
            continue;
        }
        let tag = tags::read_or_new(&source)?;
        let name = tags::flat_name(&tag, &source, index);
        let dest = opt.dest.join(&name);
        fs::copy(&source, &dest)
            .with_context(|| format!("copying {:?} to {:?}", source, dest))?;
        println!("{}", name);
        index += 1;
    }

    Ok(())
}
