use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use music_scripts::art;
use music_scripts::prompt::{self, Outcome};
use music_scripts::tags;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(
    name = "id3stuff",
    about = "Fill in missing ID3 tags, one prompt at a time."
)]
struct Opt {
    /// Directory of MP3s to fix (usually one album)
    #[clap(parse(from_os_str), default_value = ".")]
    dir: PathBuf,

    /// Cover art file offered for embedding when a file has none
    #[clap(long, default_value = "cover.jpg")]
    cover: String,

    /// Re-prompt attempts per field
    #[clap(long, default_value = "3")]
    attempts: usize,
}

fn main() -> Result<()> {
    let opt = Opt::parse();

    stderrlog::new()
        .module(module_path!())
        .module("music_scripts")
        .verbosity(2)
        .init()
        .unwrap();

    let mut files: Vec<PathBuf> = fs::read_dir(&opt.dir)
        .with_context(|| format!("reading {:?}", opt.dir))?
        .filter_map(|ent| ent.ok())
        .map(|ent| ent.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("mp3"))
        })
        .collect();
    files.sort();

    let cover = fs::read(opt.dir.join(&opt.cover)).ok();

    for path in files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut tag = match tags::read_or_new(&path) {
            Ok(tag) => tag,
            Err(err) => {
                warn!("skipping {:?}: {}", path, err);
                continue;
            }
        };

        println!("{}", name);
        println!(
            "  artist: {}  album: {}  title: {}  track: {}",
            tag.artist().unwrap_or("-"),
            tag.album().unwrap_or("-"),
            tag.title().unwrap_or("-"),
            tag.track().map_or("-".to_string(), |n| n.to_string()),
        );

        let mut changed = false;

        if tag.artist().is_none() {
            if let Outcome::Confirmed(value) = prompt::text_field("artist", None, opt.attempts)? {
                tag.set_artist(value);
                changed = true;
            }
        }
        if tag.album().is_none() {
            if let Outcome::Confirmed(value) = prompt::text_field("album", None, opt.attempts)? {
                tag.set_album(value);
                changed = true;
            }
        }
        if tag.title().is_none() {
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or("");
            let guess = stem
                .trim_start_matches(|c: char| c.is_ascii_digit())
                .trim_start_matches(['-', '.', '_', ' ']);
            let initial = if guess.is_empty() { None } else { Some(guess) };
            if let Outcome::Confirmed(value) = prompt::text_field("title", initial, opt.attempts)? {
                tag.set_title(value);
                changed = true;
            }
        }
        if tag.track().is_none() {
            if let Some(num) = tags::infer_track_number(&name) {
                tag.set_track(num);
                changed = true;
            } else if let Outcome::Confirmed(value) =
                prompt::text_field("track number", None, opt.attempts)?
            {
                match value.parse::<u32>() {
                    Ok(num) => {
                        tag.set_track(num);
                        changed = true;
                    }
                    Err(_) => warn!("not a track number: {:?}", value),
                }
            }
        }
        if let Some(cover) = &cover {
            if !art::has_front_cover(&tag)
                && prompt::confirm(&format!("embed {} into {}?", opt.cover, name), true)?
            {
                art::embed_front_cover(&mut tag, cover.clone());
                changed = true;
            }
        }

        if changed {
            tags::write(&tag, &path)?;
            println!("  written");
        }
    }

    Ok(())
}
