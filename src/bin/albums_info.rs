use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use music_scripts::art;
use music_scripts::config::Config;
use music_scripts::library;
use music_scripts::prompt::{self, Outcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Parser)]
#[clap(
    name = "albums-info",
    about = "Report albums with no cover art and fix them interactively."
)]
struct Opt {
    /// Cover art file name expected in each album directory
    #[clap(long, default_value = "cover.jpg")]
    cover: String,

    /// Prompt again for albums dismissed on earlier runs
    #[clap(long)]
    redo: bool,

    /// Report only, never prompt
    #[clap(short, long)]
    list: bool,
}

/// Albums the user has already said no to, kept between runs.
#[derive(Default, Serialize, Deserialize)]
struct Dismissed {
    albums: BTreeSet<String>,
}

impl Dismissed {
    fn load(path: &Path) -> Result<Dismissed> {
        if !path.exists() {
            return Ok(Dismissed::default());
        }
        let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
        Ok(serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing {:?}", path))?)
    }

    fn store(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("writing {:?}", path))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
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
    let cache_path = config.music_dir.join(".albums-info.json");
    let mut dismissed = if opt.redo {
        Dismissed::default()
    } else {
        Dismissed::load(&cache_path)?
    };

    let collections = library::find_collections(&config.music_dir, &opt.cover)?;
    let missing: Vec<_> = collections.iter().filter(|c| !c.has_cover).collect();
    info!(
        "{} albums, {} without {}",
        collections.len(),
        missing.len(),
        opt.cover
    );

    let mut updated = false;
    for collection in missing {
        let key = collection.root.to_string_lossy().into_owned();
        if dismissed.albums.contains(&key) {
            continue;
        }
        println!("{} ({} tracks, no {})", key, collection.tracks, opt.cover);
        if opt.list {
            continue;
        }
        match prompt::choose("what now", &["skip", "dismiss forever", "download from URL"])? {
            1 => {
                dismissed.albums.insert(key);
                updated = true;
            }
            2 => {
                if let Outcome::Confirmed(url) = prompt::text_field("image URL", None, 3)? {
                    let dest = config.music_dir.join(&collection.root).join(&opt.cover);
                    match art::download(&url).and_then(|data| art::save_jpeg(&data, &dest)) {
                        Ok(()) => println!("  saved {:?}", dest),
                        Err(err) => warn!("cover download failed: {:#}", err),
                    }
                }
            }
            _ => {}
        }
    }

    if updated {
        dismissed.store(&cache_path)?;
    }

    Ok(())
}
