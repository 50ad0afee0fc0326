use anyhow::Result;
use id3::{Tag, Version};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static TRACK_NUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,3})\b").unwrap());

/// Reads the ID3 tag, or starts an empty one for untagged files.
pub fn read_or_new(path: &Path) -> Result<Tag> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(tag),
        Err(err) if matches!(err.kind, id3::ErrorKind::NoTag) => Ok(Tag::new()),
        Err(err) => Err(err.into()),
    }
}

pub fn write(tag: &Tag, path: &Path) -> Result<()> {
    tag.write_to_path(path, Version::Id3v23)?;
    Ok(())
}

/// Track number from a leading `NN ` / `NN-` file name prefix.
pub fn infer_track_number(file_name: &str) -> Option<u32> {
    TRACK_NUM
        .captures(file_name)?
        .get(1)?
        .as_str()
        .parse()
        .ok()
}

/// `NN Artist - Title.ext` for flat copies, falling back to the source
/// file name when tags are missing.
pub fn flat_name(tag: &Tag, path: &Path, index: usize) -> String {
    let fallback = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("mp3");
    match (tag.artist(), tag.title()) {
        (Some(artist), Some(title)) => format!(
            "{:02} {} - {}.{}",
            index,
            sanitize(artist),
            sanitize(title),
            ext
        ),
        _ => format!("{:02} {}", index, fallback),
    }
}

fn sanitize(field: &str) -> String {
    field.replace('/', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_numbers_from_common_prefixes() {
        assert_eq!(infer_track_number("01 Intro.mp3"), Some(1));
        assert_eq!(infer_track_number("12-Outro.mp3"), Some(12));
        assert_eq!(infer_track_number("Intro.mp3"), None);
        // A year is not a track number.
        assert_eq!(infer_track_number("2020 vision.mp3"), None);
    }

    #[test]
    fn flat_names_prefer_tags() {
        let mut tag = Tag::new();
        tag.set_artist("AC/DC");
        tag.set_title("T.N.T.");
        let name = flat_name(&tag, Path::new("Band/Album/04 tnt.mp3"), 4);
        assert_eq!(name, "04 AC-DC - T.N.T..mp3");
    }

    #[test]
    fn flat_names_fall_back_to_file_name() {
        let tag = Tag::new();
        let name = flat_name(&tag, Path::new("Band/Album/04 tnt.mp3"), 7);
        assert_eq!(name, "07 04 tnt.mp3");
    }
}
