use anyhow::{ensure, Context, Result};
use id3::frame::{Picture, PictureType};
use id3::Tag;
use image::DynamicImage;
use std::path::Path;
use url::Url;

/// Fetches an image over HTTP. The URL is parsed up front so a stray
/// paste fails before any request goes out.
pub fn download(url: &str) -> Result<Vec<u8>> {
    let url = Url::parse(url).with_context(|| format!("invalid url {:?}", url))?;
    let response = attohttpc::get(url.as_str()).send()?;
    ensure!(
        response.is_success(),
        "fetching {} returned {}",
        url,
        response.status()
    );
    Ok(response.bytes()?)
}

/// Decodes `data` in whatever format it arrived and rewrites it as
/// JPEG at `path`. Alpha is flattened since JPEG has none.
pub fn save_jpeg(data: &[u8], path: &Path) -> Result<()> {
    let decoded = image::load_from_memory(data).context("decoding image")?;
    DynamicImage::ImageRgb8(decoded.to_rgb8())
        .save_with_format(path, image::ImageFormat::Jpeg)
        .with_context(|| format!("writing {:?}", path))?;
    Ok(())
}

pub fn has_front_cover(tag: &Tag) -> bool {
    tag.pictures()
        .any(|picture| picture.picture_type == PictureType::CoverFront)
}

/// Replaces the front-cover frame with `data` (JPEG bytes).
pub fn embed_front_cover(tag: &mut Tag, data: Vec<u8>) {
    tag.remove_picture_by_type(PictureType::CoverFront);
    tag.add_picture(Picture {
        mime_type: "image/jpeg".to_string(),
        picture_type: PictureType::CoverFront,
        description: "Cover (Front)".to_string(),
        data,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_replaces_existing_front_cover() {
        let mut tag = Tag::new();
        embed_front_cover(&mut tag, vec![1, 2, 3]);
        embed_front_cover(&mut tag, vec![4, 5, 6]);
        let covers: Vec<_> = tag
            .pictures()
            .filter(|p| p.picture_type == PictureType::CoverFront)
            .collect();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0].data, vec![4, 5, 6]);
        assert!(has_front_cover(&tag));
    }

    #[test]
    fn garbage_urls_fail_without_a_request() {
        assert!(download("not a url").is_err());
    }
}
