//! Content source: the canonical list of galleries and their images.
//!
//! The editor and proxy only see the [`ContentSource`] trait. The bundled
//! [`DirectorySource`] serves galleries from a content directory:
//!
//! ```text
//! content/
//! ├── portraits.json            # A GalleryConfig document, served as-is
//! └── summer/                   # A directory gallery
//!     ├── subtitle.md           # Optional subtitle (markdown)
//!     ├── 001-Beach-Day.jpg     # id "beach-day", alt "Beach Day"
//!     ├── 002-Harbour.jpg
//!     └── sunset.png            # Unnumbered: after numbered, by name
//! ```
//!
//! Directory galleries are ordered by the `NNN-` filename prefix. Natural
//! dimensions are read from image headers in parallel, so auto-orientation
//! can size tiles before any browser loads them.

use crate::types::{GalleryConfig, GalleryEntry, ImageEntry, is_valid_gallery_id};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid gallery file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub trait ContentSource {
    /// Canonical gallery for `id`. `Ok(None)` when the source has no such gallery.
    fn fetch(&self, id: &str) -> Result<Option<GalleryConfig>, SourceError>;

    /// Ids of every gallery the source knows.
    fn gallery_ids(&self) -> Result<Vec<String>, SourceError>;
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const SUBTITLE_FILES: &[&str] = &["subtitle.md", "subtitle.txt"];

/// Galleries read from a content directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    /// URL prefix under which the content directory is served.
    url_prefix: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            url_prefix: "/content".to_string(),
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into().trim_end_matches('/').to_string();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_json(&self, id: &str, path: &Path) -> Result<GalleryConfig, SourceError> {
        let raw = fs::read_to_string(path)?;
        let mut config: GalleryConfig =
            serde_json::from_str(&raw).map_err(|source| SourceError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        if config.id != id {
            debug!(file = %path.display(), declared = %config.id, "gallery id follows file name");
            config.id = id.to_string();
        }
        Ok(config)
    }

    fn read_directory(&self, id: &str, dir: &Path) -> Result<GalleryConfig, SourceError> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
            let entry = entry?;
            if entry.file_type().is_file() && is_image(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort_by_cached_key(|path| {
            let stem = file_stem(path);
            let order = split_order(&stem).0.unwrap_or(u32::MAX);
            (order, stem)
        });

        let dimensions: Vec<Option<(u32, u32)>> = files
            .par_iter()
            .map(|path| match image::image_dimensions(path) {
                Ok(dims) => Some(dims),
                Err(err) => {
                    debug!(file = %path.display(), "no dimensions: {err}");
                    None
                }
            })
            .collect();

        let mut seen = HashSet::new();
        let images = files
            .iter()
            .zip(dimensions)
            .map(|(path, dims)| {
                let stem = file_stem(path);
                let (_, name) = split_order(&stem);
                let base = if name.is_empty() { stem.as_str() } else { name };
                let image_id = unique_id(&mut seen, &slug(base));
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let mut image = ImageEntry::new(
                    image_id,
                    format!("{}/{}/{}", self.url_prefix, id, file_name),
                    name.replace('-', " "),
                );
                if let Some((width, height)) = dims {
                    image.width = Some(width);
                    image.height = Some(height);
                }
                GalleryEntry::Image(image)
            })
            .collect();

        Ok(GalleryConfig {
            id: id.to_string(),
            title: id.replace(['-', '_'], " "),
            subtitle: read_subtitle(dir)?,
            images,
        })
    }
}

impl ContentSource for DirectorySource {
    fn fetch(&self, id: &str) -> Result<Option<GalleryConfig>, SourceError> {
        if !is_valid_gallery_id(id) {
            return Ok(None);
        }
        let json = self.root.join(format!("{id}.json"));
        if json.is_file() {
            return self.read_json(id, &json).map(Some);
        }
        let dir = self.root.join(id);
        if dir.is_dir() {
            return self.read_directory(id, &dir).map(Some);
        }
        Ok(None)
    }

    fn gallery_ids(&self) -> Result<Vec<String>, SourceError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            let id = if entry.file_type().is_dir() {
                entry.file_name().to_string_lossy().into_owned()
            } else if path.extension().is_some_and(|e| e == "json") {
                file_stem(path)
            } else {
                continue;
            };
            if is_valid_gallery_id(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Split `020-Beach-Day` into `(Some(20), "Beach-Day")`. Names without a
/// numeric prefix come back whole.
fn split_order(stem: &str) -> (Option<u32>, &str) {
    let digits = stem.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return (None, stem);
    }
    let rest = &stem[digits..];
    match (stem[..digits].parse().ok(), rest) {
        (Some(n), "") => (Some(n), ""),
        (Some(n), rest) if rest.starts_with('-') => (Some(n), &rest[1..]),
        _ => (None, stem),
    }
}

/// Lowercase, `[a-z0-9-]` only, runs of anything else collapsed to one dash.
fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_id(seen: &mut HashSet<String>, base: &str) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{base}-{n}");
        n += 1;
    }
    candidate
}

fn read_subtitle(dir: &Path) -> Result<String, SourceError> {
    for name in SUBTITLE_FILES {
        let path = dir.join(name);
        if path.is_file() {
            return Ok(fs::read_to_string(path)?.trim().to_string());
        }
    }
    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    fn image_ids(config: &GalleryConfig) -> Vec<&str> {
        config.image_entries().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn split_order_variants() {
        assert_eq!(split_order("020-Beach-Day"), (Some(20), "Beach-Day"));
        assert_eq!(split_order("001"), (Some(1), ""));
        assert_eq!(split_order("001-"), (Some(1), ""));
        assert_eq!(split_order("sunset"), (None, "sunset"));
        assert_eq!(split_order("2024summer"), (None, "2024summer"));
    }

    #[test]
    fn slug_normalizes() {
        assert_eq!(slug("Beach-Day"), "beach-day");
        assert_eq!(slug("My  Museum!"), "my-museum");
        assert_eq!(slug("---"), "image");
    }

    #[test]
    fn directory_gallery_is_ordered_by_prefix() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("summer");
        fs::create_dir(&dir).unwrap();
        write_png(&dir.join("010-Harbour.png"), 4, 2);
        write_png(&dir.join("002-Beach-Day.png"), 2, 4);
        write_png(&dir.join("sunset.png"), 3, 3);
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.join("subtitle.md"), "Warm *days*\n").unwrap();

        let source = DirectorySource::new(tmp.path());
        let config = source.fetch("summer").unwrap().unwrap();
        assert_eq!(image_ids(&config), vec!["beach-day", "harbour", "sunset"]);
        assert_eq!(config.title, "summer");
        assert_eq!(config.subtitle, "Warm *days*");

        let first = config.image_entries().next().unwrap();
        assert_eq!(first.src, "/content/summer/002-Beach-Day.png");
        assert_eq!(first.alt, "Beach Day");
        assert_eq!((first.width, first.height), (Some(2), Some(4)));
    }

    #[test]
    fn duplicate_names_get_distinct_ids() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("g");
        fs::create_dir(&dir).unwrap();
        write_png(&dir.join("001-Sea.png"), 1, 1);
        write_png(&dir.join("002-Sea.png"), 1, 1);
        let config = DirectorySource::new(tmp.path()).fetch("g").unwrap().unwrap();
        assert_eq!(image_ids(&config), vec!["sea", "sea-2"]);
    }

    #[test]
    fn unreadable_image_has_no_dimensions() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("g");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("001-broken.jpg"), b"not a jpeg").unwrap();
        let config = DirectorySource::new(tmp.path()).fetch("g").unwrap().unwrap();
        let image = config.image_entries().next().unwrap();
        assert_eq!(image.width, None);
    }

    #[test]
    fn json_gallery_served_with_file_id() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("portraits.json"),
            r#"{"id": "other", "title": "Portraits", "images": [{"id": "p1", "src": "/p1.jpg"}]}"#,
        )
        .unwrap();
        let config = DirectorySource::new(tmp.path())
            .fetch("portraits")
            .unwrap()
            .unwrap();
        assert_eq!(config.id, "portraits");
        assert_eq!(config.title, "Portraits");
        assert_eq!(image_ids(&config), vec!["p1"]);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.json"), "{").unwrap();
        assert!(matches!(
            DirectorySource::new(tmp.path()).fetch("bad"),
            Err(SourceError::Json { .. })
        ));
    }

    #[test]
    fn unknown_and_invalid_ids_are_not_found() {
        let tmp = TempDir::new().unwrap();
        let source = DirectorySource::new(tmp.path());
        assert!(source.fetch("nope").unwrap().is_none());
        assert!(source.fetch("../etc").unwrap().is_none());
    }

    #[test]
    fn gallery_ids_lists_dirs_and_json() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("summer")).unwrap();
        fs::write(tmp.path().join("portraits.json"), "{}").unwrap();
        fs::write(tmp.path().join("readme.md"), "").unwrap();
        fs::create_dir(tmp.path().join("has space")).unwrap();
        let ids = DirectorySource::new(tmp.path()).gallery_ids().unwrap();
        assert_eq!(ids, vec!["portraits", "summer"]);
    }

    #[test]
    fn custom_url_prefix() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("g");
        fs::create_dir(&dir).unwrap();
        write_png(&dir.join("a.png"), 1, 1);
        let config = DirectorySource::new(tmp.path())
            .with_url_prefix("https://cdn.example.com/photos/")
            .fetch("g")
            .unwrap()
            .unwrap();
        assert_eq!(
            config.image_entries().next().unwrap().src,
            "https://cdn.example.com/photos/g/a.png"
        );
    }
}
