//! Wire shapes shared by the editor, the stores and the proxy.
//!
//! Three JSON documents flow through the system:
//!
//! - [`GalleryConfig`]: what the content source returns (and what the proxy
//!   serves after merging). Authoritative for *which* images exist.
//! - [`SavedEntry`] arrays: the persisted layout overlay. Authoritative for
//!   *how* images are displayed (order, size, crop) and where spacers sit.
//! - [`GalleryEntry`] arrays: the merged result and the JSON export.
//!
//! Spacers carry a `"type": "spacer"` marker; image entries carry an `id`.
//! Both arrays are untagged otherwise, so a spacer is tried first.

use crate::layout::Crop;
use serde::{Deserialize, Deserializer, Serialize};

/// Maximum length of a gallery identifier.
pub const GALLERY_ID_MAX_LEN: usize = 64;

/// A size as it appears on the wire: `2`, `"2x2"`, `"tall"`, …
///
/// Interpretation depends on the grid system, see
/// [`GridSystem::parse_size`](crate::grid::GridSystem::parse_size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Number(u32),
    Label(String),
    /// Anything else. Kept so one odd value doesn't reject a whole layout.
    Other(serde_json::Value),
}

/// Canonical gallery description from the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfig {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub images: Vec<GalleryEntry>,
}

impl GalleryConfig {
    /// Image entries in canonical order, spacers skipped.
    pub fn image_entries(&self) -> impl Iterator<Item = &ImageEntry> {
        self.images.iter().filter_map(|entry| match entry {
            GalleryEntry::Image(image) => Some(image),
            GalleryEntry::Spacer(_) => None,
        })
    }
}

/// One image as described by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub id: String,
    pub src: String,
    #[serde(default)]
    pub alt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_crop"
    )]
    pub crop: Option<Crop>,
    /// Natural pixel width, when the source knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Natural pixel height, when the source knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageEntry {
    pub fn new(id: impl Into<String>, src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            alt: alt.into(),
            size: None,
            crop: None,
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpacerMarker {
    Spacer,
}

/// `{"type": "spacer", "cols": 2, "rows": 1}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpacerEntry {
    #[serde(rename = "type")]
    pub kind: SpacerMarker,
    #[serde(default = "one")]
    pub cols: u32,
    #[serde(default = "one")]
    pub rows: u32,
}

impl SpacerEntry {
    pub fn new(cols: u32, rows: u32) -> Self {
        Self {
            kind: SpacerMarker::Spacer,
            cols,
            rows,
        }
    }
}

fn one() -> u32 {
    1
}

/// Overlay entry for an image: presentation only, content comes from the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedImage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeValue>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_crop"
    )]
    pub crop: Option<Crop>,
}

/// One element of a persisted layout overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SavedEntry {
    Spacer(SpacerEntry),
    Image(SavedImage),
}

/// One element of a merged gallery or a JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GalleryEntry {
    Spacer(SpacerEntry),
    Image(ImageEntry),
}

/// Gallery ids double as storage keys and URL path segments.
pub fn is_valid_gallery_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= GALLERY_ID_MAX_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Deserialize a crop string, dropping values that don't parse.
fn lenient_crop<'de, D>(deserializer: D) -> Result<Option<Crop>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(|v| v.as_str()).and_then(Crop::parse))
}
