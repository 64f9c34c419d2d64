//! Layout reconciliation.
//!
//! Merges a persisted overlay ([`SavedEntry`] list) over the canonical image
//! list from the content source. The same function runs in the proxy when it
//! serves a gallery and in the editor when it restores a locally saved layout.
//!
//! ```text
//! canonical  a b c          saved  b(size 2) d(size 1)
//!                    merge
//!            b(size 2) a c         (d dropped, a and c appended)
//! ```
//!
//! Rules:
//!
//! 1. Walk the overlay in stored order.
//! 2. Spacers are re-materialized with their spans clamped into the widest
//!    grid (1 to 9 columns, 1 to 12 rows).
//! 3. Image entries whose id the source no longer has are dropped silently.
//! 4. Surviving images take `src`/`alt` from the source and `size`/`crop`
//!    from the overlay. A missing overlay size falls back to the source size.
//! 5. Source images the overlay never mentions are appended in source order.
//!
//! No conflicts are reported: content wins on *what*, the overlay wins on *how*.

use crate::grid::GridSystem;
use crate::layout::{Layout, Tile};
use crate::types::{GalleryConfig, GalleryEntry, ImageEntry, SavedEntry, SavedImage, SpacerEntry};
use std::collections::{HashMap, HashSet};

/// Merge an overlay over canonical entries. Canonical spacers are ignored
/// when an overlay exists; the overlay owns spacer placement.
pub fn merge_entries(canonical: &[GalleryEntry], saved: &[SavedEntry]) -> Vec<GalleryEntry> {
    let mut by_id: HashMap<&str, &ImageEntry> = HashMap::new();
    for image in canonical.iter().filter_map(|entry| match entry {
        GalleryEntry::Image(image) => Some(image),
        GalleryEntry::Spacer(_) => None,
    }) {
        by_id.entry(image.id.as_str()).or_insert(image);
    }

    let mut merged = Vec::with_capacity(canonical.len() + saved.len());
    let mut placed: HashSet<&str> = HashSet::new();

    for entry in saved {
        match entry {
            SavedEntry::Spacer(spacer) => {
                merged.push(GalleryEntry::Spacer(bounded(spacer)));
            }
            SavedEntry::Image(overlay) => {
                let Some(source) = by_id.get(overlay.id.as_str()) else {
                    continue;
                };
                if !placed.insert(source.id.as_str()) {
                    continue;
                }
                merged.push(GalleryEntry::Image(ImageEntry {
                    size: overlay.size.clone().or_else(|| source.size.clone()),
                    crop: overlay.crop,
                    ..(*source).clone()
                }));
            }
        }
    }

    for entry in canonical {
        if let GalleryEntry::Image(image) = entry
            && placed.insert(image.id.as_str())
        {
            merged.push(GalleryEntry::Image(image.clone()));
        }
    }

    merged
}

/// Spacer spans from an overlay are untrusted; keep them inside the widest grid.
/// The layout narrows them again for its own system.
fn bounded(spacer: &SpacerEntry) -> SpacerEntry {
    let (cols, rows) = GridSystem::Dense.clamp_span(spacer.cols.into(), spacer.rows.into());
    SpacerEntry::new(cols, rows)
}

/// Merge an optional overlay into a gallery. No overlay → the gallery as-is.
pub fn merge_gallery(config: &GalleryConfig, saved: Option<&[SavedEntry]>) -> GalleryConfig {
    match saved {
        Some(saved) => GalleryConfig {
            images: merge_entries(&config.images, saved),
            ..config.clone()
        },
        None => config.clone(),
    }
}

/// Serialize the live layout to its overlay form.
///
/// Only presentation is kept: id, explicit size, non-centred crop.
pub fn to_saved(layout: &Layout) -> Vec<SavedEntry> {
    layout
        .tiles()
        .iter()
        .map(|tile| match tile {
            Tile::Spacer(spacer) => SavedEntry::Spacer(SpacerEntry::new(spacer.cols, spacer.rows)),
            Tile::Image(image) => SavedEntry::Image(SavedImage {
                id: image.id.clone(),
                size: image.explicit_size().map(|s| s.to_value()),
                crop: image.crop(),
            }),
        })
        .collect()
}

/// Serialize the live layout in the gallery image-entry shape (JSON export).
pub fn to_entries(layout: &Layout) -> Vec<GalleryEntry> {
    layout
        .tiles()
        .iter()
        .map(|tile| match tile {
            Tile::Spacer(spacer) => {
                GalleryEntry::Spacer(SpacerEntry::new(spacer.cols, spacer.rows))
            }
            Tile::Image(image) => GalleryEntry::Image(ImageEntry {
                id: image.id.clone(),
                src: image.src.clone(),
                alt: image.alt.clone(),
                size: image.explicit_size().map(|s| s.to_value()),
                crop: image.crop(),
                width: image.natural_size().map(|(w, _)| w),
                height: image.natural_size().map(|(_, h)| h),
            }),
        })
        .collect()
}
