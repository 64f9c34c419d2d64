//! Shared fixtures for the unit test suite.
//!
//! Builders for canonical galleries and layouts, plus extractors that turn a
//! layout into something `assert_eq!` can compare at a glance.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
//! assert_eq!(ids(&layout), vec!["a", "b", "c"]);
//! ```

use crate::grid::GridSystem;
use crate::layout::{Layout, Tile};
use crate::reflow::GridMetrics;
use crate::types::{GalleryConfig, GalleryEntry, ImageEntry};

// =========================================================================
// Builders
// =========================================================================

/// Canonical image entries with predictable `src`/`alt`.
pub fn canonical_entries(ids: &[&str]) -> Vec<GalleryEntry> {
    ids.iter()
        .map(|id| {
            GalleryEntry::Image(ImageEntry::new(
                *id,
                format!("/img/{id}.jpg"),
                format!("Image {id}"),
            ))
        })
        .collect()
}

pub fn gallery(id: &str, ids: &[&str]) -> GalleryConfig {
    GalleryConfig {
        id: id.to_string(),
        title: format!("Gallery {id}"),
        subtitle: String::new(),
        images: canonical_entries(ids),
    }
}

pub fn layout_of(system: GridSystem, ids: &[&str]) -> Layout {
    Layout::from_entries(system, &canonical_entries(ids))
}

/// Square cells of `cell` px with no gap, on the system's column count.
pub fn square_metrics(system: GridSystem, cell: f64) -> GridMetrics {
    GridMetrics {
        columns: system.columns(),
        container_width: cell * system.columns() as f64,
        gap: 0.0,
        dense_packing: false,
    }
}

// =========================================================================
// Extractors
// =========================================================================

/// Tile identities in order; spacers show as `spacer`.
pub fn ids(layout: &Layout) -> Vec<String> {
    layout
        .tiles()
        .iter()
        .map(|tile| match tile {
            Tile::Image(image) => image.id.clone(),
            Tile::Spacer(_) => "spacer".to_string(),
        })
        .collect()
}
