//! The layout model: an ordered sequence of tiles.
//!
//! Render order, storage order and visual order are the same thing: the
//! index of a tile in [`Layout::tiles`]. Every consumer matches exhaustively
//! on [`Tile`] to tell images from spacers.
//!
//! ## Sizes
//!
//! An image tile either has an explicit [`TileSize`] or none, in which case
//! the grid system's default applies. "No explicit size" is what lets the
//! auto-orientation rule run exactly once: once a size is set, by the user,
//! the overlay, the content source or the auto-orientation itself, the
//! rule never fires again for that tile.
//!
//! ## Crops
//!
//! A crop is the focal point of the image inside its tile, as percentages on
//! both axes (the CSS `object-position`). `50% 50%` is the default and is
//! stored as "no crop", so centred crops never reach the persisted overlay.

use crate::grid::{GridSystem, Orientation, TileSize};
use crate::types::{GalleryEntry, ImageEntry};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};

/// Focal point of an image inside its tile, percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crop {
    x: f64,
    y: f64,
}

impl Crop {
    pub const CENTER: Crop = Crop { x: 50.0, y: 50.0 };

    /// Build a crop, clamping both axes into `[0, 100]`. NaN becomes centred.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn is_centered(&self) -> bool {
        *self == Crop::CENTER
    }

    /// Parse an `object-position` style value such as `"30% 40%"`.
    pub fn parse(value: &str) -> Option<Crop> {
        let mut parts = value.split_whitespace();
        let x = parse_percent(parts.next()?)?;
        let y = parse_percent(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Crop::new(x, y))
    }

    /// Crop after dragging the image by `(dx, dy)` pixels inside a tile of
    /// the given size.
    ///
    /// The sign is inverted: dragging the image right reveals what is on its
    /// left, which moves the focal point left.
    pub fn dragged(self, dx: f64, dy: f64, width: f64, height: f64) -> Crop {
        let x = if width > 0.0 {
            self.x - dx * 100.0 / width
        } else {
            self.x
        };
        let y = if height > 0.0 {
            self.y - dy * 100.0 / height
        } else {
            self.y
        };
        Crop::new(x, y)
    }

    pub fn to_css(&self) -> String {
        format!("{}% {}%", self.x, self.y)
    }
}

impl Default for Crop {
    fn default() -> Self {
        Crop::CENTER
    }
}

impl Serialize for Crop {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}

impl<'de> Deserialize<'de> for Crop {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Crop::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid crop value: {raw:?}")))
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        50.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn parse_percent(token: &str) -> Option<f64> {
    let number = token.strip_suffix('%').unwrap_or(token);
    let value: f64 = number.parse().ok()?;
    value.is_finite().then_some(value)
}

/// An image tile. Content fields (`src`, `alt`) come from the content source.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTile {
    pub id: String,
    pub src: String,
    pub alt: String,
    size: Option<TileSize>,
    crop: Option<Crop>,
    /// Natural pixel dimensions once known. Never persisted.
    natural: Option<(u32, u32)>,
}

impl ImageTile {
    pub fn new(id: impl Into<String>, src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            alt: alt.into(),
            size: None,
            crop: None,
            natural: None,
        }
    }

    pub fn with_size(mut self, size: TileSize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_crop(mut self, crop: Crop) -> Self {
        self.crop = Some(crop).filter(|c| !c.is_centered());
        self
    }

    /// Size set explicitly, if any.
    pub fn explicit_size(&self) -> Option<TileSize> {
        self.size
    }

    /// Crop set explicitly, if any. Centred crops are never stored.
    pub fn crop(&self) -> Option<Crop> {
        self.crop
    }

    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.natural
    }
}

/// A tile that occupies grid cells without showing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpacerTile {
    pub cols: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tile {
    Image(ImageTile),
    Spacer(SpacerTile),
}

impl Tile {
    pub fn as_image(&self) -> Option<&ImageTile> {
        match self {
            Tile::Image(image) => Some(image),
            Tile::Spacer(_) => None,
        }
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self, Tile::Spacer(_))
    }

    /// Grid span `(columns, rows)`, clamped to the system's column count.
    pub fn span(&self, system: GridSystem) -> (u32, u32) {
        let (cols, rows) = match self {
            Tile::Image(image) => image.size.unwrap_or(system.default_size()).span(),
            Tile::Spacer(spacer) => (spacer.cols, spacer.rows),
        };
        (cols.clamp(1, system.columns()), rows.max(1))
    }
}

/// Ordered tiles on one grid system.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    system: GridSystem,
    tiles: Vec<Tile>,
}

impl Layout {
    pub fn new(system: GridSystem) -> Self {
        Self {
            system,
            tiles: Vec::new(),
        }
    }

    /// Build a layout from merged or canonical entries.
    ///
    /// Later duplicates of an image id are dropped, spacer spans are clamped,
    /// sizes outside the system are ignored, and images with known natural
    /// dimensions go through auto-orientation.
    pub fn from_entries(system: GridSystem, entries: &[GalleryEntry]) -> Self {
        let mut layout = Layout::new(system);
        let mut seen = HashSet::new();
        for entry in entries {
            match entry {
                GalleryEntry::Spacer(spacer) => {
                    let (cols, rows) = system.clamp_span(spacer.cols as i64, spacer.rows as i64);
                    layout.tiles.push(Tile::Spacer(SpacerTile { cols, rows }));
                }
                GalleryEntry::Image(image) => {
                    if !seen.insert(image.id.clone()) {
                        continue;
                    }
                    layout.tiles.push(Tile::Image(image_tile(system, image)));
                    layout.apply_entry_dimensions(layout.tiles.len() - 1, image);
                }
            }
        }
        layout
    }

    /// Rebuild this layout in the order of `entries`, reusing existing tiles.
    ///
    /// Tiles are moved, not recreated, so runtime state such as known natural
    /// sizes survives a restore. Content and presentation fields are taken
    /// from the entries.
    pub fn restore(&mut self, entries: &[GalleryEntry]) {
        let mut existing: HashMap<String, ImageTile> = HashMap::new();
        for tile in self.tiles.drain(..) {
            if let Tile::Image(image) = tile {
                existing.entry(image.id.clone()).or_insert(image);
            }
        }

        let system = self.system;
        let mut seen = HashSet::new();
        for entry in entries {
            match entry {
                GalleryEntry::Spacer(spacer) => {
                    let (cols, rows) = system.clamp_span(spacer.cols as i64, spacer.rows as i64);
                    self.tiles.push(Tile::Spacer(SpacerTile { cols, rows }));
                }
                GalleryEntry::Image(entry) => {
                    if !seen.insert(entry.id.clone()) {
                        continue;
                    }
                    let fresh = image_tile(system, entry);
                    let tile = match existing.remove(&entry.id) {
                        Some(mut tile) => {
                            tile.src = fresh.src;
                            tile.alt = fresh.alt;
                            tile.size = fresh.size;
                            tile.crop = fresh.crop;
                            tile
                        }
                        None => fresh,
                    };
                    self.tiles.push(Tile::Image(tile));
                    self.apply_entry_dimensions(self.tiles.len() - 1, entry);
                }
            }
        }
    }

    fn apply_entry_dimensions(&mut self, index: usize, entry: &ImageEntry) {
        if let (Some(w), Some(h)) = (entry.width, entry.height) {
            self.set_natural_size(index, w, h);
        } else if let Some(Tile::Image(image)) = self.tiles.get(index)
            && let Some((w, h)) = image.natural
        {
            self.set_natural_size(index, w, h);
        }
    }

    pub fn system(&self) -> GridSystem {
        self.system
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn push(&mut self, tile: Tile) {
        if let Tile::Image(image) = &tile
            && self.position_of(&image.id).is_some()
        {
            return;
        }
        self.tiles.push(tile);
    }

    /// Index of the image tile with `id`.
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.tiles
            .iter()
            .position(|t| matches!(t, Tile::Image(image) if image.id == id))
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageTile> {
        self.tiles.iter().filter_map(Tile::as_image)
    }

    // =========================================================================
    // Size
    // =========================================================================

    /// Effective size of the image at `index`; `None` for spacers.
    pub fn size_of(&self, index: usize) -> Option<TileSize> {
        match self.tiles.get(index)? {
            Tile::Image(image) => Some(image.size.unwrap_or(self.system.default_size())),
            Tile::Spacer(_) => None,
        }
    }

    /// Set an image's size. Sizes from the other grid system are refused.
    pub fn set_size(&mut self, index: usize, size: TileSize) -> bool {
        if !self.system.contains(size) {
            return false;
        }
        match self.tiles.get_mut(index) {
            Some(Tile::Image(image)) => {
                image.size = Some(size);
                true
            }
            _ => false,
        }
    }

    /// Advance the image at `index` to the next size in its cycle.
    pub fn cycle_size(&mut self, index: usize) -> bool {
        match self.size_of(index) {
            Some(size) => self.set_size(index, size.cycled()),
            None => false,
        }
    }

    /// Orientation-group button: dense system only.
    pub fn orient(&mut self, index: usize, group: Orientation) -> bool {
        if self.system != GridSystem::Dense {
            return false;
        }
        match self.size_of(index) {
            Some(size) => self.set_size(index, size.oriented(group)),
            None => false,
        }
    }

    /// Record natural dimensions and, for images nobody has sized yet,
    /// assign the landscape/portrait default. Returns whether the size changed.
    pub fn set_natural_size(&mut self, index: usize, width: u32, height: u32) -> bool {
        let system = self.system;
        let Some(Tile::Image(image)) = self.tiles.get_mut(index) else {
            return false;
        };
        image.natural = Some((width, height));
        if image.size.is_some() || width == 0 || height == 0 {
            return false;
        }
        match system.auto_size(Orientation::classify(width, height)) {
            Some(size) => {
                image.size = Some(size);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Crop
    // =========================================================================

    /// Current crop of the image at `index`; centred when unset.
    pub fn crop_of(&self, index: usize) -> Option<Crop> {
        match self.tiles.get(index)? {
            Tile::Image(image) => Some(image.crop.unwrap_or_default()),
            Tile::Spacer(_) => None,
        }
    }

    pub fn set_crop(&mut self, index: usize, crop: Crop) -> bool {
        match self.tiles.get_mut(index) {
            Some(Tile::Image(image)) => {
                image.crop = Some(crop).filter(|c| !c.is_centered());
                true
            }
            _ => false,
        }
    }

    /// Apply a pixel drag to the crop of the image at `index`, relative to
    /// its current crop.
    pub fn drag_crop(&mut self, index: usize, dx: f64, dy: f64, width: f64, height: f64) -> bool {
        match self.crop_of(index) {
            Some(crop) => self.set_crop(index, crop.dragged(dx, dy, width, height)),
            None => false,
        }
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Move the tile at `from` so it ends up at index `to`.
    pub fn move_tile(&mut self, from: usize, to: usize) -> bool {
        if from >= self.tiles.len() || to >= self.tiles.len() || from == to {
            return false;
        }
        let tile = self.tiles.remove(from);
        self.tiles.insert(to, tile);
        true
    }

    /// Insert a spacer before `index` (or at the end). Returns its index.
    pub fn insert_spacer(&mut self, index: usize, cols: u32, rows: u32) -> usize {
        let (cols, rows) = self.system.clamp_span(cols as i64, rows as i64);
        let index = index.min(self.tiles.len());
        self.tiles.insert(index, Tile::Spacer(SpacerTile { cols, rows }));
        index
    }

    /// Set a spacer's span, clamped to the system's bounds.
    pub fn resize_spacer(&mut self, index: usize, cols: i64, rows: i64) -> bool {
        let (cols, rows) = self.system.clamp_span(cols, rows);
        match self.tiles.get_mut(index) {
            Some(Tile::Spacer(spacer)) => {
                let changed = spacer.cols != cols || spacer.rows != rows;
                spacer.cols = cols;
                spacer.rows = rows;
                changed
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Tile> {
        (index < self.tiles.len()).then(|| self.tiles.remove(index))
    }
}

fn image_tile(system: GridSystem, entry: &ImageEntry) -> ImageTile {
    ImageTile {
        id: entry.id.clone(),
        src: entry.src.clone(),
        alt: entry.alt.clone(),
        size: entry.size.as_ref().and_then(|v| system.parse_size(v)),
        crop: entry.crop.filter(|c| !c.is_centered()),
        natural: None,
    }
}
