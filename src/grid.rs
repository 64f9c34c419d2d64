//! Grid systems and tile sizes.
//!
//! A gallery is laid out on one of two fixed-column grids:
//!
//! | System | Columns | Sizes |
//! |--------|---------|-------|
//! | [`GridSystem::Simple`] | 3 | `1`, `2`, `"2x2"`, `3`, `"tall"` |
//! | [`GridSystem::Dense`] | 9 | `"1x1"` … `"4x6"` in three orientation groups |
//!
//! A tile's size is stored as a [`TileSize`] value. CSS classes, badges and
//! grid spans are all derived from it, never the other way round.
//!
//! ## Size Cycling
//!
//! The simple system cycles `1 → 2 → 2x2 → 3 → tall → 1`. Ten dense sizes are
//! too many to cycle through blindly, so the dense system groups them by
//! aspect ratio and a click advances within the tile's current group:
//!
//! ```text
//! square      1x1 → 2x2 → 3x3
//! horizontal  3x2 → 4x2 → 6x4 → 9x6
//! vertical    2x3 → 2x4 → 4x6
//! ```

use crate::types::SizeValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on row spans for spacers in both systems.
pub const MAX_ROWS: u32 = 12;

/// Width/height ratio band inside which an image counts as square.
pub const SQUARE_TOLERANCE: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridSystem {
    #[default]
    Simple,
    Dense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleSize {
    One,
    Two,
    TwoByTwo,
    Three,
    Tall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenseSize {
    S1x1,
    S2x2,
    S3x3,
    H3x2,
    H4x2,
    H6x4,
    H9x6,
    V2x3,
    V2x4,
    V4x6,
}

/// Size of an image tile. The variant also records which grid system the
/// size belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSize {
    Simple(SimpleSize),
    Dense(DenseSize),
}

/// Aspect class of an image, and the orientation groups of the dense system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Square,
    Horizontal,
    Vertical,
}

/// Label and color shown on a tile's size badge in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBadge {
    pub label: &'static str,
    pub color: &'static str,
}

const SIMPLE_CYCLE: [SimpleSize; 5] = [
    SimpleSize::One,
    SimpleSize::Two,
    SimpleSize::TwoByTwo,
    SimpleSize::Three,
    SimpleSize::Tall,
];

const DENSE_ALL: [DenseSize; 10] = [
    DenseSize::S1x1,
    DenseSize::S2x2,
    DenseSize::S3x3,
    DenseSize::H3x2,
    DenseSize::H4x2,
    DenseSize::H6x4,
    DenseSize::H9x6,
    DenseSize::V2x3,
    DenseSize::V2x4,
    DenseSize::V4x6,
];

impl GridSystem {
    /// Fixed column count of the grid.
    pub fn columns(self) -> u32 {
        match self {
            GridSystem::Simple => 3,
            GridSystem::Dense => 9,
        }
    }

    /// Size used when neither the overlay nor the content source gives one.
    pub fn default_size(self) -> TileSize {
        match self {
            GridSystem::Simple => TileSize::Simple(SimpleSize::One),
            GridSystem::Dense => TileSize::Dense(DenseSize::S2x2),
        }
    }

    /// Size assigned to a not-yet-resized image once its aspect is known.
    /// Square images keep the default.
    pub fn auto_size(self, orientation: Orientation) -> Option<TileSize> {
        match (self, orientation) {
            (_, Orientation::Square) => None,
            (GridSystem::Simple, Orientation::Horizontal) => Some(TileSize::Simple(SimpleSize::Two)),
            (GridSystem::Simple, Orientation::Vertical) => Some(TileSize::Simple(SimpleSize::Tall)),
            (GridSystem::Dense, Orientation::Horizontal) => Some(TileSize::Dense(DenseSize::H3x2)),
            (GridSystem::Dense, Orientation::Vertical) => Some(TileSize::Dense(DenseSize::V2x3)),
        }
    }

    /// Every size valid in this system, in cycle order.
    pub fn sizes(self) -> Vec<TileSize> {
        match self {
            GridSystem::Simple => SIMPLE_CYCLE.iter().copied().map(TileSize::Simple).collect(),
            GridSystem::Dense => DENSE_ALL.iter().copied().map(TileSize::Dense).collect(),
        }
    }

    pub fn contains(self, size: TileSize) -> bool {
        size.system() == self
    }

    /// Parse a wire size in the context of this system.
    ///
    /// Returns `None` for anything outside the system's enumerated set, so
    /// callers fall back to a default rather than storing a bogus size.
    pub fn parse_size(self, value: &SizeValue) -> Option<TileSize> {
        match self {
            GridSystem::Simple => {
                let simple = match value {
                    SizeValue::Number(1) => SimpleSize::One,
                    SizeValue::Number(2) => SimpleSize::Two,
                    SizeValue::Number(3) => SimpleSize::Three,
                    SizeValue::Number(_) | SizeValue::Other(_) => return None,
                    SizeValue::Label(label) => match label.as_str() {
                        "1" => SimpleSize::One,
                        "2" => SimpleSize::Two,
                        "2x2" => SimpleSize::TwoByTwo,
                        "3" => SimpleSize::Three,
                        "tall" => SimpleSize::Tall,
                        _ => return None,
                    },
                };
                Some(TileSize::Simple(simple))
            }
            GridSystem::Dense => {
                let SizeValue::Label(label) = value else {
                    return None;
                };
                DENSE_ALL
                    .iter()
                    .copied()
                    .find(|size| size.label() == label)
                    .map(TileSize::Dense)
            }
        }
    }

    /// Clamp a spacer span into the system's bounds.
    pub fn clamp_span(self, cols: i64, rows: i64) -> (u32, u32) {
        let cols = cols.clamp(1, self.columns() as i64) as u32;
        let rows = rows.clamp(1, MAX_ROWS as i64) as u32;
        (cols, rows)
    }
}

impl fmt::Display for GridSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSystem::Simple => f.write_str("simple"),
            GridSystem::Dense => f.write_str("dense"),
        }
    }
}

impl DenseSize {
    pub fn label(self) -> &'static str {
        match self {
            DenseSize::S1x1 => "1x1",
            DenseSize::S2x2 => "2x2",
            DenseSize::S3x3 => "3x3",
            DenseSize::H3x2 => "3x2",
            DenseSize::H4x2 => "4x2",
            DenseSize::H6x4 => "6x4",
            DenseSize::H9x6 => "9x6",
            DenseSize::V2x3 => "2x3",
            DenseSize::V2x4 => "2x4",
            DenseSize::V4x6 => "4x6",
        }
    }

    pub fn group(self) -> Orientation {
        match self {
            DenseSize::S1x1 | DenseSize::S2x2 | DenseSize::S3x3 => Orientation::Square,
            DenseSize::H3x2 | DenseSize::H4x2 | DenseSize::H6x4 | DenseSize::H9x6 => {
                Orientation::Horizontal
            }
            DenseSize::V2x3 | DenseSize::V2x4 | DenseSize::V4x6 => Orientation::Vertical,
        }
    }

    fn span(self) -> (u32, u32) {
        match self {
            DenseSize::S1x1 => (1, 1),
            DenseSize::S2x2 => (2, 2),
            DenseSize::S3x3 => (3, 3),
            DenseSize::H3x2 => (3, 2),
            DenseSize::H4x2 => (4, 2),
            DenseSize::H6x4 => (6, 4),
            DenseSize::H9x6 => (9, 6),
            DenseSize::V2x3 => (2, 3),
            DenseSize::V2x4 => (2, 4),
            DenseSize::V4x6 => (4, 6),
        }
    }
}

impl Orientation {
    /// Classify natural pixel dimensions. Within 10% of square counts as square.
    pub fn classify(width: u32, height: u32) -> Orientation {
        let (w, h) = (width as f64, height as f64);
        if w > h * (1.0 + SQUARE_TOLERANCE) {
            Orientation::Horizontal
        } else if h > w * (1.0 + SQUARE_TOLERANCE) {
            Orientation::Vertical
        } else {
            Orientation::Square
        }
    }

    /// Members of this dense orientation group, smallest first.
    pub fn members(self) -> &'static [DenseSize] {
        match self {
            Orientation::Square => &[DenseSize::S1x1, DenseSize::S2x2, DenseSize::S3x3],
            Orientation::Horizontal => &[
                DenseSize::H3x2,
                DenseSize::H4x2,
                DenseSize::H6x4,
                DenseSize::H9x6,
            ],
            Orientation::Vertical => &[DenseSize::V2x3, DenseSize::V2x4, DenseSize::V4x6],
        }
    }
}

impl TileSize {
    pub fn system(self) -> GridSystem {
        match self {
            TileSize::Simple(_) => GridSystem::Simple,
            TileSize::Dense(_) => GridSystem::Dense,
        }
    }

    /// Grid span as `(columns, rows)`.
    pub fn span(self) -> (u32, u32) {
        match self {
            TileSize::Simple(SimpleSize::One) => (1, 1),
            TileSize::Simple(SimpleSize::Two) => (2, 1),
            TileSize::Simple(SimpleSize::TwoByTwo) => (2, 2),
            TileSize::Simple(SimpleSize::Three) => (3, 1),
            TileSize::Simple(SimpleSize::Tall) => (1, 2),
            TileSize::Dense(size) => size.span(),
        }
    }

    /// Next size in the system's cycle.
    ///
    /// Simple sizes wrap around the five-step cycle; dense sizes advance
    /// within their own orientation group.
    pub fn cycled(self) -> TileSize {
        match self {
            TileSize::Simple(size) => {
                let pos = SIMPLE_CYCLE.iter().position(|s| *s == size).unwrap_or(0);
                TileSize::Simple(SIMPLE_CYCLE[(pos + 1) % SIMPLE_CYCLE.len()])
            }
            TileSize::Dense(size) => TileSize::Dense(advance_in_group(size, size.group())),
        }
    }

    /// Result of pressing an orientation-group button on a tile of this size.
    ///
    /// Advances within the group when the size already belongs to it,
    /// otherwise jumps to the group's first member. Simple sizes have no
    /// groups and are returned as the dense group's first member.
    pub fn oriented(self, group: Orientation) -> TileSize {
        match self {
            TileSize::Dense(size) => TileSize::Dense(advance_in_group(size, group)),
            TileSize::Simple(_) => TileSize::Dense(group.members()[0]),
        }
    }

    /// Wire representation: numbers for simple `1`/`2`/`3`, strings otherwise.
    pub fn to_value(self) -> SizeValue {
        match self {
            TileSize::Simple(SimpleSize::One) => SizeValue::Number(1),
            TileSize::Simple(SimpleSize::Two) => SizeValue::Number(2),
            TileSize::Simple(SimpleSize::Three) => SizeValue::Number(3),
            other => SizeValue::Label(other.label().to_string()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TileSize::Simple(SimpleSize::One) => "1",
            TileSize::Simple(SimpleSize::Two) => "2",
            TileSize::Simple(SimpleSize::TwoByTwo) => "2x2",
            TileSize::Simple(SimpleSize::Three) => "3",
            TileSize::Simple(SimpleSize::Tall) => "tall",
            TileSize::Dense(size) => size.label(),
        }
    }

    /// CSS class carried by the rendered tile.
    pub fn css_class(self) -> String {
        format!("size-{}", self.label())
    }

    pub fn badge(self) -> SizeBadge {
        let color = match self {
            TileSize::Simple(SimpleSize::One) => "#6b7280",
            TileSize::Simple(SimpleSize::Two) => "#2563eb",
            TileSize::Simple(SimpleSize::TwoByTwo) => "#7c3aed",
            TileSize::Simple(SimpleSize::Three) => "#059669",
            TileSize::Simple(SimpleSize::Tall) => "#d97706",
            TileSize::Dense(size) => match size.group() {
                Orientation::Square => "#7c3aed",
                Orientation::Horizontal => "#2563eb",
                Orientation::Vertical => "#d97706",
            },
        };
        SizeBadge {
            label: self.label(),
            color,
        }
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn advance_in_group(size: DenseSize, group: Orientation) -> DenseSize {
    let members = group.members();
    match members.iter().position(|m| *m == size) {
        Some(pos) => members[(pos + 1) % members.len()],
        None => members[0],
    }
}
