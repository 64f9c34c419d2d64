//! Grid geometry, decorations and reorder transitions.
//!
//! The browser would place tiles with CSS grid. This module does the same
//! computation so the gesture engine can hit-test and measure tiles without a
//! DOM:
//!
//! - [`place`] runs CSS-grid auto-placement (`grid-auto-flow: row`, or
//!   `row dense`) over the layout's spans.
//! - [`tile_rects`] turns placements into pixel rectangles for a
//!   [`GridMetrics`] (container width, gap, column count). Cells are square.
//! - [`decorate`] recomputes the editor decorations after every structural
//!   change: 1-based order badges for images, size badges, and the number of
//!   trailing filler slots that pad the last row.
//! - [`flip`] builds a FLIP transition: each displaced tile starts translated
//!   back to where it was and animates to its new slot.

use crate::config::GridConfig;
use crate::grid::{GridSystem, SizeBadge};
use crate::layout::{Layout, Tile};

/// Duration of the reorder slide.
pub const FLIP_DURATION_MS: u32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// Live measurements of the grid container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub columns: u32,
    pub container_width: f64,
    pub gap: f64,
    pub dense_packing: bool,
}

impl GridMetrics {
    pub fn from_config(system: GridSystem, grid: &GridConfig) -> Self {
        Self {
            columns: system.columns(),
            container_width: grid.container_width,
            gap: grid.gap,
            dense_packing: grid.dense_packing,
        }
    }

    pub fn column_width(&self) -> f64 {
        let columns = self.columns.max(1) as f64;
        ((self.container_width - self.gap * (columns - 1.0)) / columns).max(0.0)
    }

    pub fn row_height(&self) -> f64 {
        self.column_width()
    }

    /// Distance between the starts of adjacent cells, `(horizontal, vertical)`.
    pub fn cell_step(&self) -> (f64, f64) {
        (self.column_width() + self.gap, self.row_height() + self.gap)
    }

    pub fn rect_for(&self, placement: &Placement) -> Rect {
        let (step_x, step_y) = self.cell_step();
        Rect {
            x: placement.col as f64 * step_x,
            y: placement.row as f64 * step_y,
            width: placement.cols as f64 * step_x - self.gap,
            height: placement.rows as f64 * step_y - self.gap,
        }
    }
}

/// Grid cell position and span of one tile, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub col: u32,
    pub row: u32,
    pub cols: u32,
    pub rows: u32,
}

/// Occupancy grid that grows downward as rows are needed.
struct Occupancy {
    columns: u32,
    cells: Vec<Vec<bool>>,
}

impl Occupancy {
    fn fits(&self, col: u32, row: u32, cols: u32, rows: u32) -> bool {
        if col + cols > self.columns {
            return false;
        }
        (row..row + rows).all(|r| {
            self.cells
                .get(r as usize)
                .map(|line| (col..col + cols).all(|c| !line[c as usize]))
                .unwrap_or(true)
        })
    }

    fn mark(&mut self, col: u32, row: u32, cols: u32, rows: u32) {
        while self.cells.len() < (row + rows) as usize {
            self.cells.push(vec![false; self.columns as usize]);
        }
        for r in row..row + rows {
            for c in col..col + cols {
                self.cells[r as usize][c as usize] = true;
            }
        }
    }
}

/// Auto-place every tile in layout order.
pub fn place(layout: &Layout, metrics: &GridMetrics) -> Vec<Placement> {
    let columns = metrics.columns.max(1);
    let mut grid = Occupancy {
        columns,
        cells: Vec::new(),
    };
    let mut cursor = (0u32, 0u32);
    let mut placements = Vec::with_capacity(layout.len());

    for tile in layout.tiles() {
        let (cols, rows) = tile.span(layout.system());
        let cols = cols.min(columns);
        let (mut row, mut col) = if metrics.dense_packing {
            (0, 0)
        } else {
            cursor
        };
        while !grid.fits(col, row, cols, rows) {
            col += 1;
            if col + cols > columns {
                col = 0;
                row += 1;
            }
        }
        grid.mark(col, row, cols, rows);
        cursor = (row, col + cols);
        placements.push(Placement {
            col,
            row,
            cols,
            rows,
        });
    }
    placements
}

pub fn tile_rects(layout: &Layout, metrics: &GridMetrics) -> Vec<Rect> {
    place(layout, metrics)
        .iter()
        .map(|p| metrics.rect_for(p))
        .collect()
}

/// Total height of the placed grid in pixels.
pub fn content_height(layout: &Layout, metrics: &GridMetrics) -> f64 {
    let rows = place(layout, metrics)
        .iter()
        .map(|p| p.row + p.rows)
        .max()
        .unwrap_or(0);
    if rows == 0 {
        return 0.0;
    }
    rows as f64 * metrics.cell_step().1 - metrics.gap
}

// ============================================================================
// Decorations
// ============================================================================

/// Editor-only decorations, indexed like the layout's tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    /// 1-based position among image tiles; `None` for spacers.
    pub order: Vec<Option<usize>>,
    pub badges: Vec<Option<SizeBadge>>,
    /// Filler slots appended after the last tile. Never persisted.
    pub fillers: usize,
}

pub fn decorate(layout: &Layout) -> Decorations {
    let mut order = Vec::with_capacity(layout.len());
    let mut badges = Vec::with_capacity(layout.len());
    let mut position = 0;
    for (index, tile) in layout.tiles().iter().enumerate() {
        match tile {
            Tile::Image(_) => {
                position += 1;
                order.push(Some(position));
                badges.push(layout.size_of(index).map(|s| s.badge()));
            }
            Tile::Spacer(_) => {
                order.push(None);
                badges.push(None);
            }
        }
    }
    Decorations {
        order,
        badges,
        fillers: filler_count(layout),
    }
}

/// Slots needed to pad a partially filled last row.
pub fn filler_count(layout: &Layout) -> usize {
    let columns = layout.system().columns();
    let used: u32 = layout
        .tiles()
        .iter()
        .map(|t| t.span(layout.system()).0)
        .sum();
    match used % columns {
        0 => 0,
        rem => (columns - rem) as usize,
    }
}

// ============================================================================
// FLIP transitions
// ============================================================================

/// Index a tile ends up at after the tile at `from` is moved to `to`.
pub fn index_after_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < to && index > from && index <= to {
        index - 1
    } else if to < from && index >= to && index < from {
        index + 1
    } else {
        index
    }
}

/// One displaced tile: starts at `translate(dx, dy)` and slides to identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipMove {
    /// Index in the new order.
    pub index: usize,
    pub dx: f64,
    pub dy: f64,
}

impl FlipMove {
    pub fn initial_transform(&self) -> String {
        format!("translate({}px, {}px)", self.dx, self.dy)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    pub moves: Vec<FlipMove>,
    pub duration_ms: u32,
}

/// FLIP for a single move from `from` to `to`, given rects captured before
/// and after the reorder. The moved tile itself is skipped; it follows the
/// pointer. Tiles that did not move produce no entry.
pub fn flip(before: &[Rect], after: &[Rect], from: usize, to: usize) -> Transition {
    let moves = before
        .iter()
        .enumerate()
        .filter(|(old, _)| *old != from)
        .filter_map(|(old, first)| {
            let index = index_after_move(old, from, to);
            let last = after.get(index)?;
            let (dx, dy) = (first.x - last.x, first.y - last.y);
            (dx != 0.0 || dy != 0.0).then_some(FlipMove { index, dx, dy })
        })
        .collect();
    Transition {
        moves,
        duration_ms: FLIP_DURATION_MS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{DenseSize, SimpleSize, TileSize};
    use crate::test_helpers::*;

    #[test]
    fn simple_tiles_fill_rows_left_to_right() {
        let layout = layout_of(GridSystem::Simple, &["a", "b", "c", "d"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let rects = tile_rects(&layout, &metrics);
        assert_eq!(rects[0], Rect { x: 0.0, y: 0.0, width: 100.0, height: 100.0 });
        assert_eq!(rects[2].x, 200.0);
        assert_eq!((rects[3].x, rects[3].y), (0.0, 100.0));
    }

    #[test]
    fn gap_is_between_cells_only() {
        let metrics = GridMetrics {
            columns: 3,
            container_width: 320.0,
            gap: 10.0,
            dense_packing: false,
        };
        assert_eq!(metrics.column_width(), 100.0);
        assert_eq!(metrics.cell_step(), (110.0, 110.0));
        let rect = metrics.rect_for(&Placement {
            col: 1,
            row: 0,
            cols: 2,
            rows: 1,
        });
        assert_eq!(rect, Rect { x: 110.0, y: 0.0, width: 210.0, height: 100.0 });
    }

    #[test]
    fn wide_tile_wraps_to_next_row() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        layout.set_size(1, TileSize::Simple(SimpleSize::Three));
        let placements = place(&layout, &square_metrics(GridSystem::Simple, 100.0));
        assert_eq!((placements[1].col, placements[1].row), (0, 1));
        assert_eq!((placements[2].col, placements[2].row), (0, 2));
    }

    #[test]
    fn dense_packing_backfills_holes() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        layout.set_size(1, TileSize::Simple(SimpleSize::Three));
        let mut metrics = square_metrics(GridSystem::Simple, 100.0);
        metrics.dense_packing = true;
        let placements = place(&layout, &metrics);
        assert_eq!((placements[2].col, placements[2].row), (1, 0));
    }

    #[test]
    fn tall_tile_blocks_cells_below() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c", "d"]);
        layout.set_size(0, TileSize::Simple(SimpleSize::Tall));
        let placements = place(&layout, &square_metrics(GridSystem::Simple, 100.0));
        assert_eq!((placements[3].col, placements[3].row), (1, 1));
    }

    #[test]
    fn content_height_counts_rows() {
        let layout = layout_of(GridSystem::Simple, &["a", "b", "c", "d"]);
        let metrics = GridMetrics {
            columns: 3,
            container_width: 320.0,
            gap: 10.0,
            dense_packing: false,
        };
        assert_eq!(content_height(&layout, &metrics), 210.0);
        assert_eq!(content_height(&Layout::new(GridSystem::Simple), &metrics), 0.0);
    }

    // =========================================================================
    // Decorations
    // =========================================================================

    #[test]
    fn order_badges_skip_spacers() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        layout.insert_spacer(1, 1, 1);
        let decorations = decorate(&layout);
        assert_eq!(decorations.order, vec![Some(1), None, Some(2), Some(3)]);
        assert!(decorations.badges[1].is_none());
        assert_eq!(decorations.badges[0].unwrap().label, "1");
    }

    #[test]
    fn filler_count_pads_last_row() {
        let layout = layout_of(GridSystem::Simple, &["a", "b", "c", "d"]);
        assert_eq!(filler_count(&layout), 2);
        let full = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        assert_eq!(filler_count(&full), 0);
        assert_eq!(filler_count(&Layout::new(GridSystem::Dense)), 0);
    }

    #[test]
    fn filler_count_uses_column_spans() {
        let mut layout = layout_of(GridSystem::Dense, &["a", "b"]);
        layout.set_size(0, TileSize::Dense(DenseSize::H6x4));
        layout.insert_spacer(2, 2, 3);
        // 6 + 2 (default 2x2) + 2 = 10 columns → 1 into the second row of 9
        assert_eq!(filler_count(&layout), 8);
    }

    // =========================================================================
    // FLIP
    // =========================================================================

    #[test]
    fn index_after_move_shifts_neighbours() {
        // [a b c d] move 0 → 2 gives [b c a d]
        assert_eq!(index_after_move(0, 0, 2), 2);
        assert_eq!(index_after_move(1, 0, 2), 0);
        assert_eq!(index_after_move(2, 0, 2), 1);
        assert_eq!(index_after_move(3, 0, 2), 3);
        // [a b c d] move 3 → 1 gives [a d b c]
        assert_eq!(index_after_move(1, 3, 1), 2);
        assert_eq!(index_after_move(0, 3, 1), 0);
    }

    #[test]
    fn flip_translates_displaced_tiles_back() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let before = tile_rects(&layout, &metrics);
        layout.move_tile(0, 2);
        let after = tile_rects(&layout, &metrics);

        let transition = flip(&before, &after, 0, 2);
        assert_eq!(transition.duration_ms, FLIP_DURATION_MS);
        assert_eq!(
            transition.moves,
            vec![
                FlipMove { index: 0, dx: 100.0, dy: 0.0 },
                FlipMove { index: 1, dx: 100.0, dy: 0.0 },
            ]
        );
        assert_eq!(transition.moves[0].initial_transform(), "translate(100px, 0px)");
    }
}
