//! Pointer gesture recognition for the layout editor.
//!
//! One pointer-down → move → up sequence resolves to exactly one of: a click
//! (size advance), a reorder drag, a crop drag or a spacer resize. The
//! recognizer is an explicit state machine:
//!
//! ```text
//! Idle ──down on tile──▶ Armed ──moved > threshold──▶ Dragging
//!   │                      │                  └─shift─▶ Cropping
//!   │                      └──up──▶ click
//!   └──down on spacer handle──▶ Resizing
//!
//! any state ──up──▶ Idle (finalize, report one outcome)
//! ```
//!
//! While dragging, the drop target is the nearest other tile by
//! centre-to-centre distance. Two guards keep the target from flickering:
//! a dead zone around the target's horizontal centre in which the insertion
//! side never flips, and hysteresis, which only lets a different tile take
//! over when it is closer than the current target by a fixed margin.
//!
//! Geometry comes from [`crate::reflow`]; the recognizer never touches
//! anything but the [`Layout`] it is handed.

use crate::config::GestureConfig;
use crate::layout::{Crop, Layout, Tile};
use crate::reflow::{GridMetrics, Point, Rect, Transition, flip, index_after_move, tile_rects};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Corner of a spacer's resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Direction each axis grows in when the pointer moves right / down.
    fn signs(self) -> (i64, i64) {
        match self {
            Corner::TopLeft => (-1, -1),
            Corner::TopRight => (1, -1),
            Corner::BottomLeft => (-1, 1),
            Corner::BottomRight => (1, 1),
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Corner::TopLeft => "handle-tl",
            Corner::TopRight => "handle-tr",
            Corner::BottomLeft => "handle-bl",
            Corner::BottomRight => "handle-br",
        }
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The body of the tile at this index.
    Tile(usize),
    /// A delete / orientation button on the tile at this index.
    Control(usize),
    /// A spacer's corner handle.
    SpacerHandle { index: usize, corner: Corner },
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub position: Point,
    pub button: PointerButton,
    pub shift: bool,
    pub target: PointerTarget,
}

impl PointerDown {
    /// Plain primary press at `position` on `target`.
    pub fn primary(position: Point, target: PointerTarget) -> Self {
        Self {
            position,
            button: PointerButton::Primary,
            shift: false,
            target,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Which side of the drop target the dragged tile goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropTarget {
    pub index: usize,
    /// Last side decided outside the dead zone.
    pub side: Option<Side>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    /// Current index of the dragged tile.
    pub index: usize,
    /// Index the tile was picked up from.
    pub origin: usize,
    pub pointer: Point,
    /// Pointer position relative to the tile's top-left corner at pickup.
    grab: Point,
    size: (f64, f64),
    pub target: Option<DropTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    Armed {
        index: usize,
        start: Point,
        shift: bool,
    },
    Dragging(Drag),
    Cropping {
        index: usize,
        start: Point,
        baseline: Crop,
        tile: Rect,
    },
    Resizing {
        index: usize,
        start: Point,
        corner: Corner,
        cols: u32,
        rows: u32,
    },
}

/// Live effect of a pointer move.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveEffect {
    None,
    Reordered {
        from: usize,
        to: usize,
        transition: Transition,
    },
    Cropped(Crop),
    Resized {
        cols: u32,
        rows: u32,
    },
}

/// What a completed gesture did. Exactly one per down/up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    None,
    /// Plain click; the tile's size advanced.
    Clicked { index: usize },
    Reordered { from: usize, to: usize },
    Cropped { index: usize },
    Resized { index: usize },
}

impl GestureOutcome {
    /// Whether the gesture changed something worth saving.
    pub fn is_edit(&self) -> bool {
        !matches!(self, GestureOutcome::None)
    }
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    state: GestureState,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, GestureState::Idle)
    }

    /// Floating ghost that follows the pointer during a reorder drag.
    pub fn ghost(&self) -> Option<Rect> {
        match &self.state {
            GestureState::Dragging(drag) => Some(Rect {
                x: drag.pointer.x - drag.grab.x,
                y: drag.pointer.y - drag.grab.y,
                width: drag.size.0,
                height: drag.size.1,
            }),
            _ => None,
        }
    }

    /// Returns whether the press started a gesture.
    pub fn pointer_down(&mut self, layout: &Layout, down: PointerDown) -> bool {
        if !self.is_idle() || down.button != PointerButton::Primary {
            return false;
        }
        self.state = match down.target {
            PointerTarget::Tile(index) if index < layout.len() => GestureState::Armed {
                index,
                start: down.position,
                shift: down.shift,
            },
            PointerTarget::SpacerHandle { index, corner } => match layout.get(index) {
                Some(Tile::Spacer(spacer)) => GestureState::Resizing {
                    index,
                    start: down.position,
                    corner,
                    cols: spacer.cols,
                    rows: spacer.rows,
                },
                _ => return false,
            },
            _ => return false,
        };
        true
    }

    pub fn pointer_move(
        &mut self,
        layout: &mut Layout,
        metrics: &GridMetrics,
        position: Point,
    ) -> MoveEffect {
        match &mut self.state {
            GestureState::Idle => MoveEffect::None,
            GestureState::Armed {
                index,
                start,
                shift,
            } => {
                if start.distance_to(position) <= self.config.drag_threshold {
                    return MoveEffect::None;
                }
                let (index, start, shift) = (*index, *start, *shift);
                let rects = tile_rects(layout, metrics);
                let Some(tile) = rects.get(index).copied() else {
                    self.state = GestureState::Idle;
                    return MoveEffect::None;
                };
                match layout.crop_of(index) {
                    Some(baseline) if shift => {
                        debug!(index, "crop drag");
                        self.state = GestureState::Cropping {
                            index,
                            start,
                            baseline,
                            tile,
                        };
                    }
                    _ => {
                        debug!(index, "reorder drag");
                        self.state = GestureState::Dragging(Drag {
                            index,
                            origin: index,
                            pointer: position,
                            grab: Point::new(start.x - tile.x, start.y - tile.y),
                            size: (tile.width, tile.height),
                            target: None,
                        });
                    }
                }
                self.pointer_move(layout, metrics, position)
            }
            GestureState::Dragging(drag) => {
                drag.pointer = position;
                retarget(drag, layout, metrics, &self.config)
            }
            GestureState::Cropping {
                index,
                start,
                baseline,
                tile,
            } => {
                let crop = baseline.dragged(
                    position.x - start.x,
                    position.y - start.y,
                    tile.width,
                    tile.height,
                );
                layout.set_crop(*index, crop);
                MoveEffect::Cropped(crop)
            }
            GestureState::Resizing {
                index,
                start,
                corner,
                cols,
                rows,
            } => {
                let (step_x, step_y) = metrics.cell_step();
                let dcols = cells(position.x - start.x, step_x);
                let drows = cells(position.y - start.y, step_y);
                let (sx, sy) = corner.signs();
                let index = *index;
                layout.resize_spacer(
                    index,
                    *cols as i64 + sx * dcols,
                    *rows as i64 + sy * drows,
                );
                match layout.get(index) {
                    Some(Tile::Spacer(spacer)) => MoveEffect::Resized {
                        cols: spacer.cols,
                        rows: spacer.rows,
                    },
                    _ => MoveEffect::None,
                }
            }
        }
    }

    /// Finish the gesture. An armed press that never moved far enough is a
    /// click and advances the tile's size.
    pub fn pointer_up(&mut self, layout: &mut Layout) -> GestureOutcome {
        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle => GestureOutcome::None,
            GestureState::Armed { index, .. } => {
                if layout.cycle_size(index) {
                    GestureOutcome::Clicked { index }
                } else {
                    GestureOutcome::None
                }
            }
            GestureState::Dragging(drag) => GestureOutcome::Reordered {
                from: drag.origin,
                to: drag.index,
            },
            GestureState::Cropping { index, .. } => GestureOutcome::Cropped { index },
            GestureState::Resizing { index, .. } => GestureOutcome::Resized { index },
        }
    }

    /// Drop any gesture in progress without finalizing it.
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}

/// Whole cells covered by a pixel delta, rounded to nearest.
fn cells(delta: f64, step: f64) -> i64 {
    if step > 0.0 {
        (delta / step).round() as i64
    } else {
        0
    }
}

/// Nearest other tile to `pointer`. Ties go to the lowest index.
fn nearest(rects: &[Rect], skip: usize, pointer: Point) -> Option<(usize, f64)> {
    rects
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(i, rect)| (i, rect.center().distance_to(pointer)))
        .fold(None, |best, (i, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((i, d)),
        })
}

fn retarget(
    drag: &mut Drag,
    layout: &mut Layout,
    metrics: &GridMetrics,
    config: &GestureConfig,
) -> MoveEffect {
    let rects = tile_rects(layout, metrics);
    let Some((candidate, candidate_distance)) = nearest(&rects, drag.index, drag.pointer) else {
        return MoveEffect::None;
    };

    let target = match drag.target {
        Some(current) if current.index != candidate => {
            let current_distance = rects
                .get(current.index)
                .map(|r| r.center().distance_to(drag.pointer))
                .unwrap_or(f64::INFINITY);
            if candidate_distance < current_distance - config.hysteresis {
                DropTarget {
                    index: candidate,
                    side: None,
                }
            } else {
                current
            }
        }
        Some(current) => current,
        None => DropTarget {
            index: candidate,
            side: None,
        },
    };

    let rect = rects[target.index];
    let center_x = rect.center().x;
    let dead = rect.width * config.dead_zone;
    let side = if drag.pointer.x < center_x - dead {
        Some(Side::Before)
    } else if drag.pointer.x > center_x + dead {
        Some(Side::After)
    } else {
        target.side
    };
    drag.target = Some(DropTarget {
        index: target.index,
        side,
    });

    let Some(side) = side else {
        return MoveEffect::None;
    };
    let from = drag.index;
    let to = match (side, from < target.index) {
        (Side::Before, true) => target.index - 1,
        (Side::Before, false) => target.index,
        (Side::After, true) => target.index,
        (Side::After, false) => target.index + 1,
    };
    if to == from || !layout.move_tile(from, to) {
        return MoveEffect::None;
    }

    let after = tile_rects(layout, metrics);
    drag.index = to;
    drag.target = Some(DropTarget {
        index: index_after_move(target.index, from, to),
        side: Some(side),
    });
    MoveEffect::Reordered {
        from,
        to,
        transition: flip(&rects, &after, from, to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridSystem, SimpleSize, TileSize};
    use crate::test_helpers::*;

    fn recognizer() -> GestureRecognizer {
        GestureRecognizer::new(GestureConfig::default())
    }

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    // =========================================================================
    // Click
    // =========================================================================

    #[test]
    fn press_without_movement_is_a_click() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b"]);
        let mut g = recognizer();
        assert!(g.pointer_down(&layout, PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0))));
        assert!(matches!(g.state(), GestureState::Armed { .. }));
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Clicked { index: 0 });
        assert_eq!(layout.size_of(0), Some(TileSize::Simple(SimpleSize::Two)));
        assert!(g.is_idle());
    }

    #[test]
    fn movement_under_threshold_is_still_a_click() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)));
        assert_eq!(g.pointer_move(&mut layout, &metrics, p(55.0, 55.0)), MoveEffect::None);
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Clicked { index: 0 });
        assert_eq!(ids(&layout), vec!["a", "b"]);
    }

    #[test]
    fn click_on_spacer_does_nothing() {
        let mut layout = layout_of(GridSystem::Simple, &["a"]);
        layout.insert_spacer(0, 1, 1);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)));
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::None);
        assert_eq!(layout.tiles()[0], Tile::Spacer(crate::layout::SpacerTile { cols: 1, rows: 1 }));
    }

    #[test]
    fn controls_background_and_other_buttons_do_not_arm() {
        let layout = layout_of(GridSystem::Simple, &["a"]);
        let mut g = recognizer();
        assert!(!g.pointer_down(&layout, PointerDown::primary(p(0.0, 0.0), PointerTarget::Control(0))));
        assert!(!g.pointer_down(&layout, PointerDown::primary(p(0.0, 0.0), PointerTarget::Background)));
        let mut secondary = PointerDown::primary(p(0.0, 0.0), PointerTarget::Tile(0));
        secondary.button = PointerButton::Secondary;
        assert!(!g.pointer_down(&layout, secondary));
        assert!(g.is_idle());
    }

    // =========================================================================
    // Reorder
    // =========================================================================

    #[test]
    fn dragging_first_tile_past_last_moves_it_to_the_end() {
        // Three 100px cells in one row: a [0,100) b [100,200) c [200,300).
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();

        g.pointer_down(&layout, PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)));
        // Crosses the threshold. Nearest is b, pointer is left of it: a is
        // already before b, nothing moves.
        assert_eq!(g.pointer_move(&mut layout, &metrics, p(60.0, 50.0)), MoveEffect::None);
        assert!(matches!(g.state(), GestureState::Dragging(_)));

        // c is 30px away against b's 130px: target switches, pointer is right
        // of c's centre, a goes after c.
        let effect = g.pointer_move(&mut layout, &metrics, p(280.0, 50.0));
        let MoveEffect::Reordered { from, to, transition } = effect else {
            panic!("expected a reorder, got {effect:?}")
        };
        assert_eq!((from, to), (0, 2));
        assert_eq!(transition.moves.len(), 2);
        assert_eq!(ids(&layout), vec!["b", "c", "a"]);

        // Hovering over its own new slot is stable.
        assert_eq!(g.pointer_move(&mut layout, &metrics, p(285.0, 55.0)), MoveEffect::None);

        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Reordered { from: 0, to: 2 });
        assert_eq!(ids(&layout), vec!["b", "c", "a"]);
        // Reorder is not a click: size untouched.
        assert_eq!(layout.tiles()[2].as_image().unwrap().explicit_size(), None);
    }

    #[test]
    fn ghost_follows_pointer_keeping_grab_offset() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(30.0, 40.0), PointerTarget::Tile(0)));
        assert_eq!(g.ghost(), None);
        g.pointer_move(&mut layout, &metrics, p(30.0, 60.0));
        assert_eq!(
            g.ghost(),
            Some(Rect { x: 0.0, y: 20.0, width: 100.0, height: 100.0 })
        );
    }

    #[test]
    fn hysteresis_holds_target_between_similar_tiles() {
        // a b c / d e f, drag f up towards the b/c boundary.
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c", "d", "e", "f"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(250.0, 150.0), PointerTarget::Tile(5)));
        // Nearest is c (250,50): 45px. Inside c's dead zone, no side yet.
        assert_eq!(g.pointer_move(&mut layout, &metrics, p(240.0, 95.0)), MoveEffect::None);
        let GestureState::Dragging(drag) = g.state() else {
            panic!("expected drag")
        };
        assert_eq!(drag.target.map(|t| t.index), Some(2));

        // b is now ~10px closer than c, short of the 15px margin: c stays the
        // target and f lands before c, not before b.
        assert!(matches!(
            g.pointer_move(&mut layout, &metrics, p(195.0, 60.0)),
            MoveEffect::Reordered { from: 5, to: 2, .. }
        ));
        assert_eq!(ids(&layout), vec!["a", "b", "f", "c", "d", "e"]);
    }

    #[test]
    fn clearly_closer_tile_takes_over_target() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c", "d", "e", "f"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(250.0, 150.0), PointerTarget::Tile(5)));
        g.pointer_move(&mut layout, &metrics, p(240.0, 95.0));
        // b is 5px from the pointer, c is 95px away.
        assert!(matches!(
            g.pointer_move(&mut layout, &metrics, p(125.0, 50.0)),
            MoveEffect::Reordered { from: 5, to: 1, .. }
        ));
        assert_eq!(ids(&layout), vec!["a", "f", "b", "c", "d", "e"]);
    }

    #[test]
    fn dead_zone_keeps_order_near_centre() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b", "c"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(250.0, 50.0), PointerTarget::Tile(2)));
        // b's centre is x=150; dead zone is ±20px.
        for x in [140.0, 150.0, 165.0, 135.0] {
            assert_eq!(g.pointer_move(&mut layout, &metrics, p(x, 50.0)), MoveEffect::None);
        }
        assert_eq!(ids(&layout), vec!["a", "b", "c"]);
        // Clearly left of centre: c goes before b.
        assert!(matches!(
            g.pointer_move(&mut layout, &metrics, p(120.0, 50.0)),
            MoveEffect::Reordered { from: 2, to: 1, .. }
        ));
        assert_eq!(ids(&layout), vec!["a", "c", "b"]);
    }

    #[test]
    fn shift_drag_on_spacer_reorders() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b"]);
        layout.insert_spacer(0, 1, 1);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(
            &layout,
            PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)).with_shift(),
        );
        g.pointer_move(&mut layout, &metrics, p(290.0, 50.0));
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Reordered { from: 0, to: 2 });
        assert_eq!(ids(&layout), vec!["a", "b", "spacer"]);
    }

    // =========================================================================
    // Crop
    // =========================================================================

    #[test]
    fn shift_drag_crops_with_inverted_sign() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(
            &layout,
            PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)).with_shift(),
        );
        assert_eq!(
            g.pointer_move(&mut layout, &metrics, p(75.0, 40.0)),
            MoveEffect::Cropped(Crop::new(25.0, 60.0))
        );
        // Deltas are measured from the press, not accumulated.
        assert_eq!(
            g.pointer_move(&mut layout, &metrics, p(60.0, 50.0)),
            MoveEffect::Cropped(Crop::new(40.0, 50.0))
        );
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Cropped { index: 0 });
        assert_eq!(layout.crop_of(0), Some(Crop::new(40.0, 50.0)));
        assert_eq!(ids(&layout), vec!["a", "b"]);
        assert_eq!(layout.tiles()[0].as_image().unwrap().explicit_size(), None);
    }

    #[test]
    fn crop_starts_from_existing_crop() {
        let mut layout = layout_of(GridSystem::Simple, &["a"]);
        layout.set_crop(0, Crop::new(10.0, 90.0));
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        g.pointer_down(
            &layout,
            PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)).with_shift(),
        );
        g.pointer_move(&mut layout, &metrics, p(40.0, 60.0));
        assert_eq!(layout.crop_of(0), Some(Crop::new(20.0, 80.0)));
    }

    #[test]
    fn crop_always_stays_in_range() {
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        for dx in (-1000..=1000).step_by(125) {
            for dy in (-1000..=1000).step_by(125) {
                let mut layout = layout_of(GridSystem::Simple, &["a"]);
                let mut g = recognizer();
                g.pointer_down(
                    &layout,
                    PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)).with_shift(),
                );
                g.pointer_move(&mut layout, &metrics, p(50.0 + dx as f64, 50.0 + dy as f64));
                let crop = layout.crop_of(0).unwrap();
                assert!((0.0..=100.0).contains(&crop.x()), "x out of range for {dx},{dy}");
                assert!((0.0..=100.0).contains(&crop.y()), "y out of range for {dx},{dy}");
            }
        }
    }

    // =========================================================================
    // Spacer resize
    // =========================================================================

    fn handle(index: usize, corner: Corner, at: Point) -> PointerDown {
        PointerDown::primary(at, PointerTarget::SpacerHandle { index, corner })
    }

    #[test]
    fn resize_starts_immediately_and_snaps_to_cells() {
        let mut layout = layout_of(GridSystem::Dense, &["a"]);
        layout.insert_spacer(0, 1, 1);
        let metrics = square_metrics(GridSystem::Dense, 50.0);
        let mut g = recognizer();
        assert!(g.pointer_down(&layout, handle(0, Corner::BottomRight, p(50.0, 50.0))));
        assert!(matches!(g.state(), GestureState::Resizing { .. }));
        // 2px is under the drag threshold but resize has none.
        assert_eq!(
            g.pointer_move(&mut layout, &metrics, p(52.0, 50.0)),
            MoveEffect::Resized { cols: 1, rows: 1 }
        );
        assert_eq!(
            g.pointer_move(&mut layout, &metrics, p(160.0, 110.0)),
            MoveEffect::Resized { cols: 3, rows: 2 }
        );
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Resized { index: 0 });
    }

    #[test]
    fn top_left_corner_grows_when_dragged_up_and_left() {
        let mut layout = layout_of(GridSystem::Dense, &[]);
        layout.insert_spacer(0, 4, 4);
        let metrics = square_metrics(GridSystem::Dense, 50.0);
        let mut g = recognizer();
        g.pointer_down(&layout, handle(0, Corner::TopLeft, p(0.0, 0.0)));
        assert_eq!(
            g.pointer_move(&mut layout, &metrics, p(-100.0, 50.0)),
            MoveEffect::Resized { cols: 6, rows: 3 }
        );
    }

    #[test]
    fn resize_never_leaves_bounds() {
        let metrics = square_metrics(GridSystem::Dense, 50.0);
        for corner in Corner::ALL {
            for (dx, dy) in [(10_000.0, 10_000.0), (-10_000.0, -10_000.0), (10_000.0, -10_000.0)] {
                let mut layout = layout_of(GridSystem::Dense, &[]);
                layout.insert_spacer(0, 2, 2);
                let mut g = recognizer();
                g.pointer_down(&layout, handle(0, corner, p(0.0, 0.0)));
                let MoveEffect::Resized { cols, rows } =
                    g.pointer_move(&mut layout, &metrics, p(dx, dy))
                else {
                    panic!("expected resize")
                };
                assert!((1..=9).contains(&cols), "{corner:?} cols {cols}");
                assert!((1..=12).contains(&rows), "{corner:?} rows {rows}");
            }
        }
    }

    #[test]
    fn handle_on_image_does_not_resize() {
        let layout = layout_of(GridSystem::Dense, &["a"]);
        let mut g = recognizer();
        assert!(!g.pointer_down(&layout, handle(0, Corner::BottomRight, p(0.0, 0.0))));
    }

    // =========================================================================
    // Exclusivity
    // =========================================================================

    #[test]
    fn second_press_during_gesture_is_ignored() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b"]);
        let mut g = recognizer();
        g.pointer_down(&layout, PointerDown::primary(p(50.0, 50.0), PointerTarget::Tile(0)));
        assert!(!g.pointer_down(&layout, PointerDown::primary(p(150.0, 50.0), PointerTarget::Tile(1))));
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::Clicked { index: 0 });
        assert_eq!(g.pointer_up(&mut layout), GestureOutcome::None);
    }

    #[test]
    fn moves_while_idle_do_nothing() {
        let mut layout = layout_of(GridSystem::Simple, &["a", "b"]);
        let metrics = square_metrics(GridSystem::Simple, 100.0);
        let mut g = recognizer();
        assert_eq!(g.pointer_move(&mut layout, &metrics, p(500.0, 500.0)), MoveEffect::None);
        assert_eq!(ids(&layout), vec!["a", "b"]);
    }
}
