//! The gallery editor.
//!
//! [`Editor`] owns the live [`Layout`], the local store, the viewer and the
//! publish indicator. Edit mode is an [`EditorSession`] that exists only
//! between [`Editor::enter`] and [`Editor::exit`]; all gesture state lives in
//! it, so leaving edit mode discards a half-finished gesture.
//!
//! Every completed gesture or control action saves the layout once. A save
//! failure is logged and otherwise ignored: the in-memory layout stays
//! authoritative for the session.

use crate::config::Config;
use crate::gesture::{GestureOutcome, GestureRecognizer, MoveEffect, PointerDown};
use crate::grid::Orientation;
use crate::layout::{Layout, Tile};
use crate::merge::{merge_entries, to_saved};
use crate::messaging::{Inbound, Outbound, ResizeReporter};
use crate::publish::{PublishStatus, Publisher, publish_with_status};
use crate::reflow::{Decorations, GridMetrics, Point, Rect, Transition, content_height, decorate, tile_rects};
use crate::render;
use crate::store::{LayoutStore, load_or_discard};
use crate::types::{GalleryConfig, SavedEntry};
use crate::viewer::{Viewer, ViewerAction, Viewport};
use tracing::{debug, info, warn};

/// State that exists only while editing.
#[derive(Debug)]
pub struct EditorSession {
    gestures: GestureRecognizer,
    decorations: Decorations,
    transition: Option<Transition>,
}

impl EditorSession {
    pub fn decorations(&self) -> &Decorations {
        &self.decorations
    }

    /// Most recent reorder slide, until the next structural change.
    pub fn transition(&self) -> Option<&Transition> {
        self.transition.as_ref()
    }

    pub fn gestures(&self) -> &GestureRecognizer {
        &self.gestures
    }
}

pub struct Editor<S> {
    gallery: GalleryConfig,
    layout: Layout,
    store: S,
    config: Config,
    metrics: GridMetrics,
    session: Option<EditorSession>,
    viewer: Viewer,
    publish: PublishStatus,
    resize: ResizeReporter,
}

impl<S: LayoutStore> Editor<S> {
    /// Build the layout from the canonical gallery merged with whatever the
    /// store holds. A corrupt record is discarded.
    pub fn open(gallery: GalleryConfig, store: S, config: Config, framed: bool) -> Self {
        let system = config.grid.system;
        let entries = match load_or_discard(&store, &gallery.id) {
            Some(saved) => merge_entries(&gallery.images, &saved),
            None => gallery.images.clone(),
        };
        let layout = Layout::from_entries(system, &entries);
        let mut viewer = Viewer::new(framed);
        viewer.sync(&layout);
        debug!(gallery = %gallery.id, tiles = layout.len(), "editor opened");
        Self {
            metrics: GridMetrics::from_config(system, &config.grid),
            gallery,
            layout,
            store,
            config,
            session: None,
            viewer,
            publish: PublishStatus::Idle,
            resize: ResizeReporter::new(),
        }
    }

    pub fn gallery(&self) -> &GalleryConfig {
        &self.gallery
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    /// Update the grid container width after the host resized it.
    pub fn set_container_width(&mut self, width: f64) {
        if width > 0.0 {
            self.metrics.container_width = width;
        }
    }

    pub fn tile_rects(&self) -> Vec<Rect> {
        tile_rects(&self.layout, &self.metrics)
    }

    // =========================================================================
    // Edit mode
    // =========================================================================

    pub fn is_editing(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EditorSession> {
        self.session.as_ref()
    }

    pub fn enter(&mut self) {
        if self.session.is_some() {
            return;
        }
        self.viewer.set_suspended(true);
        self.session = Some(EditorSession {
            gestures: GestureRecognizer::new(self.config.gestures),
            decorations: decorate(&self.layout),
            transition: None,
        });
        info!(gallery = %self.gallery.id, "editing");
    }

    pub fn exit(&mut self) {
        if self.session.take().is_some() {
            self.viewer.set_suspended(false);
            self.viewer.sync(&self.layout);
            info!(gallery = %self.gallery.id, "editing finished");
        }
    }

    /// Decorations are an edit-mode concern only.
    pub fn decorations(&self) -> Option<&Decorations> {
        self.session.as_ref().map(|s| &s.decorations)
    }

    fn refresh(&mut self) {
        if let Some(session) = &mut self.session {
            session.decorations = decorate(&self.layout);
        }
        self.viewer.sync(&self.layout);
    }

    fn save(&self) {
        if let Err(err) = self.store.save(&self.gallery.id, &to_saved(&self.layout)) {
            warn!(gallery = %self.gallery.id, "saving layout failed: {err}");
        }
    }

    /// Refresh decorations and persist after a finished edit.
    fn commit(&mut self) {
        self.refresh();
        self.save();
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn pointer_down(&mut self, down: PointerDown) -> bool {
        let Some(session) = &mut self.session else {
            return false;
        };
        let started = session.gestures.pointer_down(&self.layout, down);
        if started {
            self.publish = PublishStatus::Idle;
        }
        started
    }

    pub fn pointer_move(&mut self, position: Point) -> MoveEffect {
        let Some(session) = &mut self.session else {
            return MoveEffect::None;
        };
        let effect = session
            .gestures
            .pointer_move(&mut self.layout, &self.metrics, position);
        match &effect {
            MoveEffect::Reordered { transition, .. } => {
                session.transition = Some(transition.clone());
                session.decorations = decorate(&self.layout);
            }
            MoveEffect::Resized { .. } => {
                session.decorations = decorate(&self.layout);
            }
            MoveEffect::Cropped(_) | MoveEffect::None => {}
        }
        effect
    }

    pub fn pointer_up(&mut self) -> GestureOutcome {
        let Some(session) = &mut self.session else {
            return GestureOutcome::None;
        };
        let outcome = session.gestures.pointer_up(&mut self.layout);
        session.transition = None;
        if outcome.is_edit() {
            debug!(gallery = %self.gallery.id, ?outcome, "gesture");
            self.commit();
        }
        outcome
    }

    /// Ghost rectangle of the tile being dragged.
    pub fn drag_ghost(&self) -> Option<Rect> {
        self.session.as_ref()?.gestures.ghost()
    }

    // =========================================================================
    // Controls
    // =========================================================================

    fn idle_session(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.gestures.is_idle())
    }

    /// Remove a tile via its delete control.
    pub fn delete_tile(&mut self, index: usize) -> bool {
        if !self.idle_session() || self.layout.remove(index).is_none() {
            return false;
        }
        self.publish = PublishStatus::Idle;
        self.commit();
        true
    }

    /// Dense-system orientation button.
    pub fn orient(&mut self, index: usize, group: Orientation) -> bool {
        if !self.idle_session() || !self.layout.orient(index, group) {
            return false;
        }
        self.publish = PublishStatus::Idle;
        self.commit();
        true
    }

    /// Insert a 1×1 spacer before `index`. Returns the spacer's index.
    pub fn add_spacer(&mut self, index: usize) -> Option<usize> {
        if !self.idle_session() {
            return None;
        }
        let at = self.layout.insert_spacer(index, 1, 1);
        self.publish = PublishStatus::Idle;
        self.commit();
        Some(at)
    }

    /// Forget the stored layout and return to canonical order.
    pub fn reset(&mut self) {
        if let Err(err) = self.store.delete(&self.gallery.id) {
            warn!(gallery = %self.gallery.id, "deleting saved layout failed: {err}");
        }
        if let Some(session) = &mut self.session {
            session.gestures.reset();
            session.transition = None;
        }
        self.layout = Layout::from_entries(self.layout.system(), &self.gallery.images);
        self.refresh();
        info!(gallery = %self.gallery.id, "layout reset");
    }

    /// Natural dimensions of an image became known. Sizes the tile from its
    /// orientation if nobody has sized it yet. Not a user edit, so not saved.
    pub fn image_loaded(&mut self, id: &str, width: u32, height: u32) -> bool {
        let Some(index) = self.layout.position_of(id) else {
            return false;
        };
        let changed = self.layout.set_natural_size(index, width, height);
        if changed {
            self.refresh();
        }
        changed
    }

    /// Re-merge an overlay onto the current tiles, keeping their runtime
    /// state (natural sizes) instead of rebuilding them. A gesture in
    /// progress is abandoned.
    pub fn restore(&mut self, saved: &[SavedEntry]) {
        if let Some(session) = &mut self.session {
            session.gestures.reset();
            session.transition = None;
        }
        let merged = merge_entries(&self.gallery.images, saved);
        self.layout.restore(&merged);
        self.refresh();
    }

    // =========================================================================
    // Publish, viewer, host messages, exports
    // =========================================================================

    pub fn publish_status(&self) -> &PublishStatus {
        &self.publish
    }

    /// Send the current layout to the remote store. Local state is untouched
    /// whatever the outcome.
    pub fn publish<P: Publisher + ?Sized>(&mut self, publisher: &P) -> &PublishStatus {
        self.publish = PublishStatus::Publishing;
        self.publish = publish_with_status(publisher, &self.gallery.id, &to_saved(&self.layout));
        &self.publish
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    /// Open the viewer from a click on the tile at `index` (layout index).
    pub fn open_viewer(&mut self, index: usize) -> ViewerAction {
        if self.is_editing() {
            return ViewerAction::Ignored;
        }
        let Some(Tile::Image(_)) = self.layout.get(index) else {
            return ViewerAction::Ignored;
        };
        let position = self.layout.tiles()[..index]
            .iter()
            .filter(|t| !t.is_spacer())
            .count();
        self.viewer.open(position)
    }

    /// Height report for the hosting frame, when it changed.
    pub fn report_height(&mut self) -> Option<Outbound> {
        self.resize.observe(content_height(&self.layout, &self.metrics))
    }

    pub fn handle_message(&mut self, raw: &str) {
        if let Some(Inbound::ViewportPosition { top, height }) = Inbound::parse(raw) {
            self.viewer.set_viewport(Viewport { top, height });
        }
    }

    pub fn export_markup(&self) -> String {
        render::export_markup(&self.gallery, &self.layout)
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        render::export_json(&self.layout)
    }
}
