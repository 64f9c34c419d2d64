//! # Gallery Layout
//!
//! The core of a photo gallery with a visual layout editor, plus the small
//! proxy that serves galleries with their saved layouts applied.
//!
//! A gallery is an ordered grid of tiles: images and spacers. Editors resize
//! tiles by clicking, reorder them by dragging, crop them by shift-dragging
//! and resize spacers by their corner handles. The result is saved as an
//! *overlay* over the image list that a content source provides, so the two
//! can change independently.
//!
//! # Data Flow
//!
//! ```text
//! content source ──▶ merge(saved overlay) ──▶ Layout ──▶ reflow / render
//!                                               ▲
//!                    pointer events ──▶ gesture ┘──▶ save overlay (per gesture)
//!                                                └─▶ publish to proxy (explicit)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`grid`] | Grid systems (3-column simple, 9-column dense), tile sizes, size cycling, badges |
//! | [`layout`] | The layout model: tiles, crops, and every mutation the editor performs |
//! | [`types`] | Wire shapes: gallery configs, saved overlay entries, size values |
//! | [`merge`] | Reconciles a saved overlay with the canonical image list |
//! | [`store`] | Local durable layout storage keyed by gallery |
//! | [`publish`] | Sends an overlay to the proxy with a bearer token |
//! | [`gesture`] | Pointer state machine: click, reorder, crop, spacer resize |
//! | [`reflow`] | Grid placement, decorations, filler slots, FLIP transitions |
//! | [`render`] | Grid markup and clipboard exports, via Maud |
//! | [`viewer`] | Lightbox carousel |
//! | [`messaging`] | Messages to and from a hosting page when framed |
//! | [`editor`] | Ties it together: owns the layout, the store and the edit session |
//! | [`source`] | Content source trait and the content-directory implementation |
//! | [`proxy`] | HTTP layout proxy: `GET` merged galleries, `PUT` overlays |
//! | [`config`] | `gallery.toml` loading, merging and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Content Wins on What, the Overlay Wins on How
//!
//! The content source decides which images exist and their `src`/`alt`. The
//! overlay decides order, size, crop and spacers. Images removed upstream
//! silently drop out of a saved layout; new images are appended in source
//! order. There is never a conflict to resolve by hand.
//!
//! ## Sizes Are Enums, Not Classes
//!
//! A tile's size is a [`grid::TileSize`] stored on the tile. CSS classes and
//! grid spans are derived from it, never read back.
//!
//! ## One Gesture, One State Machine
//!
//! A pointer sequence is classified once, by distance threshold and the shift
//! key, into exactly one gesture. The state lives in an edit session that
//! exists only while editing.

pub mod config;
pub mod editor;
pub mod gesture;
pub mod grid;
pub mod layout;
pub mod merge;
pub mod messaging;
pub mod output;
pub mod proxy;
pub mod publish;
pub mod reflow;
pub mod render;
pub mod source;
pub mod store;
pub mod types;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
