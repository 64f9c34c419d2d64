//! Lightbox: an index-based carousel over the gallery's visible images.
//!
//! Spacers are not visible images, so viewer indices count images only.
//! While the editor is active the viewer is suspended and `open` does
//! nothing. When the gallery runs inside a frame, presentation is handed to
//! the host page with an [`Outbound::Lightbox`] message instead.

use crate::layout::Layout;
use crate::messaging::{LightboxImage, Outbound};

/// Visible part of a framed gallery, reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerAction {
    /// Suspended, out of range, or nothing to show.
    Ignored,
    /// Showing locally at this index.
    Shown(usize),
    /// Presentation handed to the host page.
    Delegated(Outbound),
}

#[derive(Debug, Clone, Default)]
pub struct Viewer {
    images: Vec<LightboxImage>,
    current: Option<usize>,
    suspended: bool,
    delegate: bool,
    viewport: Option<Viewport>,
}

impl Viewer {
    /// `delegate` hands presentation to the host page.
    pub fn new(delegate: bool) -> Self {
        Self {
            delegate,
            ..Self::default()
        }
    }

    /// Refresh the image list from the layout's current order.
    pub fn sync(&mut self, layout: &Layout) {
        self.images = layout
            .images()
            .map(|image| LightboxImage {
                src: image.src.clone(),
                alt: image.alt.clone(),
            })
            .collect();
        if self.current.is_some_and(|i| i >= self.images.len()) {
            self.current = None;
        }
    }

    pub fn images(&self) -> &[LightboxImage] {
        &self.images
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_image(&self) -> Option<&LightboxImage> {
        self.images.get(self.current?)
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        if suspended {
            self.current = None;
        }
        self.suspended = suspended;
    }

    pub fn open(&mut self, index: usize) -> ViewerAction {
        if self.suspended || index >= self.images.len() {
            return ViewerAction::Ignored;
        }
        if self.delegate {
            return ViewerAction::Delegated(Outbound::Lightbox {
                images: self.images.clone(),
                index,
            });
        }
        self.current = Some(index);
        ViewerAction::Shown(index)
    }

    /// Step by `direction`, wrapping at both ends.
    pub fn navigate(&mut self, direction: i64) -> Option<usize> {
        let count = self.images.len() as i64;
        let current = self.current? as i64;
        let next = (current + direction).rem_euclid(count) as usize;
        self.current = Some(next);
        Some(next)
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    /// Vertical centre for a locally rendered viewer: the middle of the
    /// visible region when framed, `None` to use the whole window.
    pub fn anchor_y(&self) -> Option<f64> {
        self.viewport.map(|v| v.top + v.height / 2.0)
    }
}
