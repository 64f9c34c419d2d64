//! Messages exchanged with a hosting page when the gallery is framed.
//!
//! ```text
//! gallery → host   {"type":"resize","height":1234}
//! gallery → host   {"type":"lightbox","images":[{"src":…,"alt":…}],"index":2}
//! host → gallery   {"type":"viewport-position","top":480,"height":900}
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

/// An image handed to the host's lightbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightboxImage {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Outbound {
    /// Content height changed; the host should resize the frame.
    Resize { height: u32 },
    /// Open the host-side lightbox at `index`.
    Lightbox {
        images: Vec<LightboxImage>,
        index: usize,
    },
}

impl Outbound {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Inbound {
    /// Visible part of the frame, in frame coordinates.
    ViewportPosition { top: f64, height: f64 },
}

impl Inbound {
    /// Parse a host message. Anything unrecognized is ignored.
    pub fn parse(raw: &str) -> Option<Inbound> {
        match serde_json::from_str(raw) {
            Ok(message) => Some(message),
            Err(err) => {
                debug!("ignoring host message: {err}");
                None
            }
        }
    }
}

/// Emits `resize` only when the content height actually changes.
#[derive(Debug, Clone, Default)]
pub struct ResizeReporter {
    last: Option<u32>,
}

impl ResizeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, height: f64) -> Option<Outbound> {
        let height = height.max(0.0).ceil() as u32;
        if self.last == Some(height) {
            return None;
        }
        self.last = Some(height);
        Some(Outbound::Resize { height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_wire_shapes() {
        let resize = Outbound::Resize { height: 640 };
        assert_eq!(resize.to_json().unwrap(), r#"{"type":"resize","height":640}"#);

        let lightbox = Outbound::Lightbox {
            images: vec![LightboxImage {
                src: "/a.jpg".into(),
                alt: "A".into(),
            }],
            index: 0,
        };
        assert_eq!(
            lightbox.to_json().unwrap(),
            r#"{"type":"lightbox","images":[{"src":"/a.jpg","alt":"A"}],"index":0}"#
        );
    }

    #[test]
    fn inbound_viewport_position() {
        assert_eq!(
            Inbound::parse(r#"{"type":"viewport-position","top":120,"height":800.5}"#),
            Some(Inbound::ViewportPosition {
                top: 120.0,
                height: 800.5
            })
        );
    }

    #[test]
    fn unknown_inbound_messages_are_ignored() {
        assert_eq!(Inbound::parse(r#"{"type":"scroll","y":3}"#), None);
        assert_eq!(Inbound::parse("not json"), None);
    }

    #[test]
    fn resize_reported_only_on_change() {
        let mut reporter = ResizeReporter::new();
        assert_eq!(reporter.observe(99.2), Some(Outbound::Resize { height: 100 }));
        assert_eq!(reporter.observe(100.0), None);
        assert_eq!(reporter.observe(180.0), Some(Outbound::Resize { height: 180 }));
    }
}
