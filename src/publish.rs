//! Remote publish: send the local overlay to the layout proxy.
//!
//! Publishing is explicit and credentialed, and independent of local saves.
//! A failure only changes the transient [`PublishStatus`]; local state is
//! never touched and nothing is retried.

use crate::types::SavedEntry;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

const TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Invalid proxy URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Unsupported proxy URL {0}: expected http:// or https://")]
    Scheme(String),
    #[error("Network error: {0}")]
    Network(Box<ureq::Transport>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not authorized")]
    Unauthorized,
    #[error("Proxy answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// Inline indicator next to the publish button.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PublishStatus {
    #[default]
    Idle,
    Publishing,
    Published,
    Failed(String),
}

impl PublishStatus {
    pub fn label(&self) -> &str {
        match self {
            PublishStatus::Idle => "",
            PublishStatus::Publishing => "Publishing…",
            PublishStatus::Published => "Published",
            PublishStatus::Failed(message) => message,
        }
    }
}

pub trait Publisher {
    fn publish(&self, gallery_id: &str, entries: &[SavedEntry]) -> Result<(), PublishError>;
}

/// `PUT {base}/{gallery}` with a bearer token.
#[derive(Debug, Clone)]
pub struct HttpPublisher {
    base: Url,
    token: String,
    agent: ureq::Agent,
}

impl HttpPublisher {
    pub fn new(base: &str, token: impl Into<String>) -> Result<Self, PublishError> {
        let base = Url::parse(base)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(PublishError::Scheme(base.to_string()));
        }
        Ok(Self {
            base,
            token: token.into(),
            agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
        })
    }

    /// Endpoint for one gallery.
    pub fn gallery_url(&self, gallery_id: &str) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), gallery_id);
        url.set_path(&path);
        url.set_query(None);
        url
    }
}

impl Publisher for HttpPublisher {
    fn publish(&self, gallery_id: &str, entries: &[SavedEntry]) -> Result<(), PublishError> {
        let body = serde_json::to_string(entries)?;
        let result = self
            .agent
            .put(self.gallery_url(gallery_id).as_str())
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Content-Type", "application/json")
            .send_string(&body);

        match result {
            Ok(_) => {
                info!(gallery = gallery_id, entries = entries.len(), "published layout");
                Ok(())
            }
            Err(ureq::Error::Status(401, _)) => Err(PublishError::Unauthorized),
            Err(ureq::Error::Status(status, response)) => Err(PublishError::Status {
                status,
                body: response.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(transport)) => Err(PublishError::Network(Box::new(transport))),
        }
    }
}

/// Publish and return the resulting indicator state.
pub fn publish_with_status<P: Publisher + ?Sized>(
    publisher: &P,
    gallery_id: &str,
    entries: &[SavedEntry],
) -> PublishStatus {
    match publisher.publish(gallery_id, entries) {
        Ok(()) => PublishStatus::Published,
        Err(err) => {
            warn!(gallery = gallery_id, "publish failed: {err}");
            PublishStatus::Failed(format!("Publish failed: {err}"))
        }
    }
}
