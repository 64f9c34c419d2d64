//! Layout proxy: serves merged galleries and stores layout overlays.
//!
//! ```text
//! GET     /{gallery}   200 merged GalleryConfig (+ ETag), 404 unknown, 500 upstream failure
//! PUT     /{gallery}   200 {"ok":true}; 401 bad bearer; 413 too large; 400 not a JSON array
//! OPTIONS /{anything}  204 (CORS preflight)
//! other                405
//! ```
//!
//! `PUT` checks are ordered: credentials, then the gallery id, then the body
//! size, then the body itself. An unauthenticated client never learns more
//! than `401`.
//!
//! Every response carries permissive CORS headers. [`Proxy::handle`] is a pure
//! function of a [`Request`] plus the source and store, so it is tested
//! without sockets; [`server`] serves it with `tiny_http`.

pub mod server;

use crate::merge::merge_gallery;
use crate::source::ContentSource;
use crate::store::{LayoutStore, load_or_discard};
use crate::types::{SavedEntry, is_valid_gallery_id};
use sha2::{Digest, Sha256};
use tracing::{error, warn};

pub use tiny_http::Method;

type Headers = Vec<(String, String)>;

fn find_header<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A request as the router sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Token from `Authorization: Bearer <token>`.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.header("authorization")?.trim();
        let (scheme, token) = value.split_once(' ')?;
        scheme
            .eq_ignore_ascii_case("bearer")
            .then(|| token.trim())
            .filter(|t| !t.is_empty())
    }

    /// Path without the query string.
    pub fn route(&self) -> &str {
        self.path.split('?').next().unwrap_or("")
    }
}

/// A response before it is put on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::empty(status)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// `{"error": message}`.
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct Proxy<C, S> {
    source: C,
    store: S,
    secret: Option<String>,
    max_body: usize,
}

impl<C: ContentSource, S: LayoutStore> Proxy<C, S> {
    /// Without a secret every `PUT` is refused.
    pub fn new(source: C, store: S, secret: Option<String>, max_body: usize) -> Self {
        if secret.is_none() {
            warn!("no layout secret configured; PUT requests will be refused");
        }
        Self {
            source,
            store,
            secret,
            max_body,
        }
    }

    pub fn max_body(&self) -> usize {
        self.max_body
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn handle(&self, request: &Request) -> Response {
        let response = match request.method {
            Method::Options => Response::empty(204),
            Method::Get => self.get(request),
            Method::Put => self.put(request),
            _ => Response::error(405, "method not allowed").with_header("Allow", "GET, PUT, OPTIONS"),
        };
        with_cors(response)
    }

    /// Answer a request whose declared body is over the limit, from its
    /// headers alone. Credentials are still checked first.
    pub fn refuse_oversized(&self, request: &Request, length: usize) -> Response {
        let response = match request.method {
            Method::Put => match self.admit_put(request, length) {
                Err(response) => response,
                Ok(_) => Response::error(413, "body too large"),
            },
            _ => Response::error(413, "body too large"),
        };
        with_cors(response)
    }

    fn get(&self, request: &Request) -> Response {
        let Some(id) = gallery_id(request) else {
            return Response::error(404, "gallery not found");
        };
        let config = match self.source.fetch(id) {
            Ok(Some(config)) => config,
            Ok(None) => return Response::error(404, "gallery not found"),
            Err(err) => {
                error!(gallery = id, "content source failed: {err}");
                return Response::error(500, "content source unavailable");
            }
        };
        let saved = load_or_discard(&self.store, id);
        let merged = merge_gallery(&config, saved.as_deref());
        let body = match serde_json::to_vec(&merged) {
            Ok(body) => body,
            Err(err) => {
                error!(gallery = id, "serializing gallery failed: {err}");
                return Response::error(500, "serialization failed");
            }
        };
        let tag = etag(&body);
        if request.header("if-none-match") == Some(tag.as_str()) {
            return Response::empty(304).with_header("ETag", tag);
        }
        Response::json(200, body).with_header("ETag", tag)
    }

    /// Credentials, gallery id and size, in that order.
    fn admit_put<'r>(&self, request: &'r Request, length: usize) -> Result<&'r str, Response> {
        let authorized = match (&self.secret, request.bearer_token()) {
            (Some(secret), Some(token)) => tokens_match(secret, token),
            _ => false,
        };
        if !authorized {
            return Err(Response::error(401, "unauthorized"));
        }
        let Some(id) = gallery_id(request) else {
            return Err(Response::error(404, "gallery not found"));
        };
        if length > self.max_body {
            return Err(Response::error(413, "body too large"));
        }
        Ok(id)
    }

    fn put(&self, request: &Request) -> Response {
        let id = match self.admit_put(request, request.body.len()) {
            Ok(id) => id,
            Err(response) => return response,
        };
        let value: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(value) => value,
            Err(_) => return Response::error(400, "invalid JSON"),
        };
        if !value.is_array() {
            return Response::error(400, "expected a JSON array");
        }
        let entries: Vec<SavedEntry> = match serde_json::from_value(value) {
            Ok(entries) => entries,
            Err(err) => return Response::error(400, &format!("invalid layout entry: {err}")),
        };
        match self.store.save(id, &entries) {
            Ok(()) => Response::json(200, r#"{"ok":true}"#),
            Err(err) => {
                error!(gallery = id, "storing layout failed: {err}");
                Response::error(500, "storing layout failed")
            }
        }
    }
}

/// The single path segment, if it is a valid gallery id.
fn gallery_id(request: &Request) -> Option<&str> {
    let id = request.route().strip_prefix('/')?;
    is_valid_gallery_id(id).then_some(id)
}

/// Compare digests so the time taken does not depend on where the token
/// first differs, or on its length.
fn tokens_match(secret: &str, token: &str) -> bool {
    let expected = Sha256::digest(secret.as_bytes());
    let given = Sha256::digest(token.as_bytes());
    expected
        .iter()
        .zip(given.iter())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Quoted hex SHA-256 of the body.
fn etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("\"{hex}\"")
}

fn with_cors(response: Response) -> Response {
    response
        .with_header("Access-Control-Allow-Origin", "*")
        .with_header("Access-Control-Allow-Methods", "GET, PUT, OPTIONS")
        .with_header("Access-Control-Allow-Headers", "Authorization, Content-Type")
}
