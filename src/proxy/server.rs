//! HTTP front end for [`Proxy`], served by `tiny_http`: one thread per request.
//!
//! A `PUT` that declares a body over the limit is answered from its headers
//! alone and the body is never read. Bodies without a declared length are
//! read up to one byte past the limit, which the router then refuses.

use super::{Method, Proxy, Request, Response};
use crate::source::ContentSource;
use crate::store::LayoutStore;
use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Cannot listen on {addr}: {message}")]
    Bind { addr: String, message: String },
    #[error("Listener has no IP address")]
    NoAddress,
}

/// A bound listener, ready to serve.
pub struct Server<C, S> {
    http: tiny_http::Server,
    proxy: Arc<Proxy<C, S>>,
}

impl<C, S> Server<C, S>
where
    C: ContentSource + Send + Sync + 'static,
    S: LayoutStore + Send + Sync + 'static,
{
    pub fn bind(addr: &str, proxy: Proxy<C, S>) -> Result<Self, ServeError> {
        let http = tiny_http::Server::http(addr).map_err(|err| ServeError::Bind {
            addr: addr.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self {
            http,
            proxy: Arc::new(proxy),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServeError> {
        self.http.server_addr().to_ip().ok_or(ServeError::NoAddress)
    }

    /// Serve until the listener shuts down.
    pub fn run(self) -> Result<(), ServeError> {
        info!(addr = %self.local_addr()?, "layout proxy listening");
        for request in self.http.incoming_requests() {
            let proxy = Arc::clone(&self.proxy);
            thread::spawn(move || serve(request, &proxy));
        }
        Ok(())
    }

    /// Run on a background thread. Returns the bound address.
    pub fn spawn(self) -> Result<SocketAddr, ServeError> {
        let addr = self.local_addr()?;
        thread::spawn(move || {
            if let Err(err) = self.run() {
                warn!("layout proxy stopped: {err}");
            }
        });
        Ok(addr)
    }
}

fn serve<C: ContentSource, S: LayoutStore>(mut incoming: tiny_http::Request, proxy: &Proxy<C, S>) {
    let peer = incoming.remote_addr().copied();
    let mut request = Request::new(incoming.method().clone(), incoming.url());
    for header in incoming.headers() {
        request = request.with_header(&header.field.to_string(), header.value.to_string());
    }

    let response = match incoming.body_length() {
        Some(length) if length > proxy.max_body() => {
            debug!(?peer, length, limit = proxy.max_body(), "declared body too large");
            proxy.refuse_oversized(&request, length)
        }
        _ if request.method == Method::Put => {
            let mut body = Vec::new();
            let limit = proxy.max_body() as u64 + 1;
            if let Err(err) = incoming.as_reader().take(limit).read_to_end(&mut body) {
                debug!(?peer, "reading body failed: {err}");
                return;
            }
            proxy.handle(&request.with_body(body))
        }
        _ => proxy.handle(&request),
    };

    info!(
        method = %incoming.method(),
        path = %incoming.url(),
        status = response.status,
        "request"
    );
    if let Err(err) = incoming.respond(to_wire(response)) {
        debug!(?peer, "writing response failed: {err}");
    }
}

fn to_wire(response: Response) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let mut wire = tiny_http::Response::from_data(response.body).with_status_code(response.status);
    for (name, value) in &response.headers {
        match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            Ok(header) => wire = wire.with_header(header),
            Err(()) => warn!(header = %name, "dropping header with invalid value"),
        }
    }
    wire
}
