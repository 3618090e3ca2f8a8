//! ============================================================================
//! Loopback Callback Server
//! ============================================================================
//! Pocket redirects the browser to `/pocketapp` once the user approves
//! access. That page links to `/stop`, and hitting `/stop` ends the wait so
//! the flow can exchange its request token.
//! ============================================================================

use std::io::Cursor;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

use crate::config::{CALLBACK_PATH, STOP_PATH};
use crate::types::PocketError;

const LANDING_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Pocket App</title>
</head>
<body>
    <h1>Pocket access approved</h1>
    <p>Finish the login in your terminal.</p>
    <a href="/stop">Click to continue</a>
</body>
</html>
"#;

/// Single-shot HTTP listener for the authorization redirect
pub struct CallbackServer {
    server: Server,
    addr: String,
}

impl CallbackServer {
    /// Bind the listener. Failing to bind (port in use) is fatal for the flow.
    pub fn bind(host: &str, port: u16) -> Result<Self, PocketError> {
        let addr = format!("{}:{}", host, port);
        let server = Server::http(&addr).map_err(|e| PocketError::CallbackBind {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

        debug!("Callback server bound to {}", addr);
        Ok(Self { server, addr })
    }

    /// Actual socket address, useful when bound to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until `/stop` is hit or `timeout` elapses.
    ///
    /// Blocks the calling thread; async callers run it on a blocking worker.
    pub fn wait_for_stop(self, timeout: Duration) -> Result<(), PocketError> {
        info!("Waiting for authorization callback on {}", self.addr);
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(PocketError::CallbackTimeout(timeout));
            }

            let request = self
                .server
                .recv_timeout(remaining)
                .map_err(|e| PocketError::CallbackServer(e.to_string()))?;

            if let Some(request) = request {
                if handle(request) {
                    info!("Authorization callback completed");
                    return Ok(());
                }
            }
        }
    }
}

/// Answer one request; returns true when it was the stop route.
fn handle(request: Request) -> bool {
    let path = request.url().split('?').next().unwrap_or("").to_string();
    debug!("Callback request: {} {}", request.method(), path);

    let is_get = *request.method() == Method::Get;
    let (result, stop) = match path.as_str() {
        CALLBACK_PATH if is_get => (request.respond(html(LANDING_PAGE)), false),
        STOP_PATH if is_get => (request.respond(Response::empty(204)), true),
        _ => (
            request.respond(Response::from_string("Not Found").with_status_code(404)),
            false,
        ),
    };

    if let Err(e) = result {
        warn!("Failed to answer callback request {}: {}", path, e);
    }
    stop
}

fn html(body: &str) -> Response<Cursor<Vec<u8>>> {
    let response = Response::from_string(body);
    match Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}
