use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{FolioResult, err};

use super::{
    HttpBody, HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle,
    HttpService, HttpStatusCode,
};

/// How long the accept loop waits for a request before re-checking the
/// shutdown flag.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

/// A blocking HTTP server backed by tiny_http.
///
/// `bind` claims the socket immediately (so the caller can learn an
/// OS-assigned port before serving); `serve` runs the accept loop until the
/// handle is shut down.
pub struct HttpServer {
    server: tiny_http::Server,
    config: HttpServerConfig,
    handle: HttpServerHandle,
}

impl std::fmt::Debug for HttpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpServer")
            .field("config", &self.config)
            .field("port", &self.handle.port())
            .finish()
    }
}

impl HttpServer {
    /// Bind the server socket described by `config`.
    pub fn bind(config: HttpServerConfig) -> FolioResult<Self> {
        let address = config.address();
        let server = tiny_http::Server::http(address.as_str())
            .map_err(|e| err!("Failed to bind HTTP server to {}: {}", address, e))?;

        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| err!("Server bound to a non-IP address"))?;

        debug!(port, "HTTP server socket bound");
        Ok(Self {
            server,
            config,
            handle: HttpServerHandle::new(port),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.handle.port()
    }

    /// Get a handle that can shut the serve loop down from another thread.
    pub fn handle(&self) -> HttpServerHandle {
        self.handle.clone()
    }

    /// Serve requests until the handle is shut down.
    ///
    /// Blocks the calling thread. Each request is dispatched to `service`;
    /// a service error is rendered as HTTP 500 with a `{"detail": …}` body.
    pub fn serve(&self, service: Arc<dyn HttpService>) -> FolioResult<()> {
        info!(
            host = %self.config.host,
            port = self.handle.port(),
            "HTTP server listening"
        );

        while !self.handle.is_shutdown() {
            let request = match self.server.recv_timeout(RECV_TIMEOUT) {
                Ok(Some(request)) => request,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "failed to receive request");
                    continue;
                }
            };

            self.dispatch(service.as_ref(), request);
        }

        info!(port = self.handle.port(), "HTTP server shut down");
        Ok(())
    }

    /// Convert a wire request, run the service, and send the response.
    fn dispatch(&self, service: &dyn HttpService, mut raw: tiny_http::Request) {
        let method_str = raw.method().to_string();
        let path = raw.url().to_string();
        debug!(method = %method_str, path = %path, "request received");

        let response = match self.convert_request(&mut raw) {
            Ok(request) => match service.handle_request(request) {
                Ok(response) => response,
                Err(e) => {
                    warn!(method = %method_str, path = %path, error = %e, "service error");
                    detail_response(
                        HttpStatusCode::InternalServerError,
                        &format!("Internal error: {}", e),
                    )
                }
            },
            Err(response) => response,
        };

        debug!(
            method = %method_str,
            path = %path,
            status = response.status().as_u16(),
            "request handled"
        );
        self.send(raw, response);
    }

    /// Convert a tiny_http request into an [`HttpRequest`].
    ///
    /// An unsupported method or an unreadable body is rejected here with a
    /// ready-made error response.
    fn convert_request(
        &self,
        raw: &mut tiny_http::Request,
    ) -> Result<HttpRequest, HttpResponse> {
        let method = HttpMethod::parse(&raw.method().to_string()).ok_or_else(|| {
            detail_response(
                HttpStatusCode::MethodNotAllowed,
                &format!("Method {} not supported", raw.method()),
            )
        })?;

        let path = raw.url().to_string();

        let mut body = Vec::new();
        raw.as_reader().read_to_end(&mut body).map_err(|e| {
            detail_response(
                HttpStatusCode::BadRequest,
                &format!("Failed to read request body: {}", e),
            )
        })?;

        let mut request = HttpRequest::new(method, path).with_body(HttpBody::from_bytes(body));
        for header in raw.headers() {
            request = request.with_header(header.field.to_string(), header.value.to_string());
        }
        Ok(request)
    }

    /// Send an [`HttpResponse`] back on the wire.
    fn send(&self, raw: tiny_http::Request, response: HttpResponse) {
        let status = response.status().as_u16();
        let mut wire = tiny_http::Response::from_data(response.body().as_bytes().to_vec())
            .with_status_code(status);

        for (key, value) in response.headers().all() {
            if let Ok(header) = tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
                wire = wire.with_header(header);
            }
        }
        if let Ok(header) =
            tiny_http::Header::from_bytes(&b"Server"[..], self.config.server_name.as_bytes())
        {
            wire = wire.with_header(header);
        }

        if let Err(e) = raw.respond(wire) {
            debug!(error = %e, "failed to send response");
        }
    }
}

/// Build an error response with the standard `{"detail": …}` body.
fn detail_response(status: HttpStatusCode, detail: &str) -> HttpResponse {
    HttpResponse::new(status)
        .with_content_type("application/json")
        .with_body(format!(r#"{{"detail":"{}"}}"#, escape_json(detail)))
}

/// Escape special characters for JSON string values.
fn escape_json(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '"' => "\\\"".to_string(),
            '\\' => "\\\\".to_string(),
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            '\u{08}' => "\\b".to_string(),
            '\u{0C}' => "\\f".to_string(),
            c => c.to_string(),
        })
        .collect()
}
