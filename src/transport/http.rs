//! HTTP transport.
//!
//! axum only supplies the listener: all paths go to a single fallback handler
//! and the responder's router decides what the request means.

use crate::api::{Responder, ResponseEnvelope};
use crate::db::ConnectionProvider;
use crate::error::{DbError, DbResult};
use crate::transport::{Transport, wait_for_signal};
use axum::{
    extract::State,
    http::{HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// HTTP transport implementation.
pub struct HttpTransport<P> {
    responder: Arc<Responder<P>>,
    /// Host to bind to
    host: String,
    /// Port to bind to
    port: u16,
}

impl<P> HttpTransport<P>
where
    P: ConnectionProvider + 'static,
{
    /// Create a new HTTP transport.
    ///
    /// # Arguments
    ///
    /// * `responder` - Shared responder handling every request
    /// * `host` - Host address to bind to
    /// * `port` - Port to bind to
    pub fn new(responder: Arc<Responder<P>>, host: impl Into<String>, port: u16) -> Self {
        Self {
            responder,
            host: host.into(),
            port,
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the axum application.
    pub fn app(responder: Arc<Responder<P>>) -> axum::Router {
        axum::Router::new()
            .fallback(handle_request::<P>)
            .with_state(responder)
    }
}

async fn handle_request<P>(
    State(responder): State<Arc<Responder<P>>>,
    method: Method,
    uri: Uri,
) -> Response
where
    P: ConnectionProvider + 'static,
{
    let envelope = responder.handle(method.as_str(), uri.path()).await;
    into_http_response(envelope)
}

/// Translate an envelope into an HTTP response, copying its headers verbatim.
pub fn into_http_response(envelope: ResponseEnvelope) -> Response {
    let status =
        StatusCode::from_u16(envelope.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let headers = envelope.headers().clone();
    let mut response = (status, envelope.into_body().to_string()).into_response();

    for (name, value) in &headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "Skipping invalid response header"),
        }
    }
    response
}

impl<P> Transport for HttpTransport<P>
where
    P: ConnectionProvider + 'static,
{
    async fn run(&self) -> DbResult<()> {
        let bind_addr = self.bind_addr();
        info!("Starting table checker with HTTP transport on {}", bind_addr);

        let app = Self::app(self.responder.clone());

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            DbError::internal(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        if let Some(stage) = self.responder.router().stage() {
            info!(stage, "Accepting stage-prefixed paths");
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_signal())
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server error");
                DbError::internal(format!("HTTP server error: {}", e))
            })?;

        info!("HTTP server stopped");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
