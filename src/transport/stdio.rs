//! Stdio transport.
//!
//! Reads API-gateway-style proxy events, one JSON object per line, and writes
//! one proxy response per line. Events are handled strictly one after the
//! other, mirroring an on-demand function runtime.

use crate::api::{OperationOutcome, Responder, ResponseBuilder, ResponseEnvelope};
use crate::db::ConnectionProvider;
use crate::error::{DbError, DbResult};
use crate::transport::{Transport, wait_for_signal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

/// Inbound event. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvocationEvent {
    #[serde(rename = "httpMethod", default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl InvocationEvent {
    pub fn method(&self) -> &str {
        self.http_method.as_deref().unwrap_or("GET")
    }

    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }
}

/// Outbound proxy response; `body` carries the envelope body as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl From<ResponseEnvelope> for ProxyResponse {
    fn from(envelope: ResponseEnvelope) -> Self {
        Self {
            status_code: envelope.status_code(),
            headers: envelope.headers().clone(),
            body: envelope.into_body().to_string(),
        }
    }
}

/// Stdio transport implementation.
pub struct StdioTransport<P> {
    responder: Arc<Responder<P>>,
}

impl<P: ConnectionProvider> StdioTransport<P> {
    pub fn new(responder: Arc<Responder<P>>) -> Self {
        Self { responder }
    }

    /// Handle one raw event line.
    pub async fn handle_line(&self, line: &str) -> ProxyResponse {
        let envelope = match serde_json::from_str::<InvocationEvent>(line) {
            Ok(event) => self.responder.handle(event.method(), event.path()).await,
            Err(e) => {
                warn!(error = %e, "Malformed invocation event");
                ResponseBuilder::build(OperationOutcome::Failed(DbError::invalid_input(
                    format!("Malformed invocation event: {}", e),
                )))
            }
        };
        envelope.into()
    }

    /// Serve events from `reader` until end of input, writing responses to `writer`.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> DbResult<usize>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut handled = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DbError::internal(format!("Failed to read event: {}", e)))?
        {
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line).await;
            let mut out = serde_json::to_string(&response)
                .map_err(|e| DbError::internal(format!("Failed to encode response: {}", e)))?;
            out.push('\n');

            writer
                .write_all(out.as_bytes())
                .await
                .map_err(|e| DbError::internal(format!("Failed to write response: {}", e)))?;
            writer
                .flush()
                .await
                .map_err(|e| DbError::internal(format!("Failed to flush response: {}", e)))?;
            handled += 1;
        }

        Ok(handled)
    }
}

impl<P: ConnectionProvider> Transport for StdioTransport<P> {
    async fn run(&self) -> DbResult<()> {
        info!("Starting table checker with stdio transport");

        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();

        tokio::select! {
            result = self.serve(reader, writer) => {
                let handled = result?;
                info!(events = handled, "Stdio transport reached end of input");
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received");
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RequestRouter;
    use crate::db::{SchemaCatalog, TableIdent};
    use crate::models::ColumnDescriptor;
    use serde_json::{Value, json};

    /// Provider whose connection attempts always fail.
    struct Unreachable;

    struct NoCatalog;

    impl SchemaCatalog for NoCatalog {
        async fn list_tables(&mut self) -> DbResult<Vec<String>> {
            unreachable!("no connection is ever opened")
        }
        async fn fetch_columns(&mut self, _: &TableIdent) -> DbResult<Vec<ColumnDescriptor>> {
            unreachable!("no connection is ever opened")
        }
        async fn count_rows(&mut self, _: &TableIdent) -> DbResult<u64> {
            unreachable!("no connection is ever opened")
        }
        async fn close(self) {}
    }

    impl ConnectionProvider for Unreachable {
        type Connection = NoCatalog;

        async fn open(&self) -> DbResult<NoCatalog> {
            Err(DbError::connection("connection refused", "Check the host"))
        }
    }

    fn transport() -> StdioTransport<Unreachable> {
        StdioTransport::new(Arc::new(Responder::new(
            RequestRouter::default(),
            Unreachable,
        )))
    }

    fn body(response: &ProxyResponse) -> Value {
        serde_json::from_str(&response.body).unwrap()
    }

    #[test]
    fn test_event_defaults() {
        let event: InvocationEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event.method(), "GET");
        assert_eq!(event.path(), "/");

        let event: InvocationEvent = serde_json::from_str(
            r#"{"httpMethod": "POST", "path": "/prod/health", "headers": {"x": "y"}}"#,
        )
        .unwrap();
        assert_eq!(event.method(), "POST");
        assert_eq!(event.path(), "/prod/health");
    }

    #[test]
    fn test_proxy_response_wire_names() {
        let response: ProxyResponse = ResponseBuilder::build(OperationOutcome::Health).into();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["headers"]["Content-Type"], "application/json");
        assert!(value["body"].is_string());
    }

    #[tokio::test]
    async fn test_handle_line_routes_event() {
        let transport = transport();

        let response = transport
            .handle_line(r#"{"httpMethod": "GET", "path": "/health"}"#)
            .await;
        assert_eq!(response.status_code, 200);
        assert_eq!(body(&response)["status"], "healthy");

        let response = transport
            .handle_line(r#"{"httpMethod": "DELETE", "path": "/unknown"}"#)
            .await;
        assert_eq!(response.status_code, 404);
        assert_eq!(
            body(&response)["available_endpoints"],
            json!(["/tables", "/health"])
        );
    }

    #[tokio::test]
    async fn test_connection_failure_over_stdio() {
        let response = transport().handle_line(r#"{"path": "/prod/tables"}"#).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(body(&response), json!({"error": "Database connection failed"}));
    }

    #[tokio::test]
    async fn test_serve_continues_after_malformed_line() {
        let input = b"not json\n\n{\"path\": \"/health\"}\n" as &[u8];
        let mut output = Vec::new();

        let handled = transport().serve(input, &mut output).await.unwrap();
        assert_eq!(handled, 2);

        let lines: Vec<ProxyResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].status_code, 500);
        let first = body(&lines[0]);
        assert_eq!(first["error"], "Internal server error");
        assert!(
            first["message"]
                .as_str()
                .unwrap()
                .contains("Malformed invocation event")
        );

        assert_eq!(lines[1].status_code, 200);
    }

    #[test]
    fn test_stdio_transport_name() {
        assert_eq!(transport().name(), "stdio");
    }
}
