//! Request handling entry point shared by every transport.

use crate::api::response::{OperationOutcome, ResponseBuilder, ResponseEnvelope};
use crate::api::router::{OperationTag, RequestRouter};
use crate::db::{ConnectionProvider, SchemaInspector};
use tracing::{error, info};

/// Routes a request, runs the operation and builds the envelope.
///
/// Each call is handled start to finish on its own connection; the responder
/// keeps no state between requests.
#[derive(Debug)]
pub struct Responder<P> {
    router: RequestRouter,
    provider: P,
}

impl<P: ConnectionProvider> Responder<P> {
    pub fn new(router: RequestRouter, provider: P) -> Self {
        Self { router, provider }
    }

    pub fn router(&self) -> &RequestRouter {
        &self.router
    }

    /// Handle one request. Never fails: errors come back as 500 envelopes.
    pub async fn handle(&self, method: &str, path: &str) -> ResponseEnvelope {
        let operation = self.router.route(method, path);
        info!(method, path, operation = %operation, "Routed request");

        let outcome = match operation {
            OperationTag::HealthCheck => OperationOutcome::Health,
            OperationTag::ListSchema => match SchemaInspector::read_schema(&self.provider).await {
                Ok(snapshot) => OperationOutcome::Schema(snapshot),
                Err(e) => {
                    error!(operation = %operation, error = %e, "Operation failed");
                    OperationOutcome::Failed(e)
                }
            },
            OperationTag::NotFound => OperationOutcome::NotFound,
        };

        let envelope = ResponseBuilder::build(outcome);
        info!(
            operation = %operation,
            status = envelope.status_code(),
            "Request completed"
        );
        envelope
    }
}
