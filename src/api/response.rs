//! Response envelopes.
//!
//! Every operation result, success or failure, is turned into the same
//! `{status_code, headers, body}` shape here.

use crate::api::router::AVAILABLE_ENDPOINTS;
use crate::error::DbError;
use crate::models::{ColumnDescriptor, SchemaSnapshot};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const HEALTH_MESSAGE: &str = "Table checker is running";

/// The closed set of status codes an envelope can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStatus {
    Ok,
    NotFound,
    InternalServerError,
}

impl EnvelopeStatus {
    pub fn code(&self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::NotFound => 404,
            Self::InternalServerError => 500,
        }
    }
}

/// Uniform wrapper returned to every caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    status: EnvelopeStatus,
    headers: BTreeMap<String, String>,
    body: Value,
}

impl ResponseEnvelope {
    fn new(status: EnvelopeStatus, body: Value) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        ]);
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> EnvelopeStatus {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Result of executing one routed operation.
#[derive(Debug)]
pub enum OperationOutcome {
    Health,
    Schema(SchemaSnapshot),
    NotFound,
    Failed(DbError),
}

#[derive(Serialize)]
struct ListSchemaBody<'a> {
    status: &'static str,
    message: String,
    tables: Vec<&'a str>,
    table_details: BTreeMap<&'a str, TableDetail<'a>>,
    total_tables: usize,
}

#[derive(Serialize)]
struct TableDetail<'a> {
    columns: &'a [ColumnDescriptor],
    row_count: u64,
}

/// Converts operation outcomes into envelopes.
pub struct ResponseBuilder;

impl ResponseBuilder {
    pub fn build(outcome: OperationOutcome) -> ResponseEnvelope {
        match outcome {
            OperationOutcome::Health => Self::health(),
            OperationOutcome::Schema(snapshot) => Self::schema(&snapshot),
            OperationOutcome::NotFound => Self::not_found(),
            OperationOutcome::Failed(err) => Self::failure(&err),
        }
    }

    fn health() -> ResponseEnvelope {
        ResponseEnvelope::new(
            EnvelopeStatus::Ok,
            json!({
                "status": "healthy",
                "message": HEALTH_MESSAGE,
                "endpoints": AVAILABLE_ENDPOINTS,
            }),
        )
    }

    fn schema(snapshot: &SchemaSnapshot) -> ResponseEnvelope {
        let total = snapshot.total_tables();
        let body = ListSchemaBody {
            status: "success",
            message: format!("Found {} tables in database", total),
            tables: snapshot.table_names().collect(),
            table_details: snapshot
                .tables()
                .iter()
                .map(|t| {
                    (
                        t.name.as_str(),
                        TableDetail {
                            columns: &t.columns,
                            row_count: t.row_count,
                        },
                    )
                })
                .collect(),
            total_tables: total,
        };

        match serde_json::to_value(&body) {
            Ok(value) => ResponseEnvelope::new(EnvelopeStatus::Ok, value),
            Err(e) => Self::internal_error(&format!("Failed to serialize schema: {}", e)),
        }
    }

    fn not_found() -> ResponseEnvelope {
        ResponseEnvelope::new(
            EnvelopeStatus::NotFound,
            json!({
                "error": "Not found",
                "available_endpoints": AVAILABLE_ENDPOINTS,
            }),
        )
    }

    fn failure(err: &DbError) -> ResponseEnvelope {
        if err.is_connectivity() {
            // Connection details stay in the logs
            ResponseEnvelope::new(
                EnvelopeStatus::InternalServerError,
                json!({ "error": "Database connection failed" }),
            )
        } else {
            Self::internal_error(&err.to_string())
        }
    }

    fn internal_error(message: &str) -> ResponseEnvelope {
        ResponseEnvelope::new(
            EnvelopeStatus::InternalServerError,
            json!({
                "error": "Internal server error",
                "message": message,
            }),
        )
    }
}
