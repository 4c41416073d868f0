//! Request/response layer.
//!
//! - Router: method/path to [`OperationTag`]
//! - Response: outcomes to [`ResponseEnvelope`]
//! - Responder: the two glued around the schema inspector

pub mod responder;
pub mod response;
pub mod router;

pub use responder::Responder;
pub use response::{
    EnvelopeStatus, HEALTH_MESSAGE, OperationOutcome, ResponseBuilder, ResponseEnvelope,
};
pub use router::{AVAILABLE_ENDPOINTS, DEFAULT_STAGE, OperationTag, RequestRouter};
