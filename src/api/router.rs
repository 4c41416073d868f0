//! Request routing.
//!
//! Maps a method/path pair onto a closed set of operations. Routing is
//! total: every input yields exactly one [`OperationTag`].

/// Endpoints advertised in health and not-found responses.
pub const AVAILABLE_ENDPOINTS: [&str; 2] = ["/tables", "/health"];

pub const DEFAULT_STAGE: &str = "prod";

/// Operations the responder knows how to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationTag {
    HealthCheck,
    ListSchema,
    NotFound,
}

impl OperationTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HealthCheck => "health_check",
            Self::ListSchema => "list_schema",
            Self::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for OperationTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path router with an optional deployment-stage prefix.
///
/// With stage `prod`, both `/tables` and `/prod/tables` route to
/// [`OperationTag::ListSchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRouter {
    stage: Option<String>,
}

impl RequestRouter {
    /// Create a router. Surrounding slashes are stripped from `stage`; an
    /// empty stage disables prefix matching.
    pub fn new(stage: Option<&str>) -> Self {
        let stage = stage
            .map(|s| s.trim().trim_matches('/').to_string())
            .filter(|s| !s.is_empty());
        Self { stage }
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    /// Route a request. The method is accepted but does not affect the result.
    pub fn route(&self, _method: &str, path: &str) -> OperationTag {
        match self.strip_stage(path) {
            "/health" => OperationTag::HealthCheck,
            "/tables" => OperationTag::ListSchema,
            _ => OperationTag::NotFound,
        }
    }

    fn strip_stage<'a>(&self, path: &'a str) -> &'a str {
        let Some(stage) = self.stage.as_deref() else {
            return path;
        };
        match path
            .strip_prefix('/')
            .and_then(|rest| rest.strip_prefix(stage))
        {
            Some(rest) if rest.starts_with('/') => rest,
            _ => path,
        }
    }
}

impl Default for RequestRouter {
    fn default() -> Self {
        Self::new(Some(DEFAULT_STAGE))
    }
}
