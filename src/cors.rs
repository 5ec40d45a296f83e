use http::Method;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost,https://localhost,http://127.0.0.1,https://127.0.0.1";

/// Trim entries and drop empty ones.
#[must_use]
pub fn normalize_origins(origins: &[String]) -> Vec<String> {
    origins
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Whether `origin` is allowed by the configured list.
///
/// An entry matches the origin exactly or with any port, so
/// `http://localhost` admits `http://localhost:3000` but not
/// `http://localhost.example.com`. A `*` entry allows every origin.
#[must_use]
pub fn origin_allowed(cors_origins: &[String], origin: &str) -> bool {
    cors_origins.iter().any(|allowed| {
        allowed == "*"
            || origin
                .strip_prefix(allowed.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
    })
}

/// Build a CORS layer for the HTTP API with the given allowed origins.
pub fn build_cors_layer(cors_origins: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin
                .to_str()
                .is_ok_and(|origin_str| origin_allowed(&cors_origins, origin_str))
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(Any)
}
