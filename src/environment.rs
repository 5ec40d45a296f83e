//! Deployment environment detection.

/// Project id used when `GOOGLE_CLOUD_PROJECT` is unset.
pub const LOCAL_PROJECT_ID: &str = "local";

/// True when running in the standard hosted environment.
#[must_use]
pub fn is_prod() -> bool {
    is_prod_value(std::env::var("GAE_ENV").ok().as_deref())
}

/// The cloud project id, or [`LOCAL_PROJECT_ID`].
#[must_use]
pub fn project_id() -> String {
    project_id_value(std::env::var("GOOGLE_CLOUD_PROJECT").ok())
}

fn is_prod_value(gae_env: Option<&str>) -> bool {
    gae_env == Some("standard")
}

fn project_id_value(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| LOCAL_PROJECT_ID.to_string())
}
