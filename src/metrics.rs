use std::time::Instant;
use tracing::info;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs how long a service operation took when dropped.
///
/// # Example
///
/// ```ignore
/// pub async fn create_item(&self, request: ItemCreate) -> Result<ItemDetail, ServiceError> {
///     let _timer = OperationTimer::new("create_item");
///     // ...
/// }
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
}

impl OperationTimer {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        info!(
            operation = %self.name,
            duration_ms = %self.elapsed_ms(),
            "Operation completed"
        );
    }
}

/// Generate a short request id for log correlation.
#[must_use]
pub fn generate_request_id() -> String {
    let uuid_str = uuid::Uuid::new_v4().simple().to_string();
    uuid_str.get(..8).unwrap_or(&uuid_str).to_string()
}
