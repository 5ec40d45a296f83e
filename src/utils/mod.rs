mod atomic;

pub use atomic::atomic_write;

/// Name of the per-user directory holding config, data and logs.
pub const SERVICE_FOLDER: &str = ".item-service";

/// Get the per-user service directory (`~/.item-service`).
///
/// If `ITEM_SERVICE_HOME` is set, that directory is used instead, so tests
/// and CI can run without touching the real home directory.
#[must_use]
pub fn service_home() -> std::path::PathBuf {
    if let Ok(home) = std::env::var("ITEM_SERVICE_HOME") {
        return std::path::PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(SERVICE_FOLDER)
}

/// Check that a bucket, object, collection or document name is usable as a
/// single path segment.
#[must_use]
pub fn is_safe_segment(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}
