use crate::mirror::{DocumentMirror, FileMirror, InMemoryMirror};
use crate::server::AppState;
use crate::services::{register_jobs, ItemService, ServiceSettings};
use crate::storage::{FsObjectStore, InMemoryObjectStore, ObjectStore};
use crate::store::{EntityStore, FileEntityStore, InMemoryEntityStore};
use crate::tasks::{HttpDelivery, LocalDelivery, TaskDelivery, TaskQueue, TaskRegistry};
use crate::utils::service_home;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_PORT: &str = "8080";

/// How long shutdown waits for scheduled tasks before abandoning them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

/// Item Service - item CRUD backend with a real-time mirror and CSV exports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the server to (default: 0.0.0.0:$PORT, PORT defaults to 8080)
    #[arg(short, long, env = "ITEM_SERVICE_ADDR")]
    pub addr: Option<String>,
    /// Directory holding the file-backed stores (default: ~/.item-service/data)
    #[arg(long, env = "ITEM_SERVICE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    /// Storage backend for items, mirror documents and buckets
    #[arg(long, env = "ITEM_SERVICE_STORAGE", value_enum, default_value_t = StorageKind::File)]
    pub storage: StorageKind,
    /// Base URL tasks are POSTed to. Tasks run in-process when unset.
    #[arg(long, env = "ITEM_SERVICE_TASK_TARGET")]
    pub task_target: Option<String>,
    /// Comma-separated list of allowed CORS origins.
    /// Use "*" to allow all origins (not recommended for production).
    #[arg(
        long,
        env = "ITEM_SERVICE_CORS_ORIGINS",
        default_value = crate::cors::DEFAULT_CORS_ORIGINS,
        value_delimiter = ','
    )]
    pub cors_origins: Vec<String>,
    /// Enable JSON log format (for production/log aggregation)
    #[arg(long, env = "ITEM_SERVICE_LOG_JSON", default_value = "false")]
    pub log_json: bool,
    /// Log rotation period: daily, hourly, or never
    #[arg(long, env = "ITEM_SERVICE_LOG_ROTATION", default_value = "daily")]
    pub log_rotation: String,
    /// Custom log directory (default: ~/.item-service/logs)
    #[arg(long, env = "ITEM_SERVICE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Args {
    /// The bind address, falling back to `0.0.0.0:$PORT`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        self.addr
            .clone()
            .unwrap_or_else(|| default_addr(std::env::var("PORT").ok().as_deref()))
    }

    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| service_home().join("data"))
    }
}

#[must_use]
pub fn default_addr(port: Option<&str>) -> String {
    format!("0.0.0.0:{}", port.unwrap_or(DEFAULT_PORT))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageKind {
    /// JSON files under the data directory
    File,
    /// Process memory, lost on exit
    Memory,
}

/// The three storage backends behind the service.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn EntityStore>,
    pub mirror: Arc<dyn DocumentMirror>,
    pub objects: Arc<dyn ObjectStore>,
}

impl Backends {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryEntityStore::new()),
            mirror: Arc::new(InMemoryMirror::new()),
            objects: Arc::new(InMemoryObjectStore::new()),
        }
    }

    /// Items in `data_dir`, mirror documents in `data_dir/mirror`, buckets
    /// in `data_dir/buckets`.
    #[must_use]
    pub fn on_disk(data_dir: &Path) -> Self {
        Self {
            store: Arc::new(FileEntityStore::new(data_dir)),
            mirror: Arc::new(FileMirror::new(&data_dir.join("mirror"))),
            objects: Arc::new(FsObjectStore::new(&data_dir.join("buckets"))),
        }
    }
}

#[must_use]
pub fn build_backends(kind: StorageKind, data_dir: &Path) -> Backends {
    match kind {
        StorageKind::File => Backends::on_disk(data_dir),
        StorageKind::Memory => Backends::in_memory(),
    }
}

/// Wire the job registry, task queue and service into handler state.
///
/// Without a `task_target` tasks are executed in-process against the same
/// registry the HTTP task endpoint uses.
#[must_use]
pub fn build_state(
    backends: &Backends,
    settings: ServiceSettings,
    project_id: &str,
    task_target: Option<&str>,
) -> AppState {
    let mut registry = TaskRegistry::new();
    register_jobs(
        &mut registry,
        &backends.store,
        &backends.mirror,
        &backends.objects,
    );
    let registry = Arc::new(registry);

    let delivery: Arc<dyn TaskDelivery> = match task_target {
        Some(url) => Arc::new(HttpDelivery::new(url)),
        None => Arc::new(LocalDelivery::new(Arc::clone(&registry))),
    };
    let queue = Arc::new(TaskQueue::new(project_id, delivery));
    let service = ItemService::new(
        Arc::clone(&backends.store),
        Arc::clone(&backends.objects),
        queue,
        settings,
    );
    AppState::new(Arc::new(service), registry)
}

pub fn report_server_error(addr: &str, log_file: &Path, e: &std::io::Error) {
    if e.kind() == std::io::ErrorKind::AddrInUse {
        eprintln!();
        eprintln!("Error: Failed to start server - address {addr} is already in use");
        eprintln!();
        eprintln!("Another instance of item-service may already be running.");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  1. Kill the existing process:   pkill item-service");
        eprintln!("  2. Use a different port:        item-service --addr 0.0.0.0:8081");
        eprintln!();
        eprintln!("Logs: {}", log_file.display());
        eprintln!();
        return;
    }
    eprintln!();
    eprintln!("Error: Failed to start server: {e}");
    eprintln!();
    eprintln!("Logs: {}", log_file.display());
    eprintln!();
}
