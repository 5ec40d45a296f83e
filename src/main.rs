use clap::Parser;
use color_eyre::eyre::Result;
use item_service::app::{build_backends, build_state, report_server_error, Args, SHUTDOWN_GRACE};
use item_service::cors::{build_cors_layer, normalize_origins};
use item_service::environment;
use item_service::http_logging::HttpLoggingLayer;
use item_service::logging::{default_log_dir, init_logging, parse_rotation, LogConfig, LOG_FILENAME};
use item_service::server::build_router;
use item_service::user_config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Install color-eyre error hooks for colored error output
    color_eyre::install()?;

    // Parse CLI arguments first (before logging, so we can use log config)
    let args = Args::parse();

    let log_dir = args.log_dir.clone().unwrap_or_else(default_log_dir);
    let log_file = log_dir.join(LOG_FILENAME);

    let log_config = LogConfig {
        log_dir,
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        ..Default::default()
    };

    if let Err(e) = init_logging(log_config) {
        eprintln!();
        eprintln!("Error: Failed to initialize logging: {e}");
        eprintln!();
        eprintln!("Logs: {}", log_file.display());
        eprintln!();
        return Err(e);
    }

    // Load user-level config (~/.item-service/config.toml); file is optional.
    let settings = user_config::service_settings_or_default(&user_config::user_config_path());

    let project_id = environment::project_id();
    let data_dir = args.data_dir();
    info!(
        production = environment::is_prod(),
        project_id = %project_id,
        storage = ?args.storage,
        data_dir = %data_dir.display(),
        "Configuring backends"
    );

    let backends = build_backends(args.storage, &data_dir);
    let state = build_state(
        &backends,
        settings,
        &project_id,
        args.task_target.as_deref(),
    );

    let cors_origins = normalize_origins(&args.cors_origins);
    info!("CORS origins: {}", cors_origins.join(", "));

    let service = Arc::clone(&state.service);
    let app = build_router(state)
        .layer(HttpLoggingLayer)
        .layer(build_cors_layer(cors_origins));

    let addr = args.bind_addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            report_server_error(&addr, &log_file, &e);
            return Err(e.into());
        }
    };

    info!("Starting item service on {}", addr);

    let server_result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {e}");
                std::future::pending::<()>().await;
            }
            info!("Received shutdown signal, stopping server...");
        })
        .await;

    let abandoned = service.queue().drain(SHUTDOWN_GRACE).await;
    if abandoned > 0 {
        warn!(abandoned, "Abandoned pending tasks on shutdown");
    }

    if let Err(e) = server_result {
        report_server_error(&addr, &log_file, &e);
        return Err(e.into());
    }

    info!("Item service stopped");
    Ok(())
}
