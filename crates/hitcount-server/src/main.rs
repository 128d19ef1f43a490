use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use hitcount_server::{config::Config, state::AppState};

/// `hitcount health` — liveness check for container health checks.
///
/// Calls `GET http://localhost:$HITCOUNT_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("HITCOUNT_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }
    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hitcount=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Ensure data directory exists before opening DuckDB.
    std::fs::create_dir_all(&cfg.data_dir)?;
    let db = hitcount_duckdb::DuckDbBackend::open(&cfg.db_path(), &cfg.duckdb_memory_limit)?;

    info!(counting_mode = ?cfg.counting_mode, "Stats store ready");
    if cfg.public_url.is_none() {
        info!("HITCOUNT_PUBLIC_URL not set; track.js will post back to its own origin");
    }

    let state = Arc::new(AppState::new(db, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = hitcount_server::app::build_app(state);

    info!(port = cfg.port, "hitcount listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move {
        tokio::signal::ctrl_c().await.ok();
    })
    .await?;

    info!("hitcount stopped");
    Ok(())
}
