//! ksc-server - Kappa Score Collector
//!
//! Survey-collection backend for expert ratings on translated psychometric
//! scales (Face-Validity and single-round Delphi studies), with on-demand
//! inter-rater agreement and content-validity statistics.

use anyhow::Result;
use clap::Parser;
use ksc_common::api::auth::load_shared_secret;
use ksc_common::config::{resolve_port, RootFolderInitializer, RootFolderResolver};
use ksc_common::db::init_database;
use ksc_server::{build_router, AppState};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "ksc-server", about = "Kappa Score Collector survey backend")]
struct Args {
    /// Root folder holding the database (overrides KSC_ROOT and config file)
    #[arg(long)]
    root_folder: Option<String>,

    /// HTTP listen port (overrides KSC_PORT and config file)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting Kappa Score Collector (ksc-server) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();

    let resolver = RootFolderResolver::new("ksc-server");
    let root_folder = resolver.resolve(args.root_folder.as_deref());

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path).await?;

    // First startup generates and stores the secret; 0 disables auth
    let shared_secret = load_shared_secret(&pool).await?;
    if shared_secret == 0 {
        info!("API authentication disabled (shared_secret = 0)");
    } else {
        info!("✓ Loaded shared secret for API authentication");
    }

    let state = AppState::new(pool, shared_secret);
    let app = build_router(state);

    let port = resolve_port(args.port);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("ksc-server listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
