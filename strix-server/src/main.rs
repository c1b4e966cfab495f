//! # Strix Server
//!
//! Reconnaissance scan service.
//!
//! ## Overview
//!
//! Strix accepts scan jobs for a target domain and runs each job through a
//! fixed six-stage pipeline of external scanning tools (subdomain
//! enumeration, live-host probing, vulnerability scanning, crawling, XSS
//! candidate discovery and XSS testing), persisting progress and per-stage
//! results after every transition so clients can poll the job record.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for persistent storage
//! - tokio tasks for background scan execution
//! - ProjectDiscovery tooling (and friends) as external stage binaries

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::http::HeaderValue;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use strix_core::database::{
    PostgresScanJobStore, PostgresUserStore, ScanJobStore, UserStore,
};
use strix_core::scan::ScanWorkflow;
use strix_server::{
    db::validate_database_url,
    infra::{
        app_state::AppState,
        config::{ConfigLoader, CorsConfig, DEFAULT_JWT_SECRET},
    },
    routes,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "strix-server")]
#[command(about = "Reconnaissance scan service with a multi-stage external-tool pipeline")]
struct Cli {
    /// Path to the configuration file (TOML)
    #[arg(long, env = "STRIX_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("using the built-in JWT secret; set STRIX_JWT_SECRET before exposing this server");
    }

    let database_url = config
        .database
        .url
        .clone()
        .context("database URL not configured; set [database].url or DATABASE_URL")?;
    validate_database_url(&database_url)?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let users: Arc<dyn UserStore> = Arc::new(PostgresUserStore::new(pool.clone()));
    let jobs: Arc<dyn ScanJobStore> = Arc::new(PostgresScanJobStore::new(pool));
    let workflow = Arc::new(ScanWorkflow::new(jobs.clone(), config.scanner.clone()));

    let config = Arc::new(config);
    let state = AppState::new(config.clone(), users, jobs, workflow);

    let router = routes::create_api_router(state)
        .layer(build_cors_layer(&config.cors)?)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("strix-server listening on {addr}");

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}

fn build_cors_layer(cors: &CorsConfig) -> anyhow::Result<CorsLayer> {
    if cors.allowed_origins.is_empty() {
        // Development default, mirrors an unconfigured deployment.
        return Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(AllowMethods::any())
            .allow_headers(AllowHeaders::any()));
    }

    let origins = cors
        .allowed_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .context("invalid CORS origin")?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::any())
        .allow_headers(AllowHeaders::any()))
}
