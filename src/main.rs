use anyhow::Result;
use clap::Parser;
use podium::analysis::HttpAnalysisEngine;
use podium::{AppState, Config, SessionService, Store, ViewerRegistry};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "podium", about = "Presentation practice coaching service")]
struct Args {
    /// Path to the configuration file (without extension).
    #[arg(long, default_value = "config/podium")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("podium=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("database at {}", cfg.database.path);
    info!("analysis engine at {}", cfg.analysis.endpoint_url);

    let store = Arc::new(Store::open(&cfg.database.path)?);
    let engine = Arc::new(HttpAnalysisEngine::new(&cfg.analysis)?);
    let service = Arc::new(SessionService::new(
        store,
        engine,
        cfg.analysis.estimated_completion_secs,
    ));
    let registry = Arc::new(ViewerRegistry::new());

    let ws_base = format!("ws://{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let app = podium::create_router(AppState::new(service, registry, ws_base));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
