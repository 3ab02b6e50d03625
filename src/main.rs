use std::net::SocketAddr;
use std::sync::Arc;
use whalewatch::{api, config::Config, ChainSource, SolanaRpcSource};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    // Missing or invalid configuration is fatal before any scan
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;
    let source: Arc<dyn ChainSource> = Arc::new(SolanaRpcSource::new(config.rpc_endpoint.clone()));

    tracing::info!(
        watched = %config.watched_address,
        rpc = %config.rpc_endpoint,
        concurrency = config.fetch.concurrency,
        "Watching wallet"
    );

    let app = api::create_router(api::AppState::new(config, source));

    // Bind to address
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
