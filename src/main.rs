// Composition root.
//
// Responsibilities
// - Read config from the environment.
// - Build the runtime with the configured worker count.
// - Connect to MongoDB, configure indexes, wire services and serve.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use tidelog::adapters::mongo::MongoEventStore;
use tidelog::config::AppConfig;
use tidelog::core::ports::EventStore;
use tidelog::http::router::router;
use tidelog::http::state::AppState;

fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;
    runtime.block_on(serve(config))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store = MongoEventStore::connect(&config).await?;
    store.configure_indexes().await?;
    let store: Arc<dyn EventStore> = Arc::new(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(store, config));

    tracing::info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
