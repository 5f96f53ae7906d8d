use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use gist_search::{
    api::routes::create_router,
    cache,
    config::Config,
    search::SearchPipeline,
    upstream::HttpUpstream,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gist_search=info,tower_http=info")),
        )
        .init();

    let config = Config::load()?;
    let server_addr = config.server_addr;

    let upstream = Arc::new(HttpUpstream::new()?);
    let cache = cache::from_config(&config).await?;

    let pipeline = SearchPipeline::new(upstream, cache, &config);
    let app_state = AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
    };

    let app = create_router(app_state);
    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
