use blog::{init_db, init_logging, make_router, run_app, AppConfig, AppState, Result};

async fn start() -> Result<()> {
    let config = AppConfig::from_env()?;
    let address = config.socket_addr()?;
    let pool = init_db(&config.database_url).await?;
    let state = AppState {
        pool,
        media_url: config.media_url,
    };
    run_app(make_router(), address, state).await
}

#[tokio::main]
async fn main() {
    init_logging();
    match start().await {
        Ok(_) => (),
        Err(error) => tracing::error!("Error: {:#}", error),
    }
}
