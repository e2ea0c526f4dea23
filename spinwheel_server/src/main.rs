use std::sync::Arc;

use spinwheel_core::GameConfig;
use spinwheel_server::{router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // math sheet is validated before the listener opens
    let config = match std::env::var("MATH_SHEET") {
        Ok(path) => {
            info!(%path, "loading math sheet");
            GameConfig::from_path(&path)?
        }
        Err(_) => GameConfig::reference(),
    };

    let state = Arc::new(AppState::new(
        config,
        std::env::var("API_KEY").unwrap_or_else(|_| "dev-key".into()),
    ));

    let idle_secs: i64 = match std::env::var("SESSION_IDLE_SECS") {
        Ok(raw) => raw.parse()?,
        Err(_) => 30 * 60,
    };
    let sweeper = state.clone();
    tokio::spawn(async move {
        let max_idle = chrono::Duration::seconds(idle_secs);
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            tick.tick().await;
            let evicted = sweeper.store.evict_idle(max_idle).await;
            if evicted > 0 {
                info!(evicted, "idle sessions evicted");
            }
        }
    });

    let app = router(state);

    let addr = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
