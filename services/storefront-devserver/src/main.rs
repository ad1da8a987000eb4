use storefront_devserver::{AppState, ServerConfig, router};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::from_env()?;
    let app = router(AppState::default(), &config.static_dir);

    info!(
        "storefront-devserver listening on {} (bundle from {})",
        config.bind,
        config.static_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}
