use std::sync::Arc;

use anyhow::Context;

use reservo_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    reservo_observability::init();

    let config = ApiConfig::from_env();

    let services = reservo_api::app::services::build_services(&config)
        .await
        .context("failed to load seed bookings")?;
    let app = reservo_api::app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
