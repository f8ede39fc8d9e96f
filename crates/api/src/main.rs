use anyhow::Context;

use catalog_export_api::config::ApiConfig;
use catalog_export_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_format = std::env::var("EXPORT_LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse::<LogFormat>().ok())
        .unwrap_or_default();
    catalog_export_observability::init_with(log_format, "info");

    let config = ApiConfig::from_env().context("invalid configuration")?;
    let app = catalog_export_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        page_size = config.page_size.get(),
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
