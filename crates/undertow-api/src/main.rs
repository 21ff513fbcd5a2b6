use anyhow::Context;
use std::fs;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use undertow_api::{routes, AppConfig, AppState};

fn init_tracing(log_dir: Option<&str>) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create log directory {dir}"))?;
            let file = fs::File::options()
                .create(true)
                .append(true)
                .open(format!("{dir}/server.log"))
                .context("failed to open server.log")?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();
    init_tracing(config.log_dir.as_deref())?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::from_config(config).await?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "undertow listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}
