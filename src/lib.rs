pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use crate::core::{bootstrap, config::Settings, metrics, shutdown, state::AppState, telemetry};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    metrics::init(&settings)?;

    let pool = db::init_pool(&settings).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::new(settings, pool);

    if let Err(err) = bootstrap::ensure_first_admin(&state).await {
        tracing::error!(error = %err, "Failed to ensure bootstrap admin");
    }

    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;
    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Coursedesk API listening"
    );

    let app = api::router::router(state);
    axum::serve(listener, app).with_graceful_shutdown(shutdown::shutdown_signal()).await?;

    Ok(())
}
