use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use research_relay::application::ports::Clock;
use research_relay::application::services::JobManager;
use research_relay::infrastructure::clock::SystemClock;
use research_relay::infrastructure::llm::create_research_provider;
use research_relay::infrastructure::observability::{TracingConfig, init_tracing};
use research_relay::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("Failed to load configuration")?;

    init_tracing(&TracingConfig::from_settings(
        environment.as_str(),
        &settings.logging,
    ))?;

    let provider = Arc::new(
        create_research_provider(&settings.provider)
            .context("Failed to configure research provider")?,
    );
    tracing::info!(
        provider = %settings.provider.name,
        model = %settings.provider.model,
        "Research provider configured"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let (state, worker) = AppState::build(provider, settings.clone(), clock);

    tokio::spawn(worker.run());
    tokio::spawn(sweep_expired_jobs(
        Arc::clone(&state.job_manager),
        settings.jobs.retention(),
        Duration::from_secs(settings.jobs.sweep_interval_secs.max(1)),
    ));

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Invalid server address")?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn sweep_expired_jobs(
    job_manager: Arc<JobManager>,
    retention: chrono::TimeDelta,
    every: Duration,
) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        if let Err(e) = job_manager.evict_expired(retention).await {
            tracing::warn!(error = %e, "Job retention sweep failed");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
