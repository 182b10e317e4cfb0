use crate::cli::ServeArgs;
use crate::infra::build_check_service;
use crate::routes::with_check_routes;
use compliance_portal::config::AppConfig;
use compliance_portal::error::AppError;
use compliance_portal::telemetry;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let service = Arc::new(build_check_service(&config).await?);
    let app = with_check_routes(service.clone(), config.intake.upload_limit_bytes);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        %addr,
        actor = %service.actor(),
        "compliance portal ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("compliance portal stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
