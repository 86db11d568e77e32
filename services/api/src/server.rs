use crate::cli::ServeArgs;
use crate::infra::{apply_model_overrides, cors_layer, load_service, AppState};
use crate::routes::with_scoring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lendwise::config::AppConfig;
use lendwise::error::AppError;
use lendwise::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    apply_model_overrides(&mut config, args.model)?;

    telemetry::init(&config.telemetry)?;

    // A missing or malformed artifact stops startup before the port is bound.
    let service = Arc::new(load_service(&config)?);
    let cors = cors_layer(&config.cors)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_scoring_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(cors);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit risk api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
