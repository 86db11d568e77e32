use crate::cli::ModelArgs;
use axum::http::HeaderValue;
use lendwise::config::{AppConfig, ConfigError, CorsConfig};
use lendwise::error::AppError;
use lendwise::scoring::{ArtifactPredictor, CreditScoringService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};
use tracing::info;

pub(crate) type ArtifactService = CreditScoringService<ArtifactPredictor>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Applies command-line model overrides on top of the environment configuration.
pub(crate) fn apply_model_overrides(
    config: &mut AppConfig,
    overrides: ModelArgs,
) -> Result<(), ConfigError> {
    if let Some(path) = overrides.model {
        config.model.artifact_path = path;
    }
    if let Some(threshold) = overrides.accept_threshold {
        config.scoring.accept_threshold = threshold;
    }
    config.scoring.policy()?;
    Ok(())
}

/// Loads the predictor artifact and wraps it in a scoring service.
pub(crate) fn load_service(config: &AppConfig) -> Result<ArtifactService, AppError> {
    let policy = config.scoring.policy()?;
    let predictor = ArtifactPredictor::load(&config.model.artifact_path)?;
    info!(
        path = %predictor.source().display(),
        kind = predictor.artifact().kind(),
        "predictor artifact loaded"
    );
    Ok(CreditScoringService::new(Arc::new(predictor), policy))
}

pub(crate) fn cors_layer(config: &CorsConfig) -> Result<CorsLayer, ConfigError> {
    if config.allows_any() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| ConfigError::InvalidOrigin {
                origin: origin.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}
