use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryReportRepository, InMemoryUploadRepository};
use crate::routes::with_readiness_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gets_readiness::analysis::ReadinessAnalyzer;
use gets_readiness::config::AppConfig;
use gets_readiness::error::AppError;
use gets_readiness::readiness::ReadinessService;
use gets_readiness::telemetry;
use std::sync::atomic::Ordering;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let uploads = Arc::new(InMemoryUploadRepository::default());
    let reports = Arc::new(InMemoryReportRepository::default());
    let readiness_service = Arc::new(ReadinessService::new(
        uploads,
        reports,
        ReadinessAnalyzer::default(),
        config.storage.clone(),
    ));

    let app = with_readiness_routes(readiness_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_upload_bytes = config.storage.max_upload_bytes,
        "readiness analyzer ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
