use crate::cli::ServeArgs;
use crate::infra::{load_directory, AppState};
use crate::routes::with_desk_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use complaint_desk::config::AppConfig;
use complaint_desk::error::AppError;
use complaint_desk::telemetry;
use complaint_desk::workflows::complaints::{
    AgentDirectory, ComplaintService, ComplaintServiceError, InMemoryComplaintStore,
    InvoiceSequencer, Leaderboard,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let directory = Arc::new(load_directory(config.desk.agent_roster.as_deref())?);
    let roster_size = directory
        .roster()
        .map_err(ComplaintServiceError::from)?
        .len();
    if roster_size == 0 {
        warn!("agent directory is empty; set COMPLAINT_AGENT_ROSTER to accept transitions");
    }

    let store = Arc::new(InMemoryComplaintStore::default());
    let service = Arc::new(ComplaintService::new(
        store.clone(),
        directory.clone(),
        InvoiceSequencer::new(config.desk.invoice_prefix.clone()),
    ));
    let leaderboard = Arc::new(Leaderboard::new(store, directory));

    let app = with_desk_routes(service, leaderboard)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        roster_size,
        invoice_prefix = %config.desk.invoice_prefix,
        "complaint desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
