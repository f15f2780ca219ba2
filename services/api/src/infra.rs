use metrics_exporter_prometheus::PrometheusHandle;
use seat_allocation::config::AllocationConfig;
use seat_allocation::error::AppError;
use seat_allocation::workflows::allocation::AllocationWorkspace;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// The policy is read once at startup; uploads replace input files, not the policy.
pub(crate) fn load_workspace(config: &AllocationConfig) -> Result<Arc<AllocationWorkspace>, AppError> {
    let workspace = AllocationWorkspace::from_policy_path(&config.policy_path)?;
    let routes = &workspace.policy().routes;
    info!(
        policy = %config.policy_path.display(),
        offer = %routes.offer.display(),
        applications = %routes.applications.display(),
        results = %routes.results.display(),
        "allocation policy loaded"
    );
    Ok(Arc::new(workspace))
}
