use std::io::ErrorKind;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::ports::AdmissionSource;
use super::workspace::{AllocationWorkspace, InputUpload};
use super::AllocationError;

/// Router exposing the offer, applicants, uploads, runs and result download.
pub fn allocation_router(workspace: Arc<AllocationWorkspace>) -> Router {
    Router::new()
        .route("/api/v1/allocation/offer", get(offer_handler))
        .route("/api/v1/allocation/applicants", get(applicants_handler))
        .route("/api/v1/allocation/inputs", post(inputs_handler))
        .route("/api/v1/allocation/run", post(run_handler))
        .route("/api/v1/allocation/results", get(results_handler))
        .with_state(workspace)
}

pub(crate) async fn offer_handler(State(workspace): State<Arc<AllocationWorkspace>>) -> Response {
    match workspace.source().load_programs() {
        Ok(programs) => (
            StatusCode::OK,
            axum::Json(json!({
                "count": programs.len(),
                "programs": programs,
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn applicants_handler(
    State(workspace): State<Arc<AllocationWorkspace>>,
) -> Response {
    match workspace.source().load() {
        Ok(snapshot) => (
            StatusCode::OK,
            axum::Json(json!({
                "count": snapshot.applicants.len(),
                "applicants": snapshot.applicants,
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn inputs_handler(
    State(workspace): State<Arc<AllocationWorkspace>>,
    axum::Json(upload): axum::Json<InputUpload>,
) -> Response {
    if upload.offer_csv.is_none() && upload.applications_csv.is_none() {
        let payload = json!({
            "error": "provide offer_csv, applications_csv or both",
        });
        return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
    }

    // Uploads wait on the run lock, so keep them off the async workers.
    match tokio::task::spawn_blocking(move || workspace.save_inputs(&upload)).await {
        Ok(Ok(saved)) => {
            let saved: Vec<String> = saved
                .iter()
                .map(|path| path.display().to_string())
                .collect();
            (StatusCode::OK, axum::Json(json!({ "saved": saved }))).into_response()
        }
        Ok(Err(err)) => error_response(err),
        Err(join_error) => task_failure(join_error, "input upload task failed"),
    }
}

pub(crate) async fn run_handler(State(workspace): State<Arc<AllocationWorkspace>>) -> Response {
    match tokio::task::spawn_blocking(move || workspace.run()).await {
        Ok(Ok(report)) => {
            let payload = json!({
                "applicants": report.applicants,
                "programs": report.programs,
                "assigned": report.assigned,
                "unassigned": report.unassigned,
                "incidents": report.incident_messages(),
                "output": report.output,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Ok(Err(err)) => error_response(err),
        Err(join_error) => task_failure(join_error, "allocation task failed"),
    }
}

pub(crate) async fn results_handler(State(workspace): State<Arc<AllocationWorkspace>>) -> Response {
    let path = workspace.results_path();
    match tokio::fs::read(path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            let payload = json!({
                "error": "no allocation results yet; run the allocation first",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(source) => error_response(AllocationError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn task_failure(join_error: tokio::task::JoinError, message: &'static str) -> Response {
    error!(%join_error, "{}", message);
    let payload = json!({
        "error": message,
    });
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
}

fn error_response(err: AllocationError) -> Response {
    let status = if err.is_data_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    if status.is_server_error() {
        error!(error = %err, "allocation request failed");
    }

    let payload = json!({
        "error": err.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
