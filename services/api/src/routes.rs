use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use seat_allocation::workflows::allocation::{allocation_router, AllocationWorkspace};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_allocation_routes(workspace: Arc<AllocationWorkspace>) -> axum::Router {
    allocation_router(workspace)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use seat_allocation::workflows::allocation::PolicyDocument;
    use serde_json::Value;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    const OFFER: &str = "OFA_ID,NOMBRE_CARRERA,OFERTA_POLITICA_CUOTAS,OFERTA_GENERAL\n\
P1,Medicina,0,1\n\
P2,Derecho,0,1\n";

    const APPLICATIONS: &str =
        "IDENTIFICACION,OFA_ID,PRIORIDAD,PUNTAJE_ANTECEDENTES,PUNTAJE_EVALUACION,PUEBLO_NACIONALIDAD\n\
A-1,P1,1,90,90,NO\n\
B-2,P1,1,80,80,NO\n\
B-2,P2,2,80,80,NO\n";

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "seat-allocation-api-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn workspace(dir: &Path) -> Arc<AllocationWorkspace> {
        let document = json!({
            "rutas_archivos": {
                "oferta_academica": dir.join("oferta.csv"),
                "matriz_postulaciones": dir.join("postulaciones.csv"),
                "resultados_asignacion": dir.join("out").join("resultados.csv"),
            },
            "mapeo_columnas": {
                "oferta": { "id_carrera": "OFA_ID", "nombre_carrera": "NOMBRE_CARRERA" },
                "postulaciones": {
                    "id_aspirante": "IDENTIFICACION",
                    "id_carrera": "OFA_ID",
                    "prioridad": "PRIORIDAD",
                    "antecedentes": "PUNTAJE_ANTECEDENTES",
                    "evaluacion": "PUNTAJE_EVALUACION",
                    "pueblo": "PUEBLO_NACIONALIDAD"
                },
                "segmentos_cupos": ["OFERTA_POLITICA_CUOTAS", "OFERTA_GENERAL"]
            }
        });
        let policy = PolicyDocument::from_reader(document.to_string().as_bytes())
            .expect("policy parses");
        Arc::new(AllocationWorkspace::new(policy))
    }

    fn app(workspace: Arc<AllocationWorkspace>, ready: bool) -> axum::Router {
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        with_allocation_routes(workspace).layer(Extension(state))
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_and_readiness_report_state() {
        let dir = scratch_dir("health");
        let router = app(workspace(&dir), false);

        let health = router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(health.status(), StatusCode::OK);

        let ready = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(ready).await["status"], "initializing");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn upload_run_and_download_results() {
        let dir = scratch_dir("run");
        let router = app(workspace(&dir), true);

        let missing = router
            .clone()
            .oneshot(
                Request::get("/api/v1/allocation/results")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let upload = json!({ "offer_csv": OFFER, "applications_csv": APPLICATIONS });
        let saved = router
            .clone()
            .oneshot(
                Request::post("/api/v1/allocation/inputs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(upload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(saved.status(), StatusCode::OK);
        assert_eq!(json_body(saved).await["saved"].as_array().map(Vec::len), Some(2));

        let run = router
            .clone()
            .oneshot(
                Request::post("/api/v1/allocation/run")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(run.status(), StatusCode::OK);
        let summary = json_body(run).await;
        assert_eq!(summary["assigned"], 2);
        assert_eq!(summary["applicants"], 2);
        assert!(summary["incidents"].as_array().expect("array").is_empty());

        let results = router
            .oneshot(
                Request::get("/api/v1/allocation/results")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(results.status(), StatusCode::OK);
        assert_eq!(
            results.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let bytes = to_bytes(results.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let text = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains(",B-2,"));
        assert!(text.contains(",P2,"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn offer_with_missing_columns_is_a_bad_request() {
        let dir = scratch_dir("offer");
        std::fs::write(dir.join("oferta.csv"), "OFA_ID,NOMBRE_CARRERA\nP1,Medicina\n")
            .expect("offer written");
        let router = app(workspace(&dir), true);

        let response = router
            .oneshot(
                Request::get("/api/v1/allocation/offer")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("OFERTA_POLITICA_CUOTAS"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = scratch_dir("upload");
        let router = app(workspace(&dir), true);

        let response = router
            .oneshot(
                Request::post("/api/v1/allocation/inputs")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        std::fs::remove_dir_all(&dir).ok();
    }
}
