//! # API REST
//!
//! In-memory development backend for the HOPS hospital pages.
//!
//! Serves every collection in [`hops_resources::ResourceKind`] under `/api`, speaking the same
//! envelope and error contract as the production hospital backend, so the core view models and
//! the `hops` CLI can be exercised end to end without it.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Status guards on transition actions (`409` on a stale status)
//! - CSV export for collections that offer it
//! - Optional YAML seed data

#![warn(rust_2018_idioms)]

pub mod error;
pub mod routes;
pub mod store;

use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use hops_resources::{with_resource_kind, ResourceKind};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use error::ApiError;
pub use routes::resource_routes;
pub use store::{Seed, Store};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// The full application: `/health` plus every collection under `/api`.
pub fn router(state: AppState) -> Router {
    let api = ResourceKind::ALL
        .iter()
        .fold(Router::<AppState>::new(), |api, kind| {
            api.merge(with_resource_kind!(*kind, R => resource_routes::<R>()))
        });

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `state` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("-- HOPS development backend listening on {}", addr);
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "HOPS development backend is alive",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hops_core::{
        run_transition, CoreConfig, ErrorKind, ExportFormat, ExportQuery, HttpClient,
        HttpResourceClient, ListViewModel, OpsError, RefreshOutcome, Resource, ResourceApi,
    };
    use hops_resources::{
        AdmissionRequest, AdmissionStatus, Discharge, DischargeStatus, EmergencyCall, Training,
    };
    use std::net::SocketAddr;
    use tokio::sync::oneshot;

    /// A backend on an ephemeral port; shuts down when dropped.
    struct Backend {
        addr: SocketAddr,
        _shutdown: oneshot::Sender<()>,
    }

    impl Backend {
        async fn spawn(store: Store) -> Self {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind");
            let addr = listener.local_addr().expect("local addr");
            let (tx, rx) = oneshot::channel::<()>();
            tokio::spawn(serve(listener, AppState::new(store), async move {
                let _ = rx.await;
            }));
            Self {
                addr,
                _shutdown: tx,
            }
        }

        fn client<R: Resource>(&self) -> HttpResourceClient<R> {
            let cfg = CoreConfig::with_base_url(format!("http://{}/api", self.addr))
                .expect("config");
            HttpResourceClient::new(HttpClient::new(&cfg).expect("http client"))
        }
    }

    fn admission_payload() -> Value {
        json!({
            "patient": {"firstName": "Ada", "lastName": "Lovelace"},
            "department": "cardiology",
            "primaryDiagnosis": "arrhythmia",
            "urgency": "high",
        })
    }

    #[tokio::test]
    async fn create_list_and_review_admission_request() {
        let backend = Backend::spawn(Store::new()).await;
        let api = backend.client::<AdmissionRequest>();

        let created = api.create(&admission_payload()).await.expect("create");
        assert_eq!(created.status, AdmissionStatus::Pending);
        assert!(created.stamps.created_at.is_some());

        let model = ListViewModel::new(api);
        assert!(matches!(model.refresh().await, RefreshOutcome::Loaded(1)));

        let review = AdmissionRequest::action("review").expect("review");
        let approved = run_transition(
            &model,
            &created.id,
            review,
            &json!({"status": "approved", "reviewNotes": "Bed 4 on ward C"}),
        )
        .await
        .expect("approve");
        assert_eq!(approved.status, AdmissionStatus::Approved);

        let again = run_transition(
            &model,
            &created.id,
            review,
            &json!({"status": "approved", "reviewNotes": "twice"}),
        )
        .await
        .expect_err("second approval");
        assert_eq!(again.kind(), ErrorKind::Conflict);
        assert_eq!(
            again.to_string(),
            "This admission request has already been approved"
        );
    }

    #[tokio::test]
    async fn backend_refuses_transition_from_a_stale_status() {
        let backend = Backend::spawn(Store::new()).await;
        let api = backend.client::<AdmissionRequest>();
        let created = api.create(&admission_payload()).await.expect("create");
        let review = AdmissionRequest::action("review").expect("review");

        api.perform(
            &created.id,
            review,
            &json!({"status": "rejected", "reviewNotes": "No beds"}),
        )
        .await
        .expect("reject");

        let err = api
            .perform(
                &created.id,
                review,
                &json!({"status": "approved", "reviewNotes": "Changed my mind"}),
            )
            .await
            .expect_err("stale review");
        match err {
            OpsError::Rejected {
                status, message, ..
            } => {
                assert_eq!(status, Some(409));
                assert_eq!(
                    message,
                    "Cannot review admission request with status: rejected"
                );
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn incomplete_create_lists_missing_fields() {
        let backend = Backend::spawn(Store::new()).await;
        let api = backend.client::<Discharge>();

        let err = api
            .create(&json!({"patientName": "Grace", "department": " "}))
            .await
            .expect_err("incomplete");
        match err {
            OpsError::Rejected {
                status,
                missing_fields,
                ..
            } => {
                assert_eq!(status, Some(400));
                assert_eq!(
                    missing_fields,
                    vec!["patientId", "department", "primaryDiagnosis"]
                );
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(api.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn discharge_moves_through_approve_and_complete() {
        let backend = Backend::spawn(Store::new()).await;
        let api = backend.client::<Discharge>();
        let created = api
            .create(&json!({
                "patientId": "P-9",
                "patientName": "Grace Hopper",
                "department": "oncology",
                "primaryDiagnosis": "remission",
            }))
            .await
            .expect("create");

        let approve = Discharge::action("approve").expect("approve");
        let complete = Discharge::action("complete").expect("complete");

        let early = api.perform(&created.id, complete, &json!({})).await;
        assert!(matches!(
            early,
            Err(OpsError::Rejected {
                status: Some(409),
                ..
            })
        ));

        let approved = api
            .perform(&created.id, approve, &json!({}))
            .await
            .expect("approve");
        assert_eq!(approved.status, DischargeStatus::Approved);
        let done = api
            .perform(&created.id, complete, &json!({}))
            .await
            .expect("complete");
        assert_eq!(done.status, DischargeStatus::Completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_approvals_admit_exactly_one() {
        let backend = Backend::spawn(Store::new()).await;
        let api = backend.client::<Discharge>();
        let approve = Discharge::action("approve").expect("approve");

        for _ in 0..10 {
            let created = api
                .create(&json!({
                    "patientId": "P-7",
                    "patientName": "Katherine Johnson",
                    "department": "cardiology",
                    "primaryDiagnosis": "stable",
                }))
                .await
                .expect("create");

            let attempts: Vec<_> = (0..12)
                .map(|_| {
                    let api = api.clone();
                    let id = created.id.clone();
                    tokio::spawn(async move { api.perform(&id, approve, &json!({})).await })
                })
                .collect();

            let mut approved = 0;
            let mut refused = 0;
            for attempt in attempts {
                match attempt.await.expect("join") {
                    Ok(_) => approved += 1,
                    Err(OpsError::Rejected {
                        status: Some(409), ..
                    }) => refused += 1,
                    Err(other) => panic!("unexpected error {other}"),
                }
            }
            assert_eq!(approved, 1);
            assert_eq!(refused, 11);
        }
    }

    #[tokio::test]
    async fn update_and_delete_unknown_records_are_not_found() {
        let backend = Backend::spawn(Store::new()).await;
        let api = backend.client::<Training>();

        let err = api
            .update("missing", &json!({"title": "x"}))
            .await
            .expect_err("update");
        assert_eq!(err.to_string(), "Training not found");
        assert!(api.remove("missing").await.is_err());
    }

    #[tokio::test]
    async fn export_filters_by_selector_and_refuses_pdf() {
        let mut seed = Seed::new();
        seed.insert(
            EmergencyCall::COLLECTION_PATH.to_string(),
            vec![
                json!({"id": "c1", "patientName": "Ann", "phone": "1", "location": "Main St",
                       "emergencyType": "cardiac", "priority": "high", "status": "pending"}),
                json!({"id": "c2", "patientName": "Bob", "phone": "2", "location": "Elm St",
                       "emergencyType": "trauma", "priority": "low", "status": "completed"}),
            ],
        );
        let backend = Backend::spawn(Store::from_seed(seed)).await;
        let api = backend.client::<EmergencyCall>();

        let mut query = ExportQuery::new(ExportFormat::Csv);
        query.filters.push(("status".into(), "pending".into()));
        let blob = api.export(&query).await.expect("export");
        assert!(blob.content_type.starts_with("text/csv"));
        let csv = String::from_utf8(blob.bytes).expect("utf8");
        assert_eq!(csv, "id,status,priority,type\r\nc1,pending,high,cardiac\r\n");

        let err = api
            .export(&ExportQuery::new(ExportFormat::Pdf))
            .await
            .expect_err("pdf");
        assert!(matches!(
            err,
            OpsError::Rejected {
                status: Some(400),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn health_reports_alive() {
        let backend = Backend::spawn(Store::new()).await;
        let body: Value = reqwest::get(format!("http://{}/health", backend.addr))
            .await
            .expect("get")
            .json()
            .await
            .expect("json");
        assert_eq!(body["ok"], true);
    }
}
