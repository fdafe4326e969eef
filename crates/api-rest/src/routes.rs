//! Generic REST routes for one resource collection.
//!
//! Every hospital collection speaks the same contract:
//!
//! - `GET    /<collection>` answers `{success, <listKey>: [...]}`
//! - `POST   /<collection>` validates the draft and answers `201 {success, <itemKey>: record}`
//! - `PUT    /<collection>/:id` merges the payload into the stored record
//! - `DELETE /<collection>/:id`
//! - `POST|PUT /<collection>/:id/<action>` for each declared status transition
//! - `GET    /<collection>/export?format=csv&<selector>=<value>` where exports are offered
//!
//! Status guards are enforced here as well as on the client, so a stale page gets a `409`.

use crate::error::ApiError;
use crate::store::{merge, record_id};
use crate::AppState;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put, MethodRouter};
use axum::{Json, Router};
use hops_core::{
    summary_csv, ActionMethod, ActionSpec, Draft, ExportFormat, FilterSet, Resource, StatusKind,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

/// Routes for `R`, mounted at `/<R::COLLECTION_PATH>`.
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    let collection = format!("/{}", R::COLLECTION_PATH);
    let item = format!("{collection}/:id");

    let mut router = Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(&item, put(update::<R>).delete(remove::<R>));

    if R::SUPPORTS_EXPORT {
        router = router.route(&format!("{collection}/export"), get(export::<R>));
    }

    for action in R::ACTIONS {
        router = router.route(&format!("{item}/{}", action.name), action_route::<R>(action));
    }

    router
}

fn action_route<R: Resource>(action: &'static ActionSpec<R::Status>) -> MethodRouter<AppState> {
    let handler = move |state: State<AppState>, id: AxumPath<String>, body: Json<Value>| {
        perform::<R>(state, id, body, action)
    };
    match action.method {
        ActionMethod::Post => post(handler),
        ActionMethod::Put => put(handler),
    }
}

async fn list<R: Resource>(State(state): State<AppState>) -> Json<Value> {
    let records = state.store.list(R::COLLECTION_PATH);
    tracing::debug!("listing {} {} records", records.len(), R::LABEL);
    Json(json!({ "success": true, (R::LIST_KEY): records }))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let draft: R::Draft = serde_json::from_value(body.clone())
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} payload: {e}", R::LABEL)))?;
    require(draft.missing_fields().into_iter())?;

    let Value::Object(mut record) = body else {
        return Err(ApiError::BadRequest(format!("Invalid {} payload", R::LABEL)));
    };
    let now = timestamp();
    record.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
    record.insert("createdAt".into(), now.clone());
    record.insert("updatedAt".into(), now);
    record
        .entry("status")
        .or_insert_with(|| Value::String(R::Status::initial().as_str().into()));

    let record = Value::Object(record);
    decode::<R>(&record)?;
    state.store.insert(R::COLLECTION_PATH, record.clone());
    tracing::info!("created {} {}", R::LABEL, record_id(&record).unwrap_or_default());

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, (R::ITEM_KEY): record })),
    ))
}

async fn update<R: Resource>(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let record = edit::<R>(&state, &id, |record| {
        merge(record, &body);
        record.insert("updatedAt".into(), timestamp());
        Ok(())
    })?;
    Ok(Json(json!({ "success": true, (R::ITEM_KEY): record })))
}

async fn remove<R: Resource>(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Value>, ApiError> {
    if !state.store.remove(R::COLLECTION_PATH, &id) {
        return Err(ApiError::NotFound { label: R::LABEL });
    }
    tracing::info!("deleted {} {}", R::LABEL, id);
    Ok(Json(json!({
        "success": true,
        "message": format!("{} deleted", hops_core::sentence_case(R::LABEL)),
    })))
}

async fn perform<R: Resource>(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(payload): Json<Value>,
    action: &'static ActionSpec<R::Status>,
) -> Result<Json<Value>, ApiError> {
    // The guard and the write happen under one store lock, so of two racing requests for the
    // same transition only the first is accepted.
    let record = edit::<R>(&state, &id, |record| {
        let current = decode::<R>(&Value::Object(record.clone()))?.status();
        if !action.permits(current) {
            tracing::warn!(
                "refused {} on {} {}: status is {}",
                action.name,
                R::LABEL,
                id,
                current.as_str()
            );
            return Err(ApiError::Conflict {
                action: action.name,
                label: R::LABEL,
                status: current.as_str(),
            });
        }
        require(action.missing_fields(&payload).into_iter())?;
        let target = action
            .target(&payload)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        merge(record, &payload);
        record.insert("status".into(), Value::String(target.as_str().into()));
        record.insert("updatedAt".into(), timestamp());
        tracing::info!(
            "{} {} {}: {} -> {}",
            action.name,
            R::LABEL,
            id,
            current.as_str(),
            target.as_str()
        );
        Ok(())
    })?;
    Ok(Json(json!({ "success": true, (R::ITEM_KEY): record })))
}

async fn export<R: Resource>(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let format = params
        .remove("format")
        .unwrap_or_else(|| ExportFormat::Csv.as_str().into())
        .parse::<ExportFormat>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if format != ExportFormat::Csv {
        return Err(ApiError::BadRequest(format!(
            "{format} export is not available on the development backend"
        )));
    }

    let mut filters = FilterSet::new();
    for (name, value) in &params {
        filters
            .select::<R>(name, value)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    }

    let records: Vec<R> = state
        .store
        .list(R::COLLECTION_PATH)
        .into_iter()
        .filter_map(|v| serde_json::from_value::<R>(v).ok())
        .collect();
    let matching = filters.apply(&records);

    let count = matching.len();
    let csv = summary_csv(matching);

    let leaf = R::COLLECTION_PATH.rsplit('/').next().unwrap_or(R::COLLECTION_PATH);
    let disposition = format!("attachment; filename=\"{leaf}.csv\"");
    tracing::info!("exported {} {} records", count, R::LABEL);

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

/// Apply `change` to the stored record and keep the result only if it still decodes as `R`.
fn edit<R: Resource>(
    state: &AppState,
    id: &str,
    change: impl FnOnce(&mut Map<String, Value>) -> Result<(), ApiError>,
) -> Result<Value, ApiError> {
    let outcome = state.store.modify(R::COLLECTION_PATH, id, |stored| {
        let Value::Object(record) = stored else {
            tracing::error!("stored {} {} is not a JSON object", R::LABEL, id);
            return Err(ApiError::Internal);
        };
        change(record)?;
        decode::<R>(stored)?;
        Ok(stored.clone())
    });
    outcome.unwrap_or(Err(ApiError::NotFound { label: R::LABEL }))
}

fn decode<R: Resource>(record: &Value) -> Result<R, ApiError> {
    serde_json::from_value(record.clone())
        .map_err(|e| ApiError::BadRequest(format!("Invalid {}: {e}", R::LABEL)))
}

fn require(missing: impl Iterator<Item = &'static str>) -> Result<(), ApiError> {
    let fields: Vec<String> = missing.map(str::to_string).collect();
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ApiError::MissingFields { fields })
    }
}

fn timestamp() -> Value {
    Value::String(chrono::Utc::now().to_rfc3339())
}
