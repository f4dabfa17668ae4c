// src/handlers/resources.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use validator::Validate;

use crate::{
    error::AppError,
    models::resource::{BulkDeleteRequest, Resource},
    state::AppState,
    utils::session::Session,
};

fn require_object(payload: &Value) -> Result<(), AppError> {
    if payload.is_object() {
        Ok(())
    } else {
        Err(AppError::BadRequest("Request body must be a JSON object.".to_string()))
    }
}

/// Lists every row of a collection, passed through as the API returns it.
pub async fn list_resource(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(resource): Path<Resource>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.api_for(&session).list_resource(resource).await?;
    Ok(Json(rows))
}

pub async fn get_resource(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(Resource, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let row = state.api_for(&session).get_resource(resource, id).await?;
    Ok(Json(row))
}

pub async fn create_resource(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(resource): Path<Resource>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    require_object(&payload)?;
    let created = state
        .api_for(&session)
        .create_resource(resource, &payload)
        .await?;
    tracing::info!("Created a row in {}", resource.path());
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_resource(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(Resource, i64)>,
    Json(payload): Json<Value>,
) -> Result<impl IntoResponse, AppError> {
    require_object(&payload)?;
    let updated = state
        .api_for(&session)
        .update_resource(resource, id, &payload)
        .await?;
    Ok(Json(updated))
}

pub async fn delete_resource(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path((resource, id)): Path<(Resource, i64)>,
) -> Result<impl IntoResponse, AppError> {
    state
        .api_for(&session)
        .delete_resource(resource, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the selected rows concurrently.
///
/// Any failure is reported as a single generic error once every request
/// has settled; the caller refreshes the list either way.
pub async fn bulk_delete(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Path(resource): Path<Resource>,
    Json(payload): Json<BulkDeleteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let outcome = state
        .api_for(&session)
        .bulk_delete(resource, &payload.ids)
        .await?;

    if outcome.failed > 0 {
        return Err(AppError::Upstream(format!(
            "{} of {} deletions in {} failed",
            outcome.failed,
            payload.ids.len(),
            resource.path()
        )));
    }

    Ok(Json(json!({ "deleted": outcome.deleted })))
}
