use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html as HtmlResponse, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::db::ValidationError;
use crate::helpers::{self, FileGroups, LicenseOption};
use crate::jobs::{self, Job, ScanError, ScanSummary};
use crate::models::*;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// Validation errors are safe to expose and come back as BAD_REQUEST; every
/// other error is logged server-side and reported generically.
fn internal_error(e: anyhow::Error) -> (StatusCode, String) {
    if let Some(validation) = e.downcast_ref::<ValidationError>() {
        tracing::warn!("Validation error: {}", validation);
        return (StatusCode::BAD_REQUEST, validation.to_string());
    }

    tracing::error!("Internal error: {:#}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn scan_error(e: ScanError) -> (StatusCode, String) {
    match e {
        ScanError::ModelNotFound(_) | ScanError::LibraryNotFound(_) => {
            (StatusCode::NOT_FOUND, e.to_string())
        }
        ScanError::Io { .. } => {
            tracing::warn!("Scan failed: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        ScanError::Store(e) => internal_error(e),
        ScanError::Pattern(_) => internal_error(e.into()),
    }
}

fn not_found(what: &str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

fn require_model(state: &AppState, id: Uuid) -> ApiResult<Model> {
    state
        .db
        .get_model(id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Model"))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Libraries
// ============================================================

pub async fn list_libraries(State(state): State<AppState>) -> ApiResult<Json<Vec<Library>>> {
    state.db.get_all_libraries().map(Json).map_err(internal_error)
}

pub async fn get_library(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Library>> {
    state
        .db
        .get_library(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Library"))
}

pub async fn create_library(
    State(state): State<AppState>,
    Json(input): Json<CreateLibraryInput>,
) -> ApiResult<(StatusCode, Json<Library>)> {
    state
        .db
        .create_library(input)
        .map(|l| (StatusCode::CREATED, Json(l)))
        .map_err(internal_error)
}

pub async fn delete_library(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_library(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Library"))
    }
}

// ============================================================
// Models
// ============================================================

pub async fn list_library_models(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Model>>> {
    state
        .db
        .get_library(library_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Library"))?;

    state
        .db
        .get_models_by_library(library_id)
        .map(Json)
        .map_err(internal_error)
}

/// Register a model and queue a scan of its directory.
pub async fn create_model(
    State(state): State<AppState>,
    Path(library_id): Path<Uuid>,
    Json(input): Json<CreateModelInput>,
) -> ApiResult<(StatusCode, Json<Model>)> {
    state
        .db
        .get_library(library_id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Library"))?;

    let model = state
        .db
        .create_model(library_id, input)
        .map_err(internal_error)?;

    state
        .jobs
        .enqueue(Job::ScanModel(model.id))
        .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(model)))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ModelDetail>> {
    state
        .db
        .get_model_detail(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Model"))
}

pub async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateModelInput>,
) -> ApiResult<Json<Model>> {
    state
        .db
        .update_model(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Model"))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_model(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Model"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanQuery {
    /// Run the scan inline and return its result instead of queueing it.
    #[serde(default)]
    pub wait: bool,
}

pub async fn scan_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ScanQuery>,
) -> ApiResult<Response> {
    require_model(&state, id)?;

    if !query.wait {
        state
            .jobs
            .enqueue(Job::ScanModel(id))
            .map_err(internal_error)?;
        let body = Json(serde_json::json!({ "status": "queued", "model_id": id }));
        return Ok((StatusCode::ACCEPTED, body).into_response());
    }

    let db = state.db.clone();
    let settings = state.settings.clone();
    let summary: ScanSummary =
        tokio::task::spawn_blocking(move || jobs::scan_model(&db, &settings, id))
            .await
            .map_err(|e| internal_error(e.into()))?
            .map_err(scan_error)?;

    Ok(Json(summary).into_response())
}

pub async fn get_model_badges(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<HtmlResponse<String>> {
    let detail = state
        .db
        .get_model_detail(id)
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Model"))?;

    let badges = helpers::status_badges(&detail, &state.settings);
    Ok(HtmlResponse(badges.into_string()))
}

// ============================================================
// Parts
// ============================================================

pub async fn list_parts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Part>>> {
    require_model(&state, id)?;
    state.db.get_parts(id).map(Json).map_err(internal_error)
}

pub async fn list_grouped_parts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FileGroups<Part>>> {
    require_model(&state, id)?;
    let parts = state.db.get_parts(id).map_err(internal_error)?;
    Ok(Json(helpers::group(parts)))
}

pub async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_part(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Part"))
    }
}

// ============================================================
// Tags
// ============================================================

pub async fn list_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<String>>> {
    require_model(&state, id)?;
    state.db.get_model_tags(id).map(Json).map_err(internal_error)
}

pub async fn set_tags(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SetTagsInput>,
) -> ApiResult<Json<Vec<String>>> {
    require_model(&state, id)?;
    state
        .db
        .set_model_tags(id, &input.tags)
        .map(Json)
        .map_err(internal_error)
}

pub async fn remove_tag(
    State(state): State<AppState>,
    Path((id, tag)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    require_model(&state, id)?;
    if state.db.remove_model_tag(id, &tag).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Tag"))
    }
}

// ============================================================
// Problems
// ============================================================

pub async fn list_problems(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Problem>>> {
    require_model(&state, id)?;
    state.db.get_problems(id).map(Json).map_err(internal_error)
}

pub async fn create_problem(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateProblemInput>,
) -> ApiResult<(StatusCode, Json<Problem>)> {
    require_model(&state, id)?;
    state
        .db
        .create_problem(id, input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn delete_problem(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.db.delete_problem(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Problem"))
    }
}

// ============================================================
// Licenses
// ============================================================

#[derive(Debug, Deserialize)]
pub struct LicenseQuery {
    pub selected: Option<String>,
}

pub async fn list_licenses(
    State(state): State<AppState>,
    Query(query): Query<LicenseQuery>,
) -> Json<Vec<LicenseOption>> {
    Json(helpers::license_options(
        &state.translations,
        query.selected.as_deref(),
    ))
}

pub async fn license_select_options(
    State(state): State<AppState>,
    Query(query): Query<LicenseQuery>,
) -> HtmlResponse<String> {
    let options =
        helpers::license_select_options(&state.translations, query.selected.as_deref());
    HtmlResponse(options.into_string())
}
