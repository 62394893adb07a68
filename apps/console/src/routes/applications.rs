use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::errors::AppError;
use crate::manager::service::{ContactLink, LoadSummary, ResumeDownload};
use crate::manager::state::{BulkDeleteReport, ListView};
use crate::manager::StatusFilter;
use crate::models::{ApplicationDetail, ApplicationId, ApplicationStatus};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RefreshQuery {
    #[serde(default)]
    pub show_loading: bool,
}

#[derive(Deserialize)]
pub struct FiltersRequest {
    pub query: Option<String>,
    pub status: Option<StatusFilter>,
}

#[derive(Deserialize)]
pub struct PageRequest {
    pub page: usize,
}

#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: ApplicationStatus,
}

#[derive(Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Option<Vec<ApplicationId>>,
}

/// POST /api/v1/applications/refresh
pub async fn handle_refresh(
    State(state): State<AppState>,
    Query(params): Query<RefreshQuery>,
) -> Result<Json<LoadSummary>, AppError> {
    let summary = state
        .applications
        .load_applications(params.show_loading)
        .await?;
    Ok(Json(summary))
}

/// GET /api/v1/applications
pub async fn handle_list(State(state): State<AppState>) -> Json<ListView> {
    Json(state.applications.list_view().await)
}

/// PUT /api/v1/applications/filters
pub async fn handle_set_filters(
    State(state): State<AppState>,
    Json(req): Json<FiltersRequest>,
) -> Json<ListView> {
    Json(state.applications.set_filters(req.query, req.status).await)
}

/// PUT /api/v1/applications/page
pub async fn handle_set_page(
    State(state): State<AppState>,
    Json(req): Json<PageRequest>,
) -> Json<ListView> {
    Json(state.applications.set_page(req.page).await)
}

/// GET /api/v1/applications/:id
pub async fn handle_view(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ApplicationDetail>, AppError> {
    Ok(Json(state.applications.view_application(id).await?))
}

/// DELETE /api/v1/applications/detail
pub async fn handle_close_detail(State(state): State<AppState>) -> StatusCode {
    state.applications.close_detail().await;
    StatusCode::NO_CONTENT
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<ApplicationDetail>, AppError> {
    Ok(Json(state.applications.update_status(id, req.status).await?))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<StatusCode, AppError> {
    state.applications.delete_application(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/applications/bulk-delete
/// An empty body, or one without `ids`, deletes the current selection.
/// Any other body must be a valid request, whatever its content type.
pub async fn handle_bulk_delete(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<BulkDeleteReport>, AppError> {
    let ids = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        let req: BulkDeleteRequest = serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid bulk delete request: {e}")))?;
        req.ids
    };
    Ok(Json(state.applications.bulk_delete(ids).await?))
}

/// POST /api/v1/applications/:id/select
pub async fn handle_toggle_select(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let selected = state.applications.toggle_select(id).await?;
    Ok(Json(serde_json::json!({ "id": id, "selected": selected })))
}

/// POST /api/v1/applications/select-page
pub async fn handle_toggle_select_page(
    State(state): State<AppState>,
) -> Json<Vec<ApplicationId>> {
    Json(state.applications.toggle_select_all_on_page().await)
}

/// GET /api/v1/applications/:id/resume/link
pub async fn handle_resume_link(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ResumeDownload>, AppError> {
    Ok(Json(state.applications.download_resume(id).await?))
}

/// GET /api/v1/applications/:id/resume
/// Streams the backend's file back as an attachment named after the applicant.
pub async fn handle_resume_download(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<impl IntoResponse, AppError> {
    let (download, bytes) = state.applications.fetch_resume(id).await?;
    let disposition = format!("attachment; filename=\"{}\"", download.filename.replace('"', ""));
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .with_context(|| format!("Resume filename for application {id} is not a valid header"))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// POST /api/v1/applications/:id/call
pub async fn handle_call(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ContactLink>, AppError> {
    Ok(Json(state.applications.call_applicant(id).await?))
}

/// POST /api/v1/applications/:id/email
pub async fn handle_email(
    State(state): State<AppState>,
    Path(id): Path<ApplicationId>,
) -> Result<Json<ContactLink>, AppError> {
    Ok(Json(state.applications.email_applicant(id).await?))
}
