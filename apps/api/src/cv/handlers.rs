use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::cv::manager::{
    apply_edit, create_resume, delete_resume, duplicate_resume, list_resumes, load_resume,
    EditOutcome, ResumeAggregate,
};
use crate::cv::submission::RawSubmission;
use crate::errors::AppError;
use crate::export::{export_filename, ExportError};
use crate::models::resume::ResumeSummary;
use crate::models::template::TemplateRow;
use crate::models::user::Owner;
use crate::state::AppState;

/// Returned by operations that land the client on a CV.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
    pub title: String,
    pub redirect_to: String,
}

impl CreatedResponse {
    fn new(id: Uuid, title: String) -> Self {
        Self {
            id,
            title,
            redirect_to: format!("/api/v1/resumes/{id}"),
        }
    }
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<TemplateRow>>, AppError> {
    let mut tx = state.store.begin().await?;
    let templates = tx.list_templates().await?;
    Ok(Json(templates))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<Json<Vec<ResumeSummary>>, AppError> {
    let resumes = list_resumes(state.store.as_ref(), &owner).await?;
    Ok(Json(resumes))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    owner: Owner,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let resume = create_resume(state.store.as_ref(), &owner).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(resume.id, resume.title)),
    ))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeAggregate>, AppError> {
    let aggregate = load_resume(state.store.as_ref(), id, &owner).await?;
    Ok(Json(aggregate))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_edit_resume(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
    payload: Result<Json<RawSubmission>, JsonRejection>,
) -> Result<Json<EditOutcome>, AppError> {
    let Json(submission) = payload?;
    let outcome = apply_edit(state.store.as_ref(), id, &owner, &submission).await?;
    Ok(Json(outcome))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_resume(state.store.as_ref(), id, &owner).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/resumes/:id/duplicate
pub async fn handle_duplicate_resume(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let copy = duplicate_resume(state.store.as_ref(), id, &owner).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(copy.id, copy.title)),
    ))
}

/// GET /api/v1/resumes/:id/export
pub async fn handle_export_resume(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let aggregate = load_resume(state.store.as_ref(), id, &owner).await?;
    let filename = export_filename(&aggregate.resume.title, state.exporter.file_extension());
    let content_type = state.exporter.content_type();

    // Rendering is CPU-bound: keep it off the async workers.
    let exporter = Arc::clone(&state.exporter);
    let bytes = tokio::task::spawn_blocking(move || exporter.render(&aggregate))
        .await
        .map_err(|e| ExportError::Task(e.to_string()))??;

    Ok((
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
