use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::documents::store::DocumentSummary;
use crate::documents::StoreError;
use crate::errors::{AppError, AppJson};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CvListResponse {
    pub cvs: Vec<String>,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DownloadQuery {
    #[serde(default)]
    pub download: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, ext)| ext) {
        Some("pdf") => "application/pdf",
        Some("md") => "text/markdown; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// GET /api/v1/cvs
pub async fn handle_list_cvs(
    State(state): State<AppState>,
) -> Result<Json<CvListResponse>, AppError> {
    let documents = state.store.list_cvs().await?;
    let cvs = documents.iter().map(|d| d.filename.clone()).collect();
    Ok(Json(CvListResponse { cvs, documents }))
}

/// GET /api/v1/cvs/:filename
///
/// Raw file bytes, shown inline unless `?download=true`.
pub async fn handle_get_cv_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, AppError> {
    let bytes = state.store.read_bytes(&filename).await?;

    let disposition = if query.download {
        format!("attachment; filename=\"{filename}\"")
    } else {
        "inline".to_string()
    };
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(|e| AppError::BadRequest(format!("unusable filename: {e}")))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(&filename)),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// GET /api/v1/cvs/:filename/content
///
/// A missing document answers 404 with empty content rather than an error body.
pub async fn handle_get_cv_content(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<(StatusCode, Json<ContentBody>), AppError> {
    match state.store.read_markdown(&filename).await {
        Ok(content) => Ok((StatusCode::OK, Json(ContentBody { content }))),
        Err(StoreError::NotFound(_)) => Ok((
            StatusCode::NOT_FOUND,
            Json(ContentBody {
                content: String::new(),
            }),
        )),
        Err(e) => Err(e.into()),
    }
}

/// PUT /api/v1/cvs/:filename/content
pub async fn handle_put_cv_content(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    AppJson(body): AppJson<ContentBody>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.write_markdown(&filename, &body.content).await?;
    Ok(SuccessResponse::ok())
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
) -> Result<Json<ContentBody>, AppError> {
    let content = state.store.read_profile().await?;
    Ok(Json(ContentBody { content }))
}

/// PUT /api/v1/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    AppJson(body): AppJson<ContentBody>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.store.write_profile(&body.content).await?;
    Ok(SuccessResponse::ok())
}
