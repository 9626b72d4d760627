use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::documents::handlers::SuccessResponse;
use crate::documents::store::{markdown_name, pdf_name};
use crate::errors::{AppError, AppJson};
use crate::render::{DocumentKind, RenderError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub filename: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfilePdfQuery {
    #[serde(default)]
    pub regenerate: bool,
}

/// A missing source document is the caller's problem (404), not a conversion failure.
fn render_error(err: RenderError) -> AppError {
    match err {
        RenderError::MissingInput(path) => {
            AppError::NotFound(format!("{} not found", path.display()))
        }
        other => AppError::ConversionFailed(other),
    }
}

/// POST /api/v1/regenerate-pdf
///
/// Rebuilds a CV's PDF from its markdown. Accepts `cv_x`, `cv_x.md` or `cv_x.pdf`.
pub async fn handle_regenerate_pdf(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegenerateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let source = state.store.cv_path(&markdown_name(&req.filename))?;
    let output = state.store.cv_path(&pdf_name(&req.filename))?;

    state
        .renderer
        .render(&source, &output, DocumentKind::Cv)
        .await
        .map_err(render_error)?;

    info!("Regenerated {}", output.display());
    Ok(SuccessResponse::ok())
}

/// GET /api/v1/profile/pdf
///
/// Serves the profile preview, rebuilding it first when `user.md` changed or `?regenerate=true`.
pub async fn handle_profile_pdf(
    State(state): State<AppState>,
    Query(query): Query<ProfilePdfQuery>,
) -> Result<Response, AppError> {
    let path = state
        .profile_pdf
        .ensure(&state.store, &state.renderer, query.regenerate)
        .await
        .map_err(render_error)?;

    let bytes = tokio::fs::read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=profile.pdf"),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        ],
        bytes,
    )
        .into_response())
}
