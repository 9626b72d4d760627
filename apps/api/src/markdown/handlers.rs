//! Axum route handlers for the editor's conversion endpoints.

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppJson};
use crate::markdown::{to_markdown, to_rich_text, Dialect, RichDocument};

#[derive(Debug, Deserialize)]
pub struct ToHtmlRequest {
    pub markdown: String,
    #[serde(default)]
    pub dialect: Dialect,
}

#[derive(Debug, Serialize)]
pub struct ToHtmlResponse {
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct FromHtmlRequest {
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct FromHtmlResponse {
    pub markdown: String,
}

/// POST /api/v1/markdown/to-html
pub async fn handle_to_html(
    AppJson(req): AppJson<ToHtmlRequest>,
) -> Result<Json<ToHtmlResponse>, AppError> {
    let html = to_rich_text(&req.markdown, req.dialect).to_html();
    Ok(Json(ToHtmlResponse { html }))
}

/// POST /api/v1/markdown/from-html
pub async fn handle_from_html(
    AppJson(req): AppJson<FromHtmlRequest>,
) -> Result<Json<FromHtmlResponse>, AppError> {
    let markdown = to_markdown(&RichDocument::from_html(&req.html));
    Ok(Json(FromHtmlResponse { markdown }))
}
