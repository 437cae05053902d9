//! Template cache administration endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::Result;
use crate::server::AppState;
use crate::template::TemplateId;

#[derive(Debug, Serialize)]
pub struct ClearAllResponse {
    pub removed: usize,
}

/// DELETE /api/v1/cache/templates/{id} - Drop one cached template
#[tracing::instrument(name = "http.clear_template", skip(state))]
pub async fn clear_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let template_id = TemplateId::try_from(id)?;
    state.fetcher.clear_cache(&template_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/cache/templates - Drop every cached template
#[tracing::instrument(name = "http.clear_all_templates", skip(state))]
pub async fn clear_all_templates(State(state): State<AppState>) -> Result<Json<ClearAllResponse>> {
    let removed = state.fetcher.clear_all_cache().await?;

    Ok(Json(ClearAllResponse { removed }))
}
