//! Template fetch, render and send endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::server::AppState;
use crate::template::{build_message, MessageSpec, RenderContext, TemplateId};

#[derive(Debug, Default, Deserialize)]
pub struct RenderRequest {
    /// Substitution values, a flat JSON object
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub to: String,
    #[serde(default)]
    pub data: Value,
}

fn parse_id(id: String) -> Result<TemplateId> {
    Ok(TemplateId::try_from(id)?)
}

/// GET /api/v1/templates/{id} - Fetch a template (through the cache)
#[tracing::instrument(name = "http.get_template", skip(state))]
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let template_id = parse_id(id)?;
    let template = state.fetcher.fetch_template(&template_id).await?;

    Ok(Json(template.into_value()))
}

/// POST /api/v1/templates/{id}/render - Render a template into a message
#[tracing::instrument(name = "http.render_template", skip(state, request))]
pub async fn render_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RenderRequest>,
) -> Result<Json<MessageSpec>> {
    let template_id = parse_id(id)?;
    let data = RenderContext::from_json(request.data)?;

    let template = state.fetcher.fetch_template(&template_id).await?;

    Ok(Json(build_message(&template, &data)))
}

/// POST /api/v1/templates/{id}/send - Render and hand to the mail sender
#[tracing::instrument(
    name = "http.send_template",
    skip(state, request),
    fields(recipient = %request.to)
)]
pub async fn send_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SendRequest>,
) -> Result<(StatusCode, Json<MessageSpec>)> {
    let template_id = parse_id(id)?;
    let data = RenderContext::from_json(request.data)?;

    let message = state.mailer.send(&template_id, &request.to, &data).await?;

    Ok((StatusCode::ACCEPTED, Json(message)))
}
