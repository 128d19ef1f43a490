use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use hitcount_core::{identify, normalize};

use crate::{error::AppError, routes::client::ClientInfo, state::AppState};

#[derive(Debug, Default, Deserialize)]
pub struct TrackPayload {
    #[serde(default)]
    pub referrer: Option<String>,
}

/// `POST /track` — record one visit and return the site's counters.
///
/// ## Request
/// `{ "referrer": "<page url>" }`. The body is parsed leniently: any
/// content type is accepted, and when the body is missing, malformed or has
/// a blank referrer the `Referer` header is used instead.
///
/// ## Pipeline
/// referrer → site origin → visitor hash (client IP + User-Agent) → counters.
///
/// ## Response
/// `200 OK` with `{ "uv": n, "pv": n }` reflecting this visit.
/// `400` when no usable referrer is present or it is not an absolute URL.
/// `500` when the store fails.
#[tracing::instrument(skip(state, client, body))]
pub async fn track(
    State(state): State<Arc<AppState>>,
    client: ClientInfo,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let referrer = referrer_from_body(&body)
        .or_else(|| client.referer.clone())
        .ok_or_else(|| AppError::BadRequest("referrer is required".to_string()))?;

    let site = normalize(&referrer)?;
    let visitor = identify(client.address.as_deref(), client.user_agent.as_deref());

    let stats = state.updater.record_visit(&site, &visitor).await?;
    tracing::info!(site = %site, uv = stats.uv, pv = stats.pv, "Visit tracked");

    Ok(Json(stats.counts()))
}

fn referrer_from_body(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice::<TrackPayload>(body)
        .ok()
        .and_then(|p| p.referrer)
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
}
