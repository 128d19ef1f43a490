use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use hitcount_core::normalize;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub site: Option<String>,
}

/// `GET /stats?site=<url>` — current counters for a site.
///
/// `site` may be the site origin itself or any page URL under it; it is
/// normalized before the lookup. Sites that have never been visited return
/// `{ "uv": 0, "pv": 0 }`. Reading never creates a counter row.
#[tracing::instrument(skip(state))]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let raw = query
        .site
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("site query parameter is required".to_string()))?;

    let site = normalize(raw)?;
    let stats = state.updater.get_stats(&site).await?;

    Ok(Json(stats.counts()))
}
