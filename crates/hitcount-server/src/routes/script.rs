use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::state::AppState;

const TRACK_JS_TEMPLATE: &str = include_str!("../../assets/track.js");
const ENDPOINT_PLACEHOLDER: &str = "__HITCOUNT_ENDPOINT__";

/// Render the tracking script. With a configured public URL the endpoint is
/// baked in as a JS string literal; otherwise `null`, and the script posts
/// back to the origin it was loaded from.
pub fn render_track_js(public_url: Option<&str>) -> String {
    let endpoint = match public_url {
        Some(base) => serde_json::Value::String(format!("{base}/track")).to_string(),
        None => "null".to_string(),
    };
    TRACK_JS_TEMPLATE.replace(ENDPOINT_PLACEHOLDER, &endpoint)
}

/// `GET /track.js` — the embeddable tracking script.
///
/// Served with `Access-Control-Allow-Origin: *` and
/// `Cross-Origin-Resource-Policy: cross-origin` so it loads on pages running
/// under COEP isolation.
#[tracing::instrument(skip(state))]
pub async fn track_js(State(state): State<Arc<AppState>>) -> Response {
    let body = render_track_js(state.config.public_url.as_deref());

    let mut response = body.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/javascript; charset=utf-8"),
    );
    if let Ok(value) =
        format!("public, max-age={}", state.config.script_max_age_secs).parse::<HeaderValue>()
    {
        headers.insert(header::CACHE_CONTROL, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "cross-origin-resource-policy",
        HeaderValue::from_static("cross-origin"),
    );
    response
}
