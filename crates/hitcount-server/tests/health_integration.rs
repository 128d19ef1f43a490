use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use hitcount_core::config::Config;
use hitcount_core::{SiteOrigin, SiteStats, StatsStore, VisitorHash, VisitorRecord};
use hitcount_duckdb::DuckDbBackend;
use hitcount_server::app::build_app;
use hitcount_server::state::AppState;

fn app() -> axum::Router {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    build_app(Arc::new(AppState::new(db, Config::default())))
}

/// A store whose database connection is gone.
struct UnreachableStore;

#[async_trait]
impl StatsStore for UnreachableStore {
    async fn record_visit(&self, _: &SiteOrigin, _: &VisitorHash) -> anyhow::Result<SiteStats> {
        Err(anyhow!("database unreachable"))
    }

    async fn update_stats(&self, _: &SiteOrigin) -> anyhow::Result<SiteStats> {
        Err(anyhow!("database unreachable"))
    }

    async fn get_stats(&self, _: &SiteOrigin) -> anyhow::Result<SiteStats> {
        Err(anyhow!("database unreachable"))
    }

    async fn get_visitor(
        &self,
        _: &SiteOrigin,
        _: &VisitorHash,
    ) -> anyhow::Result<Option<VisitorRecord>> {
        Err(anyhow!("database unreachable"))
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Err(anyhow!("database unreachable"))
    }
}

async fn body_bytes(response: axum::http::Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec()
}

// ============================================================
// BDD: Health check returns 200 when DB is reachable
// ============================================================
#[tokio::test]
async fn test_health_returns_200_when_db_reachable() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request");

    let response = app().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).expect("parse JSON");
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_health_returns_503_when_store_unreachable() {
    let state = AppState::with_store(Arc::new(UnreachableStore), Config::default());
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build request");

    let response = build_app(Arc::new(state))
        .oneshot(request)
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json: Value = serde_json::from_slice(&body_bytes(response).await).expect("parse JSON");
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_index_returns_identity_text() {
    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .expect("build request");

    let response = app().oneshot(request).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let text = String::from_utf8(body_bytes(response).await).expect("utf-8 body");
    assert!(text.starts_with("hitcount "));
}
