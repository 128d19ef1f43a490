use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

/// Transport-level facts about the caller used to derive a visitor hash.
///
/// Never fails: absent values stay `None` and the visitor identifier
/// substitutes its sentinel.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub address: Option<String>,
    pub user_agent: Option<String>,
    /// Raw `Referer` header, the fallback when the body carries no referrer.
    pub referer: Option<String>,
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        Ok(Self {
            address: extract_client_ip(&parts.headers).or(peer),
            user_agent: header_str(&parts.headers, header::USER_AGENT.as_str()),
            referer: header_str(&parts.headers, header::REFERER.as_str()),
        })
    }
}

/// Extract the real client IP from `X-Forwarded-For` (first entry), then
/// `X-Real-IP`. The TCP peer address is the caller's fallback.
fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| header_str(headers, "x-real-ip"))
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
