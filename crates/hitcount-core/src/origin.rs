//! Site-origin normalization.
//!
//! Every visit is aggregated under a [`SiteOrigin`]: the scheme, host and
//! port of the referring page plus, when present, its first path segment.
//! Hosts that serve many independent projects under one domain
//! (`user.github.io/project/...`) are counted per project, while deeper
//! pages of the same project roll up into one counter.

use std::fmt;

use serde::Serialize;
use url::Url;

use crate::error::CoreError;

/// Canonical aggregation key for one logical site.
///
/// Only constructed through [`normalize`], so a value never carries a
/// trailing slash, a query string or a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SiteOrigin(String);

impl SiteOrigin {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map a referrer URL to its [`SiteOrigin`].
///
/// ```text
/// https://example.com              -> https://example.com
/// https://example.com/             -> https://example.com
/// https://user.github.io/blog/a/b  -> https://user.github.io/blog
/// https://user.github.io/blog/?x#y -> https://user.github.io/blog
/// ```
///
/// Fails with [`CoreError::InvalidUrl`] for empty input, relative URLs and
/// URLs without a host (`mailto:`, `data:`, `file:///...`).
pub fn normalize(referrer_url: &str) -> Result<SiteOrigin, CoreError> {
    let raw = referrer_url.trim();
    if raw.is_empty() {
        return Err(CoreError::InvalidUrl("empty url".to_string()));
    }

    let parsed = Url::parse(raw).map_err(|e| CoreError::InvalidUrl(format!("{raw}: {e}")))?;

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h,
        _ => return Err(CoreError::InvalidUrl(format!("{raw}: missing host"))),
    };

    // `Url` lowercases scheme and host and drops default ports, so
    // `HTTPS://Example.com:443` and `https://example.com` share a key.
    let mut origin = format!("{}://{}", parsed.scheme(), host);
    if let Some(port) = parsed.port() {
        origin.push(':');
        origin.push_str(&port.to_string());
    }

    if let Some(first) = parsed.path().split('/').find(|segment| !segment.is_empty()) {
        origin.push('/');
        origin.push_str(first);
    }

    Ok(SiteOrigin(origin))
}
