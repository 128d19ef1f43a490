//! Visit counting: the persisted record shapes, the storage abstraction and
//! the updater that picks a counting strategy.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{origin::SiteOrigin, visitor::VisitorHash};

/// Counters for one site.
///
/// `created_at` / `updated_at` are `None` for a site that has never been
/// visited (see [`SiteStats::zero`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteStats {
    pub site_origin: SiteOrigin,
    pub uv: u64,
    pub pv: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl SiteStats {
    /// The "no visits yet" value returned for unseen sites.
    pub fn zero(site_origin: SiteOrigin) -> Self {
        Self {
            site_origin,
            uv: 0,
            pv: 0,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            uv: self.uv,
            pv: self.pv,
        }
    }
}

/// Public `{ uv, pv }` pair returned by the HTTP API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub uv: u64,
    pub pv: u64,
}

/// Per-(site, visitor) membership row kept by the deduplicating strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitorRecord {
    pub site_origin: SiteOrigin,
    pub visitor_hash: VisitorHash,
    pub first_visit: String,
    pub last_visit: String,
    pub visit_count: u64,
}

/// How visits turn into unique-visitor counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountingMode {
    /// Track every (site, visitor) pair; `uv` is the number of distinct
    /// visitors ever seen.
    #[default]
    Unique,
    /// Keep no visitor rows; `uv` is set once when the site is first seen
    /// and afterwards only `pv` moves.
    Simple,
}

impl FromStr for CountingMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unique" => Ok(Self::Unique),
            "simple" => Ok(Self::Simple),
            other => Err(format!(
                "counting mode must be one of: unique, simple (got {other:?})"
            )),
        }
    }
}

/// Storage interface for site counters.
///
/// Implementations must make each write a single atomic step at the storage
/// boundary: the visitor upsert absorbs duplicate-key races on
/// `(site_origin, visitor_hash)`, and counter increments happen inside the
/// store rather than as a caller-side read-modify-write. Both returned
/// values reflect the state *after* the visit is applied.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync + 'static {
    /// Deduplicating write: upsert the visitor row, then bump `pv` and, for a
    /// first-time visitor, `uv`.
    async fn record_visit(&self, site: &SiteOrigin, visitor: &VisitorHash) -> Result<SiteStats>;

    /// Non-deduplicating write: bump `pv`; `uv` becomes 1 when the row is
    /// created and is left alone afterwards.
    async fn update_stats(&self, site: &SiteOrigin) -> Result<SiteStats>;

    /// Read counters, returning [`SiteStats::zero`] for unseen sites.
    async fn get_stats(&self, site: &SiteOrigin) -> Result<SiteStats>;

    async fn get_visitor(
        &self,
        site: &SiteOrigin,
        visitor: &VisitorHash,
    ) -> Result<Option<VisitorRecord>>;

    /// Lightweight liveness check.
    async fn ping(&self) -> Result<()>;
}

/// Entry point used by request handlers. Holds no mutable state of its own;
/// every call goes straight to the store.
#[derive(Clone)]
pub struct StatsUpdater {
    store: Arc<dyn StatsStore>,
    mode: CountingMode,
}

impl StatsUpdater {
    pub fn new(store: Arc<dyn StatsStore>, mode: CountingMode) -> Self {
        Self { store, mode }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    /// Record one visit using the configured [`CountingMode`].
    pub async fn record_visit(&self, site: &SiteOrigin, visitor: &VisitorHash) -> Result<SiteStats> {
        let stats = match self.mode {
            CountingMode::Unique => self.store.record_visit(site, visitor).await?,
            CountingMode::Simple => self.store.update_stats(site).await?,
        };
        tracing::debug!(site = %site, uv = stats.uv, pv = stats.pv, "visit recorded");
        Ok(stats)
    }

    pub async fn get_stats(&self, site: &SiteOrigin) -> Result<SiteStats> {
        self.store.get_stats(site).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::Mutex;

    use super::*;
    use crate::origin::normalize;
    use crate::visitor::identify;

    /// Records which store method each call was routed to.
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<&'static str>>,
        pv: Mutex<HashMap<String, u64>>,
    }

    impl RecordingStore {
        async fn bump(&self, site: &SiteOrigin) -> SiteStats {
            let mut pv = self.pv.lock().await;
            let count = pv.entry(site.to_string()).or_default();
            *count += 1;
            SiteStats {
                uv: 1,
                pv: *count,
                ..SiteStats::zero(site.clone())
            }
        }
    }

    #[async_trait::async_trait]
    impl StatsStore for RecordingStore {
        async fn record_visit(&self, site: &SiteOrigin, _visitor: &VisitorHash) -> Result<SiteStats> {
            self.calls.lock().await.push("record_visit");
            Ok(self.bump(site).await)
        }

        async fn update_stats(&self, site: &SiteOrigin) -> Result<SiteStats> {
            self.calls.lock().await.push("update_stats");
            Ok(self.bump(site).await)
        }

        async fn get_stats(&self, site: &SiteOrigin) -> Result<SiteStats> {
            Ok(SiteStats::zero(site.clone()))
        }

        async fn get_visitor(
            &self,
            _site: &SiteOrigin,
            _visitor: &VisitorHash,
        ) -> Result<Option<VisitorRecord>> {
            Ok(None)
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn counting_mode_parses_known_values() {
        assert_eq!("unique".parse::<CountingMode>(), Ok(CountingMode::Unique));
        assert_eq!(" Simple ".parse::<CountingMode>(), Ok(CountingMode::Simple));
        assert!("approximate".parse::<CountingMode>().is_err());
        assert_eq!(CountingMode::default(), CountingMode::Unique);
    }

    #[test]
    fn zero_stats_have_no_timestamps() {
        let site = normalize("https://never-visited.example").expect("valid url");
        let stats = SiteStats::zero(site);
        assert_eq!(stats.counts(), Counts { uv: 0, pv: 0 });
        assert!(stats.created_at.is_none());
    }

    #[tokio::test]
    async fn updater_routes_by_mode() {
        let site = normalize("https://example.com/blog").expect("valid url");
        let visitor = identify(Some("1.2.3.4"), Some("ua"));

        let store = Arc::new(RecordingStore::default());
        let unique = StatsUpdater::new(store.clone(), CountingMode::Unique);
        let simple = StatsUpdater::new(store.clone(), CountingMode::Simple);

        unique.record_visit(&site, &visitor).await.expect("record");
        simple.record_visit(&site, &visitor).await.expect("record");

        assert_eq!(*store.calls.lock().await, vec!["record_visit", "update_stats"]);
    }
}
