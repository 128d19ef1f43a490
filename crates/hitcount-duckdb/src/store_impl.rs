use async_trait::async_trait;
use chrono::Utc;

use hitcount_core::{SiteOrigin, SiteStats, StatsStore, VisitorHash, VisitorRecord};

use crate::DuckDbBackend;

#[async_trait]
impl StatsStore for DuckDbBackend {
    async fn record_visit(
        &self,
        site: &SiteOrigin,
        visitor: &VisitorHash,
    ) -> anyhow::Result<SiteStats> {
        crate::stats::record_visit_inner(self, site, visitor, Utc::now()).await
    }

    async fn update_stats(&self, site: &SiteOrigin) -> anyhow::Result<SiteStats> {
        crate::stats::update_stats_inner(self, site, Utc::now()).await
    }

    async fn get_stats(&self, site: &SiteOrigin) -> anyhow::Result<SiteStats> {
        crate::stats::get_stats_inner(self, site).await
    }

    async fn get_visitor(
        &self,
        site: &SiteOrigin,
        visitor: &VisitorHash,
    ) -> anyhow::Result<Option<VisitorRecord>> {
        crate::stats::get_visitor_inner(self, site, visitor).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        DuckDbBackend::ping(self).await
    }
}
