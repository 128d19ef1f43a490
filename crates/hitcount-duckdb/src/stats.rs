use anyhow::Result;
use chrono::{DateTime, Utc};
use duckdb::{Connection, OptionalExt};

use hitcount_core::{SiteOrigin, SiteStats, VisitorHash, VisitorRecord};

use crate::DuckDbBackend;

/// Insert a first-time visitor or bump an existing one in a single statement.
/// A concurrent duplicate insert lands on the `DO UPDATE` branch instead of
/// failing, so a race can never create two rows for one pair.
const UPSERT_VISITOR_SQL: &str = "\
    INSERT INTO visitors (site_origin, visitor_hash, first_visit, last_visit, visit_count) \
    VALUES (?1, ?2, ?3, ?4, 1) \
    ON CONFLICT (site_origin, visitor_hash) DO UPDATE \
    SET last_visit = EXCLUDED.last_visit, visit_count = visitors.visit_count + 1";

/// Page view from a visitor never seen on this site before.
const BUMP_NEW_VISITOR_SQL: &str = "\
    INSERT INTO site_stats (site_origin, uv, pv, created_at, updated_at) \
    VALUES (?1, 1, 1, ?2, ?3) \
    ON CONFLICT (site_origin) DO UPDATE \
    SET uv = site_stats.uv + 1, pv = site_stats.pv + 1, updated_at = EXCLUDED.updated_at";

/// Page view that does not move `uv` unless the row is being created.
const BUMP_PAGEVIEW_SQL: &str = "\
    INSERT INTO site_stats (site_origin, uv, pv, created_at, updated_at) \
    VALUES (?1, 1, 1, ?2, ?3) \
    ON CONFLICT (site_origin) DO UPDATE \
    SET pv = site_stats.pv + 1, updated_at = EXCLUDED.updated_at";

const SELECT_STATS_SQL: &str = "\
    SELECT uv, pv, CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR) \
    FROM site_stats WHERE site_origin = ?1";

fn format_ts(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn to_count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// Deduplicating write. Both upserts share one transaction, so readers never
/// see a visitor row without its matching counter increment.
pub(crate) async fn record_visit_inner(
    db: &DuckDbBackend,
    site: &SiteOrigin,
    visitor: &VisitorHash,
    now: DateTime<Utc>,
) -> Result<SiteStats> {
    let mut conn = db.conn.lock().await;
    let tx = conn.transaction()?;
    let now_str = format_ts(now);

    tx.execute(
        UPSERT_VISITOR_SQL,
        duckdb::params![site.as_str(), visitor.as_str(), now_str, now_str],
    )?;
    let visit_count: i64 = tx
        .prepare("SELECT visit_count FROM visitors WHERE site_origin = ?1 AND visitor_hash = ?2")?
        .query_row(duckdb::params![site.as_str(), visitor.as_str()], |row| {
            row.get(0)
        })?;
    let is_new_visitor = visit_count == 1;

    let bump = if is_new_visitor {
        BUMP_NEW_VISITOR_SQL
    } else {
        BUMP_PAGEVIEW_SQL
    };
    tx.execute(bump, duckdb::params![site.as_str(), now_str, now_str])?;

    let stats = select_stats(&tx, site)?;
    tx.commit()?;

    tracing::debug!(
        site = %site,
        is_new_visitor,
        visit_count,
        "visitor upserted"
    );
    stats.ok_or_else(|| anyhow::anyhow!("site_stats row missing after upsert for {site}"))
}

/// Non-deduplicating write: one counter upsert, no visitor rows.
pub(crate) async fn update_stats_inner(
    db: &DuckDbBackend,
    site: &SiteOrigin,
    now: DateTime<Utc>,
) -> Result<SiteStats> {
    let mut conn = db.conn.lock().await;
    let tx = conn.transaction()?;
    let now_str = format_ts(now);

    tx.execute(BUMP_PAGEVIEW_SQL, duckdb::params![site.as_str(), now_str, now_str])?;
    let stats = select_stats(&tx, site)?;
    tx.commit()?;

    stats.ok_or_else(|| anyhow::anyhow!("site_stats row missing after upsert for {site}"))
}

pub(crate) async fn get_stats_inner(db: &DuckDbBackend, site: &SiteOrigin) -> Result<SiteStats> {
    let conn = db.conn.lock().await;
    let stats = select_stats(&conn, site)?;
    Ok(stats.unwrap_or_else(|| SiteStats::zero(site.clone())))
}

pub(crate) async fn get_visitor_inner(
    db: &DuckDbBackend,
    site: &SiteOrigin,
    visitor: &VisitorHash,
) -> Result<Option<VisitorRecord>> {
    let conn = db.conn.lock().await;
    let mut stmt = conn.prepare(
        "SELECT CAST(first_visit AS VARCHAR), CAST(last_visit AS VARCHAR), visit_count \
         FROM visitors WHERE site_origin = ?1 AND visitor_hash = ?2",
    )?;
    let record = stmt
        .query_row(duckdb::params![site.as_str(), visitor.as_str()], |row| {
            Ok(VisitorRecord {
                site_origin: site.clone(),
                visitor_hash: visitor.clone(),
                first_visit: row.get(0)?,
                last_visit: row.get(1)?,
                visit_count: to_count(row.get(2)?),
            })
        })
        .optional()?;
    Ok(record)
}

fn select_stats(conn: &Connection, site: &SiteOrigin) -> Result<Option<SiteStats>> {
    let mut stmt = conn.prepare(SELECT_STATS_SQL)?;
    let stats = stmt
        .query_row(duckdb::params![site.as_str()], |row| {
            Ok(SiteStats {
                site_origin: site.clone(),
                uv: to_count(row.get(0)?),
                pv: to_count(row.get(1)?),
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })
        .optional()?;
    Ok(stats)
}
