/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup.
///
/// `memory_limit` comes from `Config.duckdb_memory_limit`
/// (env `HITCOUNT_DUCKDB_MEMORY`, default `"1GB"`). Always set an explicit
/// limit: the DuckDB default of 80% of system RAM is not acceptable for a
/// server process.
///
/// Counters are never written with a separate read and write. Both tables
/// carry the unique key that the `ON CONFLICT` upserts in `stats.rs` target.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- SITE STATS (one row per site origin)
-- ===========================================
CREATE TABLE IF NOT EXISTS site_stats (
    site_origin     VARCHAR PRIMARY KEY,           -- normalized scheme://host[:port][/first-segment]
    uv              BIGINT NOT NULL DEFAULT 0,
    pv              BIGINT NOT NULL DEFAULT 0,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- ===========================================
-- VISITORS (deduplicating counting mode only)
-- ===========================================
-- visitor_hash is sha256(address | user_agent); raw inputs are never stored.
CREATE TABLE IF NOT EXISTS visitors (
    site_origin     VARCHAR NOT NULL,
    visitor_hash    VARCHAR(64) NOT NULL,
    first_visit     TIMESTAMP NOT NULL,
    last_visit      TIMESTAMP NOT NULL,
    visit_count     BIGINT NOT NULL DEFAULT 1,
    UNIQUE (site_origin, visitor_hash)            -- also serves (site_origin, visitor_hash) lookups
);
CREATE INDEX IF NOT EXISTS idx_visitors_site
    ON visitors(site_origin);
"#
    )
}

/// Bookkeeping table for one-off schema changes applied after `init_sql`.
pub const MIGRATIONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    id          VARCHAR PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;
