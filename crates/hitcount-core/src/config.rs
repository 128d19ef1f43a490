use crate::stats::CountingMode;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_dir: String,
    /// DuckDB `memory_limit` size string, e.g. `"512MB"` or `"1GB"`.
    pub duckdb_memory_limit: String,
    pub counting_mode: CountingMode,
    /// Base URL baked into `/track.js`. When unset the script posts back to
    /// the origin it was loaded from.
    pub public_url: Option<String>,
    /// `Cache-Control: max-age` for `/track.js`, in seconds.
    pub script_max_age_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            port: std::env::var("HITCOUNT_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|e| format!("invalid port: {e}"))?,
            data_dir: std::env::var("HITCOUNT_DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            duckdb_memory_limit: std::env::var("HITCOUNT_DUCKDB_MEMORY")
                .unwrap_or_else(|_| "1GB".to_string()),
            counting_mode: match std::env::var("HITCOUNT_COUNTING") {
                Ok(raw) => raw.parse()?,
                Err(_) => CountingMode::default(),
            },
            public_url: std::env::var("HITCOUNT_PUBLIC_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),
            script_max_age_secs: std::env::var("HITCOUNT_SCRIPT_MAX_AGE")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .map_err(|e| format!("invalid script max age: {e}"))?,
        })
    }

    /// Path of the DuckDB database file inside `data_dir`.
    pub fn db_path(&self) -> String {
        format!("{}/hitcount.db", self.data_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            data_dir: "./data".to_string(),
            duckdb_memory_limit: "1GB".to_string(),
            counting_mode: CountingMode::default(),
            public_url: None,
            script_max_age_secs: 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Tests in this module mutate the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: [&str; 6] = [
        "HITCOUNT_PORT",
        "HITCOUNT_DATA_DIR",
        "HITCOUNT_DUCKDB_MEMORY",
        "HITCOUNT_COUNTING",
        "HITCOUNT_PUBLIC_URL",
        "HITCOUNT_SCRIPT_MAX_AGE",
    ];

    fn with_env<T>(vars: &[(&str, &str)], f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for key in VARS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let out = f();
        for key in VARS {
            std::env::remove_var(key);
        }
        out
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = with_env(&[], Config::from_env).expect("defaults parse");
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.data_dir, "./data");
        assert_eq!(cfg.duckdb_memory_limit, "1GB");
        assert_eq!(cfg.counting_mode, CountingMode::Unique);
        assert_eq!(cfg.public_url, None);
        assert_eq!(cfg.script_max_age_secs, 3600);
        assert_eq!(cfg.db_path(), "./data/hitcount.db");
    }

    #[test]
    fn overrides_are_read() {
        let cfg = with_env(
            &[
                ("HITCOUNT_PORT", "8080"),
                ("HITCOUNT_DATA_DIR", "/var/lib/hitcount"),
                ("HITCOUNT_COUNTING", " Simple "),
                ("HITCOUNT_SCRIPT_MAX_AGE", "60"),
            ],
            Config::from_env,
        )
        .expect("valid overrides");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.db_path(), "/var/lib/hitcount/hitcount.db");
        assert_eq!(cfg.counting_mode, CountingMode::Simple);
        assert_eq!(cfg.script_max_age_secs, 60);
    }

    #[test]
    fn unknown_counting_mode_is_an_error() {
        let err = with_env(&[("HITCOUNT_COUNTING", "bogus")], Config::from_env)
            .expect_err("bogus mode rejected");
        assert!(err.contains("counting mode"), "{err}");
    }

    #[test]
    fn bad_numbers_are_errors() {
        let err = with_env(&[("HITCOUNT_PORT", "http")], Config::from_env)
            .expect_err("bad port rejected");
        assert!(err.starts_with("invalid port"), "{err}");

        let err = with_env(&[("HITCOUNT_SCRIPT_MAX_AGE", "1h")], Config::from_env)
            .expect_err("bad max age rejected");
        assert!(err.starts_with("invalid script max age"), "{err}");
    }

    #[test]
    fn public_url_is_trimmed() {
        let cfg = with_env(&[("HITCOUNT_PUBLIC_URL", "https://x/ ")], Config::from_env)
            .expect("valid url");
        assert_eq!(cfg.public_url.as_deref(), Some("https://x"));

        let cfg = with_env(&[("HITCOUNT_PUBLIC_URL", "   ")], Config::from_env)
            .expect("blank url ignored");
        assert_eq!(cfg.public_url, None);
    }
}
