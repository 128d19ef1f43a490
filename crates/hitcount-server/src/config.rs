/// Re-export `Config` from `hitcount-core` for use within this crate.
///
/// All environment-variable parsing lives in `hitcount-core` so it can be
/// shared with integration tests without depending on the full server.
pub use hitcount_core::config::Config;
