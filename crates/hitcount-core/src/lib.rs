pub mod config;
pub mod error;
pub mod origin;
pub mod stats;
pub mod visitor;

pub use error::CoreError;
pub use origin::{normalize, SiteOrigin};
pub use stats::{CountingMode, Counts, SiteStats, StatsStore, StatsUpdater, VisitorRecord};
pub use visitor::{identify, VisitorHash};
