use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Stand-in for a client address or user agent the transport could not
/// provide. Anonymous visits still count, coalesced into one bucket per site.
pub const UNKNOWN: &str = "unknown";

const SEPARATOR: &str = "|";

/// One-way identifier for a visitor: 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitorHash(String);

impl VisitorHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute a visitor hash from the client address and User-Agent.
///
/// Formula: `hex(sha256(address + "|" + user_agent))`.
///
/// Missing or blank inputs are replaced with [`UNKNOWN`]. Raw inputs never
/// leave this function; only the digest is handed to storage.
pub fn identify(client_address: Option<&str>, user_agent: Option<&str>) -> VisitorHash {
    let address = or_unknown(client_address);
    let agent = or_unknown(user_agent);

    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update(SEPARATOR.as_bytes());
    hasher.update(agent.as_bytes());
    VisitorHash(hex::encode(hasher.finalize()))
}

fn or_unknown(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => UNKNOWN,
    }
}
