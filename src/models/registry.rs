//! Typed records stored by the registry program.

use std::fmt;

use chrono::DateTime;
use solana_sdk::pubkey::Pubkey;

/// A client registered under a registry, with an expiry and a request quota.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    /// Registry this entry belongs to.
    pub parent: Pubkey,
    /// The registered client account.
    pub registered: Pubkey,
    /// Unix timestamp (seconds) when the registration expires.
    pub until: i64,
    /// Request limit for this client.
    pub limit: u32,
}

/// A node registered under a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEntry {
    /// Registry this entry belongs to.
    pub parent: Pubkey,
    /// The registered node account.
    pub registered: Pubkey,
    /// Domain the node serves, at most 253 bytes.
    pub domain: String,
    /// Online counter reported by the node itself.
    pub online: i32,
    pub active: bool,
}

/// Return value of the program's `check_client` view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub until: i64,
    pub limit: u32,
}

/// Return value of the program's `check_node` view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub domain: String,
    pub active: bool,
}

fn format_unix(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}

impl fmt::Display for ClientEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Parent: {}", self.parent)?;
        writeln!(f, "  Registered: {}", self.registered)?;
        writeln!(f, "  Valid until: {}", format_unix(self.until))?;
        write!(f, "  Limit: {}", self.limit)
    }
}

impl fmt::Display for NodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Parent: {}", self.parent)?;
        writeln!(f, "  Registered: {}", self.registered)?;
        writeln!(f, "  Domain: {}", self.domain)?;
        writeln!(f, "  Online: {}", self.online)?;
        write!(f, "  Active: {}", self.active)
    }
}

impl fmt::Display for ClientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Valid until: {}", format_unix(self.until))?;
        write!(f, "  Limit: {}", self.limit)
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Domain: {}", self.domain)?;
        write!(f, "  Active: {}", self.active)
    }
}
