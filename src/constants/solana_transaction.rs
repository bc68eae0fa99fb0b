//! Constants for Solana transaction submission and confirmation.

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Default per-request RPC timeout (in seconds)
pub const DEFAULT_RPC_TIMEOUT_SECONDS: u64 = 30;

/// Default upper bound on waiting for an airdrop to confirm (in seconds)
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECONDS: u64 = 60;

/// Default delay between confirmation status polls (in milliseconds)
pub const DEFAULT_CONFIRMATION_POLL_INTERVAL_MS: u64 = 500;
