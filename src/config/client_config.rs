//! Client configuration loaded from environment variables.
//!
//! Required:
//! - SOLANA_RPC_URL: JSON-RPC endpoint
//! - PROGRAM_ID: base58 address of the registry program
//! - WALLET_PRIVATE_KEY: base58 encoded 64-byte keypair
//!
//! Optional:
//! - RPC_TIMEOUT_SECONDS (default 30)
//! - CONFIRMATION_TIMEOUT_SECONDS (default 60)
//! - CONFIRMATION_POLL_INTERVAL_MS (default 500)
use std::{env, fmt, str::FromStr, time::Duration};

use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::{
    constants::{
        DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECONDS,
        DEFAULT_RPC_TIMEOUT_SECONDS,
    },
    services::ConfirmationWait,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid program id: {0}")]
    InvalidProgramId(String),
}

#[derive(Clone)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub wallet_private_key: String,
    pub rpc_timeout_seconds: u64,
    pub confirmation_timeout_seconds: u64,
    pub confirmation_poll_interval_ms: u64,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rpc_url", &self.rpc_url)
            .field("program_id", &self.program_id)
            .field("wallet_private_key", &"<redacted>")
            .field("rpc_timeout_seconds", &self.rpc_timeout_seconds)
            .field(
                "confirmation_timeout_seconds",
                &self.confirmation_timeout_seconds,
            )
            .field(
                "confirmation_poll_interval_ms",
                &self.confirmation_poll_interval_ms,
            )
            .finish()
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

fn number_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = required("SOLANA_RPC_URL")?;
        let program_id = required("PROGRAM_ID")?;
        let program_id = Pubkey::from_str(program_id.trim())
            .map_err(|e| ConfigError::InvalidProgramId(format!("{program_id}: {e}")))?;
        let wallet_private_key = required("WALLET_PRIVATE_KEY")?;

        Ok(Self {
            rpc_url,
            program_id,
            wallet_private_key,
            rpc_timeout_seconds: number_or("RPC_TIMEOUT_SECONDS", DEFAULT_RPC_TIMEOUT_SECONDS),
            confirmation_timeout_seconds: number_or(
                "CONFIRMATION_TIMEOUT_SECONDS",
                DEFAULT_CONFIRMATION_TIMEOUT_SECONDS,
            ),
            confirmation_poll_interval_ms: number_or(
                "CONFIRMATION_POLL_INTERVAL_MS",
                DEFAULT_CONFIRMATION_POLL_INTERVAL_MS,
            ),
        })
    }

    pub fn confirmation_wait(&self) -> ConfirmationWait {
        ConfirmationWait {
            timeout: Duration::from_secs(self.confirmation_timeout_seconds),
            poll_interval: Duration::from_millis(self.confirmation_poll_interval_ms),
        }
    }
}
