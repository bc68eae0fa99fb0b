use thiserror::Error;

use crate::{models::SignerError, services::SolanaProviderError};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("No bump seed produced an off-curve address")]
    DerivationExhausted,

    #[error("Seed is {len} bytes, at most {max} allowed")]
    SeedTooLong { len: usize, max: usize },

    #[error("Malformed account data: {0}")]
    MalformedAccount(String),

    #[error("Missing signer: {0}")]
    MissingSigner(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Transport failure: {0}")]
    TransportFailure(SolanaProviderError),

    #[error("Transaction not confirmed: {0}")]
    Unconfirmed(String),

    #[error("Domain is {len} bytes, at most {max} allowed")]
    DomainTooLong { len: usize, max: usize },

    #[error("Online value must be non-negative, got {0}")]
    NegativeOnlineValue(i32),

    #[error("Insufficient balance: have {balance} lamports, need {required}")]
    InsufficientBalance { balance: u64, required: u64 },

    #[error("Simulation failed: {0}")]
    SimulationFailed(String),
}

impl RegistryError {
    /// Whether this error signals a broken invariant rather than an ordinary
    /// failure the caller can act on.
    ///
    /// Only `DerivationExhausted` is fatal: every seed tuple the client uses
    /// is expected to have an off-curve bump.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RegistryError::DerivationExhausted)
    }

    /// Whether the transport failed in a way that rerunning the operation may
    /// fix. Never true for `Unconfirmed`: the transaction may still land.
    pub fn is_transient(&self) -> bool {
        matches!(self, RegistryError::TransportFailure(e) if e.is_transient())
    }
}

impl From<SolanaProviderError> for RegistryError {
    fn from(err: SolanaProviderError) -> Self {
        match err {
            SolanaProviderError::ConfirmationTimeout(msg) => RegistryError::Unconfirmed(msg),
            other => RegistryError::TransportFailure(other),
        }
    }
}

impl From<SignerError> for RegistryError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::MissingSigner(pubkey) => RegistryError::MissingSigner(pubkey.to_string()),
            other => RegistryError::SigningFailed(other.to_string()),
        }
    }
}
