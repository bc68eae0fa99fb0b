use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SignerError {
    #[error("Failed to sign transaction: {0}")]
    SigningError(String),

    #[error("Invalid key format: {0}")]
    KeyError(String),

    #[error("Transaction requires a signature from {0}, which the held key cannot provide")]
    MissingSigner(Pubkey),
}
