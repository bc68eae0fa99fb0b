//! Solana signer for the held wallet key.
//!
//! # Architecture
//!
//! ```text
//! SolanaSignTrait
//!   └── LocalSigner (base58 keypair loaded from configuration)
//! ```
//!
//! `sign_sdk_transaction` works over any `SolanaSignTrait` implementation, so
//! remote key stores can be added behind the same trait.
use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use mockall::automock;
use solana_sdk::{pubkey::Pubkey, signature::Signature, transaction::Transaction};

use crate::models::SignerError;

mod local_signer;
pub use local_signer::*;

#[async_trait]
#[cfg_attr(test, automock)]
/// Trait defining Solana-specific signing operations
pub trait SolanaSignTrait: Sync + Send {
    /// Returns the public key of the held key.
    fn pubkey(&self) -> Pubkey;

    /// Signs a message using the Solana signing scheme
    ///
    /// # Arguments
    ///
    /// * `message` - The message bytes to sign
    ///
    /// # Returns
    ///
    /// A Result containing either the Solana Signature or a SignerError
    async fn sign(&self, message: &[u8]) -> Result<Signature, SignerError>;
}

/// Signs a raw Solana SDK transaction by finding the signer's position and adding the signature
///
/// Only the held key can sign, so every required signer of the message must
/// be that key. Any other required signer fails with
/// `SignerError::MissingSigner` before anything is signed.
pub async fn sign_sdk_transaction<T: SolanaSignTrait + ?Sized>(
    signer: &T,
    mut transaction: Transaction,
) -> Result<(Transaction, Signature), SignerError> {
    let signer_pubkey = signer.pubkey();
    let num_required = transaction.message.header.num_required_signatures as usize;

    if let Some(other) = transaction
        .message
        .account_keys
        .iter()
        .take(num_required)
        .find(|key| **key != signer_pubkey)
    {
        return Err(SignerError::MissingSigner(*other));
    }

    // Find the position of the signer's public key in account_keys
    let signer_index = transaction
        .message
        .account_keys
        .iter()
        .take(num_required)
        .position(|key| *key == signer_pubkey)
        .ok_or_else(|| {
            SignerError::SigningError(
                "Signer public key not found in transaction signers".to_string(),
            )
        })?;

    let signature = signer.sign(&transaction.message_data()).await?;

    // Ensure signatures array has exactly num_required_signatures slots
    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[signer_index] = signature;

    debug!("signed transaction as {}", signer_pubkey);
    Ok((transaction, signature))
}
