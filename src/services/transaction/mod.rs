//! Transaction pipeline: wraps instructions in a transaction paid by the held
//! key, signs, and submits through the provider.
//!
//! Registry writes always use a finalized blockhash and are sent exactly once.
use std::{sync::Arc, time::Duration};

use log::{debug, info, warn};
use solana_sdk::{
    commitment_config::CommitmentConfig, instruction::Instruction, message::Message,
    pubkey::Pubkey, signature::Signature, transaction::Transaction,
};

use crate::{
    constants::{DEFAULT_CONFIRMATION_POLL_INTERVAL_MS, DEFAULT_CONFIRMATION_TIMEOUT_SECONDS},
    models::RegistryError,
    services::{sign_sdk_transaction, SolanaProviderTrait, SolanaSignTrait},
    utils::poll_until,
};

/// Bounds of the polled confirmation wait used for airdrops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationWait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationWait {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_CONFIRMATION_TIMEOUT_SECONDS),
            poll_interval: Duration::from_millis(DEFAULT_CONFIRMATION_POLL_INTERVAL_MS),
        }
    }
}

pub struct TransactionPipeline<P, S>
where
    P: SolanaProviderTrait,
    S: SolanaSignTrait,
{
    provider: Arc<P>,
    signer: Arc<S>,
    confirmation: ConfirmationWait,
}

impl<P, S> TransactionPipeline<P, S>
where
    P: SolanaProviderTrait,
    S: SolanaSignTrait,
{
    pub fn new(provider: Arc<P>, signer: Arc<S>, confirmation: ConfirmationWait) -> Self {
        Self {
            provider,
            signer,
            confirmation,
        }
    }

    /// The held key; fee payer of every transaction.
    pub fn payer(&self) -> Pubkey {
        self.signer.pubkey()
    }

    /// Builds a single-instruction transaction against a finalized blockhash
    /// and signs it with the held key.
    pub async fn build_signed(
        &self,
        instruction: Instruction,
    ) -> Result<Transaction, RegistryError> {
        let payer = self.payer();
        let (blockhash, _) = self
            .provider
            .get_latest_blockhash_with_commitment(CommitmentConfig::finalized())
            .await?;

        let message = Message::new_with_blockhash(&[instruction], Some(&payer), &blockhash);
        let (transaction, _) =
            sign_sdk_transaction(self.signer.as_ref(), Transaction::new_unsigned(message)).await?;
        Ok(transaction)
    }

    /// Signs and submits `instruction`, returning once the network confirms it.
    pub async fn submit(&self, instruction: Instruction) -> Result<Signature, RegistryError> {
        let transaction = self.build_signed(instruction).await?;

        let signature = self
            .provider
            .send_and_confirm_transaction(&transaction)
            .await?;

        info!("Transaction confirmed: {}", signature);
        Ok(signature)
    }

    /// Signs and simulates a read-only view, returning the program's return data.
    pub async fn simulate(&self, instruction: Instruction) -> Result<Vec<u8>, RegistryError> {
        let transaction = self.build_signed(instruction).await?;

        let outcome = self.provider.simulate_transaction(&transaction).await?;

        if let Some(err) = outcome.err {
            for line in &outcome.logs {
                debug!("simulation log: {}", line);
            }
            return Err(RegistryError::SimulationFailed(err));
        }

        outcome.return_data.ok_or_else(|| {
            RegistryError::SimulationFailed("program returned no data".to_string())
        })
    }

    /// Requests `lamports` for the held key and waits, bounded, for the
    /// airdrop to confirm.
    pub async fn airdrop(&self, lamports: u64) -> Result<Signature, RegistryError> {
        let payer = self.payer();
        let signature = self.provider.request_airdrop(&payer, lamports).await?;
        debug!("Airdrop of {} lamports requested: {}", lamports, signature);

        let outcome = poll_until(
            || self.provider.confirm_transaction(&signature),
            self.confirmation.timeout,
            self.confirmation.poll_interval,
            "airdrop confirmation",
        )
        .await;

        if !outcome.is_ready() {
            warn!(
                "Airdrop {} not confirmed within {:?} ({} checks)",
                signature,
                self.confirmation.timeout,
                outcome.attempts()
            );
            return Err(RegistryError::Unconfirmed(format!(
                "airdrop {signature} not confirmed within {}s",
                self.confirmation.timeout.as_secs()
            )));
        }

        info!("Airdrop confirmed: {}", signature);
        Ok(signature)
    }
}
