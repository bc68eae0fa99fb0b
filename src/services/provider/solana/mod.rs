//! Solana RPC provider.
//!
//! [`SolanaProviderTrait`] lists the network calls the registry client makes;
//! [`SolanaProvider`] implements them on the non-blocking `RpcClient`. Every
//! call is made once and its failure is classified into a
//! [`SolanaProviderError`]; nothing here retries.
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
#[cfg(test)]
use mockall::automock;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::RpcFilterType,
    rpc_request::RpcError,
};
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{Transaction, TransactionError},
};
use thiserror::Error;

use crate::utils::decode_program_data;

/// JSON-RPC error codes of Solana nodes.
mod rpc_code {
    pub const PREFLIGHT_FAILURE: i64 = -32002;
    pub const SIGNATURE_VERIFICATION: i64 = -32003;
    pub const BLOCK_NOT_AVAILABLE: i64 = -32004;
    pub const NODE_UNHEALTHY: i64 = -32005;
    pub const BLOCKHASH_NOT_FOUND: i64 = -32008;
    pub const ALREADY_PROCESSED: i64 = -32009;
    pub const SIGNATURE_LEN_MISMATCH: i64 = -32013;
    pub const MIN_CONTEXT_SLOT: i64 = -32016;
    pub const UNSUPPORTED_VERSION: i64 = -32015;
    pub const INVALID_PARAMS: i64 = -32602;
}

#[derive(Error, Debug)]
pub enum SolanaProviderError {
    /// The node could not be reached or the connection dropped.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The node answered with an error unrelated to the transaction itself.
    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Request error (HTTP {status_code}): {error}")]
    RequestError { error: String, status_code: u16 },

    #[error("Insufficient funds for transaction: {0}")]
    InsufficientFunds(String),

    #[error("Blockhash not found or expired: {0}")]
    BlockhashNotFound(String),

    /// The transaction was rejected, by preflight or by the program.
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),

    /// Sent, but not observed at the requested commitment before the
    /// blockhash expired. The transaction may still land.
    #[error("Confirmation timeout: {0}")]
    ConfirmationTimeout(String),
}

impl SolanaProviderError {
    /// Whether running the same operation again has a chance of succeeding.
    ///
    /// A confirmation timeout is not transient: the first attempt may still
    /// land and a second one would apply twice.
    pub fn is_transient(&self) -> bool {
        match self {
            SolanaProviderError::NetworkError(_)
            | SolanaProviderError::RpcError(_)
            | SolanaProviderError::BlockhashNotFound(_) => true,
            SolanaProviderError::RequestError { status_code, .. } => {
                matches!(*status_code, 408 | 425 | 429 | 500 | 502..=504 | 506..=599)
            }
            SolanaProviderError::InsufficientFunds(_)
            | SolanaProviderError::InvalidTransaction(_)
            | SolanaProviderError::AlreadyProcessed(_)
            | SolanaProviderError::ConfirmationTimeout(_) => false,
        }
    }

    pub fn from_rpc_error(error: ClientError) -> Self {
        let text = error.to_string();
        match error.kind() {
            ClientErrorKind::Io(_) => SolanaProviderError::NetworkError(text),
            ClientErrorKind::Reqwest(reqwest_err) => match reqwest_err.status() {
                Some(status) => SolanaProviderError::RequestError {
                    error: text,
                    status_code: status.as_u16(),
                },
                None => SolanaProviderError::NetworkError(text),
            },
            ClientErrorKind::RpcError(RpcError::RpcResponseError { code, message, .. }) => {
                Self::classify(Some(*code), message, text)
            }
            ClientErrorKind::RpcError(RpcError::ForUser(message))
            | ClientErrorKind::Custom(message) => Self::classify(None, message, text),
            ClientErrorKind::TransactionError(tx_error) => {
                Self::from_transaction_error(tx_error, text)
            }
            _ => SolanaProviderError::RpcError(text),
        }
    }

    /// Classifies a node's error response by code, falling back to the
    /// message when the code is absent or generic.
    fn classify(code: Option<i64>, message: &str, text: String) -> Self {
        let message = normalize(message);
        if message.contains("unabletoconfirmtransaction") {
            return SolanaProviderError::ConfirmationTimeout(text);
        }

        match code {
            Some(rpc_code::BLOCKHASH_NOT_FOUND) => SolanaProviderError::BlockhashNotFound(text),
            Some(rpc_code::ALREADY_PROCESSED) => SolanaProviderError::AlreadyProcessed(text),
            Some(
                rpc_code::SIGNATURE_VERIFICATION
                | rpc_code::SIGNATURE_LEN_MISMATCH
                | rpc_code::UNSUPPORTED_VERSION
                | rpc_code::INVALID_PARAMS,
            ) => SolanaProviderError::InvalidTransaction(text),
            Some(
                rpc_code::BLOCK_NOT_AVAILABLE
                | rpc_code::NODE_UNHEALTHY
                | rpc_code::MIN_CONTEXT_SLOT,
            ) => SolanaProviderError::RpcError(text),
            Some(rpc_code::PREFLIGHT_FAILURE) => {
                if message.contains("blockhashnotfound") {
                    SolanaProviderError::BlockhashNotFound(text)
                } else if message.contains("insufficientfunds") {
                    SolanaProviderError::InsufficientFunds(text)
                } else {
                    SolanaProviderError::InvalidTransaction(text)
                }
            }
            _ if message.contains("insufficientfunds") => {
                SolanaProviderError::InsufficientFunds(text)
            }
            _ if message.contains("blockhashnotfound") => {
                SolanaProviderError::BlockhashNotFound(text)
            }
            _ if message.contains("alreadyprocessed") => {
                SolanaProviderError::AlreadyProcessed(text)
            }
            _ => SolanaProviderError::RpcError(text),
        }
    }

    fn from_transaction_error(tx_error: &TransactionError, text: String) -> Self {
        match tx_error {
            TransactionError::InsufficientFundsForFee
            | TransactionError::InsufficientFundsForRent { .. } => {
                SolanaProviderError::InsufficientFunds(text)
            }
            TransactionError::BlockhashNotFound => SolanaProviderError::BlockhashNotFound(text),
            TransactionError::AlreadyProcessed => SolanaProviderError::AlreadyProcessed(text),
            TransactionError::AccountInUse
            | TransactionError::AccountLoadedTwice
            | TransactionError::ClusterMaintenance => SolanaProviderError::RpcError(text),
            // program and signature failures are final
            _ => SolanaProviderError::InvalidTransaction(text),
        }
    }
}

/// Lowercases and strips spaces so "Blockhash not found" and
/// "BlockhashNotFound" compare equal.
fn normalize(message: &str) -> String {
    message.to_lowercase().replace(' ', "")
}

/// What a simulated transaction produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Execution error, `None` when the transaction would succeed.
    pub err: Option<String>,
    pub logs: Vec<String>,
    /// Raw bytes the invoked program set as return data.
    pub return_data: Option<Vec<u8>>,
}

/// The network operations the registry client consumes.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait SolanaProviderTrait: Send + Sync {
    /// Retrieves the latest blockhash and its last valid block height.
    async fn get_latest_blockhash_with_commitment(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError>;

    /// Retrieves an account, `None` when it does not exist.
    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError>;

    /// Retrieves every account owned by `program_id` matching all `filters`.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>, SolanaProviderError>;

    /// Sends a signed transaction and waits for its confirmation.
    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError>;

    /// Requests `lamports` from the cluster faucet.
    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SolanaProviderError>;

    /// Retrieves the balance (in lamports) of the given address.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, SolanaProviderError>;

    /// Checks once whether a signature has reached the provider's commitment.
    async fn confirm_transaction(&self, signature: &Signature)
        -> Result<bool, SolanaProviderError>;

    /// Simulates a transaction and returns the simulation result.
    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SimulationOutcome, SolanaProviderError>;
}

pub struct SolanaProvider {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for SolanaProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaProvider")
            .field("url", &self.client.url())
            .field("commitment", &self.commitment)
            .finish()
    }
}

impl SolanaProvider {
    /// Creates a provider at finalized commitment. Registry reads and writes
    /// never run at a weaker level.
    pub fn new(url: &str, timeout_seconds: u64) -> Self {
        debug!(
            "Creating Solana provider for {} with timeout {}s",
            url, timeout_seconds
        );
        let commitment = CommitmentConfig::finalized();
        let client = RpcClient::new_with_timeout_and_commitment(
            url.to_string(),
            Duration::from_secs(timeout_seconds),
            commitment,
        );
        Self { client, commitment }
    }
}

#[async_trait]
impl SolanaProviderTrait for SolanaProvider {
    async fn get_latest_blockhash_with_commitment(
        &self,
        commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError> {
        self.client
            .get_latest_blockhash_with_commitment(commitment)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError> {
        self.client
            .get_account_with_commitment(pubkey, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>, SolanaProviderError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };

        self.client
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SolanaProviderError> {
        self.client
            .request_airdrop(pubkey, lamports)
            .await
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, SolanaProviderError> {
        self.client
            .get_balance_with_commitment(pubkey, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
    ) -> Result<bool, SolanaProviderError> {
        self.client
            .confirm_transaction_with_commitment(signature, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(SolanaProviderError::from_rpc_error)
    }

    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SimulationOutcome, SolanaProviderError> {
        let result = self
            .client
            .simulate_transaction(transaction)
            .await
            .map(|response| response.value)
            .map_err(SolanaProviderError::from_rpc_error)?;

        let return_data = match result.return_data {
            Some(data) => Some(decode_program_data(&data.data.0).map_err(|e| {
                SolanaProviderError::RpcError(format!("Invalid return data encoding: {e}"))
            })?),
            None => None,
        };

        Ok(SimulationOutcome {
            err: result.err.map(|e| e.to_string()),
            logs: result.logs.unwrap_or_default(),
            return_data,
        })
    }
}
