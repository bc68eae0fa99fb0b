//! Shared fixtures for the integration tests.
use std::sync::Arc;

use registry_client::services::{ConfirmationWait, LocalSigner, RegistryClient};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

pub mod ledger;
pub use ledger::InMemoryLedger;

pub type LedgerClient = RegistryClient<InMemoryLedger, LocalSigner>;

pub struct TestContext {
    pub program_id: Pubkey,
    pub ledger: Arc<InMemoryLedger>,
    pub client: LedgerClient,
    pub wallet: Pubkey,
}

impl TestContext {
    pub fn new() -> Self {
        let program_id = Pubkey::new_unique();
        let ledger = Arc::new(InMemoryLedger::new(program_id));
        let keypair = Keypair::new();
        let wallet = keypair.pubkey();
        let client = client_for(&ledger, program_id, keypair);
        Self {
            program_id,
            ledger,
            client,
            wallet,
        }
    }

    /// A second client on the same ledger holding `keypair`.
    pub fn client_with(&self, keypair: Keypair) -> LedgerClient {
        client_for(&self.ledger, self.program_id, keypair)
    }
}

fn client_for(ledger: &Arc<InMemoryLedger>, program_id: Pubkey, keypair: Keypair) -> LedgerClient {
    RegistryClient::new(
        program_id,
        ledger.clone(),
        Arc::new(LocalSigner::new(keypair)),
        ConfirmationWait {
            timeout: std::time::Duration::from_secs(2),
            poll_interval: std::time::Duration::from_millis(10),
        },
    )
}
