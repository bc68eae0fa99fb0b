//! Registry facade: one method per logical registry operation.
//!
//! Writes go derive -> build -> submit; reads go derive -> fetch -> decode.
//! Registries are addressed by name under the held key, except for the node
//! update operations, which name the registry authority explicitly because
//! they are signed by a node rather than by the authority.
use std::sync::Arc;

use log::{debug, warn};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use solana_system_interface::instruction as system_instruction;

use crate::{
    constants::{CLIENT_ENTRY_SIZE, ENTRY_PARENT_OFFSET, NODE_ENTRY_SIZE},
    domain::{
        decode_client_entry, decode_client_info, decode_node_entry, decode_node_info,
        entry_address, registry_address, RegistryInstructionBuilder,
    },
    models::{ClientEntry, ClientInfo, NodeEntry, NodeInfo, RegistryError},
    services::{ConfirmationWait, SolanaProviderTrait, SolanaSignTrait, TransactionPipeline},
};

pub struct RegistryClient<P, S>
where
    P: SolanaProviderTrait,
    S: SolanaSignTrait,
{
    program_id: Pubkey,
    provider: Arc<P>,
    pipeline: TransactionPipeline<P, S>,
    builder: RegistryInstructionBuilder,
}

impl<P, S> RegistryClient<P, S>
where
    P: SolanaProviderTrait,
    S: SolanaSignTrait,
{
    pub fn new(
        program_id: Pubkey,
        provider: Arc<P>,
        signer: Arc<S>,
        confirmation: ConfirmationWait,
    ) -> Self {
        Self {
            program_id,
            pipeline: TransactionPipeline::new(provider.clone(), signer, confirmation),
            provider,
            builder: RegistryInstructionBuilder::new(program_id),
        }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    /// The held key.
    pub fn wallet(&self) -> Pubkey {
        self.pipeline.payer()
    }

    /// Address of the registry `name` owned by the held key.
    pub fn registry_address(&self, name: &str) -> Result<Pubkey, RegistryError> {
        self.registry_address_of(&self.wallet(), name)
    }

    /// Address of the registry `name` owned by `authority`.
    pub fn registry_address_of(
        &self,
        authority: &Pubkey,
        name: &str,
    ) -> Result<Pubkey, RegistryError> {
        Ok(registry_address(&self.program_id, authority, name)?.0)
    }

    /// Address of the entry for `account` in the registry `name` of the held key.
    pub fn entry_address(&self, name: &str, account: &Pubkey) -> Result<Pubkey, RegistryError> {
        let registry = self.registry_address(name)?;
        Ok(entry_address(&self.program_id, account, &registry)?.0)
    }

    /// Creates the registry `name` owned by the held key.
    pub async fn create_registry(&self, name: &str) -> Result<(Signature, Pubkey), RegistryError> {
        let (instruction, registry) = self.builder.init_registry(&self.wallet(), name)?;
        let signature = self.pipeline.submit(instruction).await?;
        Ok((signature, registry))
    }

    /// Registers `account` as a client valid until the Unix time `until`.
    pub async fn add_client(
        &self,
        name: &str,
        account: &Pubkey,
        until: i64,
        limit: u32,
    ) -> Result<Signature, RegistryError> {
        let authority = self.wallet();
        let registry = self.registry_address(name)?;
        let instruction = self
            .builder
            .add_client(&authority, &registry, account, until, limit)?;
        self.pipeline.submit(instruction).await
    }

    pub async fn add_node(
        &self,
        name: &str,
        account: &Pubkey,
        domain: &str,
    ) -> Result<Signature, RegistryError> {
        let authority = self.wallet();
        let registry = self.registry_address(name)?;
        let instruction = self
            .builder
            .add_node(&authority, &registry, account, domain)?;
        self.pipeline.submit(instruction).await
    }

    pub async fn delegate_node(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<Signature, RegistryError> {
        let authority = self.wallet();
        let registry = self.registry_address(name)?;
        let instruction = self
            .builder
            .delegate_node(&authority, &registry, account)?;
        self.pipeline.submit(instruction).await
    }

    pub async fn undelegate_node(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<Signature, RegistryError> {
        let receiver = self.wallet();
        let registry = self.registry_address(name)?;
        let instruction = self
            .builder
            .undelegate_node(&receiver, &registry, account)?;
        self.pipeline.submit(instruction).await
    }

    /// Fetches the client entry of `account`, `None` when it is not registered.
    pub async fn get_client(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<Option<ClientEntry>, RegistryError> {
        let data = self.fetch_entry(name, account).await?;
        decode_client_entry(&data)
    }

    /// Fetches the node entry of `account`, `None` when it is not registered.
    pub async fn get_node(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<Option<NodeEntry>, RegistryError> {
        let data = self.fetch_entry(name, account).await?;
        decode_node_entry(&data)
    }

    async fn fetch_entry(&self, name: &str, account: &Pubkey) -> Result<Vec<u8>, RegistryError> {
        let entry = self.entry_address(name, account)?;
        let data = self
            .provider
            .get_account(&entry)
            .await?
            .map(|account| account.data)
            .unwrap_or_default();
        debug!("fetched entry {} ({} bytes)", entry, data.len());
        Ok(data)
    }

    pub async fn delete_client(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<Signature, RegistryError> {
        let authority = self.wallet();
        let registry = self.registry_address(name)?;
        let instruction = self
            .builder
            .remove_client(&authority, &registry, account)?;
        self.pipeline.submit(instruction).await
    }

    pub async fn delete_node(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<Signature, RegistryError> {
        let authority = self.wallet();
        let registry = self.registry_address(name)?;
        let instruction = self
            .builder
            .remove_node(&authority, &registry, account)?;
        self.pipeline.submit(instruction).await
    }

    /// Lists the client entries of the registry `name`.
    ///
    /// Accounts that match the filters but do not decode are skipped.
    pub async fn list_clients(&self, name: &str) -> Result<Vec<ClientEntry>, RegistryError> {
        let accounts = self.scan_entries(name, CLIENT_ENTRY_SIZE).await?;

        let mut entries = Vec::with_capacity(accounts.len());
        for (address, data) in accounts {
            if data.len() != CLIENT_ENTRY_SIZE {
                warn!("Skipping {}: unexpected size {}", address, data.len());
                continue;
            }
            match decode_client_entry(&data) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", address, e),
            }
        }
        Ok(entries)
    }

    /// Lists the node entries of the registry `name`.
    ///
    /// Accounts that match the filters but do not decode are skipped.
    pub async fn list_nodes(&self, name: &str) -> Result<Vec<NodeEntry>, RegistryError> {
        let accounts = self.scan_entries(name, NODE_ENTRY_SIZE).await?;

        let mut entries = Vec::with_capacity(accounts.len());
        for (address, data) in accounts {
            if data.len() != NODE_ENTRY_SIZE {
                warn!("Skipping {}: unexpected size {}", address, data.len());
                continue;
            }
            match decode_node_entry(&data) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!("Skipping {}: {}", address, e),
            }
        }
        Ok(entries)
    }

    async fn scan_entries(
        &self,
        name: &str,
        size: usize,
    ) -> Result<Vec<(Pubkey, Vec<u8>)>, RegistryError> {
        let registry = self.registry_address(name)?;
        let filters = vec![
            RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
                ENTRY_PARENT_OFFSET,
                registry.as_ref(),
            )),
            RpcFilterType::DataSize(size as u64),
        ];

        let accounts = self
            .provider
            .get_program_accounts(&self.program_id, filters)
            .await?;
        debug!(
            "scan of registry {} returned {} accounts",
            registry,
            accounts.len()
        );

        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }

    /// Reports the online value of the node `account`, which must be the held key.
    ///
    /// Negative values are rejected before anything is sent.
    pub async fn update_node_online(
        &self,
        name: &str,
        authority: &Pubkey,
        account: &Pubkey,
        value: i32,
    ) -> Result<Signature, RegistryError> {
        let registry = self.registry_address_of(authority, name)?;
        let instruction = self
            .builder
            .update_node_online(&registry, account, value)?;
        self.pipeline.submit(instruction).await
    }

    /// Sets the active flag of the node `account`, signed by the held key as a
    /// fellow node of the registry.
    pub async fn update_node_active(
        &self,
        name: &str,
        authority: &Pubkey,
        account: &Pubkey,
        active: bool,
    ) -> Result<Signature, RegistryError> {
        let registry = self.registry_address_of(authority, name)?;
        let signer = self.wallet();
        let instruction = self
            .builder
            .update_node_active(&signer, &registry, account, active)?;
        self.pipeline.submit(instruction).await
    }

    /// Asks the program whether `account` is a registered client, by simulation.
    pub async fn check_client(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<ClientInfo, RegistryError> {
        let registry = self.registry_address(name)?;
        let instruction = self.builder.check_client(&registry, account)?;
        let data = self.pipeline.simulate(instruction).await?;
        decode_client_info(&data)
    }

    /// Asks the program whether `account` is a registered node, by simulation.
    pub async fn check_node(
        &self,
        name: &str,
        account: &Pubkey,
    ) -> Result<NodeInfo, RegistryError> {
        let registry = self.registry_address(name)?;
        let instruction = self.builder.check_node(&registry, account)?;
        let data = self.pipeline.simulate(instruction).await?;
        decode_node_info(&data)
    }

    /// Transfers `lamports` from the held key to `to`.
    ///
    /// Fails with `InsufficientBalance` before submitting when the balance
    /// does not cover the amount. Fees are not included in the check.
    pub async fn transfer(&self, to: &Pubkey, lamports: u64) -> Result<Signature, RegistryError> {
        let from = self.wallet();
        let balance = self.provider.get_balance(&from).await?;
        if balance < lamports {
            return Err(RegistryError::InsufficientBalance {
                balance,
                required: lamports,
            });
        }

        let instruction = system_instruction::transfer(&from, to, lamports);
        self.pipeline.submit(instruction).await
    }

    /// Balance of the held key in lamports.
    pub async fn balance(&self) -> Result<u64, RegistryError> {
        Ok(self.provider.get_balance(&self.wallet()).await?)
    }

    pub async fn airdrop(&self, lamports: u64) -> Result<Signature, RegistryError> {
        self.pipeline.airdrop(lamports).await
    }
}
