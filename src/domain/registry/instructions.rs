//! Instruction builders for every registry program operation.
//!
//! Each builder derives the addresses it needs, writes the discriminator and
//! the encoded arguments, and lists accounts in the exact order and with the
//! exact writable/signer flags the program's account structs declare. The
//! program rejects any instruction whose account list deviates.

use log::debug;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    constants::{DELEGATION_PROGRAM_ID, MAGIC_CONTEXT_ID, MAGIC_PROGRAM_ID, MAX_DOMAIN_LEN},
    models::{InstructionKind, RegistryError},
};

use super::{
    codec::ByteWriter,
    pda::{
        delegation_buffer_address, delegation_metadata_address, delegation_record_address,
        entry_address, registry_address,
    },
};

/// Builds registry instructions for one deployed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryInstructionBuilder {
    program_id: Pubkey,
}

impl RegistryInstructionBuilder {
    pub fn new(program_id: Pubkey) -> Self {
        Self { program_id }
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    fn instruction(
        &self,
        kind: InstructionKind,
        data: ByteWriter,
        accounts: Vec<AccountMeta>,
    ) -> Instruction {
        debug!(
            "built {} instruction: {} data bytes, {} accounts",
            kind,
            data.len(),
            accounts.len()
        );
        Instruction::new_with_bytes(self.program_id, &data.into_inner(), accounts)
    }

    fn entry(&self, target: &Pubkey, registry: &Pubkey) -> Result<Pubkey, RegistryError> {
        Ok(entry_address(&self.program_id, target, registry)?.0)
    }

    /// Creates the registry `name` owned by `authority`.
    ///
    /// Returns the instruction together with the new registry's address.
    pub fn init_registry(
        &self,
        authority: &Pubkey,
        name: &str,
    ) -> Result<(Instruction, Pubkey), RegistryError> {
        let (registry, _) = registry_address(&self.program_id, authority, name)?;

        let mut data = ByteWriter::with_discriminator(InstructionKind::InitRegistry.discriminator());
        data.put_string(name);

        let accounts = vec![
            AccountMeta::new(registry, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ];

        Ok((
            self.instruction(InstructionKind::InitRegistry, data, accounts),
            registry,
        ))
    }

    pub fn add_client(
        &self,
        authority: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
        until: i64,
        limit: u32,
    ) -> Result<Instruction, RegistryError> {
        let entry = self.entry(target, registry)?;

        let mut data = ByteWriter::with_discriminator(InstructionKind::AddClient.discriminator());
        data.put_pubkey(target).put_i64(until).put_u32(limit);

        Ok(self.instruction(
            InstructionKind::AddClient,
            data,
            creating_entry_accounts(entry, registry, authority),
        ))
    }

    /// Registers `target` as a node serving `domain`.
    ///
    /// The domain is limited to 253 bytes, the longest name DNS allows.
    pub fn add_node(
        &self,
        authority: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
        domain: &str,
    ) -> Result<Instruction, RegistryError> {
        if domain.len() > MAX_DOMAIN_LEN {
            return Err(RegistryError::DomainTooLong {
                len: domain.len(),
                max: MAX_DOMAIN_LEN,
            });
        }
        let entry = self.entry(target, registry)?;

        let mut data = ByteWriter::with_discriminator(InstructionKind::AddNode.discriminator());
        data.put_pubkey(target).put_string(domain);

        Ok(self.instruction(
            InstructionKind::AddNode,
            data,
            creating_entry_accounts(entry, registry, authority),
        ))
    }

    /// Hands the node entry of `target` over to the delegation program.
    pub fn delegate_node(
        &self,
        authority: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        let entry = self.entry(target, registry)?;
        let (buffer, _) = delegation_buffer_address(&self.program_id, &entry)?;
        let (record, _) = delegation_record_address(&entry)?;
        let (metadata, _) = delegation_metadata_address(&entry)?;

        let accounts = vec![
            AccountMeta::new(buffer, false),
            AccountMeta::new(record, false),
            AccountMeta::new(metadata, false),
            AccountMeta::new(entry, false),
            AccountMeta::new_readonly(*registry, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(self.program_id, false),
            AccountMeta::new_readonly(DELEGATION_PROGRAM_ID, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ];

        Ok(self.instruction(
            InstructionKind::DelegateNode,
            target_payload(InstructionKind::DelegateNode, target),
            accounts,
        ))
    }

    /// Commits the delegated node entry of `target` and returns it to the program.
    pub fn undelegate_node(
        &self,
        receiver: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        let entry = self.entry(target, registry)?;

        let accounts = vec![
            AccountMeta::new(entry, false),
            AccountMeta::new_readonly(*registry, false),
            AccountMeta::new(*receiver, true),
            AccountMeta::new(MAGIC_CONTEXT_ID, false),
            AccountMeta::new_readonly(MAGIC_PROGRAM_ID, false),
        ];

        Ok(self.instruction(
            InstructionKind::UndelegateNode,
            target_payload(InstructionKind::UndelegateNode, target),
            accounts,
        ))
    }

    pub fn remove_client(
        &self,
        authority: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        self.remove_entry(InstructionKind::RemoveClient, authority, registry, target)
    }

    pub fn remove_node(
        &self,
        authority: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        self.remove_entry(InstructionKind::RemoveNode, authority, registry, target)
    }

    fn remove_entry(
        &self,
        kind: InstructionKind,
        authority: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        let entry = self.entry(target, registry)?;

        // closing the entry refunds its rent to the authority
        let accounts = vec![
            AccountMeta::new(entry, false),
            AccountMeta::new_readonly(*registry, false),
            AccountMeta::new(*authority, true),
        ];

        Ok(self.instruction(kind, target_payload(kind, target), accounts))
    }

    /// Sets the online counter of the node `target`.
    ///
    /// A node reports for itself: `target` is also the required signer.
    pub fn update_node_online(
        &self,
        registry: &Pubkey,
        target: &Pubkey,
        value: i32,
    ) -> Result<Instruction, RegistryError> {
        if value < 0 {
            return Err(RegistryError::NegativeOnlineValue(value));
        }
        let entry = self.entry(target, registry)?;

        let mut data = target_payload(InstructionKind::UpdateNodeOnline, target);
        data.put_i32(value);

        let accounts = vec![
            AccountMeta::new(entry, false),
            AccountMeta::new_readonly(*registry, false),
            AccountMeta::new(*target, true),
        ];

        Ok(self.instruction(InstructionKind::UpdateNodeOnline, data, accounts))
    }

    /// Sets the active flag of the node `target`.
    ///
    /// `signer` must itself be a node of `registry`; its entry is passed so
    /// the program can check membership.
    pub fn update_node_active(
        &self,
        signer: &Pubkey,
        registry: &Pubkey,
        target: &Pubkey,
        active: bool,
    ) -> Result<Instruction, RegistryError> {
        let entry = self.entry(target, registry)?;
        let signer_node = self.entry(signer, registry)?;

        let mut data = target_payload(InstructionKind::UpdateNodeActive, target);
        data.put_bool(active);

        let accounts = vec![
            AccountMeta::new(entry, false),
            AccountMeta::new_readonly(*registry, false),
            AccountMeta::new_readonly(signer_node, false),
            AccountMeta::new_readonly(*signer, true),
        ];

        Ok(self.instruction(InstructionKind::UpdateNodeActive, data, accounts))
    }

    /// Read-only view returning the expiry and limit of a client entry.
    pub fn check_client(
        &self,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        self.check_entry(InstructionKind::CheckClient, registry, target)
    }

    /// Read-only view returning the domain and active flag of a node entry.
    pub fn check_node(
        &self,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        self.check_entry(InstructionKind::CheckNode, registry, target)
    }

    fn check_entry(
        &self,
        kind: InstructionKind,
        registry: &Pubkey,
        target: &Pubkey,
    ) -> Result<Instruction, RegistryError> {
        let entry = self.entry(target, registry)?;

        let accounts = vec![
            AccountMeta::new_readonly(entry, false),
            AccountMeta::new_readonly(*registry, false),
        ];

        Ok(self.instruction(kind, target_payload(kind, target), accounts))
    }
}

fn target_payload(kind: InstructionKind, target: &Pubkey) -> ByteWriter {
    let mut data = ByteWriter::with_discriminator(kind.discriminator());
    data.put_pubkey(target);
    data
}

/// Accounts of the instructions that allocate a new entry paid by `authority`.
fn creating_entry_accounts(entry: Pubkey, registry: &Pubkey, authority: &Pubkey) -> Vec<AccountMeta> {
    vec![
        AccountMeta::new(entry, false),
        AccountMeta::new_readonly(*registry, false),
        AccountMeta::new(*authority, true),
        AccountMeta::new_readonly(system_program::ID, false),
    ]
}
