//! In-memory ledger executing registry and system transfer instructions.
//!
//! Transactions apply atomically: every instruction runs against a copy of
//! the state, which replaces the real state only when all of them succeed.
use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use registry_client::{
    constants::MAX_DOMAIN_LEN,
    domain::{
        decode_client_entry, decode_node_entry, encode_client_entry, encode_node_entry,
        ByteReader, ByteWriter,
    },
    models::{AccountKind, ClientEntry, InstructionKind, NodeEntry},
    services::{SimulationOutcome, SolanaProviderError, SolanaProviderTrait},
};
use solana_client::rpc_filter::RpcFilterType;
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, system_program, transaction::Transaction,
};

const SYSTEM_TRANSFER_TAG: u32 = 2;

#[derive(Debug, Default, Clone)]
struct LedgerState {
    accounts: HashMap<Pubkey, Account>,
    balances: HashMap<Pubkey, u64>,
    confirmed: HashSet<Signature>,
}

#[derive(Debug)]
pub struct InMemoryLedger {
    program_id: Pubkey,
    blockhash: Hash,
    state: Mutex<LedgerState>,
}

/// An account passed to an instruction, with its signer flag.
#[derive(Debug, Clone, Copy)]
struct Meta {
    key: Pubkey,
    is_signer: bool,
}

impl InMemoryLedger {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            blockhash: Hash::new_unique(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn fund(&self, owner: &Pubkey, lamports: u64) {
        let mut state = self.state.lock().unwrap();
        *state.balances.entry(*owner).or_default() += lamports;
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn has_account(&self, address: &Pubkey) -> bool {
        self.state.lock().unwrap().accounts.contains_key(address)
    }

    /// Stores raw program-owned data at `address`, bypassing instruction checks.
    pub fn plant_account(&self, address: Pubkey, data: Vec<u8>) {
        let account = self.program_account(data);
        self.state.lock().unwrap().accounts.insert(address, account);
    }

    fn program_account(&self, data: Vec<u8>) -> Account {
        Account {
            lamports: 1,
            data,
            owner: self.program_id,
            executable: false,
            rent_epoch: 0,
        }
    }

    /// Runs every instruction of `transaction` against `state`.
    ///
    /// Returns the return data of the last instruction that set any.
    fn execute(
        &self,
        state: &mut LedgerState,
        transaction: &Transaction,
    ) -> Result<Option<Vec<u8>>, String> {
        let message = &transaction.message;
        let mut return_data = None;

        for instruction in &message.instructions {
            let program = message.account_keys[instruction.program_id_index as usize];
            let metas: Vec<Meta> = instruction
                .accounts
                .iter()
                .map(|&index| Meta {
                    key: message.account_keys[index as usize],
                    is_signer: message.is_signer(index as usize),
                })
                .collect();

            if program == system_program::id() {
                apply_system(state, &metas, &instruction.data)?;
            } else if program == self.program_id {
                if let Some(data) = self.apply_registry(state, &metas, &instruction.data)? {
                    return_data = Some(data);
                }
            } else {
                return Err(format!("unknown program {}", program));
            }
        }

        Ok(return_data)
    }

    fn apply_registry(
        &self,
        state: &mut LedgerState,
        metas: &[Meta],
        data: &[u8],
    ) -> Result<Option<Vec<u8>>, String> {
        let kind = InstructionKind::from_data(data).ok_or("unknown discriminator")?;
        let mut args = ByteReader::new(data);
        args.read_bytes(8, "discriminator").map_err(|e| e.to_string())?;

        match kind {
            InstructionKind::InitRegistry => {
                let name = args.read_string("name").map_err(|e| e.to_string())?;
                let registry = meta(metas, 0)?;
                let authority = signer(metas, 1)?;
                if state.accounts.contains_key(&registry.key) {
                    return Err(format!("account {} already in use", registry.key));
                }
                let mut account = ByteWriter::with_discriminator(AccountKind::Registry.discriminator());
                account.put_pubkey(&authority.key).put_string(&name);
                state
                    .accounts
                    .insert(registry.key, self.program_account(account.into_inner()));
                Ok(None)
            }
            InstructionKind::AddClient => {
                let target = args.read_pubkey("target").map_err(|e| e.to_string())?;
                let until = args.read_i64("until").map_err(|e| e.to_string())?;
                let limit = args.read_u32("limit").map_err(|e| e.to_string())?;
                let (entry, registry) = self.authorized_entry(state, metas)?;
                if state.accounts.contains_key(&entry) {
                    return Err(format!("account {} already in use", entry));
                }
                let record = ClientEntry {
                    parent: registry,
                    registered: target,
                    until,
                    limit,
                };
                state
                    .accounts
                    .insert(entry, self.program_account(encode_client_entry(&record)));
                Ok(None)
            }
            InstructionKind::AddNode => {
                let target = args.read_pubkey("target").map_err(|e| e.to_string())?;
                let domain = args.read_string("domain").map_err(|e| e.to_string())?;
                if domain.len() > MAX_DOMAIN_LEN {
                    return Err("domain too long".to_string());
                }
                let (entry, registry) = self.authorized_entry(state, metas)?;
                if state.accounts.contains_key(&entry) {
                    return Err(format!("account {} already in use", entry));
                }
                let record = NodeEntry {
                    parent: registry,
                    registered: target,
                    domain,
                    online: 0,
                    active: false,
                };
                state
                    .accounts
                    .insert(entry, self.program_account(encode_node_entry(&record)));
                Ok(None)
            }
            InstructionKind::RemoveClient | InstructionKind::RemoveNode => {
                let (entry, _) = self.authorized_entry(state, metas)?;
                if state.accounts.remove(&entry).is_none() {
                    return Err(format!("account {} not found", entry));
                }
                Ok(None)
            }
            InstructionKind::UpdateNodeOnline => {
                args.read_pubkey("target").map_err(|e| e.to_string())?;
                let value = args.read_i32("online").map_err(|e| e.to_string())?;
                if value < 0 {
                    return Err("online value must be non-negative".to_string());
                }
                let entry = meta(metas, 0)?.key;
                let authority = signer(metas, 2)?;
                let mut node = load_node(state, &entry)?;
                if node.registered != authority.key {
                    return Err("only the node may report its online value".to_string());
                }
                node.online = value;
                store_node(state, &entry, &node)?;
                Ok(None)
            }
            InstructionKind::UpdateNodeActive => {
                args.read_pubkey("target").map_err(|e| e.to_string())?;
                let active = args.read_bool("active").map_err(|e| e.to_string())?;
                let entry = meta(metas, 0)?.key;
                let registry = meta(metas, 1)?.key;
                let authority_node = load_node(state, &meta(metas, 2)?.key)?;
                let authority = signer(metas, 3)?;
                if authority_node.parent != registry || authority_node.registered != authority.key
                {
                    return Err("signer is not a node of this registry".to_string());
                }
                let mut node = load_node(state, &entry)?;
                node.active = active;
                store_node(state, &entry, &node)?;
                Ok(None)
            }
            InstructionKind::CheckClient => {
                let entry = meta(metas, 0)?.key;
                let client = decode_client_entry(&account_data(state, &entry)?)
                    .map_err(|e| e.to_string())?
                    .ok_or("client entry not found")?;
                let mut data = client.until.to_le_bytes().to_vec();
                data.extend_from_slice(&client.limit.to_le_bytes());
                Ok(Some(data))
            }
            InstructionKind::CheckNode => {
                let node = load_node(state, &meta(metas, 0)?.key)?;
                let mut data = (node.domain.len() as u32).to_le_bytes().to_vec();
                data.extend_from_slice(node.domain.as_bytes());
                data.push(node.active as u8);
                Ok(Some(data))
            }
            InstructionKind::DelegateNode | InstructionKind::UndelegateNode => {
                Err(format!("{} needs the delegation program", kind))
            }
        }
    }

    /// Checks the entry-creating/closing account layout: entry, registry,
    /// authority signer matching the registry's stored authority.
    fn authorized_entry(
        &self,
        state: &LedgerState,
        metas: &[Meta],
    ) -> Result<(Pubkey, Pubkey), String> {
        let entry = meta(metas, 0)?.key;
        let registry = meta(metas, 1)?.key;
        let authority = signer(metas, 2)?;
        let data = account_data(state, &registry)?;
        let mut reader = ByteReader::new(&data);
        reader
            .expect_discriminator(AccountKind::Registry)
            .map_err(|e| e.to_string())?;
        let stored = reader.read_pubkey("authority").map_err(|e| e.to_string())?;
        if stored != authority.key {
            return Err("signer is not the registry authority".to_string());
        }
        Ok((entry, registry))
    }

    fn filter_matches(filter: &RpcFilterType, data: &[u8]) -> bool {
        match filter {
            RpcFilterType::DataSize(size) => data.len() as u64 == *size,
            RpcFilterType::Memcmp(memcmp) => memcmp.bytes_match(data),
            _ => true,
        }
    }
}

fn meta(metas: &[Meta], index: usize) -> Result<Meta, String> {
    metas
        .get(index)
        .copied()
        .ok_or_else(|| format!("missing account #{}", index))
}

fn signer(metas: &[Meta], index: usize) -> Result<Meta, String> {
    let account = meta(metas, index)?;
    if !account.is_signer {
        return Err(format!("account {} must sign", account.key));
    }
    Ok(account)
}

fn account_data(state: &LedgerState, address: &Pubkey) -> Result<Vec<u8>, String> {
    state
        .accounts
        .get(address)
        .map(|account| account.data.clone())
        .ok_or_else(|| format!("account {} not found", address))
}

fn load_node(state: &LedgerState, address: &Pubkey) -> Result<NodeEntry, String> {
    decode_node_entry(&account_data(state, address)?)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("node entry {} not found", address))
}

fn store_node(state: &mut LedgerState, address: &Pubkey, node: &NodeEntry) -> Result<(), String> {
    let account = state
        .accounts
        .get_mut(address)
        .ok_or_else(|| format!("account {} not found", address))?;
    account.data = encode_node_entry(node);
    Ok(())
}

fn apply_system(state: &mut LedgerState, metas: &[Meta], data: &[u8]) -> Result<(), String> {
    let tag = data
        .get(..4)
        .map(|bytes| u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .ok_or("empty system instruction")?;
    if tag != SYSTEM_TRANSFER_TAG {
        return Err(format!("unsupported system instruction {}", tag));
    }
    let lamports = data
        .get(4..12)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u64::from_le_bytes)
        .ok_or("truncated transfer")?;
    let from = signer(metas, 0)?;
    let to = meta(metas, 1)?;

    let balance = state.balances.entry(from.key).or_default();
    if *balance < lamports {
        return Err("insufficient lamports".to_string());
    }
    *balance -= lamports;
    *state.balances.entry(to.key).or_default() += lamports;
    Ok(())
}

#[async_trait]
impl SolanaProviderTrait for InMemoryLedger {
    async fn get_latest_blockhash_with_commitment(
        &self,
        _commitment: CommitmentConfig,
    ) -> Result<(Hash, u64), SolanaProviderError> {
        Ok((self.blockhash, 1_000))
    }

    async fn get_account(&self, pubkey: &Pubkey) -> Result<Option<Account>, SolanaProviderError> {
        Ok(self.state.lock().unwrap().accounts.get(pubkey).cloned())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>, SolanaProviderError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .accounts
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| {
                filters
                    .iter()
                    .all(|filter| Self::filter_matches(filter, &account.data))
            })
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }

    async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, SolanaProviderError> {
        transaction
            .verify()
            .map_err(|e| SolanaProviderError::InvalidTransaction(e.to_string()))?;

        let mut state = self.state.lock().unwrap();
        let mut next = state.clone();
        self.execute(&mut next, transaction)
            .map_err(|e| SolanaProviderError::InvalidTransaction(format!("program error: {e}")))?;

        let signature = transaction.signatures[0];
        next.confirmed.insert(signature);
        *state = next;
        Ok(signature)
    }

    async fn request_airdrop(
        &self,
        pubkey: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SolanaProviderError> {
        let signature = Signature::new_unique();
        let mut state = self.state.lock().unwrap();
        *state.balances.entry(*pubkey).or_default() += lamports;
        state.confirmed.insert(signature);
        Ok(signature)
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, SolanaProviderError> {
        Ok(self.balance_of(pubkey))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
    ) -> Result<bool, SolanaProviderError> {
        Ok(self.state.lock().unwrap().confirmed.contains(signature))
    }

    async fn simulate_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<SimulationOutcome, SolanaProviderError> {
        let mut scratch = self.state.lock().unwrap().clone();
        Ok(match self.execute(&mut scratch, transaction) {
            Ok(return_data) => SimulationOutcome {
                err: None,
                logs: vec![],
                return_data,
            },
            Err(e) => SimulationOutcome {
                err: Some(e.clone()),
                logs: vec![format!("Program log: {e}")],
                return_data: None,
            },
        })
    }
}
