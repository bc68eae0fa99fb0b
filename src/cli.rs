//! Command-line surface of the registry client.
//!
//! Every command is a variant of [`Command`] carrying already-validated typed
//! arguments; [`execute`] maps each variant onto one [`RegistryClient`] call
//! and renders the result for the terminal.
use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use log::Level;
use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{CLI_MAX_DOMAIN_CHARS, LAMPORTS_PER_SOL, MAX_SEED_LEN},
    domain::parse_address as parse_base58_address,
    models::RegistryError,
    services::{RegistryClient, SolanaProviderTrait, SolanaSignTrait},
};

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Parser, Debug)]
#[command(name = "registry-client", version, about = "Manage clients and nodes of an on-chain registry")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Create a registry owned by the wallet
    Create {
        #[arg(value_parser = parse_registry_name)]
        name: String,
    },
    /// Register a client for a number of days
    AddClient {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
        days: u32,
        limit: u32,
    },
    /// Register a node serving a domain
    AddNode {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
        #[arg(value_parser = parse_domain)]
        domain: String,
    },
    GetClient {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    GetNode {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    DeleteClient {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    DeleteNode {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    ListClients {
        #[arg(value_parser = parse_registry_name)]
        name: String,
    },
    ListNodes {
        #[arg(value_parser = parse_registry_name)]
        name: String,
    },
    /// Report the online value of a node; the wallet must be that node
    UpdateNodeOnline {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        /// Owner of the registry
        #[arg(value_parser = parse_address)]
        authority: Pubkey,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Set the active flag of a node, signed by the wallet as a fellow node
    UpdateNodeActive {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        /// Owner of the registry
        #[arg(value_parser = parse_address)]
        authority: Pubkey,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },
    /// Send SOL from the wallet
    Transfer {
        #[arg(value_parser = parse_address)]
        to: Pubkey,
        #[arg(value_parser = parse_sol)]
        amount: u64,
    },
    Balance,
    /// Request SOL from the cluster faucet
    Airdrop {
        #[arg(value_parser = parse_sol, default_value = "1")]
        amount: u64,
    },
    DelegateNode {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    UndelegateNode {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    /// Ask the program whether an account is a registered client
    CheckClient {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
    /// Ask the program whether an account is a registered node
    CheckNode {
        #[arg(value_parser = parse_registry_name)]
        name: String,
        #[arg(value_parser = parse_address)]
        account: Pubkey,
    },
}

pub fn parse_address(value: &str) -> Result<Pubkey, String> {
    parse_base58_address(value).map_err(|e| e.to_string())
}

pub fn parse_registry_name(value: &str) -> Result<String, String> {
    if value.is_empty() {
        return Err("registry name must not be empty".to_string());
    }
    if value.len() > MAX_SEED_LEN {
        return Err(format!(
            "registry name is {} bytes, at most {} allowed",
            value.len(),
            MAX_SEED_LEN
        ));
    }
    Ok(value.to_string())
}

pub fn parse_domain(value: &str) -> Result<String, String> {
    let chars = value.chars().count();
    if chars == 0 {
        return Err("domain must not be empty".to_string());
    }
    if chars > CLI_MAX_DOMAIN_CHARS {
        return Err(format!(
            "domain is {} characters, at most {} allowed",
            chars, CLI_MAX_DOMAIN_CHARS
        ));
    }
    Ok(value.to_string())
}

/// Parses an amount of SOL into lamports.
pub fn parse_sol(value: &str) -> Result<u64, String> {
    let sol: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid SOL amount '{}'", value))?;
    if !sol.is_finite() || sol < 0.0 {
        return Err(format!("invalid SOL amount '{}'", value));
    }
    let lamports = (sol * LAMPORTS_PER_SOL as f64).round();
    if lamports > u64::MAX as f64 {
        return Err(format!("SOL amount '{}' is too large", value));
    }
    Ok(lamports as u64)
}

pub fn format_sol(lamports: u64) -> String {
    format!("{} SOL", lamports as f64 / LAMPORTS_PER_SOL as f64)
}

/// Unix time `days` days after `now`.
pub fn expiry_after_days(now: i64, days: u32) -> i64 {
    now.saturating_add(i64::from(days) * SECONDS_PER_DAY)
}

/// Runs `command` against `client` and returns the text to print.
pub async fn execute<P, S>(
    client: &RegistryClient<P, S>,
    command: Command,
) -> Result<String, RegistryError>
where
    P: SolanaProviderTrait,
    S: SolanaSignTrait,
{
    let output = match command {
        Command::Create { name } => {
            let (signature, registry) = client.create_registry(&name).await?;
            format!("Registry '{}' created at {}\nSignature: {}", name, registry, signature)
        }
        Command::AddClient {
            name,
            account,
            days,
            limit,
        } => {
            let until = expiry_after_days(Utc::now().timestamp(), days);
            let signature = client.add_client(&name, &account, until, limit).await?;
            format!("Client {} added\nSignature: {}", account, signature)
        }
        Command::AddNode {
            name,
            account,
            domain,
        } => {
            let signature = client.add_node(&name, &account, &domain).await?;
            format!("Node {} added\nSignature: {}", account, signature)
        }
        Command::GetClient { name, account } => match client.get_client(&name, &account).await? {
            Some(entry) => format!("Client entry:\n{}", entry),
            None => format!("Client {} is not registered in '{}'", account, name),
        },
        Command::GetNode { name, account } => match client.get_node(&name, &account).await? {
            Some(entry) => format!("Node entry:\n{}", entry),
            None => format!("Node {} is not registered in '{}'", account, name),
        },
        Command::DeleteClient { name, account } => {
            let signature = client.delete_client(&name, &account).await?;
            format!("Client {} removed\nSignature: {}", account, signature)
        }
        Command::DeleteNode { name, account } => {
            let signature = client.delete_node(&name, &account).await?;
            format!("Node {} removed\nSignature: {}", account, signature)
        }
        Command::ListClients { name } => {
            let entries = client.list_clients(&name).await?;
            let mut lines = vec![format!("Found {} clients in '{}'", entries.len(), name)];
            lines.extend(entries.iter().map(|entry| entry.to_string()));
            lines.join("\n")
        }
        Command::ListNodes { name } => {
            let entries = client.list_nodes(&name).await?;
            let mut lines = vec![format!("Found {} nodes in '{}'", entries.len(), name)];
            lines.extend(entries.iter().map(|entry| entry.to_string()));
            lines.join("\n")
        }
        Command::UpdateNodeOnline {
            name,
            authority,
            account,
            value,
        } => {
            let signature = client
                .update_node_online(&name, &authority, &account, value)
                .await?;
            format!("Node {} online set to {}\nSignature: {}", account, value, signature)
        }
        Command::UpdateNodeActive {
            name,
            authority,
            account,
            active,
        } => {
            let signature = client
                .update_node_active(&name, &authority, &account, active)
                .await?;
            format!("Node {} active set to {}\nSignature: {}", account, active, signature)
        }
        Command::Transfer { to, amount } => {
            let signature = client.transfer(&to, amount).await?;
            format!("Sent {} to {}\nSignature: {}", format_sol(amount), to, signature)
        }
        Command::Balance => {
            let lamports = client.balance().await?;
            format!(
                "Balance of {}: {} ({} lamports)",
                client.wallet(),
                format_sol(lamports),
                lamports
            )
        }
        Command::Airdrop { amount } => {
            let signature = client.airdrop(amount).await?;
            format!("Airdropped {}\nSignature: {}", format_sol(amount), signature)
        }
        Command::DelegateNode { name, account } => {
            let signature = client.delegate_node(&name, &account).await?;
            format!("Node {} delegated\nSignature: {}", account, signature)
        }
        Command::UndelegateNode { name, account } => {
            let signature = client.undelegate_node(&name, &account).await?;
            format!("Node {} undelegated\nSignature: {}", account, signature)
        }
        Command::CheckClient { name, account } => {
            let info = client.check_client(&name, &account).await?;
            format!("Client {}:\n{}", account, info)
        }
        Command::CheckNode { name, account } => {
            let info = client.check_node(&name, &account).await?;
            format!("Node {}:\n{}", account, info)
        }
    };
    Ok(output)
}

/// Extra log line for a failed command, beyond the error report itself.
///
/// A fatal error means a broken invariant and is logged at `Error`; a
/// transient transport failure gets a rerun hint at `Warn`.
pub fn failure_note(error: &RegistryError) -> Option<(Level, &'static str)> {
    if error.is_fatal() {
        Some((
            Level::Error,
            "Invariant violated: no valid program address exists for these seeds",
        ))
    } else if error.is_transient() {
        Some((
            Level::Warn,
            "The failure looks transient; running the command again may succeed",
        ))
    } else {
        None
    }
}
