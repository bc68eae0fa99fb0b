//! Registry client binary.
//!
//! Loads `.env`, configures logging, reads [`ClientConfig`] from the
//! environment and runs one command against the registry program.
use std::sync::Arc;

use clap::Parser;
use color_eyre::{eyre::WrapErr, Result};
use dotenvy::dotenv;
use log::{info, log};

use registry_client::{
    cli::{execute, failure_note, Cli},
    config::ClientConfig,
    logging::setup_logging,
    services::{LocalSigner, RegistryClient, SolanaProvider},
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    setup_logging();
    color_eyre::install()?;

    let cli = Cli::parse();

    let config = ClientConfig::from_env().wrap_err("Failed to load configuration")?;
    info!("Using RPC {} and program {}", config.rpc_url, config.program_id);

    let signer = LocalSigner::from_base58(&config.wallet_private_key)
        .wrap_err("Failed to load wallet key")?;
    let provider = SolanaProvider::new(&config.rpc_url, config.rpc_timeout_seconds);

    let client = RegistryClient::new(
        config.program_id,
        Arc::new(provider),
        Arc::new(signer),
        config.confirmation_wait(),
    );

    match execute(&client, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            if let Some((level, note)) = failure_note(&e) {
                log!(level, "{}", note);
            }
            Err(e).wrap_err("Command failed")
        }
    }
}
