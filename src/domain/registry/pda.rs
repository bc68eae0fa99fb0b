//! Program-derived addresses used by the registry program.
//!
//! An address is found by hashing `seeds ++ [bump] ++ program_id` with the
//! PDA domain tag for `bump` from 255 down to 0 and taking the first result
//! that does not lie on the ed25519 curve. Every party derives the identical
//! address from identical seeds, which is what makes the scheme an address
//! book rather than a cache.

use log::debug;
use solana_sdk::pubkey::Pubkey;

use crate::{
    constants::{
        DELEGATE_BUFFER_SEED, DELEGATION_METADATA_SEED, DELEGATION_PROGRAM_ID,
        DELEGATION_RECORD_SEED, MAX_SEED_LEN,
    },
    models::RegistryError,
};

/// Parses a base58 address.
pub fn parse_address(encoded: &str) -> Result<Pubkey, RegistryError> {
    encoded
        .trim()
        .parse()
        .map_err(|e| RegistryError::InvalidAddress(format!("{encoded}: {e}")))
}

/// Derives the program address and bump for `seeds` under `program_id`.
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8), RegistryError> {
    if let Some(seed) = seeds.iter().find(|seed| seed.len() > MAX_SEED_LEN) {
        return Err(RegistryError::SeedTooLong {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    Pubkey::try_find_program_address(seeds, program_id).ok_or(RegistryError::DerivationExhausted)
}

/// Address of the registry `name` created by `authority`.
pub fn registry_address(
    program_id: &Pubkey,
    authority: &Pubkey,
    name: &str,
) -> Result<(Pubkey, u8), RegistryError> {
    let derived = derive_address(&[authority.as_ref(), name.as_bytes()], program_id)?;
    debug!("registry '{}' of {} -> {}", name, authority, derived.0);
    Ok(derived)
}

/// Address of the entry recording `target` in `registry`.
///
/// Client and node entries share this derivation, so one account can be
/// registered at most once per registry.
pub fn entry_address(
    program_id: &Pubkey,
    target: &Pubkey,
    registry: &Pubkey,
) -> Result<(Pubkey, u8), RegistryError> {
    derive_address(&[target.as_ref(), registry.as_ref()], program_id)
}

/// Buffer the owner program copies a delegated entry into.
pub fn delegation_buffer_address(
    program_id: &Pubkey,
    entry: &Pubkey,
) -> Result<(Pubkey, u8), RegistryError> {
    derive_address(&[DELEGATE_BUFFER_SEED, entry.as_ref()], program_id)
}

pub fn delegation_record_address(entry: &Pubkey) -> Result<(Pubkey, u8), RegistryError> {
    derive_address(
        &[DELEGATION_RECORD_SEED, entry.as_ref()],
        &DELEGATION_PROGRAM_ID,
    )
}

pub fn delegation_metadata_address(entry: &Pubkey) -> Result<(Pubkey, u8), RegistryError> {
    derive_address(
        &[DELEGATION_METADATA_SEED, entry.as_ref()],
        &DELEGATION_PROGRAM_ID,
    )
}
