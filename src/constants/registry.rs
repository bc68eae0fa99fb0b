//! Wire-level constants of the on-chain registry program.
//!
//! Instruction and account discriminators are the first eight bytes of
//! `sha256("global:<instruction>")` and `sha256("account:<Type>")` as computed
//! by the program's framework. They are fixed by the deployed program and must
//! never be derived at runtime.

use solana_sdk::{pubkey, pubkey::Pubkey};

/// Length of every discriminator, instruction or account.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Length of a serialized public key.
pub const PUBKEY_LEN: usize = 32;

/// Maximum length of a single derivation seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum byte length of a node domain accepted by the program.
pub const MAX_DOMAIN_LEN: usize = 253;

/// Maximum domain length (in characters) accepted on the command line.
pub const CLI_MAX_DOMAIN_CHARS: usize = 64;

pub const INIT_REGISTRY_DISCRIMINATOR: [u8; 8] = [131, 22, 4, 103, 24, 94, 163, 239];
pub const ADD_CLIENT_DISCRIMINATOR: [u8; 8] = [198, 64, 62, 101, 62, 204, 69, 108];
pub const ADD_NODE_DISCRIMINATOR: [u8; 8] = [135, 249, 13, 74, 61, 190, 188, 33];
pub const DELEGATE_NODE_DISCRIMINATOR: [u8; 8] = [177, 5, 63, 9, 89, 233, 39, 75];
pub const UNDELEGATE_NODE_DISCRIMINATOR: [u8; 8] = [215, 20, 17, 214, 131, 184, 155, 117];
pub const CHECK_CLIENT_DISCRIMINATOR: [u8; 8] = [56, 122, 178, 30, 199, 2, 243, 22];
pub const CHECK_NODE_DISCRIMINATOR: [u8; 8] = [62, 101, 38, 142, 134, 79, 122, 116];
pub const REMOVE_CLIENT_DISCRIMINATOR: [u8; 8] = [32, 83, 79, 126, 155, 239, 104, 60];
pub const REMOVE_NODE_DISCRIMINATOR: [u8; 8] = [96, 10, 183, 238, 187, 248, 96, 36];
pub const UPDATE_NODE_ONLINE_DISCRIMINATOR: [u8; 8] = [35, 22, 232, 250, 60, 30, 62, 83];
pub const UPDATE_NODE_ACTIVE_DISCRIMINATOR: [u8; 8] = [121, 150, 132, 175, 172, 145, 197, 132];

pub const REGISTRY_ACCOUNT_DISCRIMINATOR: [u8; 8] = [47, 174, 110, 246, 184, 182, 252, 218];
pub const CLIENT_ENTRY_ACCOUNT_DISCRIMINATOR: [u8; 8] = [68, 218, 150, 47, 57, 1, 247, 170];
pub const NODE_ENTRY_ACCOUNT_DISCRIMINATOR: [u8; 8] = [226, 29, 121, 132, 47, 28, 209, 67];

/// discriminator + parent + registered + until + limit
pub const CLIENT_ENTRY_SIZE: usize = DISCRIMINATOR_LEN + PUBKEY_LEN + PUBKEY_LEN + 8 + 4;

/// Space the program allocates for a node entry:
/// discriminator + parent + registered + domain prefix + domain + online + active
pub const NODE_ENTRY_SIZE: usize =
    DISCRIMINATOR_LEN + PUBKEY_LEN + PUBKEY_LEN + 4 + MAX_DOMAIN_LEN + 4 + 1;

/// Smallest node entry that can hold an empty domain.
pub const NODE_ENTRY_MIN_SIZE: usize = DISCRIMINATOR_LEN + PUBKEY_LEN + PUBKEY_LEN + 4 + 4 + 1;

/// Offset of the `parent` field inside entry account data.
pub const ENTRY_PARENT_OFFSET: usize = DISCRIMINATOR_LEN;

/// Delegation program used by `delegate-node`.
pub const DELEGATION_PROGRAM_ID: Pubkey = pubkey!("DELeGGvXpWV2fqJUhqcF5ZSYMS4JTLjteaAMARRSaeSh");

/// Program that commits and undelegates delegated accounts.
pub const MAGIC_PROGRAM_ID: Pubkey = pubkey!("Magic11111111111111111111111111111111111111");

/// Context account written by the magic program on commit.
pub const MAGIC_CONTEXT_ID: Pubkey = pubkey!("MagicContext1111111111111111111111111111111");

pub const DELEGATE_BUFFER_SEED: &[u8] = b"buffer";
pub const DELEGATION_RECORD_SEED: &[u8] = b"delegation";
pub const DELEGATION_METADATA_SEED: &[u8] = b"delegation-metadata";
