//! Client for the on-chain registry program.
//!
//! The library derives program addresses, encodes instructions, decodes
//! registry accounts and submits signed transactions through a Solana RPC
//! node. [`services::RegistryClient`] is the entry point; the binary wraps it
//! in a command-line interface.

pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;
