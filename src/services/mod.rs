//! # Services Module
//!
//! Network-facing collaborators of the registry client: the RPC provider, the
//! held-key signer, the transaction pipeline built on both, and the registry
//! facade on top.

mod provider;
pub use provider::*;

mod signer;
pub use signer::*;

mod transaction;
pub use transaction::*;

mod registry;
pub use registry::*;
