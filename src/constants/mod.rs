//! Constants shared across the registry client.

mod logging;
pub use logging::*;

mod registry;
pub use registry::*;

mod solana_transaction;
pub use solana_transaction::*;
