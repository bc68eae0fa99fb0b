mod registry;
pub use registry::*;

mod signer;
pub use signer::*;
