mod pda;
pub use pda::*;

mod codec;
pub use codec::*;

mod instructions;
pub use instructions::*;
