mod registry;
pub use registry::*;

mod instruction;
pub use instruction::*;

mod error;
pub use error::*;
