mod base64;
pub use base64::*;

mod polling;
pub use polling::*;
