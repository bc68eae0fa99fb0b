//! # Domain Module
//!
//! Core protocol logic for the registry program, implementing:
//!
//! * Program-derived address computation
//! * Account data encoding and decoding
//! * Instruction construction
//!
//! Nothing in this module performs network I/O.

pub mod registry;
pub use registry::*;
