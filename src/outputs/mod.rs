//! What a run prints and writes.
//!
//! # Submodules
//!
//! - [`console`]: the original/translated title blocks and the repeated-words
//!   table printed to stdout
//! - [`json`]: the optional JSON [`crate::models::RunReport`]

pub mod console;
pub mod json;
