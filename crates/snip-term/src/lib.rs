#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Terminal output primitives for snip frontends.
//!
//! This crate keeps colored messages, tables and single-key prompts out of
//! libsnip, so the core stays free of terminal concerns.

/// Terminal output abstractions and implementations.
mod output;

pub use output::{Output, OutputError, Quiet, Result, Terminal};
