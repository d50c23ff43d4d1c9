#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Core library for finding and deleting stale local Git branches.
//!
//! Two passes look for candidates: local branches that were never pushed and
//! have gone stale, and branches the remote has already merged into the
//! mainline. Each candidate is put to the operator through an
//! [`Interaction`], and deleted only on an explicit decision. The CLI binary in
//! `crates/snip` builds on top of this library.

/// Candidate selection for both passes.
mod classify;
/// Sequencing of the two passes.
mod cleanup;
/// Error type and result alias.
mod error;
/// Repository operations the core depends on.
mod gateway;
/// Gateway implementation that shells out to `git`.
mod git;
/// Decision loop over a candidate list.
mod orchestrate;
/// Policy and configuration loading.
mod policy;
/// High-level entry point bound to a repository.
mod snip;
/// Shared test doubles.
#[cfg(test)]
mod testutil;
/// Plain data passed between the components.
mod types;

pub use classify::{classify_merged, classify_unpushed_stale};
pub use cleanup::run_cleanup;
pub use error::{Result, SnipError};
pub use gateway::Gateway;
pub use git::{GitGateway, find_root};
pub use orchestrate::{Interaction, Orchestrator};
pub use policy::{Config, DEFAULT_MAINLINE, DEFAULT_REMOTE, Policy, Staleness};
pub use snip::Snip;
pub use types::{
    BranchOutcome, BranchRecord, BranchStatus, Candidate, CleanupSummary, Decision,
    DeletionOutcome, Notice, PassKind, PassReport, PassState,
};
