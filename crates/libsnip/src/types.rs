use std::fmt;

use chrono::NaiveDateTime;

/// A local branch together with the time of its most recent commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRecord {
    /// Short branch name, e.g. `feature/login`.
    pub name: String,
    /// Committer date of the branch tip, normalized to naive local time.
    pub last_commit: NaiveDateTime,
}

/// Which classification pass produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Local branches with no remote counterpart, optionally older than the cutoff.
    UnpushedStale,
    /// Remote branches already merged into the mainline.
    Merged,
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnpushedStale => write!(f, "unpushed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A branch proposed for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Never pushed and stale.
    UnpushedStale(BranchRecord),
    /// Merged into the mainline on the remote.
    Merged {
        /// Local branch name, with the remote prefix stripped.
        name: String,
        /// Time of the newest commit unique to the branch, when there is one.
        merged_at: Option<NaiveDateTime>,
    },
}

impl Candidate {
    /// The local branch name this candidate refers to.
    pub fn name(&self) -> &str {
        match self {
            Self::UnpushedStale(branch) => &branch.name,
            Self::Merged { name, .. } => name,
        }
    }

    /// The pass this candidate belongs to.
    pub fn kind(&self) -> PassKind {
        match self {
            Self::UnpushedStale(_) => PassKind::UnpushedStale,
            Self::Merged { .. } => PassKind::Merged,
        }
    }
}

/// The operator's answer for a single candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Leave the branch alone.
    Keep,
    /// Remove the branch.
    Delete,
    /// Stop asking about the remaining candidates of this pass.
    Abort,
}

/// What happened to a candidate that was presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The branch was removed.
    Deleted,
    /// Removal was attempted and refused or blocked.
    Failed,
    /// The operator chose to keep the branch.
    Skipped,
}

/// Outcome recorded for one branch in a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOutcome {
    /// Branch name.
    pub branch: String,
    /// Result of presenting the branch.
    pub outcome: DeletionOutcome,
}

/// Report produced by one orchestrated pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Which pass this is.
    pub kind: PassKind,
    /// Number of candidates the classifier produced.
    pub candidates: usize,
    /// Outcomes in presentation order. Shorter than `candidates` after an abort.
    pub outcomes: Vec<BranchOutcome>,
    /// Whether the operator aborted the pass.
    pub aborted: bool,
}

impl PassReport {
    /// Create an empty report for `kind`.
    pub fn new(kind: PassKind, candidates: usize) -> Self {
        Self {
            kind,
            candidates,
            outcomes: Vec::new(),
            aborted: false,
        }
    }

    /// Count outcomes equal to `outcome`.
    pub fn count(&self, outcome: DeletionOutcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }
}

/// State of a pass at the end of a cleanup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassState {
    /// The policy disabled this pass.
    Disabled,
    /// The pass ran to completion or was aborted by the operator.
    Completed(PassReport),
    /// A gateway or network error ended the pass early.
    Failed(String),
}

impl PassState {
    /// Number of candidates found, zero unless the pass completed.
    pub fn candidates(&self) -> usize {
        match self {
            Self::Completed(report) => report.candidates,
            Self::Disabled | Self::Failed(_) => 0,
        }
    }
}

/// Result of running both cleanup passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupSummary {
    /// The unpushed-stale pass.
    pub unpushed: PassState,
    /// The merged pass.
    pub merged: PassState,
}

/// Status notices handed to the interaction boundary. None of these block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A pass is about to classify branches.
    Searching(PassKind),
    /// The active checkout moved to the mainline ahead of a deletion.
    SwitchedBranch {
        /// Branch now checked out.
        to: String,
    },
    /// A branch was deleted.
    Deleted {
        /// Branch name.
        branch: String,
    },
    /// The operator kept a branch.
    Skipped {
        /// Branch name.
        branch: String,
    },
    /// Deleting a branch failed.
    Failed {
        /// Branch name.
        branch: String,
        /// Why it failed.
        reason: String,
    },
    /// The operator aborted the remaining candidates of a pass.
    PassAborted(PassKind),
    /// A pass ended early on a gateway or network error.
    PassFailed {
        /// Which pass.
        kind: PassKind,
        /// Error description.
        message: String,
    },
    /// Neither pass found anything to delete.
    NothingToDo,
}

/// A local branch as shown by the branch listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStatus {
    /// Branch name and last commit time.
    pub record: BranchRecord,
    /// Whether `<remote>/<name>` exists.
    pub tracked: bool,
    /// Whether this branch is checked out.
    pub current: bool,
}
