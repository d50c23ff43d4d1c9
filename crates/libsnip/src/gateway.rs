use chrono::NaiveDateTime;

use crate::{error::Result, types::BranchRecord};

/// Version-control operations the classifier and orchestrator depend on.
///
/// [`GitGateway`](crate::GitGateway) binds this to the `git` binary. Failures
/// must use the matching [`SnipError`](crate::SnipError) variant: `Checkout`
/// from [`checkout`](Self::checkout), `Delete` from
/// [`delete_branch`](Self::delete_branch), `Network` from
/// [`fetch_all`](Self::fetch_all), and `Gateway` for everything else.
pub trait Gateway {
    /// List local branches, most recently committed first.
    fn list_local_branches(&self) -> Result<Vec<BranchRecord>>;

    /// Whether `<remote>/<name>` resolves. A missing ref is `Ok(false)`.
    fn remote_tracking_exists(&self, remote: &str, name: &str) -> Result<bool>;

    /// Whether a local branch called `name` exists.
    fn local_branch_exists(&self, name: &str) -> Result<bool>;

    /// Name of the checked-out branch, empty on a detached HEAD.
    fn current_branch(&self) -> Result<String>;

    /// Switch the working tree to `name`.
    fn checkout(&self, name: &str) -> Result<()>;

    /// Delete the local branch `name`. Without `force`, unmerged branches are refused.
    fn delete_branch(&self, name: &str, force: bool) -> Result<()>;

    /// Fetch from all remotes.
    fn fetch_all(&self) -> Result<()>;

    /// Remote-qualified branches of `remote` merged into `<remote>/<mainline>`.
    ///
    /// The symbolic `HEAD` pointer and the mainline itself are excluded.
    fn list_merged_remote_branches(&self, remote: &str, mainline: &str) -> Result<Vec<String>>;

    /// Commit time of the newest commit on `branch` that is not on `mainline`.
    ///
    /// `None` when the branch has no such commits.
    fn merge_timestamp(&self, mainline: &str, branch: &str) -> Result<Option<NaiveDateTime>>;
}
