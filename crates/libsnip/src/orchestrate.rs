use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::{
    error::Result,
    gateway::Gateway,
    policy::Policy,
    types::{
        BranchOutcome, BranchRecord, Candidate, Decision, DeletionOutcome, Notice, PassKind,
        PassReport,
    },
};

/// The operator-facing side of a cleanup.
///
/// Presenting a candidate blocks until the operator decides. Announcements
/// never block.
pub trait Interaction {
    /// Show an unpushed-stale branch and ask what to do with it.
    fn present_unpushed(&self, branch: &BranchRecord) -> Result<Decision>;
    /// Show a merged branch and ask what to do with it. `merged_at` is `None` when unknown.
    fn present_merged(&self, name: &str, merged_at: Option<NaiveDateTime>) -> Result<Decision>;
    /// Report a status change.
    fn announce(&self, notice: &Notice) -> Result<()>;
}

/// Walks a candidate list, asking for a decision on each and carrying it out.
pub struct Orchestrator<'a> {
    /// Repository operations.
    gateway: &'a dyn Gateway,
    /// Operator prompts and notices.
    interaction: &'a dyn Interaction,
    /// Active policy; supplies the mainline to fall back to.
    policy: &'a Policy,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator over the given collaborators.
    pub fn new(
        gateway: &'a dyn Gateway,
        interaction: &'a dyn Interaction,
        policy: &'a Policy,
    ) -> Self {
        Self {
            gateway,
            interaction,
            policy,
        }
    }

    /// Run one pass over `candidates`, all of which must be of kind `kind`.
    ///
    /// Branch-level failures are reported and recorded, and the pass moves on.
    /// Any other error ends the pass and is returned.
    pub fn run_pass(&self, kind: PassKind, candidates: &[Candidate]) -> Result<PassReport> {
        let mut report = PassReport::new(kind, candidates.len());
        for candidate in candidates {
            let decision = match candidate {
                Candidate::UnpushedStale(branch) => self.interaction.present_unpushed(branch)?,
                Candidate::Merged { name, merged_at } => {
                    self.interaction.present_merged(name, *merged_at)?
                }
            };
            debug!(branch = candidate.name(), ?decision, "operator decided");

            let outcome = match decision {
                Decision::Abort => {
                    report.aborted = true;
                    self.interaction.announce(&Notice::PassAborted(kind))?;
                    break;
                }
                Decision::Keep => {
                    self.interaction.announce(&Notice::Skipped {
                        branch: candidate.name().to_string(),
                    })?;
                    DeletionOutcome::Skipped
                }
                Decision::Delete => self.delete(candidate)?,
            };
            report.outcomes.push(BranchOutcome {
                branch: candidate.name().to_string(),
                outcome,
            });
        }
        Ok(report)
    }

    /// Delete one candidate with the safety mode its kind calls for.
    fn delete(&self, candidate: &Candidate) -> Result<DeletionOutcome> {
        match candidate {
            Candidate::UnpushedStale(branch) => self.delete_unpushed(&branch.name),
            // Safe mode: a branch that is not really reachable from the mainline survives.
            Candidate::Merged { name, .. } => {
                let result = self.gateway.delete_branch(name, false);
                self.settle(name, result)
            }
        }
    }

    /// Force-delete an unpushed branch, leaving it first if it is checked out.
    fn delete_unpushed(&self, name: &str) -> Result<DeletionOutcome> {
        if self.gateway.current_branch()? == name {
            let mainline = &self.policy.mainline;
            if let Err(err) = self.gateway.checkout(mainline) {
                return self.settle(name, Err(err));
            }
            info!(from = name, to = %mainline, "switched branch before deletion");
            self.interaction.announce(&Notice::SwitchedBranch {
                to: mainline.clone(),
            })?;
        }
        // No remote copy exists, so git's merge check has nothing to protect.
        let result = self.gateway.delete_branch(name, true);
        self.settle(name, result)
    }

    /// Turn the result of a deletion attempt into an outcome and tell the operator.
    fn settle(&self, name: &str, result: Result<()>) -> Result<DeletionOutcome> {
        match result {
            Ok(()) => {
                info!(branch = name, "deleted");
                self.interaction.announce(&Notice::Deleted {
                    branch: name.to_string(),
                })?;
                Ok(DeletionOutcome::Deleted)
            }
            Err(err) if err.is_branch_level() => {
                info!(branch = name, error = %err, "deletion failed");
                self.interaction.announce(&Notice::Failed {
                    branch: name.to_string(),
                    reason: err.to_string(),
                })?;
                Ok(DeletionOutcome::Failed)
            }
            Err(err) => Err(err),
        }
    }
}
