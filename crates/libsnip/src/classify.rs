use chrono::NaiveDateTime;
use tracing::debug;

use crate::{
    error::{Result, SnipError},
    gateway::Gateway,
    policy::Policy,
    types::{BranchRecord, Candidate},
};

/// Select local branches that were never pushed and, optionally, are older than the cutoff.
///
/// The remote check always runs. The cutoff check is skipped when the policy
/// does not enforce it. Input order is preserved and the mainline is never a
/// candidate. Returns nothing when the pass is disabled.
pub fn classify_unpushed_stale(
    gateway: &dyn Gateway,
    branches: &[BranchRecord],
    policy: &Policy,
    now: NaiveDateTime,
) -> Result<Vec<Candidate>> {
    if !policy.delete_unpushed {
        return Ok(Vec::new());
    }

    let cutoff = policy.staleness.cutoff(now);
    let mut candidates = Vec::new();
    for branch in branches {
        if branch.name == policy.mainline {
            continue;
        }
        if gateway.remote_tracking_exists(&policy.remote, &branch.name)? {
            debug!(branch = %branch.name, "has a remote counterpart");
            continue;
        }
        if policy.enforce_cutoff && branch.last_commit >= cutoff {
            debug!(branch = %branch.name, %cutoff, "unpushed but recent");
            continue;
        }
        candidates.push(Candidate::UnpushedStale(branch.clone()));
    }
    Ok(candidates)
}

/// Select branches the remote has merged into the mainline.
///
/// Fetches first, so remote state is fresh. Returns nothing, without touching
/// the gateway, when the pass is disabled. Merged remote branches with no local
/// branch of the same name are left out.
pub fn classify_merged(gateway: &dyn Gateway, policy: &Policy) -> Result<Vec<Candidate>> {
    if !policy.delete_merged {
        return Ok(Vec::new());
    }

    gateway.fetch_all()?;
    let prefix = format!("{}/", policy.remote);
    let mut candidates = Vec::new();
    for qualified in gateway.list_merged_remote_branches(&policy.remote, &policy.mainline)? {
        let name = qualified
            .strip_prefix(&prefix)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                SnipError::Gateway(format!(
                    "Merged branch '{qualified}' is not under remote '{}'",
                    policy.remote
                ))
            })?;
        if name == policy.mainline {
            continue;
        }
        if !gateway.local_branch_exists(name)? {
            debug!(branch = %name, "merged on the remote, no local branch");
            continue;
        }
        let merged_at = gateway.merge_timestamp(&policy.mainline, &qualified)?;
        candidates.push(Candidate::Merged {
            name: name.to_string(),
            merged_at,
        });
    }
    Ok(candidates)
}
