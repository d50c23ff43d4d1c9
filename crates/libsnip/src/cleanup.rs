use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::{
    classify::{classify_merged, classify_unpushed_stale},
    error::Result,
    gateway::Gateway,
    orchestrate::{Interaction, Orchestrator},
    policy::Policy,
    types::{CleanupSummary, Notice, PassKind, PassReport, PassState},
};

/// Run the unpushed-stale pass, then the merged pass.
///
/// The passes are independent: a gateway or network error ends only the pass
/// it occurred in, and an abort in the first pass does not skip the second.
/// "Nothing to do" is announced only when both passes ran and found nothing.
pub fn run_cleanup(
    gateway: &dyn Gateway,
    interaction: &dyn Interaction,
    policy: &Policy,
    now: NaiveDateTime,
) -> Result<CleanupSummary> {
    let orchestrator = Orchestrator::new(gateway, interaction, policy);

    let unpushed = if policy.delete_unpushed {
        run_pass(interaction, PassKind::UnpushedStale, || {
            let branches = gateway.list_local_branches()?;
            let candidates = classify_unpushed_stale(gateway, &branches, policy, now)?;
            orchestrator.run_pass(PassKind::UnpushedStale, &candidates)
        })?
    } else {
        PassState::Disabled
    };

    let merged = if policy.delete_merged {
        run_pass(interaction, PassKind::Merged, || {
            let candidates = classify_merged(gateway, policy)?;
            orchestrator.run_pass(PassKind::Merged, &candidates)
        })?
    } else {
        PassState::Disabled
    };

    let summary = CleanupSummary { unpushed, merged };
    let failed = [&summary.unpushed, &summary.merged]
        .iter()
        .any(|state| matches!(state, PassState::Failed(_)));
    if !failed && summary.unpushed.candidates() + summary.merged.candidates() == 0 {
        interaction.announce(&Notice::NothingToDo)?;
    }
    Ok(summary)
}

/// Announce and run one pass, containing errors that are fatal only to it.
fn run_pass<F>(interaction: &dyn Interaction, kind: PassKind, pass: F) -> Result<PassState>
where
    F: FnOnce() -> Result<PassReport>,
{
    interaction.announce(&Notice::Searching(kind))?;
    match pass() {
        Ok(report) => {
            info!(
                pass = %kind,
                candidates = report.candidates,
                aborted = report.aborted,
                "pass finished"
            );
            Ok(PassState::Completed(report))
        }
        Err(err) if err.is_pass_fatal() => {
            warn!(pass = %kind, error = %err, "pass ended early");
            let message = err.to_string();
            interaction.announce(&Notice::PassFailed {
                kind,
                message: message.clone(),
            })?;
            Ok(PassState::Failed(message))
        }
        Err(err) => Err(err),
    }
}
