use std::result::Result as StdResult;

use anyhow::Result;
use chrono::NaiveDateTime;
use libsnip::{
    BranchRecord, CleanupSummary, Decision, DeletionOutcome, Interaction, Notice, PassKind,
    PassReport, PassState, SnipError,
};
use snip_term::{Output, OutputError};
use tracing::debug;

/// Per-candidate choices, in the order they are offered.
const DECISIONS: [(&str, Decision); 3] = [
    ("Yes, delete", Decision::Delete),
    ("No, keep", Decision::Keep),
    ("Quit", Decision::Abort),
];

/// Convert output-layer failures into domain errors.
pub fn map_output_error(err: OutputError) -> SnipError {
    match err {
        OutputError::Cancelled => SnipError::UserAborted,
        other => SnipError::Interaction(format!("Output operation failed: {other}")),
    }
}

/// Emit an output result, mapping errors into `SnipError`.
pub fn emit(result: StdResult<(), OutputError>) -> Result<()> {
    result.map_err(map_output_error)?;
    Ok(())
}

/// Prompt for selection, returning `None` on cancellation.
pub fn prompt_select_optional(
    output: &dyn Output,
    prompt: &str,
    options: Vec<String>,
) -> Result<Option<usize>> {
    match output.select(prompt, options) {
        Ok(selection) => Ok(Some(selection)),
        Err(OutputError::Cancelled) => Ok(None),
        Err(err) => Err(map_output_error(err).into()),
    }
}

/// Presents candidates and notices through an [`Output`].
pub struct TerminalInteraction<'a> {
    /// Where tables, prompts and notices go.
    output: &'a dyn Output,
}

impl<'a> TerminalInteraction<'a> {
    /// Create an interaction that renders to `output`.
    pub fn new(output: &'a dyn Output) -> Self {
        Self { output }
    }

    /// Ask for a decision. Cancelling the prompt aborts the pass.
    fn decide(&self, prompt: &str) -> libsnip::Result<Decision> {
        let options = DECISIONS.iter().map(|(label, _)| label.to_string()).collect();
        match self.output.select(prompt, options) {
            Ok(index) => DECISIONS
                .get(index)
                .map(|(_, decision)| *decision)
                .ok_or_else(|| SnipError::Interaction(format!("no choice at index {index}"))),
            Err(OutputError::Cancelled) => Ok(Decision::Abort),
            Err(err) => Err(map_output_error(err)),
        }
    }

    /// Render a single-row table, mapping output failures into `SnipError`.
    fn show(&self, title: Option<&str>, headers: &[&str], row: Vec<String>) -> libsnip::Result<()> {
        self.output
            .table(title, headers, &[row])
            .map_err(map_output_error)
    }
}

impl Interaction for TerminalInteraction<'_> {
    fn present_unpushed(&self, branch: &BranchRecord) -> libsnip::Result<Decision> {
        self.show(
            Some("Branch Information"),
            &["Branch", "Last Edited"],
            vec![
                branch.name.clone(),
                branch.last_commit.format("%Y-%m-%d").to_string(),
            ],
        )?;
        self.decide("Delete this branch locally?")
    }

    fn present_merged(
        &self,
        name: &str,
        merged_at: Option<NaiveDateTime>,
    ) -> libsnip::Result<Decision> {
        let merged_at = merged_at.map_or_else(
            || "Unknown".to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        self.show(None, &["Branch", "Merge Time"], vec![name.to_string(), merged_at])?;
        self.decide("Delete this merged branch locally?")
    }

    fn announce(&self, notice: &Notice) -> libsnip::Result<()> {
        debug!(?notice, "announce");
        let output = self.output;
        let result = match notice {
            Notice::Searching(PassKind::UnpushedStale) => {
                output.message("Searching for unused branches...")
            }
            Notice::Searching(PassKind::Merged) => output.message("Searching for merged branches..."),
            Notice::SwitchedBranch { to } => output.success(&format!("Switched to '{to}' branch.")),
            Notice::Deleted { branch } => output.success(&format!("Branch '{branch}' deleted.")),
            Notice::Skipped { branch } => output.warn(&format!("Branch '{branch}' skipped.")),
            Notice::Failed { branch, reason } => {
                output.fail(&format!("Failed to delete branch '{branch}': {reason}"))
            }
            Notice::PassAborted(kind) => output.warn(&format!(
                "Operation cancelled, skipping the remaining {kind} branches."
            )),
            Notice::PassFailed { kind, message } => {
                output.fail(&format!("The {kind} pass stopped early: {message}"))
            }
            Notice::NothingToDo => output.message("Nothing to do: no unused or merged branches found."),
        };
        result.map_err(map_output_error)
    }
}

/// One-line tally of a completed pass.
fn tally(report: &PassReport) -> String {
    let mut line = format!(
        "{} branches: {} deleted, {} kept, {} failed",
        report.kind,
        report.count(DeletionOutcome::Deleted),
        report.count(DeletionOutcome::Skipped),
        report.count(DeletionOutcome::Failed),
    );
    if report.aborted {
        let unanswered = report.candidates.saturating_sub(report.outcomes.len());
        line.push_str(&format!(", {unanswered} not reviewed"));
    }
    line
}

/// Render the per-pass outcome of a cleanup run.
pub fn render_summary(output: &dyn Output, summary: &CleanupSummary) -> Result<()> {
    // An empty run was already reported as "nothing to do".
    if summary.unpushed.candidates() + summary.merged.candidates() == 0 {
        return Ok(());
    }

    for state in [&summary.unpushed, &summary.merged] {
        let PassState::Completed(report) = state else {
            continue;
        };
        if report.candidates == 0 {
            let msg = match report.kind {
                PassKind::UnpushedStale => "No unused branches found that meet the criteria.",
                PassKind::Merged => "No merged branches found.",
            };
            emit(output.message(msg))?;
        } else {
            emit(output.message(&tally(report)))?;
        }
    }
    Ok(())
}
