use anyhow::Result;
use libsnip::{BranchStatus, Snip};
use snip_term::Output;

use crate::ui::emit;

/// Run the `snip list` command logic.
pub fn list(snip: &Snip, output: &dyn Output) -> Result<()> {
    let branches = snip.branches()?;
    if branches.is_empty() {
        emit(output.message("No local branches found."))?;
        return Ok(());
    }

    let remote = &snip.policy().remote;
    let rows: Vec<Vec<String>> = branches
        .iter()
        .map(|status| branch_row(status, remote))
        .collect();
    emit(output.table(
        Some("Local Branches"),
        &["Branch", "Last Edited", "Remote"],
        &rows,
    ))
}

/// Table cells for one branch; the checked-out branch is starred.
fn branch_row(status: &BranchStatus, remote: &str) -> Vec<String> {
    let marker = if status.current { "* " } else { "  " };
    let tracking = if status.tracked {
        format!("{remote}/{}", status.record.name)
    } else {
        "not pushed".to_string()
    };
    vec![
        format!("{marker}{}", status.record.name),
        status.record.last_commit.format("%Y-%m-%d").to_string(),
        tracking,
    ]
}
