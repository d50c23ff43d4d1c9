use anyhow::Result;
use libsnip::Snip;
use snip_term::Output;

use super::{clean, list};
use crate::ui::{emit, prompt_select_optional};

/// Menu entries, in display order.
const ENTRIES: [&str; 3] = ["Delete unused and merged branches", "Show branches", "Quit"];

/// Run the interactive menu until the operator quits.
pub fn menu(snip: &Snip, output: &dyn Output) -> Result<()> {
    loop {
        let options = ENTRIES.iter().map(ToString::to_string).collect();
        match prompt_select_optional(output, "Select an option:", options)? {
            Some(0) => clean(snip, output)?,
            Some(1) => list(snip, output)?,
            _ => {
                emit(output.message("Exiting..."))?;
                return Ok(());
            }
        }
    }
}
