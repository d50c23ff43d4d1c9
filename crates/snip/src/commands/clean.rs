use anyhow::Result;
use chrono::Local;
use libsnip::Snip;
use snip_term::Output;

use crate::ui::{TerminalInteraction, render_summary};

/// Run the `snip clean` command logic.
pub fn clean(snip: &Snip, output: &dyn Output) -> Result<()> {
    let interaction = TerminalInteraction::new(output);
    let summary = snip.cleanup(&interaction, Local::now().naive_local())?;
    render_summary(output, &summary)
}
