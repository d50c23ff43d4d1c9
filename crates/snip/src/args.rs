use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use libsnip::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("color_mode")
        .args(["color", "no_color"])
))]
/// Top-level CLI options for snip.
pub struct Cli {
    /// Override the repository directory (defaults to current git project)
    #[arg(long, global = true, value_name = "DIR")]
    pub repo_dir: Option<String>,

    /// Read settings from this file instead of ~/.config/snip/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,

    /// Enable colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Log git invocations and classifier decisions to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Integration branch that deletions fall back to
    #[arg(long, global = true, value_name = "BRANCH")]
    pub mainline: Option<String>,

    /// Remote used for tracking checks and merged detection
    #[arg(long, global = true, value_name = "NAME")]
    pub remote: Option<String>,

    /// Unpushed branches are stale once their last commit is this many days old
    #[arg(long, global = true, value_name = "DAYS", conflicts_with = "stale_before")]
    pub stale_days: Option<u32>,

    /// Unpushed branches are stale if their last commit predates this day (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    pub stale_before: Option<NaiveDate>,

    /// Offer every unpushed branch regardless of age
    #[arg(long, global = true)]
    pub ignore_age: bool,

    /// Only offer unpushed branches older than the cutoff, even if the config disables it
    #[arg(long, global = true, conflicts_with = "ignore_age")]
    pub enforce_age: bool,

    /// Skip the unpushed-stale pass
    #[arg(long, global = true)]
    pub skip_unpushed: bool,

    /// Run the unpushed-stale pass, even if the config disables it
    #[arg(long, global = true, conflicts_with = "skip_unpushed")]
    pub unpushed: bool,

    /// Skip the merged pass (and the fetch it needs)
    #[arg(long, global = true)]
    pub skip_merged: bool,

    /// Run the merged pass, even if the config disables it
    #[arg(long, global = true, conflicts_with = "skip_merged")]
    pub merged: bool,

    #[command(subcommand)]
    /// The command to execute; the interactive menu when omitted.
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
/// CLI subcommands supported by snip.
pub enum Commands {
    /// Interactive menu: clean up, show branches, or quit
    Menu,

    /// Walk through stale and merged branches, deciding on each
    Clean,

    /// Show local branches with their remote status
    #[command(alias = "ls")]
    List,
}

/// Fold an on/off flag pair into an override; `None` leaves the config value alone.
fn switch(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Cli {
    /// Settings given on the command line, to layer over the config file.
    pub fn overrides(&self) -> Config {
        Config {
            delete_unpushed: switch(self.unpushed, self.skip_unpushed),
            enforce_cutoff: switch(self.enforce_age, self.ignore_age),
            delete_merged: switch(self.merged, self.skip_merged),
            stale_days: self.stale_days,
            stale_before: self.stale_before,
            mainline: self.mainline.clone(),
            remote: self.remote.clone(),
        }
    }
}
