#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
//! Command-line interface for pruning stale and merged local branches via the libsnip crate.

/// Command-line arguments.
mod args;
/// Command implementations.
mod commands;
/// Rendering and prompt helpers.
mod ui;
/// Path helpers.
mod utils;

use std::{
    env,
    io::{self, IsTerminal, Write},
    process,
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use libsnip::{Config, Snip, SnipError};
use snip_term::{Output, Terminal};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{
    args::{Cli, Commands},
    utils::expand_tilde,
};

/// Default location of the config file.
const DEFAULT_CONFIG_PATH: &str = "~/.config/snip/config.toml";
/// Environment variable naming an alternative config file.
const CONFIG_ENV: &str = "SNIP_CONFIG";
/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "SNIP_LOG";

/// Install the stderr log subscriber. `verbose` overrides `SNIP_LOG`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load the config file: `--config`, then `SNIP_CONFIG`, then the default path.
///
/// An explicitly named file must exist; the default one is optional.
fn load_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(path) = &cli.config {
        Config::load(&expand_tilde(path))?
    } else if let Ok(path) = env::var(CONFIG_ENV) {
        Config::load(&expand_tilde(&path))?
    } else {
        Config::load_optional(&expand_tilde(DEFAULT_CONFIG_PATH))?
    };
    Ok(config)
}

/// CLI entrypoint.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = if cli.color {
        true
    } else if cli.no_color {
        false
    } else {
        io::stdout().is_terminal()
    };

    let output: Arc<dyn Output> = Arc::new(Terminal::new(color));

    if let Err(e) = run(&cli, &output) {
        // Reset any existing colors only if color was enabled and stdout is a TTY
        if color && io::stdout().is_terminal() {
            print!("\x1b[0m");
            if let Err(flush_err) = io::stdout().flush() {
                eprintln!("Failed to flush stdout while resetting colors: {flush_err}");
            }
        }

        let exit_code = match e.downcast_ref::<SnipError>() {
            Some(err @ SnipError::UserAborted) => err.exit_code(),
            Some(err) => {
                report_failure(output.as_ref(), &e);
                err.exit_code()
            }
            None => {
                report_failure(output.as_ref(), &e);
                1
            }
        };

        if let Err(finish_err) = output.finish() {
            eprintln!("Failed to flush output handler: {finish_err:#}");
        }
        process::exit(exit_code);
    }
    Ok(())
}

/// Show a fatal error through the output handler, falling back to stderr.
fn report_failure(output: &dyn Output, err: &anyhow::Error) {
    if let Err(display_err) = output.fail(&format!("{err:#}")) {
        eprintln!("{err:#}");
        eprintln!("Failed to report error via output handler: {display_err:#}");
    }
}

/// Execute the selected CLI command using the provided output implementation.
fn run(cli: &Cli, output: &Arc<dyn Output>) -> Result<()> {
    let policy = load_config(cli)?.merge(cli.overrides()).into_policy()?;
    debug!(?policy, "resolved policy");

    let repo_dir = cli.repo_dir.as_deref().map(expand_tilde);
    let snip = Snip::new(repo_dir, policy)?;

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => commands::menu(&snip, output.as_ref())?,
        Commands::Clean => commands::clean(&snip, output.as_ref())?,
        Commands::List => commands::list(&snip, output.as_ref())?,
    }

    output.finish()?;
    Ok(())
}
