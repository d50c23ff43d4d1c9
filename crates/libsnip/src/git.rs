use std::{
    error::Error,
    fmt,
    path::{Path, PathBuf},
    process::{Command, Output},
    result::Result as StdResult,
};

use chrono::{DateTime, Local, NaiveDateTime};
use tracing::{debug, warn};

use crate::{
    error::{Result, SnipError},
    gateway::Gateway,
    types::BranchRecord,
};

/// A git invocation that could not be started or exited unsuccessfully.
#[derive(Debug)]
struct GitFailure {
    /// The command line, e.g. `git branch -d topic`.
    command: String,
    /// Exit code, `None` when git could not be started at all.
    exit_code: Option<i32>,
    /// Trimmed stderr, or the spawn error.
    detail: String,
}

impl fmt::Display for GitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Git command failed: {}\nError: {}", self.command, self.detail)
    }
}

impl Error for GitFailure {}

/// Run a git command with the given arguments in the specified directory.
/// Returns the output if successful, otherwise a failure with the full command details.
fn run_git(repo_path: &Path, args: &[&str]) -> StdResult<Output, GitFailure> {
    let command = format!("git {}", args.join(" "));
    debug!(%command, "running git");
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .map_err(|e| GitFailure {
            command: command.clone(),
            exit_code: None,
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(GitFailure {
            command,
            exit_code: Some(output.status.code().unwrap_or(-1)),
            detail: stderr.trim().to_string(),
        });
    }

    Ok(output)
}

/// Run a git command whose exit status is the answer, e.g. `rev-parse --verify`.
fn git_succeeds(repo_path: &Path, args: &[&str]) -> StdResult<bool, GitFailure> {
    match run_git(repo_path, args) {
        Ok(_) => Ok(true),
        Err(failure) if failure.exit_code.is_some() => Ok(false),
        Err(failure) => Err(failure),
    }
}

/// Walk up from `start_dir` to find the nearest repository root containing a `.git` entry.
pub fn find_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Parse a strict ISO 8601 git date into naive local time.
fn parse_git_time(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|t| t.with_timezone(&Local).naive_local())
}

/// Parse one `<name>\t<committer date>` line from `git for-each-ref`.
fn parse_branch_line(line: &str) -> Result<BranchRecord> {
    let (name, date) = line
        .split_once('\t')
        .ok_or_else(|| SnipError::Gateway(format!("Unexpected branch listing line: {line:?}")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(SnipError::Gateway(format!(
            "Branch listing line has no branch name: {line:?}"
        )));
    }
    let last_commit = parse_git_time(date).ok_or_else(|| {
        SnipError::Gateway(format!("Invalid commit date for branch '{name}': {date:?}"))
    })?;
    Ok(BranchRecord {
        name: name.to_string(),
        last_commit,
    })
}

/// Turn `<refname>\t<symref>` lines into remote-qualified branch names.
///
/// Symbolic refs (`origin/HEAD`) and `<remote>/<mainline>` are dropped. A ref
/// outside `refs/remotes/` means git answered a different question than we
/// asked, so it is an error rather than something to skip.
fn parse_merged_listing(stdout: &str, remote: &str, mainline: &str) -> Result<Vec<String>> {
    let mainline_ref = format!("{remote}/{mainline}");
    let mut names = Vec::new();
    for line in stdout.lines().filter(|line| !line.trim().is_empty()) {
        let (refname, symref) = line.split_once('\t').unwrap_or((line, ""));
        if !symref.trim().is_empty() {
            continue;
        }
        let qualified = refname.trim().strip_prefix("refs/remotes/").ok_or_else(|| {
            SnipError::Gateway(format!("Unexpected ref in merged listing: {refname:?}"))
        })?;
        if qualified == mainline_ref || qualified.ends_with("/HEAD") {
            continue;
        }
        names.push(qualified.to_string());
    }
    Ok(names)
}

/// [`Gateway`] backed by the `git` command-line tool.
#[derive(Debug, Clone)]
pub struct GitGateway {
    /// Root of the repository all commands run in.
    repo_path: PathBuf,
}

impl GitGateway {
    /// Create a gateway for the repository rooted at `repo_path`.
    pub fn new(repo_path: PathBuf) -> Self {
        Self { repo_path }
    }

    /// Run git and return stdout, mapping any failure to [`SnipError::Gateway`].
    fn read(&self, args: &[&str]) -> Result<String> {
        let output =
            run_git(&self.repo_path, args).map_err(|f| SnipError::Gateway(f.to_string()))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run a yes/no git check, mapping spawn failures to [`SnipError::Gateway`].
    fn check(&self, args: &[&str]) -> Result<bool> {
        git_succeeds(&self.repo_path, args).map_err(|f| SnipError::Gateway(f.to_string()))
    }
}

impl Gateway for GitGateway {
    fn list_local_branches(&self) -> Result<Vec<BranchRecord>> {
        let stdout = self.read(&[
            "for-each-ref",
            "--sort=-committerdate",
            "--format=%(refname:short)%09%(committerdate:iso8601-strict)",
            "refs/heads/",
        ])?;
        stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(parse_branch_line)
            .collect()
    }

    fn remote_tracking_exists(&self, remote: &str, name: &str) -> Result<bool> {
        let refname = format!("refs/remotes/{remote}/{name}");
        self.check(&["rev-parse", "--verify", "--quiet", &refname])
    }

    fn local_branch_exists(&self, name: &str) -> Result<bool> {
        let refname = format!("refs/heads/{name}");
        self.check(&["rev-parse", "--verify", "--quiet", &refname])
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.read(&["branch", "--show-current"])?.trim().to_string())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        run_git(&self.repo_path, &["checkout", "--quiet", name]).map_err(|f| {
            SnipError::Checkout {
                branch: name.to_string(),
                message: f.detail,
            }
        })?;
        Ok(())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        let mut args = vec!["branch"];
        if force {
            args.push("-D");
        } else {
            args.push("-d");
        }
        args.push(name);

        run_git(&self.repo_path, &args).map_err(|f| SnipError::Delete {
            branch: name.to_string(),
            message: f.detail,
        })?;
        Ok(())
    }

    fn fetch_all(&self) -> Result<()> {
        run_git(&self.repo_path, &["fetch", "--all", "--quiet"])
            .map_err(|f| SnipError::Network(f.to_string()))?;
        Ok(())
    }

    fn list_merged_remote_branches(&self, remote: &str, mainline: &str) -> Result<Vec<String>> {
        let merged = format!("--merged=refs/remotes/{remote}/{mainline}");
        let scope = format!("refs/remotes/{remote}/");
        let stdout = self.read(&[
            "for-each-ref",
            &merged,
            "--format=%(refname)%09%(symref)",
            &scope,
        ])?;
        parse_merged_listing(&stdout, remote, mainline)
    }

    fn merge_timestamp(&self, mainline: &str, branch: &str) -> Result<Option<NaiveDateTime>> {
        let range = format!("{mainline}..{branch}");
        let output = match run_git(&self.repo_path, &["log", "-1", "--format=%cI", &range]) {
            Ok(output) => output,
            Err(failure) => {
                warn!(%failure, "could not resolve merge time, reporting it as unknown");
                return Ok(None);
            }
        };
        let stdout = String::from_utf8_lossy(&output.stdout);
        let raw = stdout.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        parse_git_time(raw)
            .map(Some)
            .ok_or_else(|| SnipError::Gateway(format!("Invalid commit date for {range}: {raw:?}")))
    }
}
