use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Result, ensure};
use tempfile::TempDir;

/// Return the path to the compiled `snip` binary for integration-style tests.
pub fn snip_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_snip"))
}

/// Run a git command inside `repo_path`, ensuring it succeeds.
pub fn git(repo_path: &Path, args: &[&str]) -> Result<Output> {
    let output = Command::new("git")
        .current_dir(repo_path)
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {}", args.join(" ")))?;

    ensure!(
        output.status.success(),
        "git command failed: git {}\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );

    Ok(output)
}

/// Initialise a new repository on `main` at `repo_path` with a README commit.
pub fn init_repository(repo_path: &Path) -> Result<()> {
    if !repo_path.exists() {
        fs::create_dir_all(repo_path)?;
    }

    git(repo_path, &["init", "--quiet", "-b", "main"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    git(repo_path, &["config", "user.name", "Test User"])?;

    fs::write(repo_path.join("README.md"), "# Test Project")?;
    git(repo_path, &["add", "README.md"])?;
    git(repo_path, &["commit", "--quiet", "-m", "Initial commit"])?;

    Ok(())
}

/// Create a temporary repository named `repo_name` inside a fresh temp dir.
pub fn create_repo(repo_name: &str) -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().join(repo_name);
    init_repository(&repo_path)?;
    Ok((temp_dir, repo_path))
}

/// Add a bare repository next to `repo_path` as remote `name` and push `main` to it.
pub fn add_remote(repo_path: &Path, name: &str) -> Result<PathBuf> {
    let parent = repo_path.parent().context("repository has no parent dir")?;
    let remote_path = parent.join(format!("{name}.git"));
    let remote = remote_path.to_string_lossy().to_string();
    git(parent, &["init", "--quiet", "--bare", &remote])?;
    git(repo_path, &["remote", "add", name, &remote])?;
    git(repo_path, &["push", "--quiet", name, "main"])?;
    Ok(remote_path)
}

/// Commit a new file on the current branch.
pub fn commit_file(repo_path: &Path, file: &str, message: &str) -> Result<()> {
    fs::write(repo_path.join(file), message)?;
    git(repo_path, &["add", file])?;
    git(repo_path, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Prepare a `Command` running `snip` in `dir`, isolated from the user's config.
pub fn snip_command(dir: &Path, home: &Path) -> Command {
    let mut cmd = Command::new(snip_binary());
    cmd.current_dir(dir);
    cmd.env("HOME", home);
    cmd.env_remove("SNIP_CONFIG");
    cmd.env_remove("SNIP_LOG");
    cmd.arg("--no-color");
    cmd
}

/// Run `snip` with the provided arguments, returning the command output.
pub fn run_snip(dir: &Path, home: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = snip_command(dir, home);
    cmd.args(args);
    cmd.output()
        .with_context(|| format!("failed to run snip {}", args.join(" ")))
}

/// Stdout of a finished command as a string.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
