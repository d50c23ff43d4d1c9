use std::{env, path::PathBuf};

use chrono::NaiveDateTime;

use crate::{
    cleanup::run_cleanup,
    error::{Result, SnipError},
    gateway::Gateway,
    git::{GitGateway, find_root},
    orchestrate::Interaction,
    policy::Policy,
    types::{BranchStatus, CleanupSummary},
};

/// Branch cleanup for one repository under one policy.
pub struct Snip {
    /// Gateway for the repository.
    gateway: GitGateway,
    /// Active policy.
    policy: Policy,
}

impl Snip {
    /// Open the repository containing `repo_dir`, or the current directory.
    pub fn new(repo_dir: Option<PathBuf>, policy: Policy) -> Result<Self> {
        let start = match repo_dir {
            Some(dir) => dir,
            None => env::current_dir()?,
        };
        let root = find_root(&start).ok_or_else(|| {
            SnipError::Context(format!("Not inside a git repository: {}", start.display()))
        })?;
        Ok(Self {
            gateway: GitGateway::new(root),
            policy,
        })
    }

    /// The active policy.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Run both cleanup passes, asking `interaction` about every candidate.
    pub fn cleanup(
        &self,
        interaction: &dyn Interaction,
        now: NaiveDateTime,
    ) -> Result<CleanupSummary> {
        run_cleanup(&self.gateway, interaction, &self.policy, now)
    }

    /// Every local branch, most recent first, with remote and checkout status.
    pub fn branches(&self) -> Result<Vec<BranchStatus>> {
        let current = self.gateway.current_branch()?;
        self.gateway
            .list_local_branches()?
            .into_iter()
            .map(|record| {
                let tracked = self
                    .gateway
                    .remote_tracking_exists(&self.policy.remote, &record.name)?;
                let is_current = record.name == current;
                Ok(BranchStatus {
                    record,
                    tracked,
                    current: is_current,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testutil::ScriptedInteraction,
        types::{Decision, DeletionOutcome, PassReport, PassState},
    };
    use anyhow::Result;
    use chrono::Local;
    use std::{fs, path::Path, process::Command};
    use tempfile::TempDir;

    fn git(repo_path: &Path, args: &[&str]) -> Result<()> {
        let status = Command::new("git").current_dir(repo_path).args(args).status()?;
        anyhow::ensure!(status.success(), "git {} failed", args.join(" "));
        Ok(())
    }

    fn setup_repo() -> Result<(TempDir, PathBuf)> {
        let temp_dir = TempDir::new()?;
        let repo_path = temp_dir.path().join("work");
        fs::create_dir(&repo_path)?;
        git(&repo_path, &["init", "--quiet", "-b", "main"])?;
        git(&repo_path, &["config", "user.email", "test@example.com"])?;
        git(&repo_path, &["config", "user.name", "Test User"])?;
        fs::write(repo_path.join("README.md"), "# Test Repo")?;
        git(&repo_path, &["add", "README.md"])?;
        git(&repo_path, &["commit", "--quiet", "-m", "Initial commit"])?;
        Ok((temp_dir, repo_path))
    }

    /// Commit a new file with both author and committer dates pinned to `date`.
    fn commit_at(repo_path: &Path, file: &str, date: &str) -> Result<()> {
        fs::write(repo_path.join(file), file)?;
        git(repo_path, &["add", file])?;
        let status = Command::new("git")
            .current_dir(repo_path)
            .env("GIT_AUTHOR_DATE", date)
            .env("GIT_COMMITTER_DATE", date)
            .args(["commit", "--quiet", "-m", file])
            .status()?;
        anyhow::ensure!(status.success(), "commit of {file} failed");
        Ok(())
    }

    /// Like [`setup_repo`], with `main` pushed to a bare `origin` in the same temp dir.
    fn setup_repo_with_remote() -> Result<(TempDir, PathBuf)> {
        let (temp_dir, repo_path) = setup_repo()?;
        let remote_path = temp_dir.path().join("remote.git");
        fs::create_dir(&remote_path)?;
        git(&remote_path, &["init", "--quiet", "--bare", "-b", "main"])?;
        let remote_str = remote_path.to_str().expect("utf-8 temp path");
        git(&repo_path, &["remote", "add", "origin", remote_str])?;
        git(&repo_path, &["push", "--quiet", "-u", "origin", "main"])?;
        Ok((temp_dir, repo_path))
    }

    fn completed(state: &PassState) -> &PassReport {
        match state {
            PassState::Completed(report) => report,
            other => panic!("pass did not complete: {other:?}"),
        }
    }

    #[test]
    fn test_cleanup_deletes_against_git() -> Result<()> {
        let (_temp_dir, repo_path) = setup_repo_with_remote()?;

        // `done` is pushed and merged into main on the remote.
        git(&repo_path, &["checkout", "--quiet", "-b", "done"])?;
        commit_at(&repo_path, "done.txt", "2024-03-01T10:00:00+00:00")?;
        git(&repo_path, &["push", "--quiet", "origin", "done"])?;
        git(&repo_path, &["checkout", "--quiet", "main"])?;
        git(&repo_path, &["merge", "--quiet", "--ff-only", "done"])?;
        git(&repo_path, &["push", "--quiet", "origin", "main"])?;

        // `wip` is old, never pushed, and checked out.
        git(&repo_path, &["checkout", "--quiet", "-b", "wip"])?;
        commit_at(&repo_path, "wip.txt", "2024-01-01T00:00:00+00:00")?;

        let snip = Snip::new(Some(repo_path), Policy::default())?;
        let interaction = ScriptedInteraction::new(&[Decision::Delete, Decision::Delete]);
        let summary = snip.cleanup(&interaction, Local::now().naive_local())?;

        assert_eq!(interaction.presented(), vec!["wip", "done"]);
        assert_eq!(completed(&summary.unpushed).count(DeletionOutcome::Deleted), 1);
        assert_eq!(completed(&summary.merged).count(DeletionOutcome::Deleted), 1);

        let remaining: Vec<_> = snip
            .branches()?
            .into_iter()
            .map(|b| (b.record.name, b.current))
            .collect();
        assert_eq!(remaining, vec![("main".to_string(), true)]);
        Ok(())
    }

    #[test]
    fn test_new_outside_repository() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let err = Snip::new(Some(temp_dir.path().to_path_buf()), Policy::default())
            .err()
            .expect("no repository here");
        assert!(matches!(err, SnipError::Context(_)));
        Ok(())
    }

    #[test]
    fn test_new_from_subdirectory() -> Result<()> {
        let (_temp_dir, repo_path) = setup_repo()?;
        let nested = repo_path.join("src");
        fs::create_dir(&nested)?;

        let snip = Snip::new(Some(nested), Policy::default())?;
        assert_eq!(snip.branches()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_branches_status() -> Result<()> {
        let (_temp_dir, repo_path) = setup_repo()?;
        git(&repo_path, &["branch", "topic"])?;

        let snip = Snip::new(Some(repo_path), Policy::default())?;
        let mut branches = snip.branches()?;
        branches.sort_by(|a, b| a.record.name.cmp(&b.record.name));

        let summary: Vec<_> = branches
            .iter()
            .map(|b| (b.record.name.as_str(), b.tracked, b.current))
            .collect();
        assert_eq!(summary, vec![("main", false, true), ("topic", false, false)]);
        Ok(())
    }
}
