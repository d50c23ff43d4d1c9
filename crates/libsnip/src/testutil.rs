use std::{
    cell::RefCell,
    collections::{HashMap, HashSet, VecDeque},
};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use crate::{
    error::{Result, SnipError},
    gateway::Gateway,
    orchestrate::Interaction,
    types::{BranchRecord, Decision, Notice},
};

/// Fixed classification time used across tests.
pub(crate) fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 20)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid date")
}

/// A time `days` days before [`now`].
pub(crate) fn days_ago(days: i64) -> NaiveDateTime {
    now() - TimeDelta::days(days)
}

/// A gateway call, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    /// `list_local_branches`
    ListLocal,
    /// `remote_tracking_exists`
    RemoteExists(String),
    /// `local_branch_exists`
    LocalExists(String),
    /// `current_branch`
    CurrentBranch,
    /// `checkout`
    Checkout(String),
    /// `delete_branch`
    Delete {
        /// Branch name.
        name: String,
        /// Forced removal.
        force: bool,
    },
    /// `fetch_all`
    FetchAll,
    /// `list_merged_remote_branches`
    ListMerged,
    /// `merge_timestamp`
    MergeTimestamp(String),
}

/// Scriptable [`Gateway`] that records every call.
pub(crate) struct FakeGateway {
    /// Local branches, most recent first.
    branches: RefCell<Vec<BranchRecord>>,
    /// Branch names with a remote counterpart.
    tracked: HashSet<String>,
    /// Remote-qualified merged branches.
    merged: Vec<String>,
    /// Merge times by remote-qualified name.
    merge_times: HashMap<String, NaiveDateTime>,
    /// Checked-out branch.
    current: RefCell<String>,
    /// Fail every checkout.
    refuse_checkout: bool,
    /// Branches a safe delete refuses.
    refuse_delete: HashSet<String>,
    /// Fail `fetch_all`.
    fail_fetch: bool,
    /// Fail remote tracking checks.
    fail_remote_checks: bool,
    /// Fail `list_local_branches`.
    fail_listing: bool,
    /// Call log.
    calls: RefCell<Vec<Call>>,
}

impl FakeGateway {
    /// A repository with `branches`, checked out on `main`, with nothing pushed.
    pub(crate) fn new(branches: &[BranchRecord]) -> Self {
        Self {
            branches: RefCell::new(branches.to_vec()),
            tracked: HashSet::new(),
            merged: Vec::new(),
            merge_times: HashMap::new(),
            current: RefCell::new("main".to_string()),
            refuse_checkout: false,
            refuse_delete: HashSet::new(),
            fail_fetch: false,
            fail_remote_checks: false,
            fail_listing: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Mark `names` as present on the remote.
    pub(crate) fn tracked(mut self, names: &[&str]) -> Self {
        self.tracked.extend(names.iter().map(ToString::to_string));
        self
    }

    /// Set the remote-qualified merged listing.
    pub(crate) fn merged(mut self, qualified: &[&str]) -> Self {
        self.merged = qualified.iter().map(ToString::to_string).collect();
        self
    }

    /// Record a merge time for a remote-qualified branch.
    pub(crate) fn merge_time(mut self, qualified: &str, at: NaiveDateTime) -> Self {
        self.merge_times.insert(qualified.to_string(), at);
        self
    }

    /// Check out `name`.
    pub(crate) fn on_branch(self, name: &str) -> Self {
        *self.current.borrow_mut() = name.to_string();
        self
    }

    /// Make every checkout fail.
    pub(crate) fn refusing_checkout(mut self) -> Self {
        self.refuse_checkout = true;
        self
    }

    /// Make safe deletes of `names` fail as unmerged.
    pub(crate) fn refusing_safe_delete(mut self, names: &[&str]) -> Self {
        self.refuse_delete
            .extend(names.iter().map(ToString::to_string));
        self
    }

    /// Make `fetch_all` fail.
    pub(crate) fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Make remote tracking checks fail.
    pub(crate) fn failing_remote_checks(mut self) -> Self {
        self.fail_remote_checks = true;
        self
    }

    /// Make branch listing fail.
    pub(crate) fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Every call so far.
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Only the calls that change the repository.
    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Checkout(_) | Call::Delete { .. }))
            .collect()
    }

    /// Currently checked-out branch.
    pub(crate) fn current(&self) -> String {
        self.current.borrow().clone()
    }

    /// Append to the call log.
    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl Gateway for FakeGateway {
    fn list_local_branches(&self) -> Result<Vec<BranchRecord>> {
        self.record(Call::ListLocal);
        if self.fail_listing {
            return Err(SnipError::Gateway("repository unreadable".to_string()));
        }
        Ok(self.branches.borrow().clone())
    }

    fn remote_tracking_exists(&self, _remote: &str, name: &str) -> Result<bool> {
        self.record(Call::RemoteExists(name.to_string()));
        if self.fail_remote_checks {
            return Err(SnipError::Gateway("rev-parse crashed".to_string()));
        }
        Ok(self.tracked.contains(name))
    }

    fn local_branch_exists(&self, name: &str) -> Result<bool> {
        self.record(Call::LocalExists(name.to_string()));
        Ok(self.branches.borrow().iter().any(|b| b.name == name))
    }

    fn current_branch(&self) -> Result<String> {
        self.record(Call::CurrentBranch);
        Ok(self.current())
    }

    fn checkout(&self, name: &str) -> Result<()> {
        self.record(Call::Checkout(name.to_string()));
        if self.refuse_checkout {
            return Err(SnipError::Checkout {
                branch: name.to_string(),
                message: "local changes would be overwritten".to_string(),
            });
        }
        *self.current.borrow_mut() = name.to_string();
        Ok(())
    }

    fn delete_branch(&self, name: &str, force: bool) -> Result<()> {
        self.record(Call::Delete {
            name: name.to_string(),
            force,
        });
        let refuse = |message: &str| SnipError::Delete {
            branch: name.to_string(),
            message: message.to_string(),
        };
        if self.current() == name {
            return Err(refuse("branch is checked out"));
        }
        if !force && self.refuse_delete.contains(name) {
            return Err(refuse("branch is not fully merged"));
        }
        let mut branches = self.branches.borrow_mut();
        let before = branches.len();
        branches.retain(|b| b.name != name);
        if branches.len() == before {
            return Err(refuse("branch not found"));
        }
        Ok(())
    }

    fn fetch_all(&self) -> Result<()> {
        self.record(Call::FetchAll);
        if self.fail_fetch {
            return Err(SnipError::Network("could not resolve host".to_string()));
        }
        Ok(())
    }

    fn list_merged_remote_branches(&self, _remote: &str, _mainline: &str) -> Result<Vec<String>> {
        self.record(Call::ListMerged);
        Ok(self.merged.clone())
    }

    fn merge_timestamp(&self, _mainline: &str, branch: &str) -> Result<Option<NaiveDateTime>> {
        self.record(Call::MergeTimestamp(branch.to_string()));
        Ok(self.merge_times.get(branch).copied())
    }
}

/// [`Interaction`] that replays canned decisions and records what it was shown.
pub(crate) struct ScriptedInteraction {
    /// Decisions still to hand out.
    decisions: RefCell<VecDeque<Decision>>,
    /// Names of presented candidates, in order.
    presented: RefCell<Vec<String>>,
    /// Announced notices, in order.
    notices: RefCell<Vec<Notice>>,
}

impl ScriptedInteraction {
    /// Replay `decisions` in order.
    pub(crate) fn new(decisions: &[Decision]) -> Self {
        Self {
            decisions: RefCell::new(decisions.iter().copied().collect()),
            presented: RefCell::new(Vec::new()),
            notices: RefCell::new(Vec::new()),
        }
    }

    /// Names of presented candidates.
    pub(crate) fn presented(&self) -> Vec<String> {
        self.presented.borrow().clone()
    }

    /// Announced notices.
    pub(crate) fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    /// Record a presentation and hand out the next decision.
    fn next(&self, name: &str) -> Result<Decision> {
        self.presented.borrow_mut().push(name.to_string());
        self.decisions
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| SnipError::Interaction("no scripted decision left".to_string()))
    }
}

impl Interaction for ScriptedInteraction {
    fn present_unpushed(&self, branch: &BranchRecord) -> Result<Decision> {
        self.next(&branch.name)
    }

    fn present_merged(&self, name: &str, _merged_at: Option<NaiveDateTime>) -> Result<Decision> {
        self.next(name)
    }

    fn announce(&self, notice: &Notice) -> Result<()> {
        self.notices.borrow_mut().push(notice.clone());
        Ok(())
    }
}
