use std::{fs, path::Path};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;

use crate::error::{Result, SnipError};

/// Default mainline branch name.
pub const DEFAULT_MAINLINE: &str = "main";
/// Default remote name.
pub const DEFAULT_REMOTE: &str = "origin";

/// When a branch counts as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    /// Last commit more than this long before the classification time.
    OlderThan(TimeDelta),
    /// Last commit before this point in local time.
    Before(NaiveDateTime),
}

impl Staleness {
    /// Resolve the cutoff against the current local time.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self {
            Self::OlderThan(age) => now.checked_sub_signed(*age).unwrap_or(NaiveDateTime::MIN),
            Self::Before(at) => *at,
        }
    }
}

/// Immutable cleanup policy, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Run the unpushed-stale pass at all.
    pub delete_unpushed: bool,
    /// Require unpushed branches to be older than the cutoff.
    pub enforce_cutoff: bool,
    /// Run the merged pass at all.
    pub delete_merged: bool,
    /// Staleness cutoff for the unpushed pass.
    pub staleness: Staleness,
    /// Merge target, and the branch checked out before deleting the current one.
    pub mainline: String,
    /// Remote consulted for tracking refs and merged branches.
    pub remote: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            delete_unpushed: true,
            enforce_cutoff: true,
            delete_merged: true,
            staleness: Staleness::OlderThan(TimeDelta::zero()),
            mainline: DEFAULT_MAINLINE.to_string(),
            remote: DEFAULT_REMOTE.to_string(),
        }
    }
}

/// Policy settings as read from a TOML file or assembled from CLI flags.
///
/// Every key is optional; [`Config::merge`] layers one source over another and
/// [`Config::into_policy`] fills the gaps with defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Run the unpushed-stale pass.
    pub delete_unpushed: Option<bool>,
    /// Apply the staleness cutoff within the unpushed pass.
    pub enforce_cutoff: Option<bool>,
    /// Run the merged pass.
    pub delete_merged: Option<bool>,
    /// Branches whose last commit is older than this many days are stale.
    pub stale_days: Option<u32>,
    /// Branches whose last commit is before this date are stale.
    pub stale_before: Option<NaiveDate>,
    /// Mainline branch name.
    pub mainline: Option<String>,
    /// Remote name.
    pub remote: Option<String>,
}

impl Config {
    /// Parse a config from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| SnipError::Config(e.to_string()))
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            SnipError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&contents).map_err(|e| match e {
            SnipError::Config(msg) => {
                SnipError::Config(format!("Failed to parse config file {}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Load a config file if present, returning an empty config otherwise.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// The two staleness keys travel together: if `overrides` sets either one,
    /// both are taken from `overrides`, so a CLI date replaces a file's day count.
    pub fn merge(self, overrides: Self) -> Self {
        let (stale_days, stale_before) =
            if overrides.stale_days.is_some() || overrides.stale_before.is_some() {
                (overrides.stale_days, overrides.stale_before)
            } else {
                (self.stale_days, self.stale_before)
            };
        Self {
            delete_unpushed: overrides.delete_unpushed.or(self.delete_unpushed),
            enforce_cutoff: overrides.enforce_cutoff.or(self.enforce_cutoff),
            delete_merged: overrides.delete_merged.or(self.delete_merged),
            stale_days,
            stale_before,
            mainline: overrides.mainline.or(self.mainline),
            remote: overrides.remote.or(self.remote),
        }
    }

    /// Validate and fill in defaults.
    pub fn into_policy(self) -> Result<Policy> {
        let defaults = Policy::default();
        let staleness = match (self.stale_days, self.stale_before) {
            (Some(_), Some(_)) => {
                return Err(SnipError::Config(
                    "stale_days and stale_before cannot both be set".to_string(),
                ));
            }
            (Some(days), None) => Staleness::OlderThan(TimeDelta::days(i64::from(days))),
            (None, Some(date)) => Staleness::Before(date.and_time(NaiveTime::MIN)),
            (None, None) => defaults.staleness,
        };
        let mainline = non_empty("mainline", self.mainline, defaults.mainline)?;
        let remote = non_empty("remote", self.remote, defaults.remote)?;

        Ok(Policy {
            delete_unpushed: self.delete_unpushed.unwrap_or(defaults.delete_unpushed),
            enforce_cutoff: self.enforce_cutoff.unwrap_or(defaults.enforce_cutoff),
            delete_merged: self.delete_merged.unwrap_or(defaults.delete_merged),
            staleness,
            mainline,
            remote,
        })
    }
}

/// Use `value` if given, else `default`, rejecting blank names.
fn non_empty(key: &str, value: Option<String>, default: String) -> Result<String> {
    let value = value.unwrap_or(default);
    if value.trim().is_empty() {
        return Err(SnipError::Config(format!("{key} must not be empty")));
    }
    Ok(value)
}
