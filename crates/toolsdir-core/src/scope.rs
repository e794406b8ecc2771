//! The caller's environment as seen by the launcher.
//!
//! A compiled launcher cannot write into its parent shell, so the scope is
//! modelled explicitly: it is captured at start, replaced by the snapshot taken
//! after the generated script ran, and the difference is replayed by the entry
//! point.

use std::collections::BTreeMap;
use std::path::Path;

use toolsdir_shell::Command;

use crate::error::ActivationError;

/// Prefixes of variables owned by the launcher and its entry points.
pub const HELPER_PREFIXES: [&str; 2] = ["__TOOLSDIR_", "_toolsdir_"];

/// Variable used to carry the generated script's exit code inside the
/// execution wrapper.
pub const EXIT_CODE_VARIABLE: &str = "__TOOLSDIR_RC";

#[must_use]
pub fn is_helper_variable(name: &str) -> bool {
    HELPER_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// One difference between two scopes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvChange {
    Set { name: String, value: String },
    Removed { name: String },
}

impl EnvChange {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Set { name, .. } | Self::Removed { name } => name,
        }
    }

    /// Statement that reproduces this change.
    #[must_use]
    pub fn to_command(&self) -> Command {
        match self {
            Self::Set { name, value } => Command::set(name.as_str(), value.as_str()),
            Self::Removed { name } => Command::unset(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentScope {
    vars: BTreeMap<String, String>,
}

impl EnvironmentScope {
    /// Capture this process's environment. Variables that are not valid
    /// UTF-8 cannot be replayed and are skipped.
    #[must_use]
    pub fn capture() -> Self {
        std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
            .collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Replace the whole scope with `snapshot`, dropping helper variables.
    pub fn apply_snapshot(&mut self, snapshot: BTreeMap<String, String>) {
        self.vars = snapshot;
        self.vars.retain(|name, _| !is_helper_variable(name));
    }

    /// Changes that turn `baseline` into `self`, excluding helper variables
    /// and any name in `ignored`.
    #[must_use]
    pub fn changes_since(&self, baseline: &Self, ignored: &[String]) -> Vec<EnvChange> {
        let skip = |name: &str| {
            is_helper_variable(name) || ignored.iter().any(|i| i.eq_ignore_ascii_case(name))
        };

        let mut changes: Vec<EnvChange> = self
            .vars
            .iter()
            .filter(|(name, value)| !skip(name.as_str()) && baseline.get(name) != Some(value.as_str()))
            .map(|(name, value)| EnvChange::Set {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        changes.extend(
            baseline
                .vars
                .keys()
                .filter(|name| !skip(name.as_str()) && !self.vars.contains_key(*name))
                .map(|name| EnvChange::Removed { name: name.clone() }),
        );
        changes
    }

    /// Read a snapshot file written by [`EnvironmentScope::write_snapshot`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object of
    /// strings.
    pub async fn read_snapshot(path: &Path) -> Result<BTreeMap<String, String>, ActivationError> {
        let content = tokio::fs::read(path).await?;
        serde_json::from_slice(&content).map_err(|source| ActivationError::Snapshot {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the scope as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_snapshot(&self, path: &Path) -> Result<(), ActivationError> {
        let json = serde_json::to_vec(&self.vars).map_err(|source| ActivationError::Snapshot {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl FromIterator<(String, String)> for EnvironmentScope {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}
