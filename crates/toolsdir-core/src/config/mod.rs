mod env;
mod types;


pub use types::*;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "TOOLSDIR_CONFIG";

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str::<Self>(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Reject settings the launcher cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .generator
            .command
            .first()
            .is_none_or(|program| program.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "generator.command must name a program".into(),
            ));
        }
        let prefix = &self.activation.temp_prefix;
        if prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "activation.temp_prefix must not be empty".into(),
            ));
        }
        if prefix.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "activation.temp_prefix must be a file name prefix, got '{prefix}'"
            )));
        }
        for (name, program) in [
            ("bash", &self.interpreters.bash),
            ("batch", &self.interpreters.batch),
            ("powershell", &self.interpreters.powershell),
        ] {
            if program.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "interpreters.{name} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Pick the config file: explicit argument, then `TOOLSDIR_CONFIG`, then the
/// per-user config directory.
#[must_use]
pub fn resolve_config_path(cli_arg: Option<&Path>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_owned();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir().map_or_else(
        || PathBuf::from("toolsdir.toml"),
        |dir| dir.join("toolsdir").join("config.toml"),
    )
}
