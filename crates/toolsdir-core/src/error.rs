use std::path::PathBuf;

/// The activation entry point was invoked in a mode that cannot change the
/// caller's environment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("This script must be sourced (`source {script}`), not executed.")]
    NotSourced { script: String },

    #[error("This script must be dot-sourced (`. {script}`), not run in a new scope.")]
    NotDotSourced { script: String },

    #[error("PowerShell {minimum} or newer is required; found {found}.")]
    UnsupportedShellVersion { found: u32, minimum: u32 },
}

/// Errors raised while generating or executing the activation script.
///
/// None of these are shown to the user directly; the launcher folds them into
/// a failed exit code and the status block.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    #[error("failed to start generator '{program}': {source}")]
    GeneratorSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start interpreter '{program}': {source}")]
    ExecutorSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid environment snapshot {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("environment was not captured after running {}", script.display())]
    SnapshotMissing { script: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
