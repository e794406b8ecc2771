use std::path::{Path, PathBuf};

use toolsdir_shell::Dialect;

/// One activation as requested by a dialect entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRequest {
    dialect: Dialect,
    forwarded_args: Vec<String>,
    working_directory: PathBuf,
}

impl ActivationRequest {
    #[must_use]
    pub fn new(dialect: Dialect, forwarded_args: Vec<String>, working_directory: PathBuf) -> Self {
        Self {
            dialect,
            forwarded_args,
            working_directory,
        }
    }

    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Arguments handed to the generator verbatim, after the temp path and tag.
    #[must_use]
    pub fn forwarded_args(&self) -> &[String] {
        &self.forwarded_args
    }

    /// Directory that receives the temp script.
    #[must_use]
    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }
}

/// What the entry point could observe about how it was invoked.
///
/// Every field is optional; a shell that cannot report a value leaves it unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationMetadata {
    /// `$0` in POSIX shells, `$MyInvocation.InvocationName` in PowerShell.
    pub invocation_name: Option<String>,
    /// `${BASH_SOURCE[0]}`: the path of the entry point script itself.
    pub script_path: Option<String>,
    /// `$MyInvocation.CommandOrigin` in PowerShell.
    pub command_origin: Option<String>,
    /// Major version of the running PowerShell.
    pub shell_version: Option<u32>,
}
