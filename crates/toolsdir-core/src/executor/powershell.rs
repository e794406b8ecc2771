use std::ffi::OsString;
use std::path::Path;

use toolsdir_shell::{Command, Dialect};

use super::ShellBackend;

/// PowerShell: the script is dot-sourced by a wrapper run with `-File`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerShellBackend;

impl ShellBackend for PowerShellBackend {
    fn dialect(&self) -> Dialect {
        Dialect::PowerShell
    }

    fn interpreter_args(&self, wrapper: &Path) -> Vec<OsString> {
        [
            "-NoLogo",
            "-NoProfile",
            "-NonInteractive",
            "-ExecutionPolicy",
            "Bypass",
            "-File",
        ]
        .into_iter()
        .map(OsString::from)
        .chain([wrapper.into()])
        .collect()
    }

    fn quote(&self, word: &str) -> String {
        format!("'{}'", word.replace('\'', "''"))
    }

    /// `$LASTEXITCODE` stays unset when the script runs no native command.
    fn preamble(&self) -> Vec<Command> {
        vec![Command::Raw("$global:LASTEXITCODE = 0".into())]
    }
}
