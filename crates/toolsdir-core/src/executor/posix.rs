use std::ffi::OsString;
use std::path::Path;

use toolsdir_shell::{Command, Dialect};

use super::ShellBackend;

/// bash: the script is `source`d by a wrapper run with `bash --noprofile --norc`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixBackend;

impl ShellBackend for PosixBackend {
    fn dialect(&self) -> Dialect {
        Dialect::PosixShell
    }

    fn interpreter_args(&self, wrapper: &Path) -> Vec<OsString> {
        vec!["--noprofile".into(), "--norc".into(), wrapper.into()]
    }

    fn quote(&self, word: &str) -> String {
        format!("'{}'", word.replace('\'', r"'\''"))
    }

    /// The generated script is marked executable before it is sourced.
    fn prepare(&self, script: &Path) -> std::io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut permissions = std::fs::metadata(script)?.permissions();
            permissions.set_mode(permissions.mode() | 0o111);
            std::fs::set_permissions(script, permissions)?;
        }
        #[cfg(not(unix))]
        let _ = script;
        Ok(())
    }

    /// `return` is only valid in sourced files, and the wrapper is executed.
    fn epilogue(&self) -> Command {
        Command::Raw("exit 0".into())
    }
}
