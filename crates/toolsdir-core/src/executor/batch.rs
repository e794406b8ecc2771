use std::ffi::OsString;
use std::path::Path;

use toolsdir_shell::Dialect;

use super::ShellBackend;

/// cmd.exe: the script is `call`ed by a wrapper run with `cmd /d /c`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchBackend;

impl ShellBackend for BatchBackend {
    fn dialect(&self) -> Dialect {
        Dialect::Batch
    }

    /// `/d` skips AutoRun commands from the registry.
    fn interpreter_args(&self, wrapper: &Path) -> Vec<OsString> {
        vec!["/d".into(), "/c".into(), wrapper.into()]
    }

    /// cmd has no escape for `"` inside a quoted word; such paths cannot occur
    /// on Windows.
    fn quote(&self, word: &str) -> String {
        format!("\"{word}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_and_args() {
        assert_eq!(BatchBackend.quote("C:\\a b\\x.cmd"), "\"C:\\a b\\x.cmd\"");
        assert_eq!(
            BatchBackend.interpreter_args(Path::new("w.cmd")),
            vec!["/d", "/c", "w.cmd"]
        );
    }
}
