//! The per-dialect entry point scripts.
//!
//! Each one forwards its invocation metadata and arguments to
//! `toolsdir activate`, evaluates the replay script printed on stdout in its
//! own scope, and ends with the launcher's exit code. Helper variables are
//! removed before the entry point returns.

use std::path::Path;

use toolsdir_shell::Dialect;

/// Entry point for `dialect` that runs the launcher at `exe`.
#[must_use]
pub fn render_adapter(dialect: Dialect, exe: &Path) -> String {
    let exe = exe.to_string_lossy();
    match dialect {
        Dialect::PosixShell => posix_adapter(&exe),
        Dialect::Batch => batch_adapter(&exe),
        Dialect::PowerShell => powershell_adapter(&exe),
    }
}

fn posix_adapter(exe: &str) -> String {
    let exe = format!("'{}'", exe.replace('\'', r"'\''"));
    format!(
        r#"# Activates tools in the current shell. Source this file:
#     source Activate.sh [args...]
_toolsdir_replay="$({exe} activate bash --invocation-name "$0" --script-path "${{BASH_SOURCE[0]}}" -- "$@")"
_toolsdir_rc=$?
eval "$_toolsdir_replay"
unset _toolsdir_replay
eval "unset _toolsdir_rc; return $_toolsdir_rc 2>/dev/null || exit $_toolsdir_rc"
"#
    )
}

/// `call` keeps cmd from stripping the quotes around the executable path.
fn batch_adapter(exe: &str) -> String {
    format!(
        "@REM Activates tools in the current cmd.exe session.\r\n\
         @for /f \"usebackq delims=\" %%L in (`call \"{exe}\" activate batch -- %*`) do @%%L\r\n"
    )
}

/// `'--'` is quoted so that Windows PowerShell passes it through to the
/// launcher.
fn powershell_adapter(exe: &str) -> String {
    let exe = format!("'{}'", exe.replace('\'', "''"));
    format!(
        r#"# Activates tools in the current session. Dot-source this file:
#     . ./Activate.ps1 [args...]
$_toolsdir_replay = & {exe} activate powershell --invocation-name "$($MyInvocation.InvocationName)" --command-origin "$($MyInvocation.CommandOrigin)" --shell-version "$($PSVersionTable.PSVersion.Major)" '--' @args | Out-String
$_toolsdir_rc = $LASTEXITCODE
if ($_toolsdir_replay -and $_toolsdir_replay.Trim()) {{
    . ([ScriptBlock]::Create($_toolsdir_replay))
}}
$global:LASTEXITCODE = $_toolsdir_rc
Remove-Variable -Name _toolsdir_replay, _toolsdir_rc -ErrorAction SilentlyContinue
"#
    )
}
