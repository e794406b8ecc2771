//! Refuses activation when the entry point runs in a throwaway scope.
//!
//! A check only fails on positive evidence: metadata the shell did not supply
//! lets the activation proceed.

use std::path::Path;

use toolsdir_shell::Dialect;

use crate::error::GuardError;
use crate::request::InvocationMetadata;

pub const MIN_POWERSHELL_VERSION: u32 = 5;

/// Entry point name used in guard messages when the shell did not report one.
const UNKNOWN_SCRIPT: &str = "<script>";

/// Verify the entry point was sourced (POSIX) or dot-sourced (PowerShell).
///
/// Batch files always run in the caller's scope, so batch passes unchecked.
///
/// # Errors
///
/// Returns the [`GuardError`] describing how the entry point was misused.
pub fn check_invocation_mode(
    dialect: Dialect,
    metadata: &InvocationMetadata,
) -> Result<(), GuardError> {
    match dialect {
        Dialect::Batch => Ok(()),
        Dialect::PosixShell => check_sourced(metadata),
        Dialect::PowerShell => check_dot_sourced(metadata),
    }
}

/// When a file is executed `$0` names the file itself; when sourced it names
/// the parent shell or script.
fn check_sourced(metadata: &InvocationMetadata) -> Result<(), GuardError> {
    let (Some(invocation), Some(script)) = (&metadata.invocation_name, &metadata.script_path)
    else {
        return Ok(());
    };
    let invoked = Path::new(invocation).file_name();
    if invoked.is_some() && invoked == Path::new(script).file_name() {
        return Err(GuardError::NotSourced {
            script: script.clone(),
        });
    }
    Ok(())
}

fn check_dot_sourced(metadata: &InvocationMetadata) -> Result<(), GuardError> {
    if let Some(found) = metadata.shell_version
        && found < MIN_POWERSHELL_VERSION
    {
        return Err(GuardError::UnsupportedShellVersion {
            found,
            minimum: MIN_POWERSHELL_VERSION,
        });
    }
    let from_runspace = metadata
        .command_origin
        .as_deref()
        .is_some_and(|origin| origin.eq_ignore_ascii_case("Runspace"));
    if from_runspace && metadata.invocation_name.as_deref() != Some(".") {
        return Err(GuardError::NotDotSourced {
            script: metadata
                .invocation_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_SCRIPT.to_owned()),
        });
    }
    Ok(())
}
