//! Runs a generated script so that its effects land in the caller's scope.

mod batch;
mod posix;
mod powershell;
mod sourcing;

pub use batch::BatchBackend;
pub use posix::PosixBackend;
pub use powershell::PowerShellBackend;
pub use sourcing::{ShellBackend, SourcingExecutor};

use std::path::Path;

use toolsdir_shell::Dialect;

use crate::error::ActivationError;
use crate::namer::{TempScriptHandle, TempScriptNamer};
use crate::scope::EnvironmentScope;

/// Executes a script of one dialect against an [`EnvironmentScope`].
///
/// Changes the script makes before failing are kept; there is no rollback.
pub trait ScopeExecutor: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Run `script` and fold its environment changes into `scope`.
    ///
    /// Returns the script's exit code.
    fn execute_in_caller_scope(
        &self,
        script: &Path,
        scope: &mut EnvironmentScope,
    ) -> impl Future<Output = Result<i32, ActivationError>> + Send;
}

/// Execute the temp script if the generator created it; an absent file is
/// success with nothing to do.
///
/// # Errors
///
/// Propagates the executor's error.
pub async fn execute_if_present<E: ScopeExecutor>(
    executor: &E,
    handle: &TempScriptHandle,
    scope: &mut EnvironmentScope,
) -> Result<i32, ActivationError> {
    if !handle.exists() {
        tracing::info!(path = %handle.path().display(), "no activation script generated");
        return Ok(0);
    }
    executor.execute_in_caller_scope(handle.path(), scope).await
}

/// Enum dispatch for runtime dialect selection.
#[derive(Debug)]
pub enum AnyExecutor {
    Batch(SourcingExecutor<BatchBackend>),
    Posix(SourcingExecutor<PosixBackend>),
    PowerShell(SourcingExecutor<PowerShellBackend>),
}

macro_rules! dispatch_executor {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            AnyExecutor::Batch(e) => e.$method($($arg),*).await,
            AnyExecutor::Posix(e) => e.$method($($arg),*).await,
            AnyExecutor::PowerShell(e) => e.$method($($arg),*).await,
        }
    };
}

impl AnyExecutor {
    /// `snapshot_command` is the program and leading arguments that dump the
    /// environment as JSON; `--output <path>` is appended.
    #[must_use]
    pub fn for_dialect(
        dialect: Dialect,
        interpreter: impl Into<String>,
        snapshot_command: Vec<String>,
        namer: TempScriptNamer,
    ) -> Self {
        match dialect {
            Dialect::Batch => Self::Batch(SourcingExecutor::new(
                BatchBackend,
                interpreter,
                snapshot_command,
                namer,
            )),
            Dialect::PosixShell => Self::Posix(SourcingExecutor::new(
                PosixBackend,
                interpreter,
                snapshot_command,
                namer,
            )),
            Dialect::PowerShell => Self::PowerShell(SourcingExecutor::new(
                PowerShellBackend,
                interpreter,
                snapshot_command,
                namer,
            )),
        }
    }
}

impl ScopeExecutor for AnyExecutor {
    fn dialect(&self) -> Dialect {
        match self {
            Self::Batch(e) => e.dialect(),
            Self::Posix(e) => e.dialect(),
            Self::PowerShell(e) => e.dialect(),
        }
    }

    async fn execute_in_caller_scope(
        &self,
        script: &Path,
        scope: &mut EnvironmentScope,
    ) -> Result<i32, ActivationError> {
        dispatch_executor!(self, execute_in_caller_scope, script, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_dialect_picks_backend() {
        for dialect in Dialect::ALL {
            let executor =
                AnyExecutor::for_dialect(dialect, "sh", vec!["snap".into()], TempScriptNamer::new("T"));
            assert_eq!(executor.dialect(), dialect);
        }
    }

    #[tokio::test]
    async fn absent_script_is_success_without_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let handle = TempScriptNamer::new("T").allocate(dir.path(), Dialect::PosixShell);
        let executor = AnyExecutor::for_dialect(
            Dialect::PosixShell,
            "/nonexistent/interpreter",
            vec!["snap".into()],
            TempScriptNamer::new("T"),
        );
        let mut scope = EnvironmentScope::default();
        let code = execute_if_present(&executor, &handle, &mut scope).await.unwrap();
        assert_eq!(code, 0);
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn present_script_with_missing_interpreter_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let handle = TempScriptNamer::new("T").allocate(dir.path(), Dialect::PosixShell);
        std::fs::write(handle.path(), "true\n").unwrap();
        let executor = AnyExecutor::for_dialect(
            Dialect::PosixShell,
            "/nonexistent/interpreter",
            vec!["snap".into()],
            TempScriptNamer::new("T"),
        );
        let mut scope = EnvironmentScope::capture();
        let err = execute_if_present(&executor, &handle, &mut scope)
            .await
            .unwrap_err();
        assert!(matches!(err, ActivationError::ExecutorSpawn { .. }));
        // helper files are cleaned up even on failure
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p != handle.path())
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }
}
