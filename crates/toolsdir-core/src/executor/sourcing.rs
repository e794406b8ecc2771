use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use toolsdir_shell::{Call, Command, Dialect, Execute, ExitOnError};

use super::ScopeExecutor;
use crate::error::ActivationError;
use crate::generator::exit_code_of;
use crate::namer::{TempScriptHandle, TempScriptNamer};
use crate::scope::{EXIT_CODE_VARIABLE, EnvironmentScope};

/// The per-dialect details of running a script in a child interpreter.
pub trait ShellBackend: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Arguments that make the interpreter run `wrapper` non-interactively.
    fn interpreter_args(&self, wrapper: &Path) -> Vec<OsString>;

    /// Quote one word for a command line of this dialect.
    fn quote(&self, word: &str) -> String;

    /// Make the generated script runnable in place.
    fn prepare(&self, _script: &Path) -> std::io::Result<()> {
        Ok(())
    }

    /// Statements emitted before the generated script runs.
    fn preamble(&self) -> Vec<Command> {
        vec![Command::EchoOff]
    }

    /// Last statement of the wrapper, reached only on success.
    fn epilogue(&self) -> Command {
        Command::exit_with(0)
    }
}

/// Runs the generated script in the scope of a wrapper script, then captures
/// the wrapper's environment.
///
/// The wrapper sources the script the way the dialect's entry point would,
/// keeps its exit code, dumps the resulting environment as JSON and leaves
/// with that exit code. Variables the script did not export are not captured.
#[derive(Debug)]
pub struct SourcingExecutor<B> {
    backend: B,
    interpreter: String,
    snapshot_command: Vec<String>,
    namer: TempScriptNamer,
}

impl<B: ShellBackend> SourcingExecutor<B> {
    pub fn new(
        backend: B,
        interpreter: impl Into<String>,
        snapshot_command: Vec<String>,
        namer: TempScriptNamer,
    ) -> Self {
        Self {
            backend,
            interpreter: interpreter.into(),
            snapshot_command,
            namer,
        }
    }

    /// Text of the wrapper that runs `script` and writes `snapshot`.
    #[must_use]
    pub fn wrapper_script(&self, script: &Path, snapshot: &Path) -> String {
        let snapshot_path = snapshot.to_string_lossy().into_owned();
        let snapshot_line = self
            .snapshot_command
            .iter()
            .map(String::as_str)
            .chain(["--output", snapshot_path.as_str()])
            .map(|word| self.backend.quote(word))
            .collect::<Vec<_>>()
            .join(" ");

        let mut commands = self.backend.preamble();
        commands.extend([
            Call::new(self.backend.quote(&script.to_string_lossy()))
                .without_exit_on_error()
                .into(),
            Command::persist_error(EXIT_CODE_VARIABLE),
            Execute::new(snapshot_line).without_exit_on_error().into(),
            ExitOnError::from_variable(EXIT_CODE_VARIABLE).into(),
            self.backend.epilogue(),
        ]);
        self.backend.dialect().visitor().render(&commands)
    }

    async fn run_wrapper(
        &self,
        script: &Path,
        wrapper: &TempScriptHandle,
        snapshot: &TempScriptHandle,
        scope: &mut EnvironmentScope,
    ) -> Result<i32, ActivationError> {
        tokio::fs::write(wrapper.path(), self.wrapper_script(script, snapshot.path())).await?;

        tracing::info!(
            interpreter = %self.interpreter,
            script = %script.display(),
            "executing activation script"
        );
        let status = tokio::process::Command::new(&self.interpreter)
            .args(self.backend.interpreter_args(wrapper.path()))
            .env_clear()
            .envs(scope.vars())
            .stdin(Stdio::inherit())
            .stdout(std::io::stderr())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| ActivationError::ExecutorSpawn {
                program: self.interpreter.clone(),
                source,
            })?;
        let code = exit_code_of(status);
        tracing::debug!(code, "activation script finished");

        if snapshot.exists() {
            let vars = EnvironmentScope::read_snapshot(snapshot.path()).await?;
            scope.apply_snapshot(vars);
        } else if code == 0 {
            // A clean exit without a snapshot means the changes were lost.
            return Err(ActivationError::SnapshotMissing {
                script: script.to_path_buf(),
            });
        } else {
            tracing::warn!(
                script = %script.display(),
                code,
                "script ended its interpreter before the environment was captured"
            );
        }
        Ok(code)
    }
}

impl<B: ShellBackend> ScopeExecutor for SourcingExecutor<B> {
    fn dialect(&self) -> Dialect {
        self.backend.dialect()
    }

    async fn execute_in_caller_scope(
        &self,
        script: &Path,
        scope: &mut EnvironmentScope,
    ) -> Result<i32, ActivationError> {
        self.backend.prepare(script)?;

        let directory = match script.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let wrapper = self
            .namer
            .allocate_with_extension(directory, self.backend.dialect().extension());
        let snapshot = self.namer.allocate_with_extension(directory, "json");

        let result = self.run_wrapper(script, &wrapper, &snapshot, scope).await;
        for handle in [&wrapper, &snapshot] {
            remove_quietly(handle.path()).await;
        }
        result
    }
}

async fn remove_quietly(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), "failed to remove helper file: {e}"),
    }
}
