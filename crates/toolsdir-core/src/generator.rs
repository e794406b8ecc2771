use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use toolsdir_shell::Dialect;

use crate::config::GeneratorConfig;
use crate::error::{ActivationError, ConfigError};

/// Produces the activation script at a reserved path.
///
/// Implementations must pass `forwarded_args` on unchanged and report the
/// generator's exit code exactly.
pub trait GeneratorInvoker: Send + Sync {
    fn invoke(
        &self,
        temp_path: &Path,
        dialect: Dialect,
        forwarded_args: &[String],
    ) -> impl Future<Output = Result<i32, ActivationError>> + Send;
}

/// Runs an external generator program.
///
/// The generator's stdout is sent to our stderr so that the launcher's own
/// stdout carries nothing but the replay script.
#[derive(Debug, Clone)]
pub struct ProcessGenerator {
    program: String,
    leading_args: Vec<String>,
    working_directory: Option<PathBuf>,
}

impl ProcessGenerator {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the command is empty.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        let (program, leading_args) = config
            .command
            .split_first()
            .ok_or_else(|| ConfigError::Invalid("generator.command must name a program".into()))?;
        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
            working_directory: None,
        })
    }

    #[must_use]
    pub fn with_working_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(directory.into());
        self
    }
}

impl GeneratorInvoker for ProcessGenerator {
    async fn invoke(
        &self,
        temp_path: &Path,
        dialect: Dialect,
        forwarded_args: &[String],
    ) -> Result<i32, ActivationError> {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.leading_args)
            .arg(temp_path)
            .arg(dialect.tag())
            .args(forwarded_args)
            .stdin(Stdio::inherit())
            .stdout(std::io::stderr())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.working_directory {
            cmd.current_dir(dir);
        }

        tracing::info!(
            program = %self.program,
            temp = %temp_path.display(),
            dialect = %dialect,
            "running generator"
        );
        let status = cmd
            .status()
            .await
            .map_err(|source| ActivationError::GeneratorSpawn {
                program: self.program.clone(),
                source,
            })?;
        let code = exit_code_of(status);
        tracing::debug!(code, "generator finished");
        Ok(code)
    }
}

/// Exit code of a finished child; a signal `n` maps to `128 + n` on unix.
pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
