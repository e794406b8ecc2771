use serde::Deserialize;
use toolsdir_shell::Dialect;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub interpreters: InterpreterConfig,
    #[serde(default)]
    pub activation: ActivationConfig,
}

/// External program that writes the activation script.
///
/// It is invoked as `<command...> <temp-path> <dialect-tag> [forwarded args]`.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_command")]
    pub command: Vec<String>,
}

/// Programs used to run a generated script in a child interpreter.
#[derive(Debug, Clone, Deserialize)]
pub struct InterpreterConfig {
    #[serde(default = "default_bash")]
    pub bash: String,
    #[serde(default = "default_batch")]
    pub batch: String,
    #[serde(default = "default_powershell")]
    pub powershell: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivationConfig {
    #[serde(default = "default_temp_prefix")]
    pub temp_prefix: String,
    /// Variables the interpreter itself changes; never replayed to the caller.
    #[serde(default = "default_ignored_variables")]
    pub ignored_variables: Vec<String>,
    #[serde(default = "default_true")]
    pub color: bool,
}

pub(crate) fn default_generator_command() -> Vec<String> {
    vec!["toolsdir-generate".into()]
}

fn default_bash() -> String {
    "bash".into()
}

fn default_batch() -> String {
    "cmd".into()
}

fn default_powershell() -> String {
    "pwsh".into()
}

pub(crate) fn default_temp_prefix() -> String {
    "ExecuteImpl".into()
}

fn default_ignored_variables() -> Vec<String> {
    ["_", "SHLVL", "PWD", "OLDPWD", "PROMPT", "ERRORLEVEL", "CMDCMDLINE", "PSModulePath"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: default_generator_command(),
        }
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            bash: default_bash(),
            batch: default_batch(),
            powershell: default_powershell(),
        }
    }
}

impl InterpreterConfig {
    /// Interpreter program for `dialect`.
    #[must_use]
    pub fn program(&self, dialect: Dialect) -> &str {
        match dialect {
            Dialect::Batch => &self.batch,
            Dialect::PosixShell => &self.bash,
            Dialect::PowerShell => &self.powershell,
        }
    }
}

impl Default for ActivationConfig {
    fn default() -> Self {
        Self {
            temp_prefix: default_temp_prefix(),
            ignored_variables: default_ignored_variables(),
            color: default_true(),
        }
    }
}
