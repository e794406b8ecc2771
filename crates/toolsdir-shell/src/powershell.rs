use std::fmt::Write;

use crate::command::{
    Augment, Call, Execute, Exit, ExitOnError, Message, PersistError, PushDirectory, Set,
};
use crate::visitor::{CommandVisitor, substitute};

const DOUBLE_QUOTE_ESCAPES: &[(&str, &str)] = &[("`", "``"), ("$", "`$"), ("\"", "`\"")];
const BRACED_NAME_ESCAPES: &[(&str, &str)] = &[("`", "``"), ("}", "`}")];

/// Emits PowerShell; scripts are meant to be dot-sourced.
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerShellVisitor;

impl PowerShellVisitor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn quote(value: &str) -> String {
        format!("\"{}\"", substitute(value, DOUBLE_QUOTE_ESCAPES))
    }

    /// `${env:NAME}` accepts any name, including `ProgramFiles(x86)`.
    fn env_variable(name: &str) -> String {
        format!("${{env:{}}}", substitute(name, BRACED_NAME_ESCAPES))
    }

    fn exit_on_error_suffix(&self, exit_on_error: bool, via_return: bool) -> String {
        if !exit_on_error {
            return String::new();
        }
        let command = if via_return {
            ExitOnError::last().via_return()
        } else {
            ExitOnError::last()
        };
        self.on_exit_on_error(&command).unwrap_or_default()
    }
}

impl CommandVisitor for PowerShellVisitor {
    fn on_message(&self, command: &Message) -> Option<String> {
        let lines: Vec<String> = command
            .value
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    "Write-Host \"\"".to_owned()
                } else {
                    format!("Write-Host {}", Self::quote(line))
                }
            })
            .collect();
        Some(format!("{}\n", lines.join("; ")))
    }

    fn on_call(&self, command: &Call) -> Option<String> {
        let mut out = format!(". {}\n", command.command_line);
        out.push_str(&self.exit_on_error_suffix(command.exit_on_error, command.exit_via_return));
        Some(out)
    }

    fn on_execute(&self, command: &Execute) -> Option<String> {
        let mut out = format!("& {}\n", command.command_line);
        out.push_str(
            &self.exit_on_error_suffix(command.exits_on_error(), command.exits_via_return()),
        );
        Some(out)
    }

    fn on_set(&self, command: &Set) -> Option<String> {
        match command.joined(';') {
            None => Some(format!(
                "Remove-Item -LiteralPath 'Env:{}' -ErrorAction SilentlyContinue\n",
                command.name.replace('\'', "''")
            )),
            Some(value) => Some(format!(
                "{} = {}\n",
                Self::env_variable(&command.name),
                Self::quote(&value)
            )),
        }
    }

    fn on_augment(&self, command: &Augment) -> Option<String> {
        let var = Self::env_variable(&command.name);
        let mut out = String::new();
        for value in &command.values {
            let escaped = substitute(value, DOUBLE_QUOTE_ESCAPES);
            let add = if command.append {
                format!("{var} = \"{var};{escaped}\"")
            } else {
                format!("{var} = \"{escaped};{var}\"")
            };
            let _ = write!(
                out,
                "if (-not {var}) {{\n    {var} = \"{escaped}\"\n}}\n\
                 elseif (\";{var};\" -notlike \"*;{escaped};*\") {{\n    {add}\n}}\n"
            );
        }
        Some(out)
    }

    fn on_exit(&self, command: &Exit) -> Option<String> {
        let mut out = String::new();
        if command.pause_on_success {
            out.push_str("if ($LASTEXITCODE -eq 0) {\n    Read-Host \"Press [Enter] to continue\"\n}\n");
        }
        if command.pause_on_error {
            out.push_str("if ($LASTEXITCODE -ne 0) {\n    Read-Host \"Press [Enter] to continue\"\n}\n");
        }
        let _ = writeln!(out, "exit {}", command.return_code.unwrap_or(0));
        Some(out)
    }

    fn on_exit_on_error(&self, command: &ExitOnError) -> Option<String> {
        let source = command
            .variable_name()
            .map_or_else(|| "$LASTEXITCODE".to_owned(), |name| format!("${name}"));
        let keyword = if command.use_return_statement {
            "return"
        } else {
            "exit"
        };
        let code = command
            .return_code()
            .map_or_else(|| "$error_code".to_owned(), |code| code.to_string());
        Some(format!(
            "$error_code = {source}\nif ($error_code -ne 0) {{\n    {keyword} {code}\n}}\n"
        ))
    }

    /// PowerShell does not echo commands.
    fn on_echo_off(&self) -> Option<String> {
        None
    }

    fn on_persist_error(&self, command: &PersistError) -> Option<String> {
        Some(format!("${} = $LASTEXITCODE\n", command.variable_name))
    }

    fn on_push_directory(&self, command: &PushDirectory) -> Option<String> {
        match &command.value {
            None => Some("Push-Location $PSScriptRoot\n".to_owned()),
            Some(path) => Some(format!(
                "Push-Location {}\n",
                Self::quote(&path.to_string_lossy())
            )),
        }
    }

    fn on_pop_directory(&self) -> Option<String> {
        Some("Pop-Location\n".to_owned())
    }
}
