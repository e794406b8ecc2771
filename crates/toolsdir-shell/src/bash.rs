use std::fmt::Write;

use crate::command::{
    Augment, Call, Execute, Exit, ExitOnError, Message, PersistError, PushDirectory, Set,
};
use crate::visitor::{CommandVisitor, substitute};

/// Characters that keep their meaning inside double quotes.
const DOUBLE_QUOTE_ESCAPES: &[(&str, &str)] = &[
    ("\\", "\\\\"),
    ("$", "\\$"),
    ("\"", "\\\""),
    ("`", "\\`"),
];

/// Emits bash; scripts are meant to be `source`d.
#[derive(Debug, Default, Clone, Copy)]
pub struct BashVisitor;

impl BashVisitor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn quote(value: &str) -> String {
        format!("\"{}\"", substitute(value, DOUBLE_QUOTE_ESCAPES))
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

impl CommandVisitor for BashVisitor {
    fn on_message(&self, command: &Message) -> Option<String> {
        let lines: Vec<String> = command
            .value
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    "echo \"\"".to_owned()
                } else {
                    format!("echo {}", Self::quote(line))
                }
            })
            .collect();
        Some(format!("{}\n", lines.join(" && ")))
    }

    fn on_call(&self, command: &Call) -> Option<String> {
        let mut out = format!("source {}\n", command.command_line);
        out.push_str(&self.exit_on_error_suffix(command.exit_on_error, command.exit_via_return));
        Some(out)
    }

    fn on_execute(&self, command: &Execute) -> Option<String> {
        let mut out = format!("{}\n", command.command_line);
        out.push_str(
            &self.exit_on_error_suffix(command.exits_on_error(), command.exits_via_return()),
        );
        Some(out)
    }

    fn on_set(&self, command: &Set) -> Option<String> {
        match command.joined(':') {
            None => Some(format!("unset {}\n", command.name)),
            Some(value) => Some(format!("export {}={}\n", command.name, Self::quote(&value))),
        }
    }

    fn on_augment(&self, command: &Augment) -> Option<String> {
        let name = &command.name;
        let mut out = String::new();
        for value in &command.values {
            let escaped = substitute(value, DOUBLE_QUOTE_ESCAPES);
            let updated = if command.append {
                format!("${{{name}:+${{{name}}}:}}{escaped}")
            } else {
                format!("{escaped}${{{name}:+:${{{name}}}}}")
            };
            let _ = writeln!(
                out,
                "if [[ \":${{{name}}}:\" != *\":{escaped}:\"* ]]; then export {name}=\"{updated}\"; fi"
            );
        }
        Some(out)
    }

    fn on_exit(&self, command: &Exit) -> Option<String> {
        let mut out = String::new();
        if command.pause_on_success {
            out.push_str("if [[ $? -eq 0 ]]; then\n    read -p \"Press [Enter] to continue\"\nfi\n");
        }
        if command.pause_on_error {
            out.push_str("if [[ $? -ne 0 ]]; then\n    read -p \"Press [Enter] to continue\"\nfi\n");
        }
        let _ = writeln!(out, "return {}", command.return_code.unwrap_or(0));
        Some(out)
    }

    fn on_exit_on_error(&self, command: &ExitOnError) -> Option<String> {
        let source = command
            .variable_name()
            .map_or_else(|| "$?".to_owned(), |name| format!("${name}"));
        let keyword = if command.use_return_statement {
            "return"
        } else {
            "exit"
        };
        let code = command
            .return_code()
            .map_or_else(|| "$error_code".to_owned(), |code| code.to_string());
        Some(format!(
            "error_code={source}\nif [[ $error_code -ne 0 ]]; then\n    {keyword} {code}\nfi\n"
        ))
    }

    fn on_echo_off(&self) -> Option<String> {
        Some("set +x\n\n".to_owned())
    }

    fn on_persist_error(&self, command: &PersistError) -> Option<String> {
        Some(format!("{}=$?\n", command.variable_name))
    }

    fn on_push_directory(&self, command: &PushDirectory) -> Option<String> {
        let directory = match &command.value {
            Some(path) => Self::quote(&path.to_string_lossy()),
            None => r#""$( cd "$( dirname "${BASH_SOURCE[0]}" )" > /dev/null 2>&1 && pwd )""#
                .to_owned(),
        };
        Some(format!("pushd {directory} > /dev/null\n"))
    }

    fn on_pop_directory(&self) -> Option<String> {
        Some("popd > /dev/null\n".to_owned())
    }
}
