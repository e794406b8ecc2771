use std::fmt::Write;

use crate::command::{
    Augment, Call, Execute, Exit, ExitOnError, Message, PersistError, PushDirectory, Set,
};
use crate::visitor::{CommandVisitor, substitute};

const CARET_PLACEHOLDER: &str = "__caret_placeholder__";

const MESSAGE_ESCAPES: &[(&str, &str)] = &[
    ("%", "%%"),
    ("&", "^&"),
    ("<", "^<"),
    (">", "^>"),
    ("|", "^|"),
    (",", "^,"),
    (";", "^;"),
    ("(", "^("),
    (")", "^)"),
    ("[", "^["),
    ("]", "^]"),
];

/// Emits Windows batch; scripts are meant to be `call`ed.
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchVisitor;

impl BatchVisitor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn exit_on_error_suffix(&self, exit_on_error: bool) -> String {
        if exit_on_error {
            self.on_exit_on_error(&ExitOnError::last())
                .unwrap_or_default()
        } else {
            String::new()
        }
    }
}

/// First word of a command line, honouring a leading double-quoted path.
fn program_of(command_line: &str) -> &str {
    let trimmed = command_line.trim_start();
    if let Some(rest) = trimmed.strip_prefix('"') {
        return rest.split('"').next().unwrap_or(rest);
    }
    trimmed.split_whitespace().next().unwrap_or(trimmed)
}

impl CommandVisitor for BatchVisitor {
    fn on_message(&self, command: &Message) -> Option<String> {
        let lines: Vec<String> = command
            .value
            .split('\n')
            .map(|line| {
                if line.trim().is_empty() {
                    // some terminals need the trailing space
                    return "echo. ".to_owned();
                }
                let line = line.replace('^', CARET_PLACEHOLDER);
                let line = substitute(&line, MESSAGE_ESCAPES).replace(CARET_PLACEHOLDER, "^");
                format!("echo {line}")
            })
            .collect();
        Some(format!("{}\n", lines.join(" && ")))
    }

    fn on_call(&self, command: &Call) -> Option<String> {
        let mut out = format!("call {}\n", command.command_line);
        out.push_str(&self.exit_on_error_suffix(command.exit_on_error));
        Some(out)
    }

    fn on_execute(&self, command: &Execute) -> Option<String> {
        let program = program_of(&command.command_line).to_ascii_lowercase();
        let mut out = if program.ends_with(".bat") || program.ends_with(".cmd") {
            format!("cmd /c {}\n", command.command_line)
        } else {
            format!("{}\n", command.command_line)
        };
        out.push_str(&self.exit_on_error_suffix(command.exits_on_error()));
        Some(out)
    }

    /// `SET "NAME=value"` keeps the value literal when evaluated line by line.
    fn on_set(&self, command: &Set) -> Option<String> {
        match command.joined(';') {
            None => Some(format!("SET {}=\n", command.name)),
            Some(value) => Some(format!("SET \"{}={value}\"\n", command.name)),
        }
    }

    fn on_augment(&self, command: &Augment) -> Option<String> {
        let name = &command.name;
        let mut out = String::new();
        for value in &command.values {
            let label = uuid::Uuid::new_v4().simple().to_string();
            let updated = if command.append {
                format!("%{name}%;{value}")
            } else {
                format!("{value};%{name}%")
            };
            let _ = write!(
                out,
                "REM {value}\n\
                 echo \";%{name}%;\" | findstr /C:\";{value};\" >nul\n\
                 if %ERRORLEVEL% EQU 0 goto skip_{label}\n\
                 \n\
                 SET \"{name}={updated}\"\n\
                 \n\
                 :skip_{label}\n\
                 \n"
            );
        }
        Some(out)
    }

    fn on_exit(&self, command: &Exit) -> Option<String> {
        let mut out = String::new();
        if command.pause_on_success {
            out.push_str("if %ERRORLEVEL% EQU 0 (pause)\n");
        }
        if command.pause_on_error {
            out.push_str("if %ERRORLEVEL% NEQ 0 (pause)\n");
        }
        let _ = writeln!(out, "exit /B {}", command.return_code.unwrap_or(0));
        Some(out)
    }

    fn on_exit_on_error(&self, command: &ExitOnError) -> Option<String> {
        let variable = command.variable_name().unwrap_or("ERRORLEVEL");
        let code = command
            .return_code()
            .map_or_else(|| format!("%{variable}%"), |code| code.to_string());
        Some(format!("if %{variable}% NEQ 0 (exit /B {code})\n"))
    }

    fn on_echo_off(&self) -> Option<String> {
        Some("@echo off\n".to_owned())
    }

    fn on_persist_error(&self, command: &PersistError) -> Option<String> {
        Some(format!("SET {}=%ERRORLEVEL%\n", command.variable_name))
    }

    fn on_push_directory(&self, command: &PushDirectory) -> Option<String> {
        let directory = command
            .value
            .as_ref()
            .map_or_else(|| "%~dp0".to_owned(), |path| path.display().to_string());
        Some(format!("pushd \"{directory}\"\n"))
    }

    fn on_pop_directory(&self) -> Option<String> {
        Some("popd\n".to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Command;

    fn render(command: Command) -> String {
        BatchVisitor::new().accept(&command).unwrap()
    }

    #[test]
    fn message_escapes_specials_but_keeps_carets() {
        let out = render(Command::message("50% (a|b) ^x\n"));
        assert_eq!(out, "echo 50%% ^(a^|b^) ^x && echo. \n");
    }

    #[test]
    fn set_and_unset() {
        assert_eq!(render(Command::set("FOO", "a;b")), "SET \"FOO=a;b\"\n");
        assert_eq!(render(Command::unset("FOO")), "SET FOO=\n");
    }

    #[test]
    fn call_checks_errorlevel() {
        assert_eq!(
            render(Command::call("\"C:\\tmp\\x.cmd\"")),
            "call \"C:\\tmp\\x.cmd\"\nif %ERRORLEVEL% NEQ 0 (exit /B %ERRORLEVEL%)\n"
        );
    }

    #[test]
    fn execute_wraps_batch_files_in_cmd() {
        let out = render(Execute::new("\"C:\\t\\setup.BAT\" /q").without_exit_on_error().into());
        assert_eq!(out, "cmd /c \"C:\\t\\setup.BAT\" /q\n");
        let out = render(Execute::new("tool.exe --x").without_exit_on_error().into());
        assert_eq!(out, "tool.exe --x\n");
    }

    #[test]
    fn augment_uses_unique_labels() {
        let out = render(Command::Augment(Augment {
            name: "PATH".into(),
            values: vec!["C:\\a".into(), "C:\\b".into()],
            append: false,
        }));
        let labels: Vec<&str> = out
            .lines()
            .filter_map(|line| line.strip_prefix(":skip_"))
            .collect();
        assert_eq!(labels.len(), 2);
        assert_ne!(labels[0], labels[1]);
        assert!(out.contains("SET \"PATH=C:\\a;%PATH%\""));
        assert!(out.contains("findstr /C:\";C:\\b;\""));
    }

    #[test]
    fn exit_on_error_variants() {
        assert_eq!(
            render(ExitOnError::from_variable("RC").into()),
            "if %RC% NEQ 0 (exit /B %RC%)\n"
        );
        assert_eq!(
            render(ExitOnError::with_code(4).into()),
            "if %ERRORLEVEL% NEQ 0 (exit /B 4)\n"
        );
    }

    #[test]
    fn exit_and_housekeeping() {
        assert_eq!(render(Command::exit_with(3)), "exit /B 3\n");
        assert_eq!(render(Command::EchoOff), "@echo off\n");
        assert_eq!(render(Command::persist_error("RC")), "SET RC=%ERRORLEVEL%\n");
        assert_eq!(
            render(Command::PushDirectory(PushDirectory { value: None })),
            "pushd \"%~dp0\"\n"
        );
        assert_eq!(render(Command::PopDirectory), "popd\n");
    }

    #[test]
    fn program_of_handles_quotes() {
        assert_eq!(program_of("\"C:\\a b\\x.cmd\" arg"), "C:\\a b\\x.cmd");
        assert_eq!(program_of("  run.bat arg"), "run.bat");
    }
}
