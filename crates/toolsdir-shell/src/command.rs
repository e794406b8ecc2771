//! Dialect-neutral shell commands.

use std::path::PathBuf;

/// One statement of a generated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Message(Message),
    Call(Call),
    Execute(Execute),
    Set(Set),
    Augment(Augment),
    Exit(Exit),
    ExitOnError(ExitOnError),
    /// Disable echoing of commands to the terminal.
    EchoOff,
    PersistError(PersistError),
    PushDirectory(PushDirectory),
    /// Return to the directory saved by the matching `PushDirectory`.
    PopDirectory,
    /// Shell-specific content emitted as-is.
    Raw(String),
}

/// Text displayed to the user, one `echo` per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub value: String,
}

/// Run another script in the current scope; its changes persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub command_line: String,
    pub exit_on_error: bool,
    pub exit_via_return: bool,
}

/// Run another executable; its changes do not persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execute {
    pub command_line: String,
    exit_on_error: bool,
    exit_via_return: bool,
}

/// Set a variable, replacing any existing value. `None` removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set {
    pub name: String,
    pub values: Option<Vec<String>>,
}

/// Add values to a list variable unless they are already present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Augment {
    pub name: String,
    pub values: Vec<String>,
    pub append: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exit {
    pub pause_on_success: bool,
    pub pause_on_error: bool,
    pub return_code: Option<i32>,
}

/// Leave the script when the previous command (or a persisted variable) failed.
///
/// At most one of `variable_name` and `return_code` is set; the constructors
/// enforce this.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitOnError {
    variable_name: Option<String>,
    return_code: Option<i32>,
    pub use_return_statement: bool,
}

/// Save the last exit code into a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistError {
    pub variable_name: String,
}

/// Save the current directory and change to `value`, or to the script's own
/// directory when `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDirectory {
    pub value: Option<PathBuf>,
}

impl Command {
    pub fn message(value: impl Into<String>) -> Self {
        Self::Message(Message {
            value: value.into(),
        })
    }

    pub fn call(command_line: impl Into<String>) -> Self {
        Self::Call(Call::new(command_line))
    }

    pub fn execute(command_line: impl Into<String>) -> Self {
        Self::Execute(Execute::new(command_line))
    }

    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Set(Set {
            name: name.into(),
            values: Some(vec![value.into()]),
        })
    }

    pub fn unset(name: impl Into<String>) -> Self {
        Self::Set(Set {
            name: name.into(),
            values: None,
        })
    }

    pub fn prepend(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Augment(Augment {
            name: name.into(),
            values: vec![value.into()],
            append: false,
        })
    }

    pub fn persist_error(variable_name: impl Into<String>) -> Self {
        Self::PersistError(PersistError {
            variable_name: variable_name.into(),
        })
    }

    #[must_use]
    pub fn exit_with(return_code: i32) -> Self {
        Self::Exit(Exit {
            return_code: Some(return_code),
            ..Exit::default()
        })
    }
}

impl Call {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            exit_on_error: true,
            exit_via_return: false,
        }
    }

    #[must_use]
    pub fn without_exit_on_error(mut self) -> Self {
        self.exit_on_error = false;
        self
    }
}

impl Execute {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            exit_on_error: true,
            exit_via_return: false,
        }
    }

    #[must_use]
    pub fn without_exit_on_error(mut self) -> Self {
        self.exit_on_error = false;
        self.exit_via_return = false;
        self
    }

    /// Leave via `return` rather than `exit`; implies `exit_on_error`.
    #[must_use]
    pub fn exit_via_return(mut self) -> Self {
        self.exit_on_error = true;
        self.exit_via_return = true;
        self
    }

    #[must_use]
    pub fn exits_on_error(&self) -> bool {
        self.exit_on_error
    }

    #[must_use]
    pub fn exits_via_return(&self) -> bool {
        self.exit_via_return
    }
}

impl Set {
    /// Values joined with the dialect's list separator.
    #[must_use]
    pub fn joined(&self, separator: char) -> Option<String> {
        self.values
            .as_ref()
            .map(|values| values.join(&separator.to_string()))
    }
}

impl ExitOnError {
    /// Test the exit code of the previous command.
    #[must_use]
    pub fn last() -> Self {
        Self::default()
    }

    /// Test the exit code stored by an earlier [`PersistError`].
    pub fn from_variable(name: impl Into<String>) -> Self {
        Self {
            variable_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Test the previous command but leave with a fixed code.
    #[must_use]
    pub fn with_code(return_code: i32) -> Self {
        Self {
            return_code: Some(return_code),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn via_return(mut self) -> Self {
        self.use_return_statement = true;
        self
    }

    #[must_use]
    pub fn variable_name(&self) -> Option<&str> {
        self.variable_name.as_deref()
    }

    #[must_use]
    pub fn return_code(&self) -> Option<i32> {
        self.return_code
    }
}

impl From<Call> for Command {
    fn from(value: Call) -> Self {
        Self::Call(value)
    }
}

impl From<Execute> for Command {
    fn from(value: Execute) -> Self {
        Self::Execute(value)
    }
}

impl From<ExitOnError> for Command {
    fn from(value: ExitOnError) -> Self {
        Self::ExitOnError(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_defaults_to_exit_on_error() {
        let call = Call::new("other.sh");
        assert!(call.exit_on_error);
        assert!(!call.exit_via_return);
        assert!(!call.without_exit_on_error().exit_on_error);
    }

    #[test]
    fn execute_exit_via_return_implies_exit_on_error() {
        let execute = Execute::new("tool").without_exit_on_error().exit_via_return();
        assert!(execute.exits_on_error());
        assert!(execute.exits_via_return());
    }

    #[test]
    fn disabling_exit_on_error_clears_return() {
        let execute = Execute::new("tool").exit_via_return().without_exit_on_error();
        assert!(!execute.exits_on_error());
        assert!(!execute.exits_via_return());
    }

    #[test]
    fn exit_on_error_constructors_are_exclusive() {
        let var = ExitOnError::from_variable("rc");
        assert_eq!(var.variable_name(), Some("rc"));
        assert_eq!(var.return_code(), None);

        let code = ExitOnError::with_code(3);
        assert_eq!(code.variable_name(), None);
        assert_eq!(code.return_code(), Some(3));
    }

    #[test]
    fn set_joined_uses_separator() {
        let set = Set {
            name: "PATH".into(),
            values: Some(vec!["/a".into(), "/b".into()]),
        };
        assert_eq!(set.joined(':').as_deref(), Some("/a:/b"));
        assert_eq!(set.joined(';').as_deref(), Some("/a;/b"));
    }

    #[test]
    fn unset_has_no_values() {
        let Command::Set(set) = Command::unset("FOO") else {
            panic!("expected Set");
        };
        assert!(set.values.is_none());
        assert!(set.joined(':').is_none());
    }
}
