use crate::command::{
    Augment, Call, Command, Execute, Exit, ExitOnError, Message, PersistError, PushDirectory, Set,
};

/// Renders [`Command`]s as statements of one shell dialect.
///
/// Each handler returns the statement text terminated by a newline, or `None`
/// when the command has no meaning in the dialect.
pub trait CommandVisitor {
    fn on_message(&self, command: &Message) -> Option<String>;
    fn on_call(&self, command: &Call) -> Option<String>;
    fn on_execute(&self, command: &Execute) -> Option<String>;
    fn on_set(&self, command: &Set) -> Option<String>;
    fn on_augment(&self, command: &Augment) -> Option<String>;
    fn on_exit(&self, command: &Exit) -> Option<String>;
    fn on_exit_on_error(&self, command: &ExitOnError) -> Option<String>;
    fn on_echo_off(&self) -> Option<String>;
    fn on_persist_error(&self, command: &PersistError) -> Option<String>;
    fn on_push_directory(&self, command: &PushDirectory) -> Option<String>;
    fn on_pop_directory(&self) -> Option<String>;

    fn on_raw(&self, value: &str) -> Option<String> {
        Some(format!("{}\n", value.strip_suffix('\n').unwrap_or(value)))
    }

    fn accept(&self, command: &Command) -> Option<String> {
        match command {
            Command::Message(c) => self.on_message(c),
            Command::Call(c) => self.on_call(c),
            Command::Execute(c) => self.on_execute(c),
            Command::Set(c) => self.on_set(c),
            Command::Augment(c) => self.on_augment(c),
            Command::Exit(c) => self.on_exit(c),
            Command::ExitOnError(c) => self.on_exit_on_error(c),
            Command::EchoOff => self.on_echo_off(),
            Command::PersistError(c) => self.on_persist_error(c),
            Command::PushDirectory(c) => self.on_push_directory(c),
            Command::PopDirectory => self.on_pop_directory(),
            Command::Raw(value) => self.on_raw(value),
        }
    }

    /// Render a whole script.
    fn render(&self, commands: &[Command]) -> String {
        commands
            .iter()
            .filter_map(|command| self.accept(command))
            .collect()
    }
}

/// Replace every occurrence of each `(from, to)` pair, in order.
pub(crate) fn substitute(value: &str, table: &[(&str, &str)]) -> String {
    table
        .iter()
        .fold(value.to_owned(), |acc, (from, to)| acc.replace(from, to))
}
