use toolsdir_shell::{Command, Dialect};

use crate::scope::EnvChange;

/// Script the entry point evaluates in the caller's shell to apply `changes`.
///
/// Batch entry points read the script line by line through `for /f`, which
/// loses the launcher's exit code, so for batch the script ends by exiting
/// with `exit_code` itself.
#[must_use]
pub fn render_replay(dialect: Dialect, changes: &[EnvChange], exit_code: i32) -> String {
    let mut commands: Vec<Command> = changes.iter().map(EnvChange::to_command).collect();
    if dialect == Dialect::Batch {
        commands.push(Command::exit_with(exit_code));
    }
    dialect.visitor().render(&commands)
}
