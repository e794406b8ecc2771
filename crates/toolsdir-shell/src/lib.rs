//! Shell dialects and script emission for toolsdir.
//!
//! A script is described once as a list of [`Command`] values and rendered
//! for a target [`Dialect`] by that dialect's [`CommandVisitor`].

pub mod bash;
pub mod batch;
pub mod command;
pub mod dialect;
pub mod powershell;
pub mod visitor;

pub use bash::BashVisitor;
pub use batch::BatchVisitor;
pub use command::{
    Augment, Call, Command, Execute, Exit, ExitOnError, Message, PersistError, PushDirectory, Set,
};
pub use dialect::{Dialect, UnknownDialect};
pub use powershell::PowerShellVisitor;
pub use visitor::CommandVisitor;
