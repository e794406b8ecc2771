use std::fmt;
use std::str::FromStr;

use crate::visitor::CommandVisitor;
use crate::{BashVisitor, BatchVisitor, PowerShellVisitor};

/// Shell execution environment that a generated script targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Windows `cmd.exe` batch files; `call` runs in the caller's scope.
    Batch,
    /// POSIX shells; scripts must be `source`d.
    PosixShell,
    /// PowerShell; scripts must be dot-sourced.
    PowerShell,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown shell dialect '{0}' (expected batch, bash or powershell)")]
pub struct UnknownDialect(pub String);

impl Dialect {
    pub const ALL: [Self; 3] = [Self::Batch, Self::PosixShell, Self::PowerShell];

    /// Tag passed to the generator as its second argument.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::PosixShell => "bash",
            Self::PowerShell => "powershell",
        }
    }

    /// Extension (without the dot) the dialect's interpreter will execute.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Batch => "cmd",
            Self::PosixShell => "sh",
            Self::PowerShell => "ps1",
        }
    }

    /// Separator between entries of list-valued variables such as `PATH`.
    #[must_use]
    pub fn list_separator(self) -> char {
        match self {
            Self::PosixShell => ':',
            Self::Batch | Self::PowerShell => ';',
        }
    }

    #[must_use]
    pub fn visitor(self) -> Box<dyn CommandVisitor> {
        match self {
            Self::Batch => Box::new(BatchVisitor::new()),
            Self::PosixShell => Box::new(BashVisitor::new()),
            Self::PowerShell => Box::new(PowerShellVisitor::new()),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" | "cmd" => Ok(Self::Batch),
            "bash" | "sh" | "posix" => Ok(Self::PosixShell),
            "powershell" | "pwsh" => Ok(Self::PowerShell),
            _ => Err(UnknownDialect(s.to_owned())),
        }
    }
}
