//! Activation launcher for toolsdir.
//!
//! An activation reserves a temp script path, asks an external generator to
//! write a dialect specific script there, runs that script so its effects land
//! in the caller's [`EnvironmentScope`], and folds both exit codes into one.

pub mod adapter;
pub mod aggregator;
pub mod config;
pub mod error;
pub mod executor;
pub mod generator;
pub mod guard;
pub mod launcher;
pub mod namer;
pub mod replay;
pub mod request;
pub mod scope;

pub use aggregator::{ExecutionOutcome, Reporter, StatusBlock};
pub use config::Config;
pub use error::{ActivationError, ConfigError, GuardError};
pub use executor::{AnyExecutor, ScopeExecutor};
pub use generator::{GeneratorInvoker, ProcessGenerator};
pub use launcher::{ActivationReport, Launcher};
pub use namer::{TempScriptHandle, TempScriptNamer};
pub use request::{ActivationRequest, InvocationMetadata};
pub use scope::{EnvChange, EnvironmentScope};
pub use toolsdir_shell::Dialect;
