//! Combines the generation and execution outcomes into the final exit code
//! and tells the user what happened.

use std::fmt::Write as _;
use std::io::Write;

use crossterm::style::Stylize;

use crate::namer::TempScriptHandle;

/// Exit code reported for every failed activation.
pub const FAILURE_EXIT_CODE: i32 = 1;

pub const ACTIVATION_FAILED: &str = "Unable to activate tools.";
pub const ACTIVATION_SUCCEEDED: &str = "Tools have been activated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionOutcome {
    pub generation_exit_code: i32,
    /// `0` when execution was skipped or there was nothing to run.
    pub execution_exit_code: i32,
}

impl ExecutionOutcome {
    /// Generation failed; execution never ran.
    #[must_use]
    pub fn generation_failed(code: i32) -> Self {
        Self {
            generation_exit_code: code,
            execution_exit_code: 0,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.generation_exit_code == 0 && self.execution_exit_code == 0
    }

    #[must_use]
    pub fn final_exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            FAILURE_EXIT_CODE
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    Error,
    Success,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Self::Error => "ERROR:",
            Self::Success => "SUCCESS:",
        }
    }
}

/// A headline with bracketed detail lines, framed by blank lines:
///
/// ```text
///
/// ERROR: Unable to activate tools.
/// ERROR:     [generator failed]
///
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBlock {
    severity: Severity,
    headline: String,
    details: Vec<String>,
}

impl StatusBlock {
    pub fn error(headline: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            headline: headline.into(),
            details: Vec::new(),
        }
    }

    pub fn success(headline: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            headline: headline.into(),
            details: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    #[must_use]
    pub fn render(&self, color: bool) -> String {
        let label = self.severity.label();
        let label = match (color, self.severity) {
            (false, _) => label.to_owned(),
            (true, Severity::Error) => label.red().bold().to_string(),
            (true, Severity::Success) => label.green().bold().to_string(),
        };
        let mut out = format!("\n{label} {}\n", self.headline);
        for detail in &self.details {
            let _ = writeln!(out, "{label}     [{detail}]");
        }
        out.push('\n');
        out
    }
}

/// Writes status blocks to the user, normally on stderr.
#[derive(Debug)]
pub struct Reporter<W> {
    out: W,
    color: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    /// Failing to reach the terminal must not change the activation result.
    pub fn emit(&mut self, block: &StatusBlock) {
        let text = block.render(self.color);
        if let Err(e) = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush())
        {
            tracing::debug!("failed to write status block: {e}");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Decide the final exit code, report it, and clean up after success.
///
/// The temp script is removed only when both phases succeeded; after a
/// failure it stays on disk for inspection.
pub fn finalize<W: Write>(
    outcome: &ExecutionOutcome,
    handle: &TempScriptHandle,
    reporter: &mut Reporter<W>,
) -> i32 {
    if outcome.generation_exit_code != 0 {
        tracing::debug!(code = outcome.generation_exit_code, "generation failed");
        reporter.emit(&StatusBlock::error(ACTIVATION_FAILED).with_detail("generator failed"));
        return outcome.final_exit_code();
    }
    if outcome.execution_exit_code != 0 {
        tracing::debug!(code = outcome.execution_exit_code, "execution failed");
        reporter.emit(
            &StatusBlock::error(ACTIVATION_FAILED)
                .with_detail(format!("{} failed", handle.path().display())),
        );
        return outcome.final_exit_code();
    }

    match std::fs::remove_file(handle.path()) {
        Ok(()) => tracing::debug!(path = %handle.path().display(), "removed temp script"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %handle.path().display(), "failed to remove temp script: {e}"),
    }
    reporter.emit(&StatusBlock::success(ACTIVATION_SUCCEEDED));
    outcome.final_exit_code()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn reporter() -> Reporter<Vec<u8>> {
        Reporter::new(Vec::new(), false)
    }

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    fn handle_in(dir: &std::path::Path, create: bool) -> TempScriptHandle {
        let handle = TempScriptHandle::new(dir.join("ExecuteImpl-7.sh"));
        if create {
            std::fs::write(handle.path(), "export FOO=bar\n").unwrap();
        }
        handle
    }

    #[test]
    fn error_block_layout() {
        let block = StatusBlock::error(ACTIVATION_FAILED).with_detail("generator failed");
        assert_eq!(
            block.render(false),
            "\nERROR: Unable to activate tools.\nERROR:     [generator failed]\n\n"
        );
    }

    #[test]
    fn colored_block_keeps_text() {
        let text = StatusBlock::success(ACTIVATION_SUCCEEDED).render(true);
        assert!(text.contains("\u{1b}["));
        assert!(text.contains("SUCCESS:"));
        assert!(text.contains(ACTIVATION_SUCCEEDED));
    }

    #[test]
    fn success_removes_script() {
        let dir = tempfile::tempdir().unwrap();
        let handle = handle_in(dir.path(), true);
        let mut reporter = reporter();
        let code = finalize(
            &ExecutionOutcome {
                generation_exit_code: 0,
                execution_exit_code: 0,
            },
            &handle,
            &mut reporter,
        );
        assert_eq!(code, 0);
        assert!(!handle.exists());
        assert!(output(reporter).contains("SUCCESS: Tools have been activated."));
    }

    #[test]
    fn success_without_script_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let handle = handle_in(dir.path(), false);
        let mut reporter = reporter();
        let outcome = ExecutionOutcome {
            generation_exit_code: 0,
            execution_exit_code: 0,
        };
        assert_eq!(finalize(&outcome, &handle, &mut reporter), 0);
    }

    #[test]
    fn generation_failure_reports_generator() {
        let dir = tempfile::tempdir().unwrap();
        let handle = handle_in(dir.path(), true);
        let mut reporter = reporter();
        let code = finalize(&ExecutionOutcome::generation_failed(2), &handle, &mut reporter);
        assert_eq!(code, FAILURE_EXIT_CODE);
        assert!(handle.exists());
        let text = output(reporter);
        assert!(text.contains("ERROR:     [generator failed]"));
        assert!(!text.contains("SUCCESS"));
    }

    #[test]
    fn execution_failure_names_script_and_keeps_it() {
        let dir = tempfile::tempdir().unwrap();
        let handle = handle_in(dir.path(), true);
        let mut reporter = reporter();
        let code = finalize(
            &ExecutionOutcome {
                generation_exit_code: 0,
                execution_exit_code: 5,
            },
            &handle,
            &mut reporter,
        );
        assert_eq!(code, FAILURE_EXIT_CODE);
        assert!(handle.exists());
        let expected = format!("ERROR:     [{} failed]", handle.path().display());
        assert!(output(reporter).contains(&expected));
    }

    proptest! {
        #[test]
        fn final_code_is_zero_iff_both_succeed(generation in -3i32..256, execution in -3i32..256) {
            let outcome = ExecutionOutcome {
                generation_exit_code: generation,
                execution_exit_code: execution,
            };
            let code = outcome.final_exit_code();
            prop_assert_eq!(code == 0, generation == 0 && execution == 0);
            prop_assert!(code == 0 || code == FAILURE_EXIT_CODE);
        }
    }
}
