//! Unique names for the temp scripts exchanged with the generator.
//!
//! The namer only reserves a path. The file is created by the generator, and
//! its absence afterwards means "nothing to activate".

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use toolsdir_shell::Dialect;

/// Upper bound of the random component, matching cmd's `%RANDOM%`.
const RANDOM_RANGE: u32 = 32_768;

/// A reserved temp script location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempScriptHandle {
    path: PathBuf,
}

impl TempScriptHandle {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the filesystem on every call; the generator may have created or
    /// skipped the file since the handle was allocated.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

type SuffixSource = Box<dyn Fn() -> String + Send + Sync>;

/// Allocates `<prefix>-<suffix>.<ext>` paths that do not exist yet.
pub struct TempScriptNamer {
    prefix: String,
    suffix: SuffixSource,
}

impl fmt::Debug for TempScriptNamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TempScriptNamer")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl TempScriptNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::with_suffix_source(prefix, Box::new(inline_suffix))
    }

    /// Use `suffix` to produce the variable part of inline names.
    pub fn with_suffix_source(prefix: impl Into<String>, suffix: SuffixSource) -> Self {
        Self {
            prefix: prefix.into(),
            suffix,
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reserve a path for a `dialect` script inside `directory`.
    ///
    /// PowerShell uses the platform temp file facility; the other dialects
    /// compose a random and time based name inline. The path never exists at
    /// the time of return.
    #[must_use]
    pub fn allocate(&self, directory: &Path, dialect: Dialect) -> TempScriptHandle {
        let extension = dialect.extension();
        let handle = match dialect {
            Dialect::PowerShell => self
                .allocate_platform(directory, extension)
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        directory = %directory.display(),
                        "platform temp file unavailable ({e}), naming inline"
                    );
                    self.allocate_inline(directory, extension)
                }),
            Dialect::Batch | Dialect::PosixShell => self.allocate_inline(directory, extension),
        };
        tracing::debug!(path = %handle.path().display(), "allocated temp script path");
        handle
    }

    /// Reserve a path with an arbitrary extension, always named inline.
    #[must_use]
    pub fn allocate_with_extension(&self, directory: &Path, extension: &str) -> TempScriptHandle {
        self.allocate_inline(directory, extension)
    }

    fn allocate_inline(&self, directory: &Path, extension: &str) -> TempScriptHandle {
        loop {
            let candidate =
                directory.join(format!("{}-{}.{extension}", self.prefix, (self.suffix)()));
            // symlink_metadata also sees dangling links
            if std::fs::symlink_metadata(&candidate).is_err() {
                return TempScriptHandle::new(candidate);
            }
            tracing::debug!(path = %candidate.display(), "temp name collision, retrying");
        }
    }

    /// Create a uniquely named file, then delete it and keep only the name.
    fn allocate_platform(
        &self,
        directory: &Path,
        extension: &str,
    ) -> std::io::Result<TempScriptHandle> {
        let file = tempfile::Builder::new()
            .prefix(&format!("{}-", self.prefix))
            .suffix(&format!(".{extension}"))
            .tempfile_in(directory)?;
        let path = file.path().to_path_buf();
        file.close()?;
        Ok(TempScriptHandle::new(path))
    }
}

/// A value in `0..32768` followed by the sub-second clock in nanoseconds.
fn inline_suffix() -> String {
    let bytes = uuid::Uuid::new_v4().into_bytes();
    let random = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % RANDOM_RANGE;
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.subsec_nanos());
    format!("{random}{nanos:09}")
}
