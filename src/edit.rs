use crate::span::{code_of, replace_span, Span, SpliceError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A verified byte-span replacement on a file.
///
/// Rewrites computed in memory (import injection, tag edits) are written back
/// through this type so the file is only touched when it still holds the
/// bytes the rewrite was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Edit does nothing until apply() is called"]
pub struct Edit {
    pub file: PathBuf,
    pub span: Span,
    /// Bytes to put at `span`
    pub new_bytes: Vec<u8>,
    /// What we expect to find at `span` before applying
    pub expected_before: EditVerification,
}

/// Verification strategy for edit safety.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact bytes required
    ExactMatch(Vec<u8>),
    /// xxh3 hash of the expected bytes (for large spans)
    Hash(u64),
}

impl EditVerification {
    pub fn matches(&self, bytes: &[u8]) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => bytes == expected.as_slice(),
            EditVerification::Hash(expected_hash) => xxh3_64(bytes) == *expected_hash,
        }
    }

    /// Exact match for up to 1KB, hash above that.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() > 1024 {
            EditVerification::Hash(xxh3_64(bytes))
        } else {
            EditVerification::ExactMatch(bytes.to_vec())
        }
    }
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("before-text verification failed at {file}:{byte_start}")]
    BeforeTextMismatch {
        file: PathBuf,
        byte_start: usize,
        byte_end: usize,
        found: String,
    },

    #[error("invalid span for {file}: {source}")]
    InvalidSpan {
        file: PathBuf,
        #[source]
        source: SpliceError,
    },

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("edit would leave {0} with malformed UTF-8")]
    InvalidUtf8Edit(PathBuf),
}

/// Result of applying an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditResult should be checked for success/already-applied"]
pub enum EditResult {
    Applied { file: PathBuf, bytes_changed: usize },
    /// The span already holds the new bytes
    AlreadyApplied { file: PathBuf },
}

impl Edit {
    pub fn new(
        file: impl Into<PathBuf>,
        span: Span,
        new_bytes: impl Into<Vec<u8>>,
        expected_before: &[u8],
    ) -> Self {
        Self {
            file: file.into(),
            span,
            new_bytes: new_bytes.into(),
            expected_before: EditVerification::from_bytes(expected_before),
        }
    }

    /// The smallest edit turning `before` into `after`, or `None` when they
    /// are equal.
    ///
    /// The span covers the bytes between the common prefix and the common
    /// suffix of the two buffers.
    pub fn from_rewrite(file: impl Into<PathBuf>, before: &[u8], after: &[u8]) -> Option<Self> {
        if before == after {
            return None;
        }
        let prefix = before
            .iter()
            .zip(after)
            .take_while(|(a, b)| a == b)
            .count();
        let max_suffix = before.len().min(after.len()) - prefix;
        let suffix = before
            .iter()
            .rev()
            .zip(after.iter().rev())
            .take(max_suffix)
            .take_while(|(a, b)| a == b)
            .count();

        let span = Span::new(prefix, before.len() - suffix);
        let new_bytes = after[prefix..after.len() - suffix].to_vec();
        Some(Self::new(file, span, new_bytes, &before[span.range()]))
    }

    /// Check the edit against file contents and return the bytes currently
    /// at the span.
    fn validate<'a>(&self, content: &'a [u8]) -> Result<&'a [u8], EditError> {
        let current = code_of(content, self.span).map_err(|source| EditError::InvalidSpan {
            file: self.file.clone(),
            source,
        })?;

        if current == self.new_bytes.as_slice() {
            return Ok(current);
        }

        if !self.expected_before.matches(current) {
            return Err(EditError::BeforeTextMismatch {
                file: self.file.clone(),
                byte_start: self.span.start,
                byte_end: self.span.end,
                found: String::from_utf8_lossy(current).into_owned(),
            });
        }

        Ok(current)
    }

    /// Apply this edit to the file system atomically.
    pub fn apply(&self) -> Result<EditResult, EditError> {
        let original = fs::read(&self.file)?;
        let current = self.validate(&original)?;

        if current == self.new_bytes.as_slice() {
            return Ok(EditResult::AlreadyApplied {
                file: self.file.clone(),
            });
        }

        let updated =
            replace_span(&original, self.span, &self.new_bytes).map_err(|source| {
                EditError::InvalidSpan {
                    file: self.file.clone(),
                    source,
                }
            })?;

        if std::str::from_utf8(&updated).is_err() {
            return Err(EditError::InvalidUtf8Edit(self.file.clone()));
        }

        atomic_write(&self.file, &updated)?;

        // Bump mtime so `go build` caches notice the change
        filetime::set_file_mtime(&self.file, filetime::FileTime::now())?;

        Ok(EditResult::Applied {
            file: self.file.clone(),
            bytes_changed: self.new_bytes.len(),
        })
    }
}

/// Atomic file write: tempfile + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    // Same directory keeps the rename on one filesystem
    let parent = path.parent().ok_or_else(|| {
        EditError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "path has no parent directory",
        ))
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
