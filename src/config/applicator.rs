//! Plan applicator: runs import and tag jobs against a Go workspace.
//!
//! Every job reads and re-parses its file before computing a rewrite, so
//! spans from an earlier job never leak into a later one. Writes go through
//! [`Edit`], which refuses to touch a file that changed underneath it.

use crate::config::schema::{ImportJob, PlanConfig, TagJob};
use crate::edit::{Edit, EditError, EditResult};
use crate::imports::{ImportError, PackageImportOptions, TypeTable};
use crate::safety::{SafetyError, WorkspaceGuard};
use crate::tag::{rewrite_struct_tag, TagError};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const PLAN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::plan");

/// Outcome of a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "JobResult should be checked for success/failure"]
pub enum JobResult {
    /// The file was rewritten (or would be, in a dry run)
    Applied { file: PathBuf },
    /// The file already had the requested imports or tag value
    AlreadyApplied { file: PathBuf },
    Failed { file: PathBuf, reason: String },
}

impl JobResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobResult::Failed { .. })
    }
}

impl fmt::Display for JobResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobResult::Applied { file } => write!(f, "Applied to {}", file.display()),
            JobResult::AlreadyApplied { file } => {
                write!(f, "Already applied to {}", file.display())
            }
            JobResult::Failed { file, reason } => {
                write!(f, "Failed on {}: {}", file.display(), reason)
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("edit error: {0}")]
    Edit(#[from] EditError),

    #[error("import injection failed: {0}")]
    Imports(#[from] ImportError),

    #[error("tag rewrite failed: {0}")]
    Tag(#[from] TagError),
}

/// Contents of one file before the first and after the last job touching it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub before: Vec<u8>,
    pub after: Vec<u8>,
}

/// Per-job results in plan order, plus the net change per file.
#[derive(Debug, Clone, Default)]
pub struct PlanReport {
    pub jobs: Vec<(String, JobResult)>,
    pub changes: BTreeMap<PathBuf, FileChange>,
}

impl PlanReport {
    pub fn has_failures(&self) -> bool {
        self.jobs.iter().any(|(_, result)| result.is_failure())
    }

    pub fn applied_count(&self) -> usize {
        self.jobs
            .iter()
            .filter(|(_, result)| matches!(result, JobResult::Applied { .. }))
            .count()
    }
}

/// A plan job, rewritten from the current file contents.
enum Job<'c> {
    Imports(&'c ImportJob),
    Tag(&'c TagJob),
}

impl Job<'_> {
    fn file(&self) -> &str {
        match self {
            Job::Imports(job) => &job.file,
            Job::Tag(job) => &job.file,
        }
    }

    fn rewrite(&self, source: &[u8], table: &TypeTable) -> Result<Vec<u8>, ApplicationError> {
        match self {
            Job::Imports(job) => {
                let options = job
                    .packages
                    .iter()
                    .fold(PackageImportOptions::new(), |options, path| {
                        options.with_package(path.as_str())
                    });
                let options = job
                    .types
                    .iter()
                    .fold(options, |options, name| options.with_type(name.as_str()));
                Ok(options.inject(source, table)?)
            }
            Job::Tag(job) => Ok(rewrite_struct_tag(
                source,
                &job.struct_name,
                &job.field,
                &job.key,
                &job.sub_field,
                &job.value,
                job.position,
            )?),
        }
    }
}

/// Apply every job of `config` to files under `workspace_root`.
///
/// Jobs run in plan order, imports first. With `dry_run` nothing is
/// written: later jobs see the in-memory result of earlier ones and
/// `Applied` means "would apply".
pub fn apply_plan(config: &PlanConfig, workspace_root: &Path, dry_run: bool) -> PlanReport {
    let jobs: Vec<(String, Job<'_>)> = config
        .imports
        .iter()
        .enumerate()
        .map(|(index, job)| (job.label(index), Job::Imports(job)))
        .chain(
            config
                .tags
                .iter()
                .enumerate()
                .map(|(index, job)| (job.label(index), Job::Tag(job))),
        )
        .collect();

    let mut report = PlanReport::default();

    let guard = match WorkspaceGuard::new(workspace_root) {
        Ok(guard) => guard,
        Err(err) => {
            let reason = err.to_string();
            for (label, job) in jobs {
                let file = PathBuf::from(job.file());
                report.jobs.push((
                    label,
                    JobResult::Failed {
                        file,
                        reason: reason.clone(),
                    },
                ));
            }
            return report;
        }
    };

    let table: TypeTable = config.types.iter().collect();
    let mut runner = Runner {
        guard: &guard,
        table: &table,
        dry_run,
        workspace_relative: config.meta.workspace_relative,
        pending: HashMap::new(),
        changes: BTreeMap::new(),
    };

    for (label, job) in jobs {
        let file = runner.resolve(job.file());
        let result = match runner.run(&file, &job) {
            Ok(result) => result,
            Err(err) => JobResult::Failed {
                file: file.clone(),
                reason: err.to_string(),
            },
        };
        info!(target: PLAN_TARGET, job = label.as_str(), %result, "job finished");
        report.jobs.push((label, result));
    }

    report.changes = runner.changes;
    report
}

struct Runner<'a> {
    guard: &'a WorkspaceGuard,
    table: &'a TypeTable,
    dry_run: bool,
    workspace_relative: bool,
    /// Dry-run contents of files earlier jobs rewrote
    pending: HashMap<PathBuf, Vec<u8>>,
    changes: BTreeMap<PathBuf, FileChange>,
}

impl Runner<'_> {
    fn resolve(&self, file: &str) -> PathBuf {
        if self.workspace_relative {
            self.guard.workspace_root().join(file)
        } else {
            PathBuf::from(file)
        }
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, ApplicationError> {
        if let Some(contents) = self.pending.get(path) {
            return Ok(contents.clone());
        }
        fs::read(path).map_err(|source| ApplicationError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn run(&mut self, file: &Path, job: &Job<'_>) -> Result<JobResult, ApplicationError> {
        let path = self.guard.validate_path(file)?;
        let before = self.read(&path)?;
        let after = job.rewrite(&before, self.table)?;

        let Some(edit) = Edit::from_rewrite(&path, &before, &after) else {
            debug!(target: PLAN_TARGET, file = %path.display(), "nothing to change");
            return Ok(JobResult::AlreadyApplied { file: path });
        };

        if self.dry_run {
            self.pending.insert(path.clone(), after.clone());
        } else if let EditResult::AlreadyApplied { file } = edit.apply()? {
            return Ok(JobResult::AlreadyApplied { file });
        }

        self.changes
            .entry(path.clone())
            .and_modify(|change| change.after = after.clone())
            .or_insert(FileChange { before, after });
        Ok(JobResult::Applied { file: path })
    }
}
