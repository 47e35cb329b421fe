pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{apply_plan, ApplicationError, FileChange, JobResult, PlanReport};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{ImportJob, Metadata, PlanConfig, TagJob, ValidationError, ValidationIssue};
