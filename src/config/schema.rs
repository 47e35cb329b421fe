use crate::tag::InsertLocation;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A rewrite plan: import injections and struct tag edits over Go files.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PlanConfig {
    #[serde(default)]
    pub meta: Metadata,
    /// Type name to import path, used to resolve `imports.types`
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    #[serde(default)]
    pub imports: Vec<ImportJob>,
    #[serde(default)]
    pub tags: Vec<TagJob>,
}

impl PlanConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.imports.is_empty() && self.tags.is_empty() {
            issues.push(ValidationIssue::EmptyPlan);
        }

        for (type_name, import_path) in &self.types {
            if import_path.trim().is_empty() {
                issues.push(ValidationIssue::InvalidCombo {
                    job: None,
                    message: format!("type '{type_name}' maps to an empty import path"),
                });
            }
        }

        for (index, job) in self.imports.iter().enumerate() {
            let label = job.label(index);
            if job.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    job: label.clone(),
                    field: "file",
                });
            }
            if job.packages.is_empty() && job.types.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    job: label.clone(),
                    field: "packages",
                });
            }
            for package in &job.packages {
                if package.trim().is_empty() || package.contains('"') {
                    issues.push(ValidationIssue::InvalidCombo {
                        job: Some(label.clone()),
                        message: format!("invalid package path {package:?}"),
                    });
                }
            }
            for type_name in &job.types {
                if !self.types.contains_key(type_name) {
                    issues.push(ValidationIssue::UnknownType {
                        job: label.clone(),
                        type_name: type_name.clone(),
                    });
                }
            }
        }

        for (index, job) in self.tags.iter().enumerate() {
            let label = job.label(index);
            let required = [
                ("file", &job.file),
                ("struct", &job.struct_name),
                ("field", &job.field),
                ("key", &job.key),
                ("sub_field", &job.sub_field),
            ];
            for (field, value) in required {
                if value.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        job: label.clone(),
                        field,
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Number of jobs across all job tables.
    pub fn job_count(&self) -> usize {
        self.imports.len() + self.tags.len()
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resolve job files against the workspace root instead of the cwd
    #[serde(default)]
    pub workspace_relative: bool,
}

/// Add imports to one file.
#[derive(Debug, Deserialize, Clone)]
pub struct ImportJob {
    #[serde(default)]
    pub id: Option<String>,
    pub file: String,
    #[serde(default)]
    pub packages: Vec<String>,
    /// Type names resolved through `[types]`
    #[serde(default)]
    pub types: Vec<String>,
}

impl ImportJob {
    pub fn label(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("imports[{index}]"))
    }
}

/// Set `sub_field:value` inside `key` of one struct field tag.
#[derive(Debug, Deserialize, Clone)]
pub struct TagJob {
    #[serde(default)]
    pub id: Option<String>,
    pub file: String,
    #[serde(rename = "struct")]
    pub struct_name: String,
    pub field: String,
    pub key: String,
    pub sub_field: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub position: InsertLocation,
}

impl TagJob {
    pub fn label(&self, index: usize) -> String {
        self.id.clone().unwrap_or_else(|| format!("tags[{index}]"))
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyPlan,
    MissingField {
        job: String,
        field: &'static str,
    },
    UnknownType {
        job: String,
        type_name: String,
    },
    InvalidCombo {
        job: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyPlan => write!(f, "plan contains no jobs"),
            ValidationIssue::MissingField { job, field } => {
                write!(f, "job '{job}' missing required field '{field}'")
            }
            ValidationIssue::UnknownType { job, type_name } => {
                write!(f, "job '{job}' references type '{type_name}' not listed in [types]")
            }
            ValidationIssue::InvalidCombo { job, message } => match job {
                Some(job) => write!(f, "job '{job}' has invalid configuration: {message}"),
                None => write!(f, "invalid plan configuration: {message}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> PlanConfig {
        toml_edit::de::from_str(input).unwrap()
    }

    #[test]
    fn deserializes_full_plan() {
        let config = parse(
            r#"
[meta]
name = "orders"
workspace_relative = true

[types]
Time = "time"

[[imports]]
file = "model/order.go"
packages = ["fmt"]
types = ["Time"]

[[tags]]
id = "order-id-type"
file = "model/order.go"
struct = "Order"
field = "ID"
key = "gorm"
sub_field = "type"
value = "bigint"
position = "top"
"#,
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.meta.name, "orders");
        assert_eq!(config.job_count(), 2);
        assert_eq!(config.imports[0].label(0), "imports[0]");
        assert_eq!(config.tags[0].label(0), "order-id-type");
        assert_eq!(config.tags[0].struct_name, "Order");
        assert_eq!(config.tags[0].position, InsertLocation::Top);
    }

    #[test]
    fn position_defaults_to_end() {
        let config = parse(
            r#"
[[tags]]
file = "a.go"
struct = "A"
field = "B"
key = "gorm"
sub_field = "column"
value = "b"
"#,
        );
        assert_eq!(config.tags[0].position, InsertLocation::End);
    }

    #[test]
    fn unknown_position_is_rejected() {
        let result: Result<PlanConfig, _> = toml_edit::de::from_str(
            r#"
[[tags]]
file = "a.go"
struct = "A"
field = "B"
key = "gorm"
sub_field = "column"
position = "middle"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn validation_lists_every_issue() {
        let config = parse(
            r#"
[[imports]]
file = ""
types = ["Missing"]

[[tags]]
file = "a.go"
struct = ""
field = "B"
key = "gorm"
sub_field = ""
"#,
        );
        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 4);
        assert!(err.issues.contains(&ValidationIssue::UnknownType {
            job: "imports[0]".to_string(),
            type_name: "Missing".to_string(),
        }));
        assert!(err.to_string().contains("missing required field 'struct'"));
    }

    #[test]
    fn empty_plan_is_invalid() {
        let err = PlanConfig::default().validate().unwrap_err();
        assert_eq!(err.issues, vec![ValidationIssue::EmptyPlan]);
    }
}
