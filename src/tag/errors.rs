use crate::go::GoSyntaxError;
use crate::span::SpliceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagError {
    #[error("tag key '{key}' not found")]
    KeyNotFound { key: String },

    #[error("invalid insert location '{location}', expected TOP or END")]
    InvalidLocation { location: String },

    #[error("invalid tag pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("struct '{name}' not found")]
    StructNotFound { name: String },

    #[error("field '{field}' not found in struct '{struct_name}'")]
    FieldNotFound { struct_name: String, field: String },

    #[error("field '{field}' has no tag")]
    MissingTag { field: String },

    #[error("tag of field '{field}' is not a raw string literal")]
    UnsupportedTagLiteral { field: String },

    #[error(transparent)]
    Syntax(#[from] GoSyntaxError),

    #[error(transparent)]
    Splice(#[from] SpliceError),
}
