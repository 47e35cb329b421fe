//! Tree-sitter integration for Go source.
//!
//! Parsing, query-based location of declarations, and read-only lookups
//! over the top-level declaration list.

pub mod errors;
pub mod locator;
pub mod parser;
pub mod query;
pub mod search;
pub mod validator;

pub use errors::GoSyntaxError;
pub use locator::{CaptureInfo, GoLocator, GoTarget, LocatorResult};
pub use parser::{ErrorNode, GoParser, ParsedSource};
pub use query::{queries, CapturedNode, QueryEngine, QueryMatch};
pub use search::{FuncDecl, ImportSpec, Receiver, StructField, TypeDecl, ValueDecl};
pub use validator::{validate_edit, validate_snippet, validate_syntax, SnippetCategory};
