//! Go Syntax Kit: Go source analysis and byte-exact rewriting
//!
//! Built on tree-sitter's Go grammar. Everything that changes source text
//! compiles down to a byte-span splice on the original buffer, so bytes
//! outside the edited span are never reformatted.
//!
//! # Architecture
//!
//! - [`go`]: parsing, query-based location, read-only declaration lookups
//! - [`span`]: the splice primitives every rewrite goes through
//! - [`imports`]: adding missing imports after the package clause
//! - [`norm`]: parameter/result list normalization for code generation
//! - [`tag`]: the struct tag micro-grammar (`gorm:"column:id;type:int"`)
//! - [`config`]: TOML rewrite plans applied with idempotency checks
//!
//! Spans are only valid for the buffer they were computed on. After a
//! splice, re-parse before locating anything else.
//!
//! # Example
//!
//! ```
//! use go_syntax_kit::inject_imports;
//!
//! let source = b"package main\n\nfunc main() {}\n";
//! let rewritten = inject_imports(source, &["fmt"]).unwrap();
//! assert!(String::from_utf8(rewritten).unwrap().contains("import \"fmt\""));
//! ```

pub mod config;
pub mod edit;
pub mod go;
pub mod imports;
pub mod norm;
pub mod pool;
pub mod safety;
pub mod span;
pub mod tag;

// Re-exports
pub use config::{
    apply_plan, load_from_path, load_from_str, ApplicationError, ConfigError, JobResult,
    PlanConfig, PlanReport,
};
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use go::{GoLocator, GoParser, GoSyntaxError, GoTarget, LocatorResult, ParsedSource};
pub use imports::{
    create_imports, inject_imports, inject_named_imports, remove_imports, remove_named_imports,
    ImportError, PackageImportOptions, TypeLocator, TypeTable,
};
pub use norm::{FunctionSignature, NameStrategy, NameTypeElement, NameTypeElements};
pub use safety::{SafetyError, WorkspaceGuard};
pub use span::{
    code_of, delete_span, replace_span, replace_span_padded, text_of, Span, SpliceError,
};
pub use tag::{rewrite_struct_tag, set_tag_field_value, InsertLocation, TagError, TagMatch};
