//! Normalization of parameter and result lists for code generation.
//!
//! A field list like `(a, b int, _ string, opts ...Option)` is expanded into
//! one [`NameTypeElement`] per bound name. Unnamed entries get a generated
//! name from a [`NameStrategy`]. Kinds can optionally be qualified with the
//! declaring package name so generated code can call into it from outside.

pub mod element;
pub mod generics;
pub mod naming;
pub mod signature;
pub mod statements;

pub use element::{
    field_entries, prefixed_elements, simple_arguments, simple_results, FieldEntry,
    NameTypeElement, NameTypeElements, Qualifier,
};
pub use generics::GenericParams;
pub use naming::{NameStrategy, PrefixNames, SimpleNames};
pub use signature::FunctionSignature;
pub use statements::{StatementLines, StatementParts};
