//! Import injection and removal.
//!
//! [`inject_imports`] adds every missing import path to a Go file by
//! splicing a fresh import declaration right after the package clause line.
//! It never edits an existing import block: a later `gofmt`/`goimports`
//! pass is expected to merge the blocks and tidy the blank lines.
//! [`remove_imports`] deletes import specs, re-parsing after every deletion.

use crate::go::search::{imports, package_clause_end};
use crate::go::GoSyntaxError;
use crate::pool::with_parser;
use crate::span::{delete_span, replace_span_padded, Span, SpliceError};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

const IMPORTS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::imports");

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("failed to parse Go source: {0}")]
    Parse(#[from] GoSyntaxError),

    #[error("source has no package clause")]
    MissingPackageClause,

    #[error(transparent)]
    Splice(#[from] SpliceError),
}

/// Resolves a type name to the import path of the package declaring it.
pub trait TypeLocator {
    fn package_path(&self, type_name: &str) -> Option<&str>;
}

/// Explicit type name to import path table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeTable {
    paths: BTreeMap<String, String>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_name: impl Into<String>, path: impl Into<String>) {
        self.paths.insert(type_name.into(), path.into());
    }

    pub fn with(mut self, type_name: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(type_name, path);
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl TypeLocator for TypeTable {
    fn package_path(&self, type_name: &str) -> Option<&str> {
        self.paths.get(type_name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TypeTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            paths: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Collects import paths from explicit package paths and from type names
/// resolved through a [`TypeLocator`].
#[derive(Debug, Clone, Default)]
pub struct PackageImportOptions {
    packages: Vec<String>,
    types: Vec<String>,
}

impl PackageImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, path: impl Into<String>) -> Self {
        self.packages.push(path.into());
        self
    }

    /// Import whatever package declares `type_name`.
    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.types.push(type_name.into());
        self
    }

    /// Explicit paths first, then resolved types, without duplicates.
    ///
    /// Type names the locator cannot resolve are skipped with a warning.
    pub fn package_paths(&self, locator: &dyn TypeLocator) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for path in &self.packages {
            if seen.insert(path.as_str()) {
                paths.push(path.clone());
            }
        }
        for type_name in &self.types {
            match locator.package_path(type_name) {
                Some(path) => {
                    if seen.insert(path) {
                        paths.push(path.to_string());
                    }
                }
                None => warn!(
                    target: IMPORTS_TARGET,
                    type_name = type_name.as_str(),
                    "no package path known for type, skipping"
                ),
            }
        }
        paths
    }

    pub fn inject(&self, source: &[u8], locator: &dyn TypeLocator) -> Result<Vec<u8>, ImportError> {
        inject_imports(source, self.package_paths(locator).as_slice())
    }

    pub fn create_imports(&self, locator: &dyn TypeLocator) -> String {
        create_imports(self.package_paths(locator).as_slice())
    }
}

fn quoted(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    if !path.starts_with('"') {
        out.push('"');
    }
    out.push_str(path);
    if !path.ends_with('"') {
        out.push('"');
    }
    out
}

/// A standalone parenthesised import block, one quoted path per line.
///
/// Duplicates and entries with nothing between the quotes (`""`, `"`) are
/// dropped; order is first occurrence.
pub fn create_imports<S: AsRef<str>>(paths: &[S]) -> String {
    let mut seen = HashSet::new();
    let mut block = String::from("import (\n");
    for path in paths.iter().map(|p| p.as_ref()) {
        if path.trim_matches('"').is_empty() {
            continue;
        }
        let path = quoted(path);
        if seen.insert(path.clone()) {
            block.push_str(&path);
            block.push('\n');
        }
    }
    block.push_str(")\n");
    block
}

/// Quoted form of a requested path, or `None` (with a warning) when unusable.
fn accept_path(path: &str) -> Option<String> {
    if path.is_empty() {
        warn!(target: IMPORTS_TARGET, "skipping empty import path");
        return None;
    }
    if path.contains('"') {
        warn!(
            target: IMPORTS_TARGET,
            path, "skipping import path containing a double quote"
        );
        return None;
    }
    Some(format!("\"{path}\""))
}

/// An identifier, `.` or `_`.
fn is_import_alias(alias: &str) -> bool {
    if alias == "." {
        return true;
    }
    let mut chars = alias.chars();
    chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// An empty alias means a plain import.
fn alias_of(alias: &str) -> Option<&str> {
    Some(alias).filter(|a| !a.is_empty())
}

/// Render the missing set. Input is already sorted by path.
fn render_imports(missing: &BTreeSet<(String, Option<String>)>) -> String {
    let line = |(path, alias): &(String, Option<String>)| match alias {
        Some(alias) => format!("{alias} {path}"),
        None => path.clone(),
    };
    let mut text = String::from("\n");
    if missing.len() == 1 {
        for entry in missing {
            text.push_str(&format!("import {}\n", line(entry)));
        }
    } else {
        text.push_str("import (\n");
        for entry in missing {
            text.push_str(&format!("    {}\n", line(entry)));
        }
        text.push_str(")\n");
    }
    text.push('\n');
    text
}

/// Add every path in `paths` not already imported by `source`.
///
/// Returns the input unchanged when nothing is missing. Missing imports are
/// sorted so the output does not depend on the order of `paths`. Empty paths
/// and paths containing `"` are skipped with a warning. An aliased import of
/// a path counts as present.
///
/// The insertion point is the first newline after the package name. A
/// block comment spanning lines right after the package clause therefore
/// receives the import inside the comment.
pub fn inject_imports<S: AsRef<str>>(source: &[u8], paths: &[S]) -> Result<Vec<u8>, ImportError> {
    inject(source, paths.iter().map(|p| (None, p.as_ref())))
}

/// [`inject_imports`] with an alias per path: `("db", "database/sql")` renders
/// as `db "database/sql"`.
///
/// An entry is present only when an import with the same alias and path
/// exists. Aliases that are not identifiers, `.` or `_` are skipped with a
/// warning; an empty alias is a plain import.
pub fn inject_named_imports<A: AsRef<str>, P: AsRef<str>>(
    source: &[u8],
    imports: &[(A, P)],
) -> Result<Vec<u8>, ImportError> {
    inject(
        source,
        imports
            .iter()
            .map(|(alias, path)| (alias_of(alias.as_ref()), path.as_ref())),
    )
}

fn inject<'r>(
    source: &[u8],
    requests: impl Iterator<Item = (Option<&'r str>, &'r str)>,
) -> Result<Vec<u8>, ImportError> {
    let (clause_end, existing) = with_parser(|parser| -> Result<_, ImportError> {
        let parsed = parser.parse_checked(source)?;
        let clause_end = package_clause_end(&parsed).ok_or(ImportError::MissingPackageClause)?;
        let existing: Vec<(Option<String>, String)> = imports(&parsed)
            .into_iter()
            .map(|spec| (spec.alias.map(str::to_string), spec.path))
            .collect();
        Ok((clause_end, existing))
    })??;

    let mut missing = BTreeSet::new();
    for (alias, path) in requests {
        let Some(quoted) = accept_path(path) else {
            continue;
        };
        if let Some(alias) = alias.filter(|a| !is_import_alias(a)) {
            warn!(
                target: IMPORTS_TARGET,
                alias, path, "skipping import with an invalid alias"
            );
            continue;
        }
        let present = existing
            .iter()
            .any(|(a, p)| *p == quoted && (alias.is_none() || a.as_deref() == alias));
        if !present {
            missing.insert((quoted, alias.map(str::to_string)));
        }
    }

    if missing.is_empty() {
        return Ok(source.to_vec());
    }

    let anchor = source[clause_end..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(source.len(), |offset| clause_end + offset);
    debug!(
        target: IMPORTS_TARGET,
        anchor,
        missing = missing.len(),
        "injecting imports"
    );

    let text = render_imports(&missing);
    Ok(replace_span_padded(source, Span::empty(anchor), text.as_bytes(), 2)?)
}

/// Remove the unaliased imports of every path in `paths`.
///
/// Aliased imports of the same path stay; see [`remove_named_imports`].
/// Removing the last spec of a declaration removes the whole `import`
/// declaration, parentheses included. Empty paths and paths containing `"`
/// are skipped with a warning.
pub fn remove_imports<S: AsRef<str>>(source: &[u8], paths: &[S]) -> Result<Vec<u8>, ImportError> {
    remove(source, paths.iter().map(|p| (None, p.as_ref())))
}

/// Remove imports matching both alias and path; an empty alias matches plain
/// imports.
pub fn remove_named_imports<A: AsRef<str>, P: AsRef<str>>(
    source: &[u8],
    imports: &[(A, P)],
) -> Result<Vec<u8>, ImportError> {
    remove(
        source,
        imports
            .iter()
            .map(|(alias, path)| (alias_of(alias.as_ref()), path.as_ref())),
    )
}

fn remove<'r>(
    source: &[u8],
    requests: impl Iterator<Item = (Option<&'r str>, &'r str)>,
) -> Result<Vec<u8>, ImportError> {
    let targets: Vec<(Option<&str>, String)> = requests
        .filter_map(|(alias, path)| accept_path(path).map(|quoted| (alias, quoted)))
        .collect();

    // One spec per pass; spans from the previous parse are stale after a splice.
    let mut out = source.to_vec();
    loop {
        let found = with_parser(|parser| -> Result<_, ImportError> {
            let parsed = parser.parse_checked(&out)?;
            let specs = imports(&parsed);
            let Some(spec) = specs.iter().find(|spec| {
                targets
                    .iter()
                    .any(|(alias, path)| spec.path == *path && spec.alias == *alias)
            }) else {
                return Ok(None);
            };
            let siblings = specs
                .iter()
                .filter(|other| other.declaration == spec.declaration)
                .count();
            Ok(Some(if siblings == 1 {
                spec.declaration
            } else {
                spec.span
            }))
        })??;

        let Some(span) = found else {
            return Ok(out);
        };
        let span = removal_span(&out, span);
        debug!(
            target: IMPORTS_TARGET,
            start = span.start,
            end = span.end,
            "removing import"
        );
        out = delete_span(&out, span)?;
    }
}

/// Widen `span` to its whole line when only blanks and a trailing line
/// comment share the line; otherwise take a following `;` along.
fn removal_span(source: &[u8], span: Span) -> Span {
    let is_blank = |b: &u8| matches!(b, b' ' | b'\t');
    let skip_blanks = |at: usize| at + source[at..].iter().take_while(|b| is_blank(*b)).count();

    let line_start = source[..span.start]
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    let alone = source[line_start..span.start].iter().all(is_blank);

    let mut end = skip_blanks(span.end);
    if source[end..].starts_with(b"//") {
        end += source[end..]
            .iter()
            .position(|b| *b == b'\n')
            .unwrap_or(source.len() - end);
    }

    match source.get(end).copied() {
        None if alone => Span::new(line_start, end),
        Some(b'\n') if alone => Span::new(line_start, end + 1),
        Some(b';') => Span::new(span.start, skip_blanks(end + 1)),
        _ => Span::new(span.start, end),
    }
}
