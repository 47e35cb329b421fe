//! Read-only lookups over a parsed Go file.
//!
//! Every function here walks the top-level declaration list of a
//! [`ParsedSource`] and hands back thin wrappers around tree-sitter nodes.
//! "Not found" is always `None` or an empty collection.

use crate::go::parser::ParsedSource;
use crate::span::Span;
use std::collections::BTreeMap;
use tree_sitter::Node;

fn text<'t>(node: Node<'_>, source: &'t [u8]) -> &'t str {
    source
        .get(node.byte_range())
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or_default()
}

fn top_level<'t>(parsed: &'t ParsedSource<'_>) -> Vec<Node<'t>> {
    let root = parsed.tree.root_node();
    let mut cursor = root.walk();
    root.named_children(&mut cursor).collect()
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Name declared by the package clause.
pub fn package_name<'t>(parsed: &'t ParsedSource<'_>) -> Option<&'t str> {
    package_identifier(parsed).map(|node| text(node, parsed.source))
}

/// Byte offset just past the package name.
pub fn package_clause_end(parsed: &ParsedSource<'_>) -> Option<usize> {
    package_identifier(parsed).map(|node| node.end_byte())
}

fn package_identifier<'t>(parsed: &'t ParsedSource<'_>) -> Option<Node<'t>> {
    let clause = top_level(parsed)
        .into_iter()
        .find(|node| node.kind() == "package_clause")?;
    let mut cursor = clause.walk();
    let ident = clause
        .named_children(&mut cursor)
        .find(|child| child.kind() == "package_identifier");
    ident
}

/// One import spec, either standalone or inside a parenthesised block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec<'t> {
    /// Alias, `.` or `_` when present
    pub alias: Option<&'t str>,
    /// Path literal in double-quoted form, e.g. `"fmt"`
    pub path: String,
    /// Span of the whole spec
    pub span: Span,
    /// Span of the enclosing `import` declaration
    pub declaration: Span,
}

impl ImportSpec<'_> {
    /// The path without its quotes.
    pub fn unquoted(&self) -> &str {
        self.path.trim_matches('"')
    }
}

/// Normalize an import path literal to its double-quoted form.
///
/// Raw-string literals (`` `fmt` ``) become `"fmt"` so both spellings compare
/// equal.
pub fn quoted_import_path(literal: &str) -> String {
    match literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        Some(inner) => format!("\"{inner}\""),
        None => literal.to_string(),
    }
}

/// All imports declared in the file, in source order.
pub fn imports<'t>(parsed: &'t ParsedSource<'_>) -> Vec<ImportSpec<'t>> {
    let mut specs = Vec::new();
    for decl in top_level(parsed) {
        if decl.kind() != "import_declaration" {
            continue;
        }
        let mut cursor = decl.walk();
        for child in decl.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => specs.extend(import_spec(child, decl, parsed.source)),
                "import_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "import_spec" {
                            specs.extend(import_spec(spec, decl, parsed.source));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    specs
}

fn import_spec<'t>(node: Node<'_>, decl: Node<'_>, source: &'t [u8]) -> Option<ImportSpec<'t>> {
    let path = node.child_by_field_name("path")?;
    Some(ImportSpec {
        alias: node.child_by_field_name("name").map(|n| text(n, source)),
        path: quoted_import_path(text(path, source)),
        span: Span::of(node),
        declaration: Span::of(decl),
    })
}

/// Receiver of a method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver<'t> {
    /// Receiver variable name, absent for `func (T) M()`
    pub name: Option<&'t str>,
    /// Receiver type name with pointer and type arguments stripped
    pub type_name: &'t str,
    pub pointer: bool,
}

/// A `function_declaration` or `method_declaration`.
#[derive(Debug, Clone, Copy)]
pub struct FuncDecl<'t> {
    node: Node<'t>,
    source: &'t [u8],
}

impl<'t> FuncDecl<'t> {
    pub fn node(&self) -> Node<'t> {
        self.node
    }

    pub fn span(&self) -> Span {
        Span::of(self.node)
    }

    pub fn text(&self) -> &'t str {
        text(self.node, self.source)
    }

    pub fn name(&self) -> &'t str {
        self.node
            .child_by_field_name("name")
            .map(|n| text(n, self.source))
            .unwrap_or_default()
    }

    pub fn is_method(&self) -> bool {
        self.node.kind() == "method_declaration"
    }

    pub fn is_exported(&self) -> bool {
        is_exported(self.name())
    }

    pub fn receiver(&self) -> Option<Receiver<'t>> {
        let list = self.node.child_by_field_name("receiver")?;
        let mut cursor = list.walk();
        let param = list
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration")?;
        let mut ty = param.child_by_field_name("type")?;
        let pointer = ty.kind() == "pointer_type";
        if pointer {
            ty = ty.named_child(0)?;
        }
        if ty.kind() == "generic_type" {
            ty = ty.child_by_field_name("type")?;
        }
        Some(Receiver {
            name: param.child_by_field_name("name").map(|n| text(n, self.source)),
            type_name: text(ty, self.source),
            pointer,
        })
    }

    /// The `[T any, ...]` list, for generic functions.
    pub fn type_parameters(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("type_parameters")
    }

    pub fn parameters(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("parameters")
    }

    /// The result: a `parameter_list` or a single bare type.
    pub fn result(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("result")
    }

    pub fn body(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("body")
    }

    /// Declaration text up to the opening brace of the body.
    pub fn signature(&self) -> &'t str {
        let end = self
            .body()
            .map(|b| b.start_byte())
            .unwrap_or_else(|| self.node.end_byte());
        self.source
            .get(self.node.start_byte()..end)
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or_default()
            .trim_end()
    }

    /// Text of the comment block directly above the declaration, with the
    /// comment markers removed.
    pub fn doc(&self) -> Option<String> {
        doc_comment(self.node, self.source)
    }
}

fn doc_comment(node: Node<'_>, source: &[u8]) -> Option<String> {
    let mut lines = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut current = node.prev_sibling();
    while let Some(comment) = current {
        if comment.kind() != "comment" || comment.end_position().row + 1 != expected_row {
            break;
        }
        lines.push(text(comment, source));
        expected_row = comment.start_position().row;
        current = comment.prev_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    let body: Vec<&str> = lines
        .into_iter()
        .map(|line| {
            line.strip_prefix("//")
                .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
                .or_else(|| {
                    line.strip_prefix("/*")
                        .and_then(|rest| rest.strip_suffix("*/"))
                        .map(str::trim)
                })
                .unwrap_or(line)
        })
        .collect();
    Some(body.join("\n"))
}

/// Top-level functions, excluding methods.
pub fn functions<'t>(parsed: &'t ParsedSource<'_>) -> Vec<FuncDecl<'t>> {
    declarations_of(parsed, "function_declaration")
}

/// All methods, in source order.
pub fn methods<'t>(parsed: &'t ParsedSource<'_>) -> Vec<FuncDecl<'t>> {
    declarations_of(parsed, "method_declaration")
}

fn declarations_of<'t>(parsed: &'t ParsedSource<'_>, kind: &str) -> Vec<FuncDecl<'t>> {
    top_level(parsed)
        .into_iter()
        .filter(|node| node.kind() == kind)
        .map(|node| FuncDecl {
            node,
            source: parsed.source,
        })
        .collect()
}

pub fn function_by_name<'t>(parsed: &'t ParsedSource<'_>, name: &str) -> Option<FuncDecl<'t>> {
    functions(parsed).into_iter().find(|f| f.name() == name)
}

pub fn main_function<'t>(parsed: &'t ParsedSource<'_>) -> Option<FuncDecl<'t>> {
    function_by_name(parsed, "main")
}

/// Methods whose receiver type is `receiver`, value or pointer.
pub fn methods_by_receiver<'t>(
    parsed: &'t ParsedSource<'_>,
    receiver: &str,
    only_exported: bool,
) -> Vec<FuncDecl<'t>> {
    methods(parsed)
        .into_iter()
        .filter(|m| m.receiver().is_some_and(|r| r.type_name == receiver))
        .filter(|m| !only_exported || m.is_exported())
        .collect()
}

pub fn method_by_receiver_and_name<'t>(
    parsed: &'t ParsedSource<'_>,
    receiver: &str,
    name: &str,
) -> Option<FuncDecl<'t>> {
    methods_by_receiver(parsed, receiver, false)
        .into_iter()
        .find(|m| m.name() == name)
}

/// A `type_spec` or `type_alias` together with its enclosing declaration.
#[derive(Debug, Clone, Copy)]
pub struct TypeDecl<'t> {
    spec: Node<'t>,
    declaration: Node<'t>,
    source: &'t [u8],
}

impl<'t> TypeDecl<'t> {
    pub fn name(&self) -> &'t str {
        self.spec
            .child_by_field_name("name")
            .map(|n| text(n, self.source))
            .unwrap_or_default()
    }

    pub fn spec(&self) -> Node<'t> {
        self.spec
    }

    /// The whole `type ...` declaration, which may hold several specs.
    pub fn declaration(&self) -> Node<'t> {
        self.declaration
    }

    pub fn is_alias(&self) -> bool {
        self.spec.kind() == "type_alias"
    }

    /// The underlying type expression.
    pub fn type_node(&self) -> Option<Node<'t>> {
        self.spec.child_by_field_name("type")
    }

    pub fn type_parameters(&self) -> Option<Node<'t>> {
        self.spec.child_by_field_name("type_parameters")
    }

    pub fn is_struct(&self) -> bool {
        self.type_kind() == Some("struct_type")
    }

    pub fn is_interface(&self) -> bool {
        self.type_kind() == Some("interface_type")
    }

    fn type_kind(&self) -> Option<&'static str> {
        self.type_node().map(|n| n.kind())
    }

    pub fn span(&self) -> Span {
        Span::of(self.spec)
    }

    pub fn text(&self) -> &'t str {
        text(self.spec, self.source)
    }

    /// Fields of a struct type; empty for anything else.
    pub fn fields(&self) -> Vec<StructField<'t>> {
        let Some(body) = self
            .type_node()
            .filter(|n| n.kind() == "struct_type")
            .and_then(|n| {
                let mut cursor = n.walk();
                let list = n
                    .named_children(&mut cursor)
                    .find(|c| c.kind() == "field_declaration_list");
                list
            })
        else {
            return Vec::new();
        };
        let mut cursor = body.walk();
        let fields = body
            .named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .map(|node| StructField {
                node,
                source: self.source,
            })
            .collect();
        fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<StructField<'t>> {
        self.fields()
            .into_iter()
            .find(|f| f.names().contains(&name) || (f.is_embedded() && f.type_text() == name))
    }
}

/// All type specs and aliases, in source order.
pub fn types<'t>(parsed: &'t ParsedSource<'_>) -> Vec<TypeDecl<'t>> {
    let mut out = Vec::new();
    for declaration in top_level(parsed) {
        if declaration.kind() != "type_declaration" {
            continue;
        }
        let mut cursor = declaration.walk();
        for spec in declaration.named_children(&mut cursor) {
            if matches!(spec.kind(), "type_spec" | "type_alias") {
                out.push(TypeDecl {
                    spec,
                    declaration,
                    source: parsed.source,
                });
            }
        }
    }
    out
}

pub fn type_by_name<'t>(parsed: &'t ParsedSource<'_>, name: &str) -> Option<TypeDecl<'t>> {
    types(parsed).into_iter().find(|t| t.name() == name)
}

pub fn struct_type_by_name<'t>(parsed: &'t ParsedSource<'_>, name: &str) -> Option<TypeDecl<'t>> {
    type_by_name(parsed, name).filter(TypeDecl::is_struct)
}

/// Struct types keyed by name.
pub fn struct_types<'t>(parsed: &'t ParsedSource<'_>) -> BTreeMap<&'t str, TypeDecl<'t>> {
    types(parsed)
        .into_iter()
        .filter(TypeDecl::is_struct)
        .map(|t| (t.name(), t))
        .collect()
}

/// Whole `type` declarations for each struct, keyed by struct name.
pub fn struct_declarations<'t>(parsed: &'t ParsedSource<'_>) -> BTreeMap<&'t str, Node<'t>> {
    struct_types(parsed)
        .into_iter()
        .map(|(name, t)| (name, t.declaration()))
        .collect()
}

pub fn interface_types<'t>(parsed: &'t ParsedSource<'_>) -> Vec<TypeDecl<'t>> {
    types(parsed)
        .into_iter()
        .filter(TypeDecl::is_interface)
        .collect()
}

/// A named array or slice type.
pub fn array_type_by_name<'t>(parsed: &'t ParsedSource<'_>, name: &str) -> Option<TypeDecl<'t>> {
    type_by_name(parsed, name).filter(|t| {
        matches!(
            t.type_kind(),
            Some("array_type" | "slice_type" | "implicit_length_array_type")
        )
    })
}

/// A `var_spec` or `const_spec` together with its enclosing declaration.
#[derive(Debug, Clone, Copy)]
pub struct ValueDecl<'t> {
    spec: Node<'t>,
    declaration: Node<'t>,
    source: &'t [u8],
}

impl<'t> ValueDecl<'t> {
    /// Every name bound by the spec, e.g. `a, b` in `var a, b int`.
    pub fn names(&self) -> Vec<&'t str> {
        let mut cursor = self.spec.walk();
        let names = self
            .spec
            .children_by_field_name("name", &mut cursor)
            .map(|n| text(n, self.source))
            .collect();
        names
    }

    pub fn is_const(&self) -> bool {
        self.spec.kind() == "const_spec"
    }

    /// Declared type, absent when inferred from the value.
    pub fn type_text(&self) -> Option<&'t str> {
        self.spec
            .child_by_field_name("type")
            .map(|n| text(n, self.source))
    }

    /// Initializer expressions, absent for `var x T` and implicit `iota` repeats.
    pub fn value_text(&self) -> Option<&'t str> {
        self.spec
            .child_by_field_name("value")
            .map(|n| text(n, self.source))
    }

    pub fn spec(&self) -> Node<'t> {
        self.spec
    }

    pub fn declaration(&self) -> Node<'t> {
        self.declaration
    }

    pub fn span(&self) -> Span {
        Span::of(self.spec)
    }

    pub fn text(&self) -> &'t str {
        text(self.spec, self.source)
    }
}

/// Top-level `var` and `const` specs, in source order.
pub fn values<'t>(parsed: &'t ParsedSource<'_>) -> Vec<ValueDecl<'t>> {
    let mut out = Vec::new();
    for declaration in top_level(parsed) {
        if !matches!(declaration.kind(), "var_declaration" | "const_declaration") {
            continue;
        }
        let mut cursor = declaration.walk();
        for child in declaration.named_children(&mut cursor) {
            match child.kind() {
                "var_spec" | "const_spec" => out.push(ValueDecl {
                    spec: child,
                    declaration,
                    source: parsed.source,
                }),
                "var_spec_list" => {
                    let mut inner = child.walk();
                    for spec in child.named_children(&mut inner) {
                        if spec.kind() == "var_spec" {
                            out.push(ValueDecl {
                                spec,
                                declaration,
                                source: parsed.source,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }
    out
}

/// The `var` or `const` spec binding `name`.
pub fn value_by_name<'t>(parsed: &'t ParsedSource<'_>, name: &str) -> Option<ValueDecl<'t>> {
    values(parsed)
        .into_iter()
        .find(|v| v.names().contains(&name))
}

/// One `field_declaration` inside a struct body.
#[derive(Debug, Clone, Copy)]
pub struct StructField<'t> {
    node: Node<'t>,
    source: &'t [u8],
}

impl<'t> StructField<'t> {
    /// Declared names; empty for an embedded field.
    pub fn names(&self) -> Vec<&'t str> {
        let mut cursor = self.node.walk();
        let names = self
            .node
            .children_by_field_name("name", &mut cursor)
            .map(|n| text(n, self.source))
            .collect();
        names
    }

    pub fn is_embedded(&self) -> bool {
        self.node.child_by_field_name("name").is_none()
    }

    pub fn type_text(&self) -> &'t str {
        self.node
            .child_by_field_name("type")
            .map(|n| text(n, self.source))
            .unwrap_or_default()
            .trim_start_matches('*')
    }

    /// Tag literal including its delimiters.
    pub fn tag(&self) -> Option<&'t str> {
        self.tag_node().map(|n| text(n, self.source))
    }

    /// Span of the tag literal including delimiters.
    pub fn tag_span(&self) -> Option<Span> {
        self.tag_node().map(Span::of)
    }

    /// Span of the tag content between the delimiters.
    pub fn tag_content_span(&self) -> Option<Span> {
        self.tag_span()
            .filter(|span| span.len() >= 2)
            .map(|span| Span::new(span.start + 1, span.end - 1))
    }

    fn tag_node(&self) -> Option<Node<'t>> {
        self.node.child_by_field_name("tag")
    }

    pub fn span(&self) -> Span {
        Span::of(self.node)
    }
}

pub fn struct_field_by_name<'t>(
    parsed: &'t ParsedSource<'_>,
    struct_name: &str,
    field_name: &str,
) -> Option<StructField<'t>> {
    struct_type_by_name(parsed, struct_name)?.field_by_name(field_name)
}

/// Candidates resembling `target`, best first.
pub fn suggest_similar<'c>(
    target: &str,
    candidates: impl IntoIterator<Item = &'c str>,
) -> Vec<String> {
    let mut scored: Vec<(f64, &str)> = candidates
        .into_iter()
        .map(|c| (strsim::jaro_winkler(target, c), c))
        .filter(|(score, _)| *score >= 0.8)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored.dedup_by(|a, b| a.1 == b.1);
    scored
        .into_iter()
        .take(3)
        .map(|(_, c)| c.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::parser::GoParser;

    const SOURCE: &[u8] = br#"package store

import (
	"context"
	db `database/sql`
)

import "fmt"

// Item is a stored row.
// It has a tag.
type Item struct {
	ID, Rev int    `gorm:"column:id"`
	Name    string `json:"name"`
	*Base
}

type (
	Reader interface{ Read() error }
	Items  []Item
	Alias  = Item
)

type Pair[K comparable, V any] struct {
	Key K
	Val V
}

// Open opens the store.
func Open(ctx context.Context) (*Store, error) { return nil, nil }

func helper() {}

func (s *Store) Get(id int) (Item, error) { return Item{}, nil }
func (s Store) put(it Item)                 {}
func (Store) Close() error                  { return nil }
func (p *Pair[K, V]) Swap()                 {}

const Version = "1"

const (
	A, B = 1, 2
	C    int = 3
)

var (
	ErrClosed = errors.New("closed")
	cache     map[string]Item
)
"#;

    fn parsed() -> ParsedSource<'static> {
        GoParser::new().unwrap().parse_with_source(SOURCE).unwrap()
    }

    #[test]
    fn package_and_imports() {
        let parsed = parsed();
        assert_eq!(package_name(&parsed), Some("store"));
        assert_eq!(package_clause_end(&parsed), Some("package store".len()));

        let specs = imports(&parsed);
        let paths: Vec<_> = specs.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["\"context\"", "\"database/sql\"", "\"fmt\""]);
        assert_eq!(specs[1].alias, Some("db"));
        assert_eq!(specs[1].unquoted(), "database/sql");
        assert_eq!(specs[0].declaration, specs[1].declaration);
        assert_eq!(parsed.span_text(specs[2].declaration), "import \"fmt\"");
    }

    #[test]
    fn functions_and_methods() {
        let parsed = parsed();
        let names: Vec<_> = functions(&parsed).iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Open", "helper"]);
        assert!(main_function(&parsed).is_none());

        let open = function_by_name(&parsed, "Open").unwrap();
        assert_eq!(
            open.signature(),
            "func Open(ctx context.Context) (*Store, error)"
        );
        assert_eq!(open.doc().as_deref(), Some("Open opens the store."));
        assert!(helper_has_no_doc(&parsed));

        let store_methods: Vec<_> = methods_by_receiver(&parsed, "Store", false)
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(store_methods, vec!["Get", "put", "Close"]);

        let exported: Vec<_> = methods_by_receiver(&parsed, "Store", true)
            .iter()
            .map(|m| m.name())
            .collect();
        assert_eq!(exported, vec!["Get", "Close"]);
    }

    fn helper_has_no_doc(parsed: &ParsedSource<'_>) -> bool {
        function_by_name(parsed, "helper").unwrap().doc().is_none()
    }

    #[test]
    fn receivers() {
        let parsed = parsed();
        let get = method_by_receiver_and_name(&parsed, "Store", "Get").unwrap();
        let recv = get.receiver().unwrap();
        assert_eq!(recv.name, Some("s"));
        assert_eq!(recv.type_name, "Store");
        assert!(recv.pointer);

        let close = method_by_receiver_and_name(&parsed, "Store", "Close").unwrap();
        assert_eq!(close.receiver().unwrap().name, None);

        let swap = method_by_receiver_and_name(&parsed, "Pair", "Swap").unwrap();
        assert_eq!(swap.receiver().unwrap().type_name, "Pair");
    }

    #[test]
    fn type_lookups() {
        let parsed = parsed();
        let names: Vec<_> = types(&parsed).iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Item", "Reader", "Items", "Alias", "Pair"]);

        let structs: Vec<_> = struct_types(&parsed).keys().copied().collect();
        assert_eq!(structs, vec!["Item", "Pair"]);

        assert!(struct_type_by_name(&parsed, "Reader").is_none());
        assert_eq!(interface_types(&parsed).len(), 1);
        assert!(array_type_by_name(&parsed, "Items").is_some());
        assert!(type_by_name(&parsed, "Alias").unwrap().is_alias());
        assert!(type_by_name(&parsed, "Pair")
            .unwrap()
            .type_parameters()
            .is_some());

        let decls = struct_declarations(&parsed);
        assert!(parsed.node_text(decls["Item"]).starts_with("type Item struct"));
    }

    #[test]
    fn value_lookups() {
        let parsed = parsed();
        let names: Vec<_> = values(&parsed).iter().map(|v| v.names()).collect();
        assert_eq!(
            names,
            vec![
                vec!["Version"],
                vec!["A", "B"],
                vec!["C"],
                vec!["ErrClosed"],
                vec!["cache"]
            ]
        );

        let version = value_by_name(&parsed, "Version").unwrap();
        assert!(version.is_const());
        assert_eq!(version.value_text(), Some("\"1\""));
        assert_eq!(version.type_text(), None);

        let b = value_by_name(&parsed, "B").unwrap();
        assert_eq!(b.value_text(), Some("1, 2"));
        assert_eq!(value_by_name(&parsed, "C").unwrap().type_text(), Some("int"));

        let cache = value_by_name(&parsed, "cache").unwrap();
        assert!(!cache.is_const());
        assert_eq!(cache.type_text(), Some("map[string]Item"));
        assert_eq!(cache.value_text(), None);
        assert!(parsed.node_text(cache.declaration()).starts_with("var ("));

        assert!(value_by_name(&parsed, "Missing").is_none());
    }

    #[test]
    fn struct_fields_and_tags() {
        let parsed = parsed();
        let item = struct_type_by_name(&parsed, "Item").unwrap();
        let fields = item.fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].names(), vec!["ID", "Rev"]);
        assert!(fields[2].is_embedded());
        assert_eq!(fields[2].type_text(), "Base");

        let rev = struct_field_by_name(&parsed, "Item", "Rev").unwrap();
        assert_eq!(rev.tag(), Some("`gorm:\"column:id\"`"));
        let content = rev.tag_content_span().unwrap();
        assert_eq!(parsed.span_text(content), "gorm:\"column:id\"");

        assert!(struct_field_by_name(&parsed, "Item", "Base").is_some());
        assert!(struct_field_by_name(&parsed, "Item", "Missing").is_none());
    }

    #[test]
    fn raw_import_paths_are_quoted() {
        assert_eq!(quoted_import_path("`fmt`"), "\"fmt\"");
        assert_eq!(quoted_import_path("\"fmt\""), "\"fmt\"");
    }

    #[test]
    fn suggestions_rank_closest_first() {
        let suggestions = suggest_similar("Opne", ["Open", "Close", "helper", "Opener"]);
        assert_eq!(suggestions.first().map(String::as_str), Some("Open"));
        assert!(!suggestions.contains(&"helper".to_string()));
    }
}
