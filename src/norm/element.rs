use crate::norm::generics::GenericParams;
use crate::norm::naming::{NameStrategy, PrefixNames, SimpleNames};
use crate::norm::statements::{StatementLines, StatementParts};
use crate::span::Span;
use serde::Serialize;
use tree_sitter::Node;

/// One bound name of a parameter or result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameTypeElement {
    pub name: String,
    /// Type as written, e.g. `*pkg.Type` or `...string`
    pub kind: String,
    pub variadic: bool,
    /// Span of the type expression in the source it was read from
    #[serde(skip)]
    pub type_span: Span,
}

/// Rewrites bare exported type names as `package.Name` for code that calls
/// into the declaring package from outside.
#[derive(Debug, Clone)]
pub struct Qualifier {
    pub package: String,
    pub generics: GenericParams,
}

impl Qualifier {
    pub fn new(package: impl Into<String>, generics: GenericParams) -> Self {
        Self {
            package: package.into(),
            generics,
        }
    }

    /// Qualify `kind` if it names an exported type of this package.
    ///
    /// `A` becomes `pkg.A`, `*A` becomes `*pkg.A` and `...A` becomes
    /// `...pkg.A`. Kinds that are already qualified, start with a lowercase
    /// letter or name one of the generic parameters are returned unchanged.
    pub fn qualify(&self, kind: &str, variadic: bool) -> String {
        let trimmed = kind.trim();
        let (ellipsis, short) = match trimmed.strip_prefix("...") {
            Some(rest) if variadic => ("...", rest.trim_start()),
            _ => ("", trimmed),
        };
        if short.contains('.') {
            return kind.to_string();
        }
        let (star, class) = match short.strip_prefix('*') {
            Some(rest) => ("*", rest),
            None => ("", short),
        };
        if !class.starts_with(|c: char| c.is_ascii_uppercase()) || self.generics.contains(class) {
            return kind.to_string();
        }
        format!("{ellipsis}{star}{}.{class}", self.package)
    }
}

/// One syntactic entry of a field list; `a, b int` is a single entry with
/// two names.
#[derive(Debug, Clone)]
pub struct FieldEntry<'t> {
    pub names: Vec<&'t str>,
    pub kind: String,
    pub variadic: bool,
    pub type_span: Span,
}

fn slice_text(source: &[u8], start: usize, end: usize) -> String {
    source
        .get(start..end)
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .unwrap_or_default()
}

fn node_str<'t>(node: Node<'_>, source: &'t [u8]) -> &'t str {
    source
        .get(node.byte_range())
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .unwrap_or_default()
}

/// Split a `parameter_list`, or a bare result type, into entries.
pub fn field_entries<'t>(list: Node<'_>, source: &'t [u8]) -> Vec<FieldEntry<'t>> {
    if list.kind() != "parameter_list" {
        // A single unnamed result like `error` or `*Store`.
        return vec![FieldEntry {
            names: Vec::new(),
            kind: slice_text(source, list.start_byte(), list.end_byte()),
            variadic: false,
            type_span: Span::of(list),
        }];
    }

    let mut entries = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        let Some(ty) = decl.child_by_field_name("type") else {
            continue;
        };
        let mut names_cursor = decl.walk();
        let names = decl
            .children_by_field_name("name", &mut names_cursor)
            .map(|n| node_str(n, source))
            .collect();
        match decl.kind() {
            "parameter_declaration" => entries.push(FieldEntry {
                names,
                kind: slice_text(source, ty.start_byte(), ty.end_byte()),
                variadic: false,
                type_span: Span::of(ty),
            }),
            "variadic_parameter_declaration" => {
                let mut tokens = decl.walk();
                let start = decl
                    .children(&mut tokens)
                    .find(|c| c.kind() == "...")
                    .map(|c| c.start_byte())
                    .unwrap_or_else(|| ty.start_byte());
                entries.push(FieldEntry {
                    names,
                    kind: slice_text(source, start, ty.end_byte()),
                    variadic: true,
                    type_span: Span::new(start, ty.end_byte()),
                });
            }
            _ => {}
        }
    }
    entries
}

/// Ordered elements of a parameter or result list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NameTypeElements(Vec<NameTypeElement>);

impl NameTypeElements {
    /// Normalize a field list.
    ///
    /// Every bound name produces one element and every unnamed entry one
    /// synthetic element named by `strategy`. `list` is `None` when the
    /// function has no results; the outcome is then empty.
    pub fn extract(
        list: Option<Node<'_>>,
        source: &[u8],
        strategy: &dyn NameStrategy,
        qualifier: Option<&Qualifier>,
    ) -> Self {
        let Some(list) = list else {
            return Self::default();
        };
        let mut elements: Vec<NameTypeElement> = Vec::new();
        let mut anonymous = 0;
        for entry in field_entries(list, source) {
            let kind = match qualifier {
                Some(q) => q.qualify(&entry.kind, entry.variadic),
                None => entry.kind.clone(),
            };
            if entry.names.is_empty() {
                let name = strategy.make_name(None, &entry.kind, elements.len(), anonymous);
                elements.push(NameTypeElement {
                    name,
                    kind,
                    variadic: entry.variadic,
                    type_span: entry.type_span,
                });
                anonymous += 1;
                continue;
            }
            for ident in &entry.names {
                let name = strategy.make_name(Some(ident), &entry.kind, elements.len(), 0);
                elements.push(NameTypeElement {
                    name,
                    kind: kind.clone(),
                    variadic: entry.variadic,
                    type_span: entry.type_span,
                });
            }
        }
        Self(elements)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NameTypeElement> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> StatementParts {
        self.iter().map(|e| e.name.clone()).collect::<Vec<_>>().into()
    }

    pub fn kinds(&self) -> Vec<String> {
        self.iter().map(|e| e.kind.clone()).collect()
    }

    /// `&a, &b`
    pub fn addressable_names(&self) -> StatementParts {
        self.names().with_prefix("&")
    }

    /// Names as call arguments, spreading the variadic one: `a, rest...`
    pub fn call_arguments(&self) -> StatementParts {
        self.iter()
            .map(|e| {
                if e.variadic {
                    format!("{}...", e.name)
                } else {
                    e.name.clone()
                }
            })
            .collect::<Vec<_>>()
            .into()
    }

    /// `a int, b string`
    pub fn names_with_kinds(&self) -> StatementParts {
        self.iter()
            .map(|e| format!("{} {}", e.name, e.kind))
            .collect::<Vec<_>>()
            .into()
    }

    /// One `var name kind` line per element.
    pub fn var_definitions(&self) -> StatementLines {
        StatementLines(self.names_with_kinds().with_prefix("var ").0)
    }

    /// Names grouped by identical kind, kinds in order of first occurrence.
    pub fn group_by_kind(&self) -> Vec<(String, Vec<String>)> {
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for element in self.iter() {
            match groups.iter_mut().find(|(kind, _)| *kind == element.kind) {
                Some((_, names)) => names.push(element.name.clone()),
                None => groups.push((element.kind.clone(), vec![element.name.clone()])),
            }
        }
        groups
    }

    /// `var a, b int` lines, one per distinct kind.
    pub fn grouped_var_definitions(&self) -> StatementLines {
        self.group_by_kind()
            .into_iter()
            .map(|(kind, names)| format!("var {} {kind}", names.join(", ")))
            .collect::<Vec<_>>()
            .into()
    }
}

impl<'a> IntoIterator for &'a NameTypeElements {
    type Item = &'a NameTypeElement;
    type IntoIter = std::slice::Iter<'a, NameTypeElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for NameTypeElements {
    type Output = NameTypeElement;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Parameters with declared names kept and unnamed ones called `arg`, `arg1`, ...
pub fn simple_arguments(list: Option<Node<'_>>, source: &[u8]) -> NameTypeElements {
    NameTypeElements::extract(list, source, &SimpleNames::new("arg"), None)
}

/// Results with declared names kept and unnamed ones called `res`, `res1`, ...
pub fn simple_results(list: Option<Node<'_>>, source: &[u8]) -> NameTypeElements {
    NameTypeElements::extract(list, source, &SimpleNames::new("res"), None)
}

/// Elements named `prefix + index (+ name)`.
pub fn prefixed_elements(
    list: Option<Node<'_>>,
    prefix: &str,
    source: &[u8],
    qualifier: Option<&Qualifier>,
) -> NameTypeElements {
    NameTypeElements::extract(list, source, &PrefixNames::new(prefix), qualifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::parser::GoParser;
    use crate::go::search::function_by_name;

    const SOURCE: &[u8] = br#"package demo

func Mixed(a, b int, err error) {}

func Results() (*User, error) { return nil, nil }

func Single() error { return nil }

func Spread(format string, args ...any) {}

func Generic[T any](in T, user *User, opts ...Option) (T, *Client) { var t T; return t, nil }

func Named() (id int, name string, ok bool) { return }
"#;

    fn with_func<R>(name: &str, f: impl FnOnce(crate::go::FuncDecl<'_>) -> R) -> R {
        let parsed = GoParser::new().unwrap().parse_with_source(SOURCE).unwrap();
        let func = function_by_name(&parsed, name).unwrap();
        f(func)
    }

    #[test]
    fn keeps_declared_names() {
        let elements = with_func("Mixed", |f| simple_results(f.parameters(), SOURCE));
        assert_eq!(elements.names().merge_parts(), "a, b, err");
        assert_eq!(elements.kinds(), vec!["int", "int", "error"]);
    }

    #[test]
    fn unnamed_results_get_generated_names() {
        let elements = with_func("Results", |f| simple_results(f.result(), SOURCE));
        assert_eq!(elements.names().merge_parts(), "res, err1");

        let single = with_func("Single", |f| simple_results(f.result(), SOURCE));
        assert_eq!(single.names().merge_parts(), "err");
        assert_eq!(single.kinds(), vec!["error"]);

        let none = with_func("Mixed", |f| simple_results(f.result(), SOURCE));
        assert!(none.is_empty());
    }

    #[test]
    fn variadic_parameters() {
        let elements = with_func("Spread", |f| simple_arguments(f.parameters(), SOURCE));
        assert_eq!(elements.len(), 2);
        assert!(elements[1].variadic);
        assert_eq!(elements[1].kind, "...any");
        assert_eq!(elements.call_arguments().merge_parts(), "format, args...");
        assert_eq!(elements.addressable_names().merge_parts(), "&format, &args");
    }

    #[test]
    fn prefixed_names_and_qualification() {
        let (params, results) = with_func("Generic", |f| {
            let generics = GenericParams::from_node(f.type_parameters(), SOURCE);
            let qualifier = Qualifier::new("demo", generics);
            (
                prefixed_elements(f.parameters(), "p", SOURCE, Some(&qualifier)),
                prefixed_elements(f.result(), "r", SOURCE, Some(&qualifier)),
            )
        });
        assert_eq!(
            params.names_with_kinds().merge_parts(),
            "p0in T, p1user *demo.User, p2opts ...demo.Option"
        );
        assert_eq!(results.names_with_kinds().merge_parts(), "r0 T, r1 *demo.Client");
    }

    #[test]
    fn qualify_rules() {
        let generics: GenericParams = [("T", "any")].into_iter().collect();
        let q = Qualifier::new("pkg", generics);
        assert_eq!(q.qualify("A", false), "pkg.A");
        assert_eq!(q.qualify("*A", false), "*pkg.A");
        assert_eq!(q.qualify("...A", true), "...pkg.A");
        assert_eq!(q.qualify("int", false), "int");
        assert_eq!(q.qualify("*string", false), "*string");
        assert_eq!(q.qualify("other.A", false), "other.A");
        assert_eq!(q.qualify("T", false), "T");
        assert_eq!(q.qualify("*T", false), "*T");
        assert_eq!(q.qualify("[]A", false), "[]A");
        assert_eq!(q.qualify("", false), "");
    }

    #[test]
    fn var_definitions_and_grouping() {
        let elements = with_func("Named", |f| simple_results(f.result(), SOURCE));
        assert_eq!(
            elements.var_definitions().merge_lines(),
            "var id int\nvar name string\nvar ok bool"
        );

        let mixed = with_func("Mixed", |f| simple_arguments(f.parameters(), SOURCE));
        assert_eq!(
            mixed.grouped_var_definitions().merge_lines(),
            "var a, b int\nvar err error"
        );
        let kinds: Vec<_> = mixed.group_by_kind().into_iter().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec!["int", "error"]);
    }
}
