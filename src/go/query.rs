use crate::go::errors::GoSyntaxError;
use crate::go::parser::ParsedSource;
use crate::span::Span;
use ast_grep_language::{LanguageExt, SupportLang};
use std::collections::HashMap;
use tree_sitter::{Query, QueryCursor, StreamingIterator};

/// A match from a tree-sitter query with captured nodes.
#[derive(Debug, Clone)]
pub struct QueryMatch {
    /// The full match byte range
    pub span: Span,
    /// Named captures: capture_name -> captured node
    pub captures: HashMap<String, CapturedNode>,
}

#[derive(Debug, Clone)]
pub struct CapturedNode {
    pub span: Span,
    pub text: String,
    pub kind: String,
}

/// Engine for executing tree-sitter queries against parsed Go source.
pub struct QueryEngine {
    query: Query,
    capture_names: Vec<String>,
}

impl QueryEngine {
    /// Create a new query engine from a tree-sitter query string.
    ///
    /// # Query Syntax
    ///
    /// ```text
    /// (function_declaration
    ///   name: (identifier) @func_name
    ///   body: (block) @body)
    /// ```
    pub fn new(query_str: &str) -> Result<Self, GoSyntaxError> {
        let language = SupportLang::Go.get_ts_language();
        let query = Query::new(&language, query_str).map_err(|e| GoSyntaxError::InvalidQuery {
            message: e.to_string(),
        })?;

        let capture_names = query.capture_names().iter().map(|s| s.to_string()).collect();

        Ok(Self {
            query,
            capture_names,
        })
    }

    /// Execute the query against parsed source and return all matches.
    pub fn find_all(&self, parsed: &ParsedSource<'_>) -> Vec<QueryMatch> {
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, parsed.root_node(), parsed.source);

        let mut results = Vec::new();

        while let Some(m) = matches.next() {
            let mut captures = HashMap::new();
            let mut overall_start = usize::MAX;
            let mut overall_end = 0usize;

            for capture in m.captures {
                let node = capture.node;
                let name = &self.capture_names[capture.index as usize];

                overall_start = overall_start.min(node.start_byte());
                overall_end = overall_end.max(node.end_byte());

                captures.insert(
                    name.clone(),
                    CapturedNode {
                        span: Span::of(node),
                        text: parsed.node_text(node).to_string(),
                        kind: node.kind().to_string(),
                    },
                );
            }

            if overall_start != usize::MAX {
                results.push(QueryMatch {
                    span: Span::new(overall_start, overall_end),
                    captures,
                });
            }
        }

        results
    }

    /// Execute the query and expect exactly one match.
    pub fn find_unique(&self, parsed: &ParsedSource<'_>) -> Result<QueryMatch, GoSyntaxError> {
        let mut matches = self.find_all(parsed);

        match matches.len() {
            0 => Err(GoSyntaxError::NoMatch),
            1 => matches.pop().ok_or(GoSyntaxError::NoMatch),
            n => Err(GoSyntaxError::AmbiguousMatch { count: n }),
        }
    }

    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }
}

/// Common tree-sitter queries for Go declarations.
pub mod queries {
    /// Quote a name for use inside an `#eq?` predicate.
    fn quoted(name: &str) -> String {
        name.replace('\\', "\\\\").replace('"', "\\\"")
    }

    /// Query for a top-level function by name.
    pub fn function_by_name(name: &str) -> String {
        let name = quoted(name);
        format!(
            r#"(function_declaration
                name: (identifier) @name
                (#eq? @name "{name}")
            ) @function"#
        )
    }

    /// Query for a method by receiver type and method name.
    ///
    /// Matches both value (`T`) and pointer (`*T`) receivers.
    pub fn method_by_name(receiver: &str, method_name: &str) -> String {
        let receiver = quoted(receiver);
        let method_name = quoted(method_name);
        format!(
            r#"(method_declaration
                receiver: (parameter_list
                    (parameter_declaration
                        type: [
                            (type_identifier) @receiver
                            (pointer_type (type_identifier) @receiver)
                        ]))
                name: (field_identifier) @name
                (#eq? @receiver "{receiver}")
                (#eq? @name "{method_name}")
            ) @method"#
        )
    }

    /// Query for a struct type by name.
    pub fn struct_by_name(name: &str) -> String {
        let name = quoted(name);
        format!(
            r#"(type_spec
                name: (type_identifier) @name
                type: (struct_type)
                (#eq? @name "{name}")
            ) @struct"#
        )
    }

    /// Query for an interface type by name.
    pub fn interface_by_name(name: &str) -> String {
        let name = quoted(name);
        format!(
            r#"(type_spec
                name: (type_identifier) @name
                type: (interface_type)
                (#eq? @name "{name}")
            ) @interface"#
        )
    }

    /// Query for any type spec by name.
    pub fn type_by_name(name: &str) -> String {
        let name = quoted(name);
        format!(
            r#"(type_spec
                name: (type_identifier) @name
                (#eq? @name "{name}")
            ) @type"#
        )
    }

    /// Query for an import spec whose path literal contains `path`.
    pub fn import_path(path: &str) -> String {
        let path = quoted(path);
        format!(
            r#"(import_spec
                path: (_) @path
                (#eq? @path "\"{path}\"")
            ) @import"#
        )
    }

    /// Query for all top-level functions in a file.
    pub const ALL_FUNCTIONS: &str = r#"(function_declaration
        name: (identifier) @name
    ) @function"#;

    /// Query for all methods in a file.
    pub const ALL_METHODS: &str = r#"(method_declaration
        name: (field_identifier) @name
    ) @method"#;

    /// Query for all struct types in a file.
    pub const ALL_STRUCTS: &str = r#"(type_spec
        name: (type_identifier) @name
        type: (struct_type)
    ) @struct"#;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::parser::GoParser;

    #[test]
    fn find_function_by_name() {
        let mut parser = GoParser::new().unwrap();
        let source = br#"package main

func helper() {}

func main() {
	helper()
}

func other() {}
"#;
        let parsed = parser.parse_with_source(source).unwrap();
        let engine = QueryEngine::new(&queries::function_by_name("main")).unwrap();

        let matches = engine.find_all(&parsed);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].captures["name"].text, "main");
    }

    #[test]
    fn find_method_with_pointer_receiver() {
        let mut parser = GoParser::new().unwrap();
        let source = br#"package demo

type Box struct{}

func (b *Box) Open() error { return nil }
func (b Box) Close() {}
"#;
        let parsed = parser.parse_with_source(source).unwrap();

        let open = QueryEngine::new(&queries::method_by_name("Box", "Open")).unwrap();
        let m = open.find_unique(&parsed).unwrap();
        assert_eq!(m.captures["receiver"].text, "Box");

        let close = QueryEngine::new(&queries::method_by_name("Box", "Close")).unwrap();
        assert!(close.find_unique(&parsed).is_ok());
    }

    #[test]
    fn find_struct_by_name() {
        let mut parser = GoParser::new().unwrap();
        let source = br#"package demo

type Foo struct {
	X int
}

type Bar interface{}
"#;
        let parsed = parser.parse_with_source(source).unwrap();
        let engine = QueryEngine::new(&queries::struct_by_name("Foo")).unwrap();
        let m = engine.find_unique(&parsed).unwrap();
        assert_eq!(m.captures["name"].text, "Foo");

        let miss = QueryEngine::new(&queries::struct_by_name("Bar")).unwrap();
        assert!(matches!(miss.find_unique(&parsed), Err(GoSyntaxError::NoMatch)));
    }

    #[test]
    fn ambiguous_match_error() {
        let mut parser = GoParser::new().unwrap();
        let source = b"package demo\n\nfunc test() {}\nfunc test() {}\n";
        let parsed = parser.parse_with_source(source).unwrap();
        let engine = QueryEngine::new(&queries::function_by_name("test")).unwrap();

        assert!(matches!(
            engine.find_unique(&parsed),
            Err(GoSyntaxError::AmbiguousMatch { count: 2 })
        ));
    }

    #[test]
    fn invalid_query_is_reported() {
        assert!(matches!(
            QueryEngine::new("(function_declaration"),
            Err(GoSyntaxError::InvalidQuery { .. })
        ));
    }
}
