use crate::go::errors::GoSyntaxError;
use crate::go::parser::GoParser;
use crate::go::query::{queries, QueryEngine, QueryMatch};
use crate::span::Span;
use std::collections::HashMap;
use std::path::Path;

/// High-level structural target for locating Go declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoTarget {
    /// A top-level function by name
    Function { name: String },

    /// A method by receiver type (value or pointer receiver)
    Method { receiver: String, name: String },

    /// A struct type by name
    Struct { name: String },

    /// An interface type by name
    Interface { name: String },

    /// Any type spec by name
    Type { name: String },

    /// An import spec by unquoted path
    Import { path: String },

    /// Custom tree-sitter query
    Custom { query: String },
}

impl GoTarget {
    /// Convert to a tree-sitter query string.
    pub fn to_query(&self) -> String {
        match self {
            GoTarget::Function { name } => queries::function_by_name(name),
            GoTarget::Method { receiver, name } => queries::method_by_name(receiver, name),
            GoTarget::Struct { name } => queries::struct_by_name(name),
            GoTarget::Interface { name } => queries::interface_by_name(name),
            GoTarget::Type { name } => queries::type_by_name(name),
            GoTarget::Import { path } => queries::import_path(path),
            GoTarget::Custom { query } => query.clone(),
        }
    }

    /// Parse a `Receiver.Method` shorthand into a method target.
    pub fn method_from_path(path: &str) -> Option<Self> {
        let (receiver, name) = path.split_once('.')?;
        let receiver = receiver.trim_start_matches('*');
        if receiver.is_empty() || name.is_empty() {
            return None;
        }
        Some(GoTarget::Method {
            receiver: receiver.to_string(),
            name: name.to_string(),
        })
    }
}

/// Result of locating a structural target.
#[derive(Debug, Clone)]
pub struct LocatorResult {
    /// Byte range of the entire matched construct
    pub span: Span,
    /// The matched text
    pub text: String,
    /// Named captures from the query
    pub captures: HashMap<String, CaptureInfo>,
}

#[derive(Debug, Clone)]
pub struct CaptureInfo {
    pub span: Span,
    pub text: String,
}

impl LocatorResult {
    fn from_match(m: QueryMatch, source: &[u8]) -> Self {
        let text = source
            .get(m.span.range())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        LocatorResult {
            span: m.span,
            text,
            captures: m
                .captures
                .into_iter()
                .map(|(k, v)| {
                    (
                        k,
                        CaptureInfo {
                            span: v.span,
                            text: v.text,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Structural code locator using tree-sitter queries.
pub struct GoLocator {
    parser: GoParser,
}

impl GoLocator {
    pub fn new() -> Result<Self, GoSyntaxError> {
        Ok(Self {
            parser: GoParser::new()?,
        })
    }

    /// Locate a structural target in source code, expecting exactly one match.
    pub fn locate(
        &mut self,
        source: &[u8],
        target: &GoTarget,
    ) -> Result<LocatorResult, GoSyntaxError> {
        let parsed = self.parser.parse_with_source(source)?;
        let engine = QueryEngine::new(&target.to_query())?;

        let m = engine.find_unique(&parsed)?;
        Ok(LocatorResult::from_match(m, source))
    }

    /// Locate all matches for a structural target.
    pub fn locate_all(
        &mut self,
        source: &[u8],
        target: &GoTarget,
    ) -> Result<Vec<LocatorResult>, GoSyntaxError> {
        let parsed = self.parser.parse_with_source(source)?;
        let engine = QueryEngine::new(&target.to_query())?;

        Ok(engine
            .find_all(&parsed)
            .into_iter()
            .map(|m| LocatorResult::from_match(m, source))
            .collect())
    }

    /// Locate a target in a file.
    pub fn locate_in_file(
        &mut self,
        path: &Path,
        target: &GoTarget,
    ) -> Result<LocatorResult, GoSyntaxError> {
        let source = std::fs::read(path).map_err(|e| GoSyntaxError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.locate(&source, target)
    }

    pub fn parser_mut(&mut self) -> &mut GoParser {
        &mut self.parser
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &[u8] = br#"package shop

import "fmt"

type Cart struct {
	Items []string
}

type Checkout interface {
	Pay() error
}

func (c *Cart) Add(item string) {
	c.Items = append(c.Items, item)
}

func main() {
	fmt.Println("hi")
}
"#;

    #[test]
    fn locate_function() {
        let mut locator = GoLocator::new().unwrap();
        let result = locator
            .locate(SOURCE, &GoTarget::Function { name: "main".into() })
            .unwrap();
        assert!(result.text.starts_with("func main()"));
        assert!(result.text.contains("fmt.Println"));
    }

    #[test]
    fn locate_method_from_shorthand() {
        let mut locator = GoLocator::new().unwrap();
        let target = GoTarget::method_from_path("*Cart.Add").unwrap();
        let result = locator.locate(SOURCE, &target).unwrap();
        assert!(result.text.starts_with("func (c *Cart) Add"));
        assert!(GoTarget::method_from_path("Cart").is_none());
    }

    #[test]
    fn locate_struct_and_interface() {
        let mut locator = GoLocator::new().unwrap();
        let cart = locator
            .locate(SOURCE, &GoTarget::Struct { name: "Cart".into() })
            .unwrap();
        assert!(cart.text.contains("Items []string"));

        let checkout = locator
            .locate(SOURCE, &GoTarget::Interface { name: "Checkout".into() })
            .unwrap();
        assert!(checkout.text.contains("Pay() error"));
    }

    #[test]
    fn locate_import() {
        let mut locator = GoLocator::new().unwrap();
        let result = locator
            .locate(SOURCE, &GoTarget::Import { path: "fmt".into() })
            .unwrap();
        assert_eq!(result.text, "\"fmt\"");
    }

    #[test]
    fn byte_span_accuracy() {
        let mut locator = GoLocator::new().unwrap();
        let source = b"package p\n\nfunc foo() {}\nfunc bar() {}\n";
        let result = locator
            .locate(source, &GoTarget::Function { name: "bar".into() })
            .unwrap();
        assert_eq!(&source[result.span.range()], b"func bar() {}");
    }

    #[test]
    fn locate_all_types() {
        let mut locator = GoLocator::new().unwrap();
        let target = GoTarget::Custom {
            query: "(type_spec name: (type_identifier) @name) @type".into(),
        };
        let results = locator.locate_all(SOURCE, &target).unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.captures["name"].text.as_str())
            .collect();
        assert_eq!(names, vec!["Cart", "Checkout"]);
    }
}
