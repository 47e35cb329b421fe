use crate::go::errors::GoSyntaxError;
use crate::span::Span;
use ast_grep_language::{LanguageExt, SupportLang};
use tree_sitter::{Node, Parser, Tree};

/// Tree-sitter parser wrapper for Go source code.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    /// Create a new Go parser.
    pub fn new() -> Result<Self, GoSyntaxError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = SupportLang::Go.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| GoSyntaxError::LanguageSet)?;

        Ok(Self { parser })
    }

    /// Parse source code into a tree-sitter Tree.
    ///
    /// Tree-sitter recovers from errors, so the tree may contain ERROR
    /// nodes. Use [`GoParser::parse_checked`] to reject those.
    pub fn parse(&mut self, source: &[u8]) -> Result<Tree, GoSyntaxError> {
        self.parser
            .parse(source, None)
            .ok_or(GoSyntaxError::ParseFailed)
    }

    /// Parse source code and return the tree along with the source.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a [u8],
    ) -> Result<ParsedSource<'a>, GoSyntaxError> {
        let tree = self.parse(source)?;
        Ok(ParsedSource { source, tree })
    }

    /// Parse source code, failing when the tree contains syntax errors.
    pub fn parse_checked<'a>(
        &mut self,
        source: &'a [u8],
    ) -> Result<ParsedSource<'a>, GoSyntaxError> {
        let parsed = self.parse_with_source(source)?;
        parsed.check_syntax()?;
        Ok(parsed)
    }
}

/// A parsed source file with its tree-sitter tree.
///
/// The tree is only valid for `source`; spans taken from it must not be
/// applied to any other buffer.
pub struct ParsedSource<'a> {
    pub source: &'a [u8],
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    /// Get the root node of the tree.
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR nodes.
    pub fn has_errors(&self) -> bool {
        has_error_nodes(self.tree.root_node())
    }

    /// Get all ERROR nodes in the tree.
    pub fn error_nodes(&self) -> Vec<ErrorNode> {
        let mut errors = Vec::new();
        collect_error_nodes(self.tree.root_node(), &mut errors);
        errors
    }

    /// Turn error nodes into a [`GoSyntaxError`].
    pub fn check_syntax(&self) -> Result<(), GoSyntaxError> {
        let errors = self.error_nodes();
        match errors.as_slice() {
            [] => Ok(()),
            [single] => Err(GoSyntaxError::SyntaxError {
                byte_start: single.byte_start,
                byte_end: single.byte_end,
            }),
            many => Err(GoSyntaxError::MultipleSyntaxErrors { count: many.len() }),
        }
    }

    /// Extract text for a node's byte range.
    pub fn node_text(&self, node: Node<'_>) -> &'a str {
        std::str::from_utf8(self.node_bytes(node)).unwrap_or_default()
    }

    /// Extract raw bytes for a node's byte range.
    pub fn node_bytes(&self, node: Node<'_>) -> &'a [u8] {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    /// Text covered by an arbitrary span of this source.
    pub fn span_text(&self, span: Span) -> &'a str {
        self.source
            .get(span.range())
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .unwrap_or_default()
    }
}

/// Information about an ERROR node in the parse tree.
#[derive(Debug, Clone)]
pub struct ErrorNode {
    pub byte_start: usize,
    pub byte_end: usize,
    pub start_point: tree_sitter::Point,
    pub end_point: tree_sitter::Point,
}

fn has_error_nodes(node: Node<'_>) -> bool {
    if node.is_error() || node.is_missing() {
        return true;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if has_error_nodes(child) {
            return true;
        }
    }

    false
}

fn collect_error_nodes(node: Node<'_>, errors: &mut Vec<ErrorNode>) {
    if node.is_error() || node.is_missing() {
        errors.push(ErrorNode {
            byte_start: node.start_byte(),
            byte_end: node.end_byte(),
            start_point: node.start_position(),
            end_point: node.end_position(),
        });
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_error_nodes(child, errors);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_go() {
        let mut parser = GoParser::new().unwrap();
        let source = b"package main\n\nfunc main() { println(\"hello\") }\n";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(!parsed.has_errors());
        assert_eq!(parsed.root_node().kind(), "source_file");
    }

    #[test]
    fn parse_invalid_go() {
        let mut parser = GoParser::new().unwrap();
        let source = b"package main\n\nfunc main( { }\n";
        let parsed = parser.parse_with_source(source).unwrap();

        assert!(parsed.has_errors());
        assert!(!parsed.error_nodes().is_empty());
    }

    #[test]
    fn parse_checked_rejects_errors() {
        let mut parser = GoParser::new().unwrap();
        let result = parser.parse_checked(b"package main\n\nfunc main( { }\n");
        assert!(matches!(
            result,
            Err(GoSyntaxError::SyntaxError { .. }) | Err(GoSyntaxError::MultipleSyntaxErrors { .. })
        ));
    }

    #[test]
    fn node_text_matches_byte_range() {
        let mut parser = GoParser::new().unwrap();
        let source = b"package demo\n";
        let parsed = parser.parse_with_source(source).unwrap();
        let clause = parsed.root_node().named_child(0).unwrap();
        assert_eq!(clause.kind(), "package_clause");
        assert_eq!(parsed.node_text(clause), "package demo");
    }
}
