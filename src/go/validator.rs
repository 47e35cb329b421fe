use crate::go::errors::GoSyntaxError;
use crate::go::parser::ErrorNode;
use crate::pool::with_parser;
use crate::span::{replace_span, Span};

fn errors_of(source: &[u8]) -> Result<Vec<ErrorNode>, GoSyntaxError> {
    with_parser(|parser| {
        parser
            .parse_with_source(source)
            .map(|parsed| parsed.error_nodes())
    })?
}

fn report(errors: &[&ErrorNode]) -> Result<(), GoSyntaxError> {
    match errors {
        [] => Ok(()),
        [single] => Err(GoSyntaxError::SyntaxError {
            byte_start: single.byte_start,
            byte_end: single.byte_end,
        }),
        many => Err(GoSyntaxError::MultipleSyntaxErrors { count: many.len() }),
    }
}

/// Validate that Go source has no syntax errors.
pub fn validate_syntax(source: &[u8]) -> Result<(), GoSyntaxError> {
    let errors = errors_of(source)?;
    report(&errors.iter().collect::<Vec<_>>())
}

/// Validate that replacing `span` with `new_text` doesn't introduce syntax
/// errors.
///
/// Errors already present in `source` are tolerated; only error nodes at
/// positions that were clean before the splice are reported.
pub fn validate_edit(source: &[u8], span: Span, new_text: &[u8]) -> Result<(), GoSyntaxError> {
    let new_source = replace_span(source, span, new_text)?;

    let original_errors = errors_of(source)?;
    let new_errors = errors_of(&new_source)?;

    // Comparing by position is imperfect but reasonable
    let introduced: Vec<&ErrorNode> = new_errors
        .iter()
        .filter(|e| {
            !original_errors
                .iter()
                .any(|o| o.byte_start == e.byte_start && o.byte_end == e.byte_end)
        })
        .collect();

    report(&introduced)
}

/// Check if a code snippet is valid as a specific syntactic category.
pub fn validate_snippet(snippet: &str, category: SnippetCategory) -> Result<(), GoSyntaxError> {
    let wrapped = match category {
        SnippetCategory::Declaration => format!("package snippet\n\n{snippet}\n"),
        SnippetCategory::Statement => format!("package snippet\n\nfunc _() {{\n{snippet}\n}}\n"),
        SnippetCategory::Expression => format!("package snippet\n\nvar _ = {snippet}\n"),
        SnippetCategory::Type => format!("package snippet\n\ntype _ {snippet}\n"),
    };

    validate_syntax(wrapped.as_bytes())
}

/// Category of code snippet for validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetCategory {
    /// A top-level declaration (func, type, import, var, const)
    Declaration,
    /// A statement inside a function body
    Statement,
    Expression,
    /// A type expression
    Type,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_valid_syntax() {
        let source = b"package main\n\nfunc main() {\n\tprintln(\"hello\")\n}\n";
        assert!(validate_syntax(source).is_ok());
    }

    #[test]
    fn validate_invalid_syntax() {
        assert!(validate_syntax(b"package main\n\nfunc main( { }\n").is_err());
    }

    #[test]
    fn validate_edit_introduces_error() {
        let source = b"package main\n\nfunc foo() { x := 1; _ = x }\n";
        let start = source.iter().position(|b| *b == b'x').unwrap();
        let result = validate_edit(source, Span::new(start, start + 6), b"x := ");
        assert!(result.is_err());
    }

    #[test]
    fn validate_edit_no_new_errors() {
        let source = b"package main\n\nfunc foo() { x := 1; _ = x }\n";
        let start = source.iter().position(|b| *b == b'x').unwrap();
        let result = validate_edit(source, Span::new(start, start + 6), b"x := 2");
        assert!(result.is_ok());
    }

    #[test]
    fn validate_edit_rejects_bad_span() {
        let result = validate_edit(b"package main\n", Span::new(5, 100), b"");
        assert!(matches!(result, Err(GoSyntaxError::Splice(_))));
    }

    #[test]
    fn validate_snippets() {
        assert!(validate_snippet("import \"fmt\"", SnippetCategory::Declaration).is_ok());
        assert!(validate_snippet("func f(", SnippetCategory::Declaration).is_err());
        assert!(validate_snippet("a, b := 1, 2\n_, _ = a, b", SnippetCategory::Statement).is_ok());
        assert!(validate_snippet("1 +", SnippetCategory::Expression).is_err());
        assert!(validate_snippet("struct{ A int }", SnippetCategory::Type).is_ok());
    }
}
