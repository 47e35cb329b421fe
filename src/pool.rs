//! Thread-local parser pooling.
//!
//! Creating a tree-sitter parser and loading the Go grammar is not free, and
//! a plan run parses the same file once per job. Each thread keeps one
//! [`GoParser`] around and hands it out on demand.

use crate::go::{GoParser, GoSyntaxError};
use std::cell::RefCell;

thread_local! {
    static GO_PARSER: RefCell<Option<GoParser>> = const { RefCell::new(None) };
}

/// Execute `f` with the pooled parser for this thread.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use go_syntax_kit::pool::with_parser;
///
/// let has_errors = with_parser(|parser| {
///     parser
///         .parse_with_source(b"package main\n")
///         .map(|parsed| parsed.has_errors())
/// })??;
/// # Ok(())
/// # }
/// ```
pub fn with_parser<F, R>(f: F) -> Result<R, GoSyntaxError>
where
    F: FnOnce(&mut GoParser) -> R,
{
    GO_PARSER.with(|cell| {
        // Taken out of the cell so a nested call gets its own parser.
        let taken = cell.borrow_mut().take();
        let mut parser = match taken {
            Some(parser) => parser,
            None => GoParser::new()?,
        };
        let result = f(&mut parser);
        *cell.borrow_mut() = Some(parser);
        Ok(result)
    })
}
