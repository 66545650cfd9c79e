use crate::errors::{parse_error, AutodocError};
use rustpython_parser::ast::Suite;
use rustpython_parser::Parse;

/// Parse Python source code into a RustPython AST.
///
/// `source_path` only labels the error; nothing is read from disk.
pub fn parse_python(source: &str, source_path: &str) -> Result<Suite, AutodocError> {
    Suite::parse(source, source_path).map_err(|e| {
        let offset = u32::from(e.offset) as usize;
        let (line, column) = line_column(source, offset);
        parse_error(format!("{} ({})", e.error, source_path), Some(line), Some(column))
    })
}

/// 1-based line and column of a byte offset
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let column = before.iter().rev().take_while(|&&b| b != b'\n').count() + 1;
    (line, column)
}
