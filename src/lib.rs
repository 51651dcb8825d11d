#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc, time::Instant};

use log::{debug, info};

use crate::{
    ast::ast::CompilationUnit,
    compiler::{compiler::Compiler, target::Target},
    errors::{
        diagnostics::DiagnosticSink,
        errors::{CodegenError, CompileError, Error},
    },
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::type_check,
};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A location in a source file. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(line: u32, column: u32, file: Rc<String>) -> Self {
        Position { line, column, file }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }
}

/// Returns the text of the given 1-based line, without its line terminator.
pub fn get_line_at_position(source: &str, line: u32) -> Option<&str> {
    if line == 0 {
        return None;
    }

    source
        .split_inclusive('\n')
        .nth(line as usize - 1)
        .map(|text| text.trim_end_matches(['\n', '\r']))
}

/// Strips leading spaces, returning the rest and how many were removed.
pub fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nsecond\n\nTesting { }\n";

        assert_eq!(super::get_line_at_position(source, 1), Some("Hello, world!"));
        assert_eq!(super::get_line_at_position(source, 3), Some(""));
        assert_eq!(super::get_line_at_position(source, 4), Some("Testing { }"));
        assert_eq!(super::get_line_at_position(source, 5), None);
        assert_eq!(super::get_line_at_position(source, 0), None);
    }

    #[test]
    fn test_remove_starting_whitespace() {
        let (text, removed) = super::remove_starting_whitespace("    return x;");
        assert_eq!(text, "return x;");
        assert_eq!(removed, 4);
    }
}

/// Lexes, parses and type checks one source file, returning the annotated
/// tree.
///
/// Warnings go to `sink` as they are found; the first error aborts.
pub fn analyze(
    source: &str,
    file_name: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<CompilationUnit, Error> {
    let start = Instant::now();
    let file = Rc::new(String::from(file_name));

    let tokens = tokenize(source, Rc::clone(&file))?;
    info!("tokenized {} in {:?}", file_name, start.elapsed());

    let parse_start = Instant::now();
    let mut unit = parse(tokens, file)?;
    info!("parsed {} in {:?}", file_name, parse_start.elapsed());

    let type_check_start = Instant::now();
    type_check(&mut unit, sink)?;
    info!("type checked {} in {:?}", file_name, type_check_start.elapsed());

    Ok(unit)
}

/// Runs the whole pipeline on one source file and returns the assembly text.
pub fn compile(
    source: &str,
    file_name: &str,
    target: Target,
    sink: &mut dyn DiagnosticSink,
) -> Result<String, CompileError> {
    let unit = analyze(source, file_name, sink)?;
    Ok(generate(&unit, target)?)
}

/// Lowers an analyzed unit to assembly text for `target`.
pub fn generate(unit: &CompilationUnit, target: Target) -> Result<String, CodegenError> {
    debug!("targeting {} with the {} ABI", target.architecture(), target.abi());

    let start = Instant::now();
    let assembly = Compiler::new(target).generate(unit)?;
    info!("generated assembly for {} in {:?}", unit.file_name(), start.elapsed());

    Ok(assembly)
}
