//! Unit tests for the parser module.
//!
//! This module contains tests for parsing the language constructs:
//! - Function declarations and parameter lists
//! - Primitive and function types
//! - Expressions and operator precedence
//! - Statements
//! - Syntax errors

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{CompilationUnit, Expr, Stmt},
        expressions::BinaryOperator,
        types::{PrimitiveType, Type},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<CompilationUnit, Error> {
    let file = Rc::new(String::from("test.zp"));
    let tokens = tokenize(source, Rc::clone(&file)).unwrap();
    parse(tokens, file)
}

fn return_value(unit: &CompilationUnit) -> &Expr {
    match &unit.functions[0].body[0] {
        Stmt::Return(stmt) => &stmt.value,
        other => panic!("expected a return statement, found {:?}", other),
    }
}

/// Renders an expression fully parenthesized, to check grouping.
fn render(expr: &Expr) -> String {
    match expr {
        Expr::Symbol(symbol) => symbol.value.clone(),
        Expr::Binary(binary) => format!(
            "({} {} {})",
            render(&binary.left),
            binary.operator,
            render(&binary.right)
        ),
    }
}

#[test]
fn test_parse_function_declaration() {
    let unit = parse_source("fn add(a: i32, b: i64) { return a + b; }").unwrap();

    assert_eq!(unit.functions.len(), 1);
    let function = &unit.functions[0];
    assert_eq!(function.name, "add");
    assert_eq!(
        function.parameters,
        vec![
            (String::from("a"), Type::Primitive(PrimitiveType::I32)),
            (String::from("b"), Type::Primitive(PrimitiveType::I64)),
        ]
    );
    assert_eq!(function.body.len(), 1);
    assert!(function.ty.is_none());
}

#[test]
fn test_parse_multiple_functions() {
    let unit = parse_source("fn a() {}\nfn b(x: u8,) { x; }").unwrap();

    assert_eq!(unit.functions.len(), 2);
    assert_eq!(unit.functions[0].name, "a");
    assert!(unit.functions[0].parameters.is_empty());
    assert!(unit.functions[0].body.is_empty());
    assert_eq!(unit.functions[1].parameters.len(), 1);
    assert!(matches!(unit.functions[1].body[0], Stmt::Expression(_)));
}

#[test]
fn test_parse_empty_unit() {
    let unit = parse_source("// nothing here\n").unwrap();

    assert!(unit.functions.is_empty());
    assert_eq!(unit.file_name(), "test.zp");
}

#[test]
fn test_parse_function_type_parameter() {
    let unit = parse_source("fn apply(f: fn(i32, usize) -> fn() -> u16) { return f; }").unwrap();

    let expected = Type::function(
        vec![
            Type::Primitive(PrimitiveType::I32),
            Type::Primitive(PrimitiveType::USize),
        ],
        Type::function(vec![], Type::Primitive(PrimitiveType::U16)),
    );
    assert_eq!(unit.functions[0].parameters[0].1, expected);
    assert_eq!(expected.to_string(), "fn(i32, usize) -> fn() -> u16");
}

#[test]
fn test_parse_precedence() {
    let unit = parse_source("fn f(a: i32, b: i32, c: i32) { return a + b * c; }").unwrap();

    assert_eq!(render(return_value(&unit)), "(a + (b * c))");
}

#[test]
fn test_parse_left_associativity() {
    let unit = parse_source("fn f(a: i32, b: i32, c: i32) { return a - b - c % a / b; }").unwrap();

    assert_eq!(render(return_value(&unit)), "((a - b) - ((c % a) / b))");
}

#[test]
fn test_parse_grouping() {
    let unit = parse_source("fn f(a: i32, b: i32, c: i32) { return (a + b) * c; }").unwrap();

    let value = return_value(&unit);
    assert_eq!(render(value), "((a + b) * c)");
    match value {
        Expr::Binary(binary) => assert_eq!(binary.operator, BinaryOperator::Multiply),
        other => panic!("expected a binary expression, found {:?}", other),
    }
}

#[test]
fn test_parse_spans() {
    let unit = parse_source("fn f(a: i32) {\n  return a;\n}").unwrap();

    let function = &unit.functions[0];
    assert_eq!(function.span.start.line, 1);
    assert_eq!(function.span.end.line, 3);

    let stmt_span = function.body[0].get_span();
    assert_eq!(stmt_span.start.line, 2);
    assert_eq!(stmt_span.start.column, 3);

    let value_span = return_value(&unit).get_span();
    assert_eq!(value_span.start.column, 10);
}

#[test]
fn test_parse_unknown_type() {
    let error = parse_source("fn f(a: i128) { return a; }").unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnknownType {
            type_: String::from("i128")
        }
    );
    assert_eq!(error.get_position().column, 9);
}

#[test]
fn test_parse_missing_semicolon() {
    let error = parse_source("fn f(a: i32) { return a }").unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnexpectedToken {
            token: String::from("}")
        }
    );
}

#[test]
fn test_parse_top_level_statement() {
    let error = parse_source("return a;").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
    assert_eq!(error.get_position().line, 1);
    assert_eq!(error.get_position().column, 1);
}

#[test]
fn test_parse_missing_parameter_type() {
    let error = parse_source("fn f(a) { return a; }").unwrap_err();

    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_parse_unterminated_body() {
    let error = parse_source("fn f(a: i32) { return a;").unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnexpectedToken {
            token: String::from("EOF")
        }
    );
}

#[test]
fn test_parse_dangling_operator() {
    let error = parse_source("fn f(a: i32) { return a +; }").unwrap_err();

    assert_eq!(
        error.get_internal_error(),
        &ErrorImpl::UnexpectedToken {
            token: String::from(";")
        }
    );
}
