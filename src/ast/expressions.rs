use std::fmt::Display;

use crate::Span;

use super::{ast::Expr, types::Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Binary Expression
/// Represents an arithmetic operation between two expressions in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub operator: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
    pub ty: Option<Type>,
}

impl BinaryExpr {
    pub fn new(operator: BinaryOperator, left: Expr, right: Expr, span: Span) -> Self {
        BinaryExpr {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span,
            ty: None,
        }
    }
}

/// Symbol Expression
/// Represents a reference to a variable in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolExpr {
    pub value: String,
    pub span: Span,
    pub ty: Option<Type>,
}

impl SymbolExpr {
    pub fn new(value: String, span: Span) -> Self {
        SymbolExpr {
            value,
            span,
            ty: None,
        }
    }
}
