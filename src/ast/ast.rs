use crate::Span;

use super::{
    expressions::{BinaryExpr, SymbolExpr},
    statements::{ExpressionStmt, ReturnStmt},
    types::Type,
};

/// Root of the tree: every function of one source file, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    pub functions: Vec<Function>,
    pub span: Span,
}

impl CompilationUnit {
    /// The source file this unit was parsed from.
    pub fn file_name(&self) -> &str {
        &self.span.start.file
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub parameters: Vec<(String, Type)>,
    pub body: Vec<Stmt>,
    pub span: Span,
    /// The function's signature, synthesized by the type checker.
    pub ty: Option<Type>,
}

impl Function {
    pub fn new(name: String, parameters: Vec<(String, Type)>, body: Vec<Stmt>, span: Span) -> Self {
        Function {
            name,
            parameters,
            body,
            span,
            ty: None,
        }
    }
}

/// Statement Types
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Return(ReturnStmt),
    /// An expression evaluated for its side effects; its value is dropped.
    Expression(ExpressionStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
        }
    }
}

/// Expression Types
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(BinaryExpr),
    Symbol(SymbolExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Binary(expr) => &expr.span,
            Expr::Symbol(expr) => &expr.span,
        }
    }

    /// The type resolved by the type checker, if it has run.
    pub fn get_type(&self) -> Option<&Type> {
        match self {
            Expr::Binary(expr) => expr.ty.as_ref(),
            Expr::Symbol(expr) => expr.ty.as_ref(),
        }
    }
}

impl From<BinaryExpr> for Expr {
    fn from(expr: BinaryExpr) -> Self {
        Expr::Binary(expr)
    }
}

impl From<SymbolExpr> for Expr {
    fn from(expr: SymbolExpr) -> Self {
        Expr::Symbol(expr)
    }
}
