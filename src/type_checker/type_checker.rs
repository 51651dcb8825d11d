use std::collections::HashMap;

use log::{debug, trace};

use crate::{
    ast::{
        ast::{CompilationUnit, Expr, Function, Stmt},
        expressions::{BinaryExpr, SymbolExpr},
        statements::ReturnStmt,
        types::Type,
    },
    errors::{
        diagnostics::{Diagnostic, DiagnosticSink},
        errors::{Error, ErrorImpl, Warning},
    },
    Position,
};

#[derive(Debug, Default)]
pub struct Environment {
    pub variable_lookup: HashMap<String, Type>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            variable_lookup: HashMap::new(),
        }
    }

    /// Binds a name in this scope. A later declaration of the same name
    /// replaces the earlier one.
    pub fn declare_variable(&mut self, variable_name: String, variable_type: Type) {
        self.variable_lookup.insert(variable_name, variable_type);
    }

    pub fn get_variable(&self, variable_name: &str) -> Option<&Type> {
        self.variable_lookup.get(variable_name)
    }
}

/// The return type of the function being checked.
///
/// The first `return` reached in program order fixes it; every later
/// `return` is checked as a conversion to that type.
#[derive(Debug, Default)]
pub struct InferredReturn {
    first: Option<Type>,
}

impl InferredReturn {
    pub fn first_return_type(&self) -> Option<&Type> {
        self.first.as_ref()
    }

    fn establish(&mut self, ty: Type) {
        if self.first.is_none() {
            self.first = Some(ty);
        }
    }

    fn reset(&mut self) {
        self.first = None;
    }
}

/// Stores `ty` in an empty slot and returns the slot's content. A slot that
/// already holds a type keeps it.
fn annotate(slot: &mut Option<Type>, ty: Type) -> Type {
    slot.get_or_insert(ty).clone()
}

pub struct TypeChecker<'a> {
    pub environments: Vec<Environment>,
    pub inferred_return: InferredReturn,
    sink: &'a mut dyn DiagnosticSink,
}

impl<'a> TypeChecker<'a> {
    pub fn new(sink: &'a mut dyn DiagnosticSink) -> Self {
        TypeChecker {
            environments: vec![],
            inferred_return: InferredReturn::default(),
            sink,
        }
    }

    pub fn push_environment(&mut self, environment: Environment) {
        trace!(
            "entering scope {} with {} bindings",
            self.environments.len(),
            environment.variable_lookup.len()
        );
        self.environments.push(environment);
    }

    pub fn pop_environment(&mut self) -> Option<Environment> {
        trace!("leaving scope {}", self.environments.len().saturating_sub(1));
        self.environments.pop()
    }

    /// Innermost-first lookup. The caller gets its own copy of the type.
    pub fn fetch_variable_type(&self, variable: &str) -> Option<Type> {
        self.environments
            .iter()
            .rev()
            .find_map(|environment| environment.get_variable(variable))
            .cloned()
    }

    fn warn(&mut self, warning: Warning, position: &Position) {
        debug!("{}: {}", position, warning);
        self.sink.report(Diagnostic::warning(&warning, position.clone()));
    }

    pub fn check_unit(&mut self, unit: &mut CompilationUnit) -> Result<(), Error> {
        for function in unit.functions.iter_mut() {
            self.check_function(function)?;
        }

        Ok(())
    }

    pub fn check_function(&mut self, function: &mut Function) -> Result<(), Error> {
        debug!("type checking function `{}`", function.name);
        self.inferred_return.reset();

        let mut environment = Environment::new();
        for (name, ty) in &function.parameters {
            environment.declare_variable(name.clone(), ty.clone());
        }
        self.push_environment(environment);

        let result = function
            .body
            .iter_mut()
            .try_for_each(|stmt| self.check_stmt(stmt));
        self.pop_environment();
        result?;

        let Some(return_type) = self.inferred_return.first_return_type().cloned() else {
            return Err(Error::new(
                ErrorImpl::MissingReturn {
                    function: function.name.clone(),
                },
                function.span.start.clone(),
            ));
        };

        let parameters = function
            .parameters
            .iter()
            .map(|(_, ty)| ty.clone())
            .collect();
        let signature = annotate(&mut function.ty, Type::function(parameters, return_type));
        debug!("function `{}` has type `{}`", function.name, signature);

        Ok(())
    }

    pub fn check_stmt(&mut self, stmt: &mut Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Return(stmt) => self.check_return(stmt),
            Stmt::Expression(stmt) => self.check_expr(&mut stmt.expression).map(|_| ()),
        }
    }

    fn check_return(&mut self, stmt: &mut ReturnStmt) -> Result<(), Error> {
        let value_type = self.check_expr(&mut stmt.value)?;

        match self.inferred_return.first_return_type().cloned() {
            Some(expected) => {
                let position = stmt.span.start.clone();
                self.check_conversion(&value_type, &expected, &position)
            }
            None => {
                self.inferred_return.establish(value_type);
                Ok(())
            }
        }
    }

    pub fn check_expr(&mut self, expr: &mut Expr) -> Result<Type, Error> {
        match expr {
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Symbol(symbol) => self.check_symbol(symbol),
        }
    }

    fn check_binary(&mut self, binary: &mut BinaryExpr) -> Result<Type, Error> {
        let left = self.check_expr(&mut binary.left)?;
        let right = self.check_expr(&mut binary.right)?;

        let result = self.binary_result_type(&binary.operator.to_string(), &left, &right, &binary.span.start)?;
        Ok(annotate(&mut binary.ty, result))
    }

    fn check_symbol(&mut self, symbol: &mut SymbolExpr) -> Result<Type, Error> {
        match self.fetch_variable_type(&symbol.value) {
            Some(ty) => Ok(annotate(&mut symbol.ty, ty)),
            None => Err(Error::new(
                ErrorImpl::UndefinedIdentifier {
                    name: symbol.value.clone(),
                },
                symbol.span.start.clone(),
            )),
        }
    }

    /// The type of `left <operator> right`: the wider operand, the left one
    /// when both have the same width.
    pub fn binary_result_type(
        &mut self,
        operator: &str,
        left: &Type,
        right: &Type,
        position: &Position,
    ) -> Result<Type, Error> {
        match (left, right) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                if a.is_signed() != b.is_signed() {
                    self.warn(
                        Warning::SignednessMismatch {
                            operator: String::from(operator),
                            left: left.to_string(),
                            right: right.to_string(),
                        },
                        position,
                    );
                }

                Ok(if a.bits() >= b.bits() { left.clone() } else { right.clone() })
            }
            (Type::Function(_), Type::Function(_)) => Err(Error::new(
                ErrorImpl::FunctionOperands {
                    operator: String::from(operator),
                    left: left.to_string(),
                    right: right.to_string(),
                },
                position.clone(),
            )),
            _ => Err(Error::new(
                ErrorImpl::IncompatibleOperands {
                    operator: String::from(operator),
                    left: left.to_string(),
                    right: right.to_string(),
                },
                position.clone(),
            )),
        }
    }

    /// Checks that a value of type `from` may be used where `to` is expected.
    /// Primitive pairs always convert, possibly with warnings.
    pub fn check_conversion(&mut self, from: &Type, to: &Type, position: &Position) -> Result<(), Error> {
        match (from, to) {
            (Type::Primitive(a), Type::Primitive(b)) => {
                if a.is_signed() != b.is_signed() {
                    self.warn(
                        Warning::ChangesSignedness {
                            from: from.to_string(),
                            to: to.to_string(),
                        },
                        position,
                    );
                }

                if a.bits() > b.bits() {
                    self.warn(
                        Warning::LosesPrecision {
                            from: from.to_string(),
                            to: to.to_string(),
                        },
                        position,
                    );
                }

                Ok(())
            }
            (Type::Function(_), Type::Function(_)) => Err(Error::new(
                ErrorImpl::FunctionConversion {
                    from: from.to_string(),
                    to: to.to_string(),
                },
                position.clone(),
            )),
            _ => Err(Error::new(
                ErrorImpl::IncompatibleConversion {
                    from: from.to_string(),
                    to: to.to_string(),
                },
                position.clone(),
            )),
        }
    }
}

/// Type checks a whole unit, annotating it in place.
///
/// Warnings go to `sink`; the first error stops the pass.
pub fn type_check(unit: &mut CompilationUnit, sink: &mut dyn DiagnosticSink) -> Result<(), Error> {
    let mut type_checker = TypeChecker::new(sink);
    type_checker.check_unit(unit)
}
