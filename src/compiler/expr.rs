use crate::{
    ast::{
        ast::Expr,
        expressions::{BinaryExpr, BinaryOperator},
    },
    errors::errors::CodegenError,
};

use super::{
    allocator::Value,
    compiler::{Compiler, FunctionContext},
};

/// Lowers an expression and returns the value holding its result.
pub fn gen_expression(
    compiler: &Compiler,
    function: &mut FunctionContext,
    expr: &Expr,
) -> Result<Value, CodegenError> {
    match expr {
        Expr::Symbol(symbol) => function.lookup_variable(&symbol.value).ok_or_else(|| {
            CodegenError::UnresolvedVariable {
                name: symbol.value.clone(),
            }
        }),
        Expr::Binary(binary) => gen_binary(compiler, function, binary),
    }
}

fn gen_binary(
    compiler: &Compiler,
    function: &mut FunctionContext,
    binary: &BinaryExpr,
) -> Result<Value, CodegenError> {
    let ty = binary.ty.as_ref().ok_or(CodegenError::MissingType)?;
    let size = compiler.operand_size(ty)?;

    let left = gen_expression(compiler, function, &binary.left)?;
    let right = gen_expression(compiler, function, &binary.right)?;

    // Operand registers may be reused for the result.
    function.allocator.destroy_value(&left);
    function.allocator.destroy_value(&right);

    let result = match binary.operator {
        BinaryOperator::Add => compiler.add(function, &left, &right, size)?,
        operator => {
            return Err(CodegenError::not_implemented(&format!(
                "binary operator `{}`",
                operator
            )))
        }
    };

    function.allocator.destroy_value(&left);
    function.allocator.destroy_value(&right);

    Ok(result)
}
