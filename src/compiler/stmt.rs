use crate::{ast::ast::Stmt, errors::errors::CodegenError};

use super::{
    compiler::{Compiler, FunctionContext},
    expr::gen_expression,
};

pub fn gen_statement(
    compiler: &Compiler,
    function: &mut FunctionContext,
    stmt: &Stmt,
) -> Result<(), CodegenError> {
    match stmt {
        Stmt::Return(stmt) => {
            let value = gen_expression(compiler, function, &stmt.value)?;
            compiler.return_value(function, &value)
        }
        Stmt::Expression(stmt) => {
            let value = gen_expression(compiler, function, &stmt.expression)?;
            function.allocator.destroy_value(&value);
            Ok(())
        }
    }
}
