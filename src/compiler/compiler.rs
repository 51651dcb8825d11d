//! Main compiler module.
//!
//! This module contains the core Compiler structure. It lowers a type checked
//! compilation unit to AT&T assembly text, one function at a time, and frames
//! each function with its prologue, callee-saved register preservation and
//! epilogue.

use std::collections::HashMap;

use log::debug;

use crate::{
    ast::{
        ast::{CompilationUnit, Function},
        types::Type,
    },
    errors::errors::CodegenError,
};

use super::{
    allocator::{RegisterAllocator, Value, ValuePosition},
    instructions::{Instruction, InstructionGenerator, OperandSize, Register},
    stmt::gen_statement,
    target::Target,
};

/// Lowering state of the function being generated.
pub struct FunctionContext {
    pub name: String,
    /// Prefix of this function's local labels, `l<index>`.
    pub label_prefix: String,
    /// Name-to-value scopes, innermost last.
    pub variables: Vec<HashMap<String, Value>>,
    pub instructions: Vec<Instruction>,
    pub allocator: RegisterAllocator,
}

impl FunctionContext {
    pub fn new(name: &str, index: usize, target: &Target) -> Self {
        FunctionContext {
            name: String::from(name),
            label_prefix: format!("l{}", index),
            variables: vec![],
            instructions: vec![],
            allocator: RegisterAllocator::new(target),
        }
    }

    pub fn end_label(&self) -> String {
        format!("{}_end", self.label_prefix)
    }

    pub fn lookup_variable(&self, name: &str) -> Option<Value> {
        self.variables
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .copied()
    }
}

/// A lowered function: its name and its complete instruction list.
pub struct GeneratedFunction {
    pub name: String,
    pub instructions: Vec<Instruction>,
}

/// The main compiler structure.
///
/// Holds the target description; every function is lowered with its own
/// [`FunctionContext`], so one compiler can generate any number of units.
pub struct Compiler {
    pub generator: InstructionGenerator,
}

impl Compiler {
    pub fn new(target: Target) -> Self {
        Compiler {
            generator: InstructionGenerator::new(target),
        }
    }

    pub fn target(&self) -> Target {
        self.generator.target()
    }

    /// Operand size of a value of the given type.
    pub fn operand_size(&self, ty: &Type) -> Result<OperandSize, CodegenError> {
        match ty {
            Type::Primitive(primitive) => OperandSize::from_bits(primitive.bits()),
            Type::Function(_) => Err(CodegenError::not_implemented("function-typed values")),
        }
    }

    pub fn get_into_register(&self, value: &Value) -> Result<Register, CodegenError> {
        match value.position {
            ValuePosition::Register(register) => Ok(register),
            ValuePosition::Stack(_) => Err(CodegenError::OutOfRegisters),
        }
    }

    pub fn get_back_to_value(&self, function: &mut FunctionContext, register: Register, value: &Value) {
        match value.position {
            ValuePosition::Register(target) => {
                function
                    .instructions
                    .extend(self.generator.move_register(value.size, register, target));
            }
            ValuePosition::Stack(offset) => {
                function
                    .instructions
                    .push(self.generator.stack_store(value.size, register, offset));
            }
        }
    }

    /// Emits `result = a + b` into a freshly allocated value of `size`.
    pub fn add(
        &self,
        function: &mut FunctionContext,
        a: &Value,
        b: &Value,
        size: OperandSize,
    ) -> Result<Value, CodegenError> {
        let register_a = self.get_into_register(a)?;
        let register_b = self.get_into_register(b)?;
        let result = function.allocator.create_value(size, false);
        let register_result = self.get_into_register(&result)?;

        function
            .instructions
            .extend(self.generator.add(size, register_a, register_b, register_result));
        self.get_back_to_value(function, register_result, &result);

        Ok(result)
    }

    pub fn return_value(&self, function: &mut FunctionContext, value: &Value) -> Result<(), CodegenError> {
        let register = self.get_into_register(value)?;
        let return_register = self.target().registers().return_value;

        function
            .instructions
            .extend(self.generator.move_register(value.size, register, return_register));
        let end_label = function.end_label();
        function.instructions.push(self.generator.jump(&end_label));

        Ok(())
    }

    pub fn gen_function(&self, node: &Function, index: usize) -> Result<GeneratedFunction, CodegenError> {
        debug!("generating function `{}`", node.name);
        let target = self.target();
        let parameter_registers = target.registers().parameters;
        if node.parameters.len() > parameter_registers.len() {
            return Err(CodegenError::not_implemented(
                "more parameters than parameter registers",
            ));
        }

        let mut function = FunctionContext::new(&node.name, index, &target);

        let mut parameters = HashMap::new();
        for ((name, ty), register) in node.parameters.iter().zip(parameter_registers) {
            let Some(primitive) = ty.as_primitive() else {
                return Err(CodegenError::not_implemented("non-primitive parameters"));
            };
            let size = OperandSize::from_bits(primitive.bits())?;
            parameters.insert(
                name.clone(),
                function.allocator.create_fixed_value(size, true, *register),
            );
        }
        function.variables.push(parameters);

        for stmt in &node.body {
            gen_statement(self, &mut function, stmt)?;
        }

        if let Some(scope) = function.variables.pop() {
            for value in scope.values() {
                function.allocator.destroy_variable(value);
            }
        }

        let stack_size = function.allocator.stack_size();
        let saved_registers = function.allocator.saved_registers().to_vec();

        let mut instructions = self.generator.prologue(stack_size);
        for register in &saved_registers {
            instructions.push(self.generator.save_register(*register));
        }
        instructions.append(&mut function.instructions);
        instructions.push(self.generator.label(&function.end_label()));
        for register in saved_registers.iter().rev() {
            instructions.push(self.generator.restore_register(*register));
        }
        instructions.extend(self.generator.epilogue(stack_size));

        Ok(GeneratedFunction {
            name: function.name,
            instructions,
        })
    }

    /// Lowers a whole unit to assembly text.
    pub fn generate(&self, unit: &CompilationUnit) -> Result<String, CodegenError> {
        let functions = unit
            .functions
            .iter()
            .enumerate()
            .map(|(index, function)| self.gen_function(function, index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut result = self.generator.file_header(unit.file_name());
        result.push('\n');
        for function in &functions {
            result.push_str(&self.generator.function_header(&function.name));
            result.push('\n');
            for instruction in &function.instructions {
                result.push('\t');
                result.push_str(&instruction.to_string());
                result.push('\n');
            }
            result.push_str(&self.generator.function_footer(&function.name));
            result.push('\n');
        }
        result.push_str(&self.generator.file_footer());

        Ok(result)
    }
}
