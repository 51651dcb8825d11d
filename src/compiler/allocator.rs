//! Per-function register allocation.
//!
//! Registers come from the ABI's caller-saved pool first, then from the
//! callee-saved pool (those get pushed and popped around the function body),
//! and once both are empty values spill to stack slots below the frame base.
//! Stack slots are never reclaimed.

use std::collections::HashMap;

use log::trace;

use super::{
    instructions::{OperandSize, Register},
    target::Target,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePosition {
    Register(Register),
    /// Byte offset of the slot below the frame base.
    Stack(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Value {
    /// Unique within one allocator; identifies the owner of a register.
    pub id: usize,
    pub size: OperandSize,
    pub position: ValuePosition,
    /// Bound to a name; released only when its scope ends.
    pub is_variable: bool,
}

impl Value {
    pub fn register(&self) -> Option<Register> {
        match self.position {
            ValuePosition::Register(register) => Some(register),
            ValuePosition::Stack(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct RegisterAllocator {
    available_registers: Vec<Register>,
    remaining_callee_saved: Vec<Register>,
    saved_registers: Vec<Register>,
    /// Id of the live value occupying each handed-out register.
    owners: HashMap<Register, usize>,
    next_id: usize,
    stack_size: usize,
}

impl RegisterAllocator {
    pub fn new(target: &Target) -> Self {
        let registers = target.registers();
        RegisterAllocator {
            available_registers: registers.caller_saved.to_vec(),
            remaining_callee_saved: registers.callee_saved.to_vec(),
            saved_registers: vec![],
            owners: HashMap::new(),
            next_id: 0,
            stack_size: 0,
        }
    }

    fn fresh_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn claim(&mut self, size: OperandSize, is_variable: bool, register: Register) -> Value {
        let id = self.fresh_id();
        self.owners.insert(register, id);

        Value {
            id,
            size,
            position: ValuePosition::Register(register),
            is_variable,
        }
    }

    pub fn create_value(&mut self, size: OperandSize, is_variable: bool) -> Value {
        if let Some(register) = self.available_registers.pop() {
            trace!("allocated {}", register.name(OperandSize::I64));
            return self.claim(size, is_variable, register);
        }

        if let Some(register) = self.remaining_callee_saved.pop() {
            trace!("allocated callee-saved {}", register.name(OperandSize::I64));
            self.saved_registers.push(register);
            return self.claim(size, is_variable, register);
        }

        // Naturally aligned.
        let bytes = size.bytes();
        self.stack_size = self.stack_size.div_ceil(bytes) * bytes + bytes;
        let offset = self.stack_size - bytes;
        trace!("spilled {} bytes to stack offset {}", bytes, offset);

        Value {
            id: self.fresh_id(),
            size,
            position: ValuePosition::Stack(offset),
            is_variable,
        }
    }

    /// Binds a value to `register`. The register leaves the free pools until
    /// the value is destroyed.
    pub fn create_fixed_value(&mut self, size: OperandSize, is_variable: bool, register: Register) -> Value {
        self.available_registers.retain(|free| *free != register);
        if self.remaining_callee_saved.contains(&register) {
            self.remaining_callee_saved.retain(|free| *free != register);
            self.saved_registers.push(register);
        }

        self.claim(size, is_variable, register)
    }

    /// Releases a temporary. Variables and stack slots are left alone, and so
    /// is a register that has since been handed to another value.
    pub fn destroy_value(&mut self, value: &Value) {
        if !value.is_variable {
            self.release(value);
        }
    }

    /// Releases a variable at the end of its scope.
    pub fn destroy_variable(&mut self, value: &Value) {
        if value.is_variable {
            self.release(value);
        }
    }

    fn release(&mut self, value: &Value) {
        if let Some(register) = value.register() {
            if self.owners.get(&register) == Some(&value.id) {
                self.owners.remove(&register);
                trace!("released {}", register.name(OperandSize::I64));
                self.available_registers.push(register);
            }
        }
    }

    /// Callee-saved registers handed out so far, in allocation order.
    pub fn saved_registers(&self) -> &[Register] {
        &self.saved_registers
    }

    pub fn stack_size(&self) -> usize {
        self.stack_size
    }

    pub fn is_available(&self, register: Register) -> bool {
        self.available_registers.contains(&register)
    }
}
