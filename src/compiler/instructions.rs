//! x86-64 instructions in AT&T syntax.
//!
//! Instructions are plain values; rendering one to text has no side effects.

use std::fmt::Display;

use crate::errors::errors::CodegenError;

use super::target::Target;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Rax,
    Rcx,
    Rdx,
    Rbx,
    Rbp,
    Rsp,
    Rsi,
    Rdi,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

const REGISTER_NAMES_64: [&str; 16] = [
    "rax", "rcx", "rdx", "rbx", "rbp", "rsp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];
const REGISTER_NAMES_32: [&str; 16] = [
    "eax", "ecx", "edx", "ebx", "ebp", "esp", "esi", "edi", "r8d", "r9d", "r10d", "r11d", "r12d",
    "r13d", "r14d", "r15d",
];
const REGISTER_NAMES_16: [&str; 16] = [
    "ax", "cx", "dx", "bx", "bp", "sp", "si", "di", "r8w", "r9w", "r10w", "r11w", "r12w", "r13w",
    "r14w", "r15w",
];
const REGISTER_NAMES_8: [&str; 16] = [
    "al", "cl", "dl", "bl", "bpl", "spl", "sil", "dil", "r8b", "r9b", "r10b", "r11b", "r12b",
    "r13b", "r14b", "r15b",
];

impl Register {
    /// The register's name at the given width, without the `%` sigil.
    pub fn name(self, size: OperandSize) -> &'static str {
        let index = self as usize;
        match size {
            OperandSize::I8 => REGISTER_NAMES_8[index],
            OperandSize::I16 => REGISTER_NAMES_16[index],
            OperandSize::I32 => REGISTER_NAMES_32[index],
            OperandSize::I64 => REGISTER_NAMES_64[index],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandSize {
    I8,
    I16,
    I32,
    I64,
}

impl OperandSize {
    /// The smallest operand size holding `bits` bits.
    pub fn from_bits(bits: u32) -> Result<Self, CodegenError> {
        match bits {
            0..=8 => Ok(OperandSize::I8),
            9..=16 => Ok(OperandSize::I16),
            17..=32 => Ok(OperandSize::I32),
            33..=64 => Ok(OperandSize::I64),
            _ => Err(CodegenError::OperandTooWide { bits }),
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            OperandSize::I8 => 1,
            OperandSize::I16 => 2,
            OperandSize::I32 => 4,
            OperandSize::I64 => 8,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            OperandSize::I8 => "b",
            OperandSize::I16 => "w",
            OperandSize::I32 => "l",
            OperandSize::I64 => "q",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Register(Register),
    Immediate(usize),
    Label(String),
    /// `offset(%base)`, base always named at 64 bits.
    Memory { base: Register, offset: isize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: String,
    pub size: OperandSize,
    pub operands: Vec<Operand>,
    pub needs_size_suffix: bool,
}

impl Instruction {
    pub fn new(mnemonic: &str, size: OperandSize, operands: Vec<Operand>) -> Self {
        Instruction {
            mnemonic: String::from(mnemonic),
            size,
            operands,
            needs_size_suffix: true,
        }
    }

    /// An instruction whose mnemonic is written without a size suffix.
    pub fn without_suffix(mnemonic: &str, operands: Vec<Operand>) -> Self {
        Instruction {
            mnemonic: String::from(mnemonic),
            size: OperandSize::I64,
            operands,
            needs_size_suffix: false,
        }
    }
}

impl Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic)?;
        if self.needs_size_suffix {
            write!(f, "{}", self.size.suffix())?;
        }

        for (index, operand) in self.operands.iter().enumerate() {
            let separator = if index == 0 { " " } else { ", " };
            match operand {
                Operand::Register(register) => {
                    write!(f, "{}%{}", separator, register.name(self.size))?
                }
                Operand::Immediate(value) => write!(f, "{}${}", separator, value)?,
                Operand::Label(label) => write!(f, "{}{}", separator, label)?,
                Operand::Memory { base, offset } => write!(
                    f,
                    "{}{}(%{})",
                    separator,
                    offset,
                    base.name(OperandSize::I64)
                )?,
            }
        }

        Ok(())
    }
}

/// Builds instruction sequences and the textual framing of an assembly file.
pub struct InstructionGenerator {
    target: Target,
}

impl InstructionGenerator {
    pub fn new(target: Target) -> Self {
        InstructionGenerator { target }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn file_header(&self, file_name: &str) -> String {
        format!(".file \"{}\"\n.text", file_name)
    }

    pub fn file_footer(&self) -> String {
        String::from(".ident \"Compiled by zipc\"\n.section .note.GNU-stack,\"\",@progbits")
    }

    pub fn function_header(&self, name: &str) -> String {
        format!(".globl {}\n.type {}, @function\n{}:", name, name, name)
    }

    pub fn function_footer(&self, name: &str) -> String {
        format!(".size {}, .-{}", name, name)
    }

    pub fn prologue(&self, stack_size: usize) -> Vec<Instruction> {
        let mut result = vec![
            Instruction::new("push", OperandSize::I64, vec![Operand::Register(Register::Rbp)]),
            Instruction::new(
                "mov",
                OperandSize::I64,
                vec![Operand::Register(Register::Rsp), Operand::Register(Register::Rbp)],
            ),
        ];
        if stack_size > 0 {
            result.push(Instruction::new(
                "sub",
                OperandSize::I64,
                vec![Operand::Immediate(stack_size), Operand::Register(Register::Rsp)],
            ));
        }
        result
    }

    pub fn epilogue(&self, stack_size: usize) -> Vec<Instruction> {
        let mut result = vec![];
        if stack_size > 0 {
            result.push(Instruction::new(
                "add",
                OperandSize::I64,
                vec![Operand::Immediate(stack_size), Operand::Register(Register::Rsp)],
            ));
        }
        result.push(Instruction::new("pop", OperandSize::I64, vec![Operand::Register(Register::Rbp)]));
        result.push(Instruction::new("ret", OperandSize::I64, vec![]));
        result
    }

    pub fn label(&self, name: &str) -> Instruction {
        Instruction::without_suffix(&format!("{}:", name), vec![])
    }

    pub fn save_register(&self, register: Register) -> Instruction {
        Instruction::new("push", OperandSize::I64, vec![Operand::Register(register)])
    }

    pub fn restore_register(&self, register: Register) -> Instruction {
        Instruction::new("pop", OperandSize::I64, vec![Operand::Register(register)])
    }

    /// `None` when source and destination are the same register.
    pub fn move_register(&self, size: OperandSize, from: Register, to: Register) -> Option<Instruction> {
        if from == to {
            return None;
        }

        Some(Instruction::new(
            "mov",
            size,
            vec![Operand::Register(from), Operand::Register(to)],
        ))
    }

    pub fn jump(&self, label: &str) -> Instruction {
        Instruction::without_suffix("jmp", vec![Operand::Label(String::from(label))])
    }

    /// `dest = a + b`.
    pub fn add(&self, size: OperandSize, a: Register, b: Register, dest: Register) -> Vec<Instruction> {
        // Moving `a` first would clobber `b` when it already lives in `dest`.
        let (first, second) = if b == dest && a != dest { (b, a) } else { (a, b) };

        let mut result = vec![];
        result.extend(self.move_register(size, first, dest));
        result.push(Instruction::new(
            "add",
            size,
            vec![Operand::Register(second), Operand::Register(dest)],
        ));
        result
    }

    /// Stores `register` into the stack slot that starts `offset` bytes
    /// below the frame base.
    pub fn stack_store(&self, size: OperandSize, register: Register, offset: usize) -> Instruction {
        let rbp_offset = -((offset + size.bytes()) as isize);
        Instruction::new(
            "mov",
            size,
            vec![
                Operand::Register(register),
                Operand::Memory {
                    base: Register::Rbp,
                    offset: rbp_offset,
                },
            ],
        )
    }
}
