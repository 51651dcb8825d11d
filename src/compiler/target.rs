//! Target selection and per-ABI register conventions.

use std::{fmt::Display, str::FromStr};

use crate::errors::errors::CodegenError;

use super::instructions::Register;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetArchitecture {
    X86_64,
    Aarch64,
}

impl Display for TargetArchitecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetArchitecture::X86_64 => write!(f, "x86_64"),
            TargetArchitecture::Aarch64 => write!(f, "aarch64"),
        }
    }
}

impl FromStr for TargetArchitecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(TargetArchitecture::X86_64),
            "aarch64" => Ok(TargetArchitecture::Aarch64),
            _ => Err(format!("unknown architecture `{}`", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAbi {
    SystemV,
    MsX64,
    Aarch64Eabi,
}

impl Display for TargetAbi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetAbi::SystemV => write!(f, "sysv"),
            TargetAbi::MsX64 => write!(f, "ms-x64"),
            TargetAbi::Aarch64Eabi => write!(f, "aarch64-eabi"),
        }
    }
}

impl FromStr for TargetAbi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sysv" => Ok(TargetAbi::SystemV),
            "ms-x64" => Ok(TargetAbi::MsX64),
            "aarch64-eabi" => Ok(TargetAbi::Aarch64Eabi),
            _ => Err(format!("unknown ABI `{}`", s)),
        }
    }
}

/// Register roles under one calling convention.
#[derive(Debug, PartialEq, Eq)]
pub struct AbiRegisters {
    /// Handed out first; popped from the back.
    pub caller_saved: &'static [Register],
    /// Used once the caller-saved pool is empty, and then preserved.
    pub callee_saved: &'static [Register],
    pub parameters: &'static [Register],
    pub return_value: Register,
    pub stack_alignment_on_call: usize,
}

pub static SYSTEM_V_REGISTERS: AbiRegisters = AbiRegisters {
    caller_saved: &[
        Register::Rax,
        Register::Rcx,
        Register::Rdx,
        Register::Rsi,
        Register::Rdi,
        Register::R8,
        Register::R9,
        Register::R10,
        Register::R11,
    ],
    callee_saved: &[
        Register::Rbx,
        Register::R12,
        Register::R13,
        Register::R14,
        Register::R15,
    ],
    parameters: &[
        Register::Rdi,
        Register::Rsi,
        Register::Rdx,
        Register::Rcx,
        Register::R8,
        Register::R9,
    ],
    return_value: Register::Rax,
    stack_alignment_on_call: 16,
};

pub static MS_X64_REGISTERS: AbiRegisters = AbiRegisters {
    caller_saved: &[
        Register::Rax,
        Register::Rcx,
        Register::Rdx,
        Register::R8,
        Register::R9,
        Register::R10,
        Register::R11,
    ],
    callee_saved: &[
        Register::Rbx,
        Register::R12,
        Register::R13,
        Register::R14,
        Register::R15,
    ],
    parameters: &[Register::Rcx, Register::Rdx, Register::R8, Register::R9],
    return_value: Register::Rax,
    stack_alignment_on_call: 16,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    architecture: TargetArchitecture,
    abi: TargetAbi,
    registers: &'static AbiRegisters,
}

impl Target {
    pub fn new(architecture: TargetArchitecture, abi: TargetAbi) -> Result<Self, CodegenError> {
        let registers = match (architecture, abi) {
            (TargetArchitecture::X86_64, TargetAbi::SystemV) => &SYSTEM_V_REGISTERS,
            (TargetArchitecture::X86_64, TargetAbi::MsX64) => &MS_X64_REGISTERS,
            _ => {
                return Err(CodegenError::UnsupportedTarget {
                    architecture: architecture.to_string(),
                    abi: abi.to_string(),
                })
            }
        };

        Ok(Target {
            architecture,
            abi,
            registers,
        })
    }

    pub fn architecture(&self) -> TargetArchitecture {
        self.architecture
    }

    pub fn abi(&self) -> TargetAbi {
        self.abi
    }

    pub fn registers(&self) -> &'static AbiRegisters {
        self.registers
    }
}

impl Default for Target {
    fn default() -> Self {
        Target {
            architecture: TargetArchitecture::X86_64,
            abi: TargetAbi::SystemV,
            registers: &SYSTEM_V_REGISTERS,
        }
    }
}
