//! Type system definitions for the AST.
//!
//! This module defines the types of the language:
//!
//! - Primitive integer types of fixed or pointer width
//! - Function types, made of parameter types and a return type
//!
//! Types are plain values. Whoever holds one owns it outright, and copying a
//! type out of a scope or a node always produces an independent clone.

use std::{collections::HashMap, fmt::Display};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref PRIMITIVE_LOOKUP: HashMap<&'static str, PrimitiveType> = {
        let mut map = HashMap::new();
        for primitive in PrimitiveType::ALL {
            map.insert(primitive.name(), primitive);
        }
        map
    };
}

/// Width of `isize`/`usize` on the one supported architecture.
pub const POINTER_BITS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    ISize,
    USize,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 10] = [
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::ISize,
        PrimitiveType::USize,
    ];

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            PrimitiveType::I8
                | PrimitiveType::I16
                | PrimitiveType::I32
                | PrimitiveType::I64
                | PrimitiveType::ISize
        )
    }

    pub fn bits(self) -> u32 {
        match self {
            PrimitiveType::I8 | PrimitiveType::U8 => 8,
            PrimitiveType::I16 | PrimitiveType::U16 => 16,
            PrimitiveType::I32 | PrimitiveType::U32 => 32,
            PrimitiveType::I64 | PrimitiveType::U64 => 64,
            PrimitiveType::ISize | PrimitiveType::USize => POINTER_BITS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::ISize => "isize",
            PrimitiveType::USize => "usize",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimitiveType> {
        PRIMITIVE_LOOKUP.get(name).copied()
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    pub parameters: Vec<Type>,
    pub return_type: Box<Type>,
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| parameter.to_string())
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "fn({}) -> {}", parameters, self.return_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Primitive(PrimitiveType),
    Function(FunctionType),
}

impl Type {
    pub fn function(parameters: Vec<Type>, return_type: Type) -> Self {
        Type::Function(FunctionType {
            parameters,
            return_type: Box::new(return_type),
        })
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(primitive) => Some(*primitive),
            Type::Function(_) => None,
        }
    }
}

impl From<PrimitiveType> for Type {
    fn from(primitive: PrimitiveType) -> Self {
        Type::Primitive(primitive)
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Primitive(primitive) => write!(f, "{}", primitive),
            Type::Function(function) => write!(f, "{}", function),
        }
    }
}
