//! Code generation module for the compiler.
//!
//! This module lowers the type checked AST to textual x86-64 assembly in
//! AT&T syntax. It handles:
//!
//! - Target selection and per-ABI register conventions
//! - Register allocation with callee-saved preservation and stack spills
//! - Compilation of expressions and statements
//! - Function framing and whole-file assembly text

pub mod allocator;
pub mod compiler;
pub mod expr;
pub mod instructions;
pub mod stmt;
pub mod target;

#[cfg(test)]
mod tests;
