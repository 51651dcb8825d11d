//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Located errors raised by the lexer, parser and type checker
//! - Fatal code generation errors, which carry no source position
//! - Non-fatal warnings and the sinks that receive them

pub mod diagnostics;
pub mod errors;
