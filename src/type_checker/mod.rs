//! Type checking and semantic analysis module.
//!
//! This module performs type checking on the AST and annotates it in place:
//!
//! - Every expression receives its resolved type
//! - Every function receives a signature synthesized from its parameters
//!   and its first `return`
//! - Lossy or sign-changing conversions are reported as warnings
//! - Undefined identifiers and incompatible operands are errors
//!
//! The type checker maintains an environment stack to handle scopes.
//! Type slots are written once, so checking an annotated tree again leaves
//! it unchanged.

pub mod type_checker;
