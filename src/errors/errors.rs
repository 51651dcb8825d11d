use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A user-facing error tied to a source position.
///
/// Lexing, parsing and type checking all report through this type; the first
/// one raised aborts the compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_internal_error(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::IncompatibleOperands { .. } => "IncompatibleOperands",
            ErrorImpl::FunctionOperands { .. } => "FunctionOperands",
            ErrorImpl::IncompatibleConversion { .. } => "IncompatibleConversion",
            ErrorImpl::FunctionConversion { .. } => "FunctionConversion",
            ErrorImpl::UndefinedIdentifier { .. } => "UndefinedIdentifier",
            ErrorImpl::MissingReturn { .. } => "MissingReturn",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { .. } => {
                ErrorTip::Suggestion(String::from("did you miss a semicolon?"))
            }
            ErrorImpl::UnexpectedTokenDetailed { message, .. } => {
                ErrorTip::Suggestion(message.clone())
            }
            ErrorImpl::UnknownType { .. } => ErrorTip::Suggestion(String::from(
                "known types are i8, i16, i32, i64, u8, u16, u32, u64, isize, usize and fn(...) -> T",
            )),
            ErrorImpl::IncompatibleOperands { .. } => ErrorTip::Suggestion(String::from(
                "both operands of a binary operator must be integers",
            )),
            ErrorImpl::FunctionOperands { .. } => ErrorTip::Suggestion(String::from(
                "functions cannot be used as arithmetic operands",
            )),
            ErrorImpl::IncompatibleConversion { .. } => ErrorTip::Suggestion(String::from(
                "a function's return type is set by its first return statement",
            )),
            ErrorImpl::FunctionConversion { .. } => ErrorTip::None,
            ErrorImpl::UndefinedIdentifier { .. } => ErrorTip::Suggestion(String::from(
                "only function parameters can be referenced",
            )),
            ErrorImpl::MissingReturn { .. } => ErrorTip::Suggestion(String::from(
                "add a return statement so the return type can be inferred",
            )),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.position, self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token `{token}`")]
    UnrecognisedToken { token: String },
    #[error("unexpected token `{token}`")]
    UnexpectedToken { token: String },
    #[error("unexpected token `{token}`, {message}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unknown type `{type_}`")]
    UnknownType { type_: String },
    #[error("incompatible types for binary operator `{operator}`: `{left}` and `{right}`")]
    IncompatibleOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("cannot apply binary operator `{operator}` to function types `{left}` and `{right}`")]
    FunctionOperands {
        operator: String,
        left: String,
        right: String,
    },
    #[error("cannot convert `{from}` to `{to}`")]
    IncompatibleConversion { from: String, to: String },
    #[error("conversion between function types `{from}` and `{to}` is not supported")]
    FunctionConversion { from: String, to: String },
    #[error("undefined identifier `{name}`")]
    UndefinedIdentifier { name: String },
    #[error("function `{function}` never returns a value")]
    MissingReturn { function: String },
}

/// Non-fatal findings of the type checker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("binary operator `{operator}` applied to types of different signedness: `{left}` and `{right}`")]
    SignednessMismatch {
        operator: String,
        left: String,
        right: String,
    },
    #[error("converting from `{from}` to `{to}` changes signedness")]
    ChangesSignedness { from: String, to: String },
    #[error("converting from `{from}` to `{to}` loses precision")]
    LosesPrecision { from: String, to: String },
}

/// Unrecoverable limitations of the code generator.
///
/// These carry no source position: they signal a construct the back-end
/// cannot lower yet, not a mistake in the program.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("not implemented: {feature}")]
    NotImplemented { feature: String },
    #[error("variable `{name}` not found during code generation")]
    UnresolvedVariable { name: String },
    #[error("invalid operand size: {bits} bits")]
    OperandTooWide { bits: u32 },
    #[error("not implemented: out of registers")]
    OutOfRegisters,
    #[error("unsupported target: {architecture} with the {abi} ABI")]
    UnsupportedTarget { architecture: String, abi: String },
    #[error("expression reached code generation without a resolved type")]
    MissingType,
}

impl CodegenError {
    pub fn not_implemented(feature: &str) -> Self {
        CodegenError::NotImplemented {
            feature: String::from(feature),
        }
    }
}

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Located(#[from] Error),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}
