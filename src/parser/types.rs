//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive integer types (identifiers such as `i32` or `usize`)
//! - Function types, written `fn(T, U) -> R`
//!
//! Like expressions, types are dispatched on their first token through a
//! lookup table held by the parser.

use std::collections::HashMap;

use crate::{
    ast::types::{PrimitiveType, Type},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_primitive_type);
    parser.type_nud(TokenKind::Fn, parse_function_type);
}

pub fn parse_primitive_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    match PrimitiveType::from_name(&token.value) {
        Some(primitive) => Ok(Type::Primitive(primitive)),
        None => Err(Error::new(
            ErrorImpl::UnknownType { type_: token.value },
            token.span.start,
        )),
    }
}

pub fn parse_function_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Fn)?;
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        parameters.push(parse_type(parser)?);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect_detailed(TokenKind::Arrow, "function types need a return type")?;
    let return_type = parse_type(parser)?;

    Ok(Type::function(parameters, return_type))
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();
    let Some(handler) = parser.get_type_nud_handler(token_kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        ));
    };

    handler(parser)
}
