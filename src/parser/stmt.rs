use crate::{
    ast::{
        ast::{Function, Stmt},
        statements::{ExpressionStmt, ReturnStmt},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    if let Some(handler) = parser.get_stmt_handler(parser.current_token_kind()) {
        return handler(parser);
    }

    let expression = parse_expr(parser, BindingPower::Default)?;
    let end = parser.expect(TokenKind::Semicolon)?.span.end;

    Ok(Stmt::Expression(ExpressionStmt {
        span: Span::new(expression.get_span().start.clone(), end),
        expression,
    }))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = parse_expr(parser, BindingPower::Default)?;
    let end = parser.expect(TokenKind::Semicolon)?.span.end;

    Ok(Stmt::Return(ReturnStmt {
        value,
        span: Span::new(start, end),
    }))
}

pub fn parse_function(parser: &mut Parser) -> Result<Function, Error> {
    let start = parser.expect(TokenKind::Fn)?.span.start;

    let name = parser
        .expect_detailed(TokenKind::Identifier, "expected the function's name")?
        .value;

    parser.expect(TokenKind::OpenParen)?;

    let mut parameters = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseParen {
        let parameter = parser
            .expect_detailed(TokenKind::Identifier, "expected a parameter name")?
            .value;
        parser.expect_detailed(TokenKind::Colon, "parameters need an explicit type")?;
        let ty = parse_type(parser)?;
        parameters.push((parameter, ty));

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    parser.expect_detailed(TokenKind::OpenCurly, "expected the function body")?;

    let mut body = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly && parser.has_tokens() {
        body.push(parse_stmt(parser)?);
    }

    let end = parser.expect(TokenKind::CloseCurly)?.span.end;

    Ok(Function::new(name, parameters, body, Span::new(start, end)))
}
