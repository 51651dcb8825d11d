use crate::{
    ast::{
        ast::Expr,
        expressions::{BinaryExpr, BinaryOperator, SymbolExpr},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let Some(nud) = parser.get_nud_handler(token_kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: parser.current_token().value.clone(),
            },
            parser.get_position(),
        ));
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    while parser.get_binding_power(parser.current_token_kind()) > bp {
        let token_kind = parser.current_token_kind();
        let Some(led) = parser.get_led_handler(token_kind) else {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ));
        };

        left = led(parser, left, parser.get_binding_power(token_kind))?;
    }

    Ok(left)
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(Expr::Symbol(SymbolExpr::new(token.value, token.span)))
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Plus => Some(BinaryOperator::Add),
        TokenKind::Dash => Some(BinaryOperator::Subtract),
        TokenKind::Star => Some(BinaryOperator::Multiply),
        TokenKind::Slash => Some(BinaryOperator::Divide),
        TokenKind::Percent => Some(BinaryOperator::Modulo),
        _ => None,
    }
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let Some(operator) = binary_operator(operator_token.kind) else {
        return Err(Error::new(
            ErrorImpl::UnexpectedToken {
                token: operator_token.value,
            },
            operator_token.span.start,
        ));
    };

    let right = parse_expr(parser, bp)?;

    let span = Span::new(left.get_span().start.clone(), right.get_span().end.clone());
    Ok(Expr::Binary(BinaryExpr::new(operator, left, right, span)))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

    Ok(expr)
}
