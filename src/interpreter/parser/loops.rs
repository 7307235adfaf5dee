use crate::{ast::Expr,
            error::ParseError,
            interpreter::{lexer::{Position, TokenKind},
                          parser::core::{ParseResult, Parser, Precedence}}};

impl Parser {
    /// `while cond { body }`.
    pub(super) fn parse_while(&mut self) -> ParseResult<Expr> {
        self.loop_depth += 1;
        let result = self.parse_while_inner();
        self.loop_depth -= 1;
        result
    }

    fn parse_while_inner(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        self.advance();
        let condition = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(Expr::While { condition: Box::new(condition),
                         body,
                         pos })
    }

    /// `do { body }` - loops until `break` or `return`.
    pub(super) fn parse_do(&mut self) -> ParseResult<Expr> {
        self.loop_depth += 1;
        let result = self.parse_do_inner();
        self.loop_depth -= 1;
        result
    }

    fn parse_do_inner(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(Expr::DoLoop { body, pos })
    }

    /// The `for` family: `for { … }`, `for (init; cond; update) { … }`,
    /// `for item in seq { … }` and `for key, value in coll { … }`.
    pub(super) fn parse_for(&mut self) -> ParseResult<Expr> {
        self.loop_depth += 1;
        let result = self.parse_for_inner();
        self.loop_depth -= 1;
        result
    }

    fn parse_for_inner(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;

        if self.peek_is(TokenKind::LBrace) {
            self.advance();
            let body = self.parse_block()?;
            return Ok(Expr::Forever { body, pos });
        }

        if self.peek_is(TokenKind::LParen) {
            return self.parse_c_for(pos);
        }

        self.advance();
        if !self.cur_is(TokenKind::Identifier) {
            return Err(ParseError::UnexpectedToken { expected:
                                                         "identifier or '_'".to_string(),
                                                     found: self.cur().kind.to_string(),
                                                     line:  self.cur().pos.line, });
        }

        let first = self.cur().literal.clone();
        if first == "_" || self.peek_is(TokenKind::Comma) {
            self.parse_foreach_pair(pos, first)
        } else {
            self.parse_foreach(pos, first)
        }
    }

    /// `for item in sequence { body }`.
    fn parse_foreach(&mut self, pos: Position, var: String) -> ParseResult<Expr> {
        self.expect_peek(TokenKind::In)?;
        self.advance();
        let iterable = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(Expr::ForEach { var,
                           iterable: Box::new(iterable),
                           body,
                           pos })
    }

    /// `for key, value in collection { body }`. Either name may be
    /// `_`, but not both.
    fn parse_foreach_pair(&mut self, pos: Position, key: String) -> ParseResult<Expr> {
        self.expect_peek(TokenKind::Comma)?;
        self.advance();

        if !self.cur_is(TokenKind::Identifier) {
            return Err(ParseError::UnexpectedToken { expected:
                                                         "identifier or '_'".to_string(),
                                                     found: self.cur().kind.to_string(),
                                                     line:  self.cur().pos.line, });
        }
        let value = self.cur().literal.clone();

        if key == "_" && value == "_" {
            return Err(ParseError::ForLoopVariables { line: self.cur().pos.line });
        }

        self.expect_peek(TokenKind::In)?;
        self.advance();
        let iterable = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;

        Ok(Expr::ForEachPair { key,
                               value,
                               iterable: Box::new(iterable),
                               body,
                               pos })
    }

    /// `for (init; cond; update) { body }` - each part may be empty;
    /// with all three empty this is the forever loop in disguise.
    fn parse_c_for(&mut self, pos: Position) -> ParseResult<Expr> {
        self.expect_peek(TokenKind::LParen)?;
        self.advance();

        let mut init = None;
        if !self.cur_is(TokenKind::Semicolon) {
            init = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            self.advance();
        }

        self.advance();
        let mut cond = None;
        if !self.cur_is(TokenKind::Semicolon) {
            cond = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            self.advance();
        }

        self.advance();
        let mut update = None;
        if self.cur_is(TokenKind::RParen) {
            // `for (a; b;)` - nothing to do, already at ')'.
        } else {
            if !self.cur_is(TokenKind::Semicolon) {
                update = Some(Box::new(self.parse_expression(Precedence::Lowest)?));
            }
            self.expect_peek(TokenKind::RParen)?;
        }

        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;

        if init.is_none() && cond.is_none() && update.is_none() {
            return Ok(Expr::Forever { body, pos });
        }
        Ok(Expr::CFor { init, cond, update, body, pos })
    }
}
