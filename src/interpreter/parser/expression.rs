use std::rc::Rc;

use crate::{ast::{Block, Expr, FunctionLiteral, IfCondition, InfixOp, PostfixOp, PrefixOp,
                  SwitchCase},
            ast::AssignOp,
            error::ParseError,
            interpreter::{lexer::TokenKind,
                          parser::core::{ParseResult, Parser, Precedence}}};

/// Maps a token to the infix operator it denotes, if any.
const fn infix_op(kind: TokenKind) -> Option<InfixOp> {
    match kind {
        TokenKind::Plus => Some(InfixOp::Plus),
        TokenKind::Minus => Some(InfixOp::Minus),
        TokenKind::Asterisk => Some(InfixOp::Asterisk),
        TokenKind::Slash => Some(InfixOp::Slash),
        TokenKind::Percent => Some(InfixOp::Percent),
        TokenKind::Power => Some(InfixOp::Power),
        TokenKind::Eq => Some(InfixOp::Eq),
        TokenKind::NotEq => Some(InfixOp::NotEq),
        TokenKind::Lt => Some(InfixOp::Lt),
        TokenKind::Le => Some(InfixOp::Le),
        TokenKind::Gt => Some(InfixOp::Gt),
        TokenKind::Ge => Some(InfixOp::Ge),
        TokenKind::And => Some(InfixOp::And),
        TokenKind::Or => Some(InfixOp::Or),
        TokenKind::Match => Some(InfixOp::Match),
        TokenKind::NotMatch => Some(InfixOp::NotMatch),
        TokenKind::DotDot => Some(InfixOp::Range),
        TokenKind::In => Some(InfixOp::In),
        _ => None,
    }
}

impl Parser {
    /// The Pratt loop: parse a prefix expression, then fold in infix
    /// operators while the next token binds tighter than `precedence`.
    /// On exit the current token is the last token of the expression.
    pub(crate) fn parse_expression(&mut self, precedence: Precedence) -> ParseResult<Expr> {
        let mut left = self.parse_prefix()?;

        while precedence < self.peek_precedence() {
            self.advance();
            left = self.parse_infix(left)?;
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        match self.cur().kind {
            TokenKind::Number => self.parse_number(),
            TokenKind::Identifier => Ok(Expr::Identifier { name: self.cur().literal.clone(),
                                                           pos }),
            TokenKind::Str => Ok(Expr::Str { value: self.cur().literal.clone(), pos }),
            TokenKind::Regex => Ok(Expr::Regex { pattern: self.cur().literal.clone(), pos }),
            TokenKind::Cmd => Ok(Expr::Cmd { command: self.cur().literal.clone(), pos }),
            TokenKind::True => Ok(Expr::Boolean { value: true, pos }),
            TokenKind::False => Ok(Expr::Boolean { value: false, pos }),
            TokenKind::Nil => Ok(Expr::Nil { pos }),
            TokenKind::Bang | TokenKind::Minus | TokenKind::Plus => {
                self.parse_prefix_expression()
            },
            TokenKind::LParen => self.parse_grouped(),
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_hash(),
            TokenKind::Function => self.parse_function_literal(),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Fallthrough => {
                if self.switch_depth == 0 {
                    return Err(ParseError::FallthroughOutsideSwitch { line: pos.line });
                }
                Ok(Expr::Fallthrough { pos })
            },
            TokenKind::For => self.parse_for(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do(),
            TokenKind::Break => {
                if self.loop_depth == 0 {
                    return Err(ParseError::BreakOutsideLoop { line: pos.line });
                }
                Ok(Expr::Break { pos })
            },
            TokenKind::Continue => {
                if self.loop_depth == 0 {
                    return Err(ParseError::ContinueOutsideLoop { line: pos.line });
                }
                Ok(Expr::Continue { pos })
            },
            TokenKind::Illegal => Err(ParseError::IllegalToken { literal: self.cur()
                                                                              .literal
                                                                              .clone(),
                                                                 line:    pos.line, }),
            other => Err(ParseError::NoPrefixParse { token: other.to_string(),
                                                     line:  pos.line, }),
        }
    }

    fn parse_infix(&mut self, left: Expr) -> ParseResult<Expr> {
        match self.cur().kind {
            TokenKind::LParen => self.parse_call(left),
            TokenKind::LBracket => self.parse_index(left),
            TokenKind::Dot => self.parse_method_call(left),
            TokenKind::Increment => Ok(Expr::Postfix { operator: PostfixOp::Increment,
                                                       left:     Box::new(left),
                                                       pos:      self.cur().pos, }),
            TokenKind::Decrement => Ok(Expr::Postfix { operator: PostfixOp::Decrement,
                                                       left:     Box::new(left),
                                                       pos:      self.cur().pos, }),
            TokenKind::Assign
            | TokenKind::PlusAssign
            | TokenKind::MinusAssign
            | TokenKind::AsteriskAssign
            | TokenKind::SlashAssign
            | TokenKind::PercentAssign => self.parse_assign(left),
            TokenKind::FatArrow => self.parse_fat_arrow(left),
            _ => self.parse_infix_expression(left),
        }
    }

    fn parse_number(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let literal = self.cur().literal.clone();
        let value = literal.parse::<f64>().map_err(|_| {
                                              ParseError::NumberLiteral { literal, line: pos.line }
                                          })?;
        Ok(Expr::Number { value, pos })
    }

    fn parse_prefix_expression(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let operator = match self.cur().kind {
            TokenKind::Bang => PrefixOp::Bang,
            TokenKind::Minus => PrefixOp::Minus,
            _ => PrefixOp::Plus,
        };
        self.advance();
        let right = self.parse_expression(Precedence::Prefix)?;
        Ok(Expr::Prefix { operator, right: Box::new(right), pos })
    }

    /// An ordinary infix expression. A comparison directly following
    /// the right operand starts a chained comparison, stored on the
    /// node; more than two comparison operators in a chain is a syntax
    /// error.
    fn parse_infix_expression(&mut self, left: Expr) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let Some(operator) = infix_op(self.cur().kind) else {
            return Err(ParseError::NoPrefixParse { token: self.cur().kind.to_string(),
                                                   line:  pos.line, });
        };

        // `**` is right-associative: parse its right side one level
        // below Product so `a ** b ** c` groups to the right.
        let precedence = if self.cur_is(TokenKind::Power) {
            Precedence::Sum
        } else {
            self.cur_precedence()
        };

        self.advance();
        let right = self.parse_expression(precedence)?;

        let mut next = None;
        if self.peek_is_comparison() {
            self.advance();
            let next_op = infix_op(self.cur().kind).expect("comparison token maps to operator");
            self.advance();
            let next_expr = self.parse_expression(precedence)?;
            next = Some((next_op, Box::new(next_expr)));

            if self.peek_is_comparison() {
                return Err(ParseError::TooManyComparisons { line: self.peek().pos.line });
            }
        }

        Ok(Expr::Infix { operator,
                         left: Box::new(left),
                         right: Box::new(right),
                         next,
                         pos })
    }

    fn peek_is_comparison(&self) -> bool {
        matches!(self.peek().kind,
                 TokenKind::Lt
                 | TokenKind::Le
                 | TokenKind::Gt
                 | TokenKind::Ge
                 | TokenKind::Eq
                 | TokenKind::NotEq)
    }

    /// `(expr)`, the empty tuple `()`, or a tuple `(a, b)` / `(a,)`.
    fn parse_grouped(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        self.advance();

        if self.cur_is(TokenKind::RParen) {
            // The empty tuple; `() => body` picks it up as an empty
            // parameter list through the fat-arrow infix rule.
            return Ok(Expr::Tuple { members: Vec::new(), pos });
        }

        let expr = self.parse_expression(Precedence::Lowest)?;

        if self.peek_is(TokenKind::Comma) {
            return self.parse_tuple(pos, expr);
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok(expr)
    }

    /// The rest of a tuple after its first member. A trailing comma
    /// distinguishes the one-tuple `(1,)` from the grouped `(1)`.
    fn parse_tuple(&mut self, pos: crate::interpreter::lexer::Position, first: Expr)
                   -> ParseResult<Expr> {
        let mut members = vec![first];

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            if self.peek_is(TokenKind::RParen) {
                self.advance();
                return Ok(Expr::Tuple { members, pos });
            }
            self.advance();
            members.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok(Expr::Tuple { members, pos })
    }

    fn parse_array(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let (members, _) = self.parse_expression_list(TokenKind::RBracket)?;
        Ok(Expr::Array { members, pos })
    }

    /// A comma-separated expression list ending at `end`, used for
    /// array literals and call arguments. Returns the list and whether
    /// the last element carried a spreading `...`.
    pub(super) fn parse_expression_list(&mut self, end: TokenKind)
                                        -> ParseResult<(Vec<Expr>, bool)> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.advance();
            return Ok((list, false));
        }

        self.advance();
        list.push(self.parse_expression(Precedence::Lowest)?);
        let mut variadic = self.check_ellipsis(end)?;

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            list.push(self.parse_expression(Precedence::Lowest)?);
            variadic = self.check_ellipsis(end)?;
        }

        self.expect_peek(end)?;
        Ok((list, variadic))
    }

    /// A `...` is only legal on the final element, just before `end`.
    fn check_ellipsis(&mut self, end: TokenKind) -> ParseResult<bool> {
        if !self.peek_is(TokenKind::Ellipsis) {
            return Ok(false);
        }
        self.advance();
        if !self.peek_is(end) {
            return Err(ParseError::EllipsisPosition { line: self.cur().pos.line });
        }
        Ok(true)
    }

    fn parse_hash(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let mut pairs = Vec::new();

        while !self.peek_is(TokenKind::RBrace) {
            if self.peek_is(TokenKind::Eof) {
                return Err(ParseError::UnexpectedToken { expected: "}".to_string(),
                                                         found:    "EOF".to_string(),
                                                         line:     self.cur().pos.line, });
            }
            self.advance();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TokenKind::Colon)?;
            self.advance();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(TokenKind::RBrace) {
                self.expect_peek(TokenKind::Comma)?;
            }
        }

        self.expect_peek(TokenKind::RBrace)?;
        Ok(Expr::Hash { pairs, pos })
    }

    /// `fn name(params) { body }` or an anonymous `fn(params) { … }`.
    pub(super) fn parse_function_literal(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;

        let mut name = None;
        if self.peek_is(TokenKind::Identifier) {
            self.advance();
            name = Some(self.cur().literal.clone());
        }

        self.expect_peek(TokenKind::LParen)?;
        let (parameters, variadic) = self.parse_function_parameters()?;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;

        Ok(Expr::Function(Rc::new(FunctionLiteral { name,
                                                    parameters,
                                                    variadic,
                                                    body,
                                                    pos })))
    }

    fn parse_function_parameters(&mut self) -> ParseResult<(Vec<String>, bool)> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.advance();
            return Ok((parameters, false));
        }

        self.advance();
        parameters.push(self.expect_identifier()?);
        let mut variadic = self.check_ellipsis(TokenKind::RParen)?;

        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            parameters.push(self.expect_identifier()?);
            variadic = self.check_ellipsis(TokenKind::RParen)?;
        }

        self.expect_peek(TokenKind::RParen)?;
        Ok((parameters, variadic))
    }

    fn expect_identifier(&mut self) -> ParseResult<String> {
        if self.cur_is(TokenKind::Identifier) {
            Ok(self.cur().literal.clone())
        } else {
            Err(ParseError::UnexpectedToken { expected: "identifier".to_string(),
                                              found:    self.cur().kind.to_string(),
                                              line:     self.cur().pos.line, })
        }
    }

    pub(super) fn parse_call(&mut self, function: Expr) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let (arguments, variadic) = self.parse_expression_list(TokenKind::RParen)?;
        Ok(Expr::Call { function: Box::new(function),
                        arguments,
                        variadic,
                        pos })
    }

    fn parse_index(&mut self, left: Expr) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        self.advance();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::RBracket)?;
        Ok(Expr::Index { left: Box::new(left),
                         index: Box::new(index),
                         pos })
    }

    /// `object.name` or `object.method(args)`.
    fn parse_method_call(&mut self, object: Expr) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        self.expect_peek(TokenKind::Identifier)?;
        let name = Expr::Identifier { name: self.cur().literal.clone(),
                                      pos:  self.cur().pos, };

        let call = if self.peek_is(TokenKind::LParen) {
            self.advance();
            self.parse_call(name)?
        } else {
            name
        };

        Ok(Expr::MethodCall { object: Box::new(object),
                              call: Box::new(call),
                              pos })
    }

    fn parse_assign(&mut self, target: Expr) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        if matches!(&target, Expr::Identifier { name, .. } if name == "self") {
            return Err(ParseError::SelfAssignment { line: pos.line });
        }

        let operator = match self.cur().kind {
            TokenKind::PlusAssign => AssignOp::Plus,
            TokenKind::MinusAssign => AssignOp::Minus,
            TokenKind::AsteriskAssign => AssignOp::Asterisk,
            TokenKind::SlashAssign => AssignOp::Slash,
            TokenKind::PercentAssign => AssignOp::Percent,
            _ => AssignOp::Assign,
        };

        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        Ok(Expr::Assign { operator,
                          target: Box::new(target),
                          value: Box::new(value),
                          pos })
    }

    /// `params => body`. The left-hand expression supplies the
    /// parameters: an identifier, a tuple of identifiers, or the empty
    /// tuple for a zero-parameter arrow.
    fn parse_fat_arrow(&mut self, left: Expr) -> ParseResult<Expr> {
        let pos = left.pos();

        let parameters = match left {
            Expr::Identifier { name, .. } => vec![name],
            Expr::Tuple { members, .. } => {
                let mut names = Vec::with_capacity(members.len());
                for member in members {
                    match member {
                        Expr::Identifier { name, .. } => names.push(name),
                        other => {
                            return Err(ParseError::ArrowParameters { line: other.line() });
                        },
                    }
                }
                names
            },
            other => return Err(ParseError::ArrowParameters { line: other.line() }),
        };

        self.advance();
        let body = if self.cur_is(TokenKind::LBrace) {
            self.parse_block()?
        } else {
            // A single statement body; `(x) => return x` works because
            // the body goes through statement parsing.
            let statement = self.parse_statement()?;
            Block { pos:        statement.pos(),
                    end_pos:    statement.end(),
                    statements: vec![statement], }
        };

        Ok(Expr::Function(Rc::new(FunctionLiteral { name: None,
                                                    parameters,
                                                    variadic: false,
                                                    body,
                                                    pos })))
    }

    fn parse_if(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        let mut conditions = vec![self.parse_condition()?];
        let mut alternative = None;

        while self.peek_is(TokenKind::Else) {
            self.advance();
            if self.peek_is(TokenKind::If) {
                self.advance();
                conditions.push(self.parse_condition()?);
            } else {
                self.expect_peek(TokenKind::LBrace)?;
                alternative = Some(self.parse_block()?);
                break;
            }
        }

        Ok(Expr::If { conditions, alternative, pos })
    }

    fn parse_condition(&mut self) -> ParseResult<IfCondition> {
        self.advance();
        let cond = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(IfCondition { cond, body })
    }

    fn parse_switch(&mut self) -> ParseResult<Expr> {
        self.switch_depth += 1;
        let result = self.parse_switch_inner();
        self.switch_depth -= 1;
        result
    }

    fn parse_switch_inner(&mut self) -> ParseResult<Expr> {
        let pos = self.cur().pos;
        self.advance();
        let scrutinee = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenKind::LBrace)?;
        self.advance();

        let mut cases: Vec<SwitchCase> = Vec::new();
        let mut seen_default = false;

        while !self.cur_is(TokenKind::RBrace) {
            if self.cur_is(TokenKind::Eof) {
                return Err(ParseError::UnterminatedSwitch { line: pos.line });
            }

            let case_pos = self.cur().pos;
            let (exprs, default) = match self.cur().kind {
                TokenKind::Case => {
                    self.advance();
                    let mut exprs = vec![self.parse_expression(Precedence::Lowest)?];
                    while self.peek_is(TokenKind::Comma) {
                        self.advance();
                        self.advance();
                        exprs.push(self.parse_expression(Precedence::Lowest)?);
                    }
                    (exprs, false)
                },
                TokenKind::Default => {
                    if seen_default {
                        return Err(ParseError::MultipleDefaults { line: case_pos.line });
                    }
                    seen_default = true;
                    (Vec::new(), true)
                },
                other => {
                    return Err(ParseError::UnexpectedToken { expected:
                                                                 "'case' or 'default'".to_string(),
                                                             found: other.to_string(),
                                                             line: case_pos.line, });
                },
            };

            self.expect_peek(TokenKind::LBrace)?;
            let block = self.parse_block()?;
            self.advance();

            cases.push(SwitchCase { exprs, default, block, pos: case_pos });
        }

        // Validate fallthrough placement now that all cases are known.
        for (case_idx, case) in cases.iter().enumerate() {
            let last_case = case_idx == cases.len() - 1;
            for (stmt_idx, statement) in case.block.statements.iter().enumerate() {
                if let crate::ast::Statement::Expression(Expr::Fallthrough { pos: ft_pos }) =
                    statement
                {
                    if stmt_idx != case.block.statements.len() - 1 {
                        return Err(ParseError::FallthroughNotLast { line: ft_pos.line });
                    }
                    if last_case {
                        return Err(ParseError::FallthroughFinalCase { line: ft_pos.line });
                    }
                }
            }
        }

        Ok(Expr::Switch { scrutinee: Box::new(scrutinee),
                          cases,
                          pos })
    }
}
