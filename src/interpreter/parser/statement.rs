use std::{path::PathBuf, rc::Rc};

use crate::{ast::{CatchClause, Expr, FunctionLiteral, ImportStatement, Program, Statement,
                  StructDecl},
            error::ParseError,
            interpreter::{lexer::{Lexer, TokenKind},
                          parser::core::{ParseResult, Parser, Precedence}}};

impl Parser {
    /// Parses one statement. On exit the current token is the last
    /// token of the statement (including an optional trailing
    /// semicolon).
    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.cur().kind {
            TokenKind::Import => self.parse_import(),
            TokenKind::Let => self.parse_let(),
            TokenKind::Return => self.parse_return(),
            TokenKind::TailCall => self.parse_tailcall(),
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block()?)),
            TokenKind::Struct => self.parse_struct(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => self.parse_throw(),
            TokenKind::At => self.parse_decorator(),
            TokenKind::Identifier => {
                let expr = self.parse_expression(Precedence::Lowest)?;
                if self.peek_is(TokenKind::Comma) {
                    return self.parse_multi_assign(expr);
                }
                if self.peek_is(TokenKind::Semicolon) {
                    self.advance();
                }
                Ok(Statement::Expression(expr))
            },
            _ => self.parse_expression_statement(),
        }
    }

    pub(super) fn parse_expression_statement(&mut self) -> ParseResult<Statement> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        Ok(Statement::Expression(expr))
    }

    /// `let a, b, c = 1, 2, 3` - or `let x;` which binds `nil`.
    fn parse_let(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;
        let mut names = Vec::new();

        loop {
            self.advance();
            if !self.cur_is(TokenKind::Identifier) {
                return Err(ParseError::UnexpectedToken { expected:
                                                             "identifier or '_'".to_string(),
                                                         found: self.cur().kind.to_string(),
                                                         line:  self.cur().pos.line, });
            }
            if self.cur().literal == "self" {
                return Err(ParseError::SelfAssignment { line: self.cur().pos.line });
            }
            names.push(self.cur().literal.clone());

            self.advance();
            if matches!(self.cur().kind,
                        TokenKind::Assign | TokenKind::Semicolon | TokenKind::Eof)
            {
                break;
            }
            if !self.cur_is(TokenKind::Comma) {
                return Err(ParseError::UnexpectedToken { expected: ",".to_string(),
                                                         found:    self.cur()
                                                                       .kind
                                                                       .to_string(),
                                                         line:     self.cur().pos.line, });
            }
        }

        if !self.cur_is(TokenKind::Assign) {
            // `let x;` - every name binds to nil.
            return Ok(Statement::Let { names, values: Vec::new(), pos });
        }

        self.advance();
        let values = self.parse_value_list()?;
        Ok(Statement::Let { names, values, pos })
    }

    /// `a, b = f()` - multi-assignment without declaration. `first`
    /// is the already-parsed first target.
    fn parse_multi_assign(&mut self, first: Expr) -> ParseResult<Statement> {
        let pos = first.pos();
        let mut names = vec![first];

        loop {
            self.advance(); // comma
            self.advance();
            names.push(self.parse_expression(Precedence::Assign)?);
            if self.peek_is(TokenKind::Assign) {
                self.advance();
                break;
            }
            if !self.peek_is(TokenKind::Comma) {
                return Err(ParseError::UnexpectedToken { expected: "',' or '='".to_string(),
                                                         found:    self.peek()
                                                                       .kind
                                                                       .to_string(),
                                                         line:     self.cur().pos.line, });
            }
        }

        for name in &names {
            if !matches!(name, Expr::Identifier { .. }) {
                return Err(ParseError::Other { message: "multi-assignment targets must be \
                                                         identifiers"
                                                                 .to_string(),
                                               line:    name.line(), });
            }
        }

        self.advance();
        let values = self.parse_value_list()?;
        Ok(Statement::MultiAssign { names, values, pos })
    }

    /// `return`, `return x` or `return x, y`.
    fn parse_return(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;

        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
            return Ok(Statement::Return { values: Vec::new(), pos });
        }
        if self.peek_is(TokenKind::RBrace) || self.peek_is(TokenKind::Eof) {
            return Ok(Statement::Return { values: Vec::new(), pos });
        }

        self.advance();
        let values = self.parse_value_list()?;
        Ok(Statement::Return { values, pos })
    }

    /// A comma-separated expression list as used by `let`, `return`
    /// and multi-assignment. The current token is the first token of
    /// the first value; on exit it is the last token consumed.
    fn parse_value_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut values = Vec::new();
        loop {
            values.push(self.parse_expression(Precedence::Lowest)?);
            if self.peek_is(TokenKind::Semicolon) {
                self.advance();
            }
            if !self.peek_is(TokenKind::Comma) {
                break;
            }
            self.advance();
            self.advance();
        }
        Ok(values)
    }

    /// `tailcall f(args)`.
    fn parse_tailcall(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;
        self.advance();
        let call = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        if !matches!(call, Expr::Call { .. }) {
            return Err(ParseError::TailCallTarget { line: pos.line });
        }
        Ok(Statement::TailCall { call, pos })
    }

    fn parse_struct(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;
        self.expect_peek(TokenKind::Identifier)?;
        let name = self.cur().literal.clone();
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;
        Ok(Statement::Struct(Rc::new(StructDecl { name, body, pos })))
    }

    fn parse_try(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;
        self.expect_peek(TokenKind::LBrace)?;
        let body = self.parse_block()?;

        let mut catch = None;
        if self.peek_is(TokenKind::Catch) {
            self.advance();
            let var = if self.peek_is(TokenKind::Identifier) {
                self.advance();
                Some(self.cur().literal.clone())
            } else {
                None
            };
            self.expect_peek(TokenKind::LBrace)?;
            let catch_body = self.parse_block()?;
            catch = Some(CatchClause { var, body: catch_body });
        }

        let mut finally = None;
        if self.peek_is(TokenKind::Finally) {
            self.advance();
            self.expect_peek(TokenKind::LBrace)?;
            finally = Some(self.parse_block()?);
        }

        Ok(Statement::Try { body, catch, finally, pos })
    }

    fn parse_throw(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
            return Ok(Statement::Throw { value: Expr::Nil { pos }, pos });
        }
        self.advance();
        let value = self.parse_expression(Precedence::Lowest)?;
        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }
        Ok(Statement::Throw { value, pos })
    }

    /// `import a.b.c` - resolves `a/b/c.mp` next to the current file,
    /// then under `MAGPIE_ROOT`, and parses it recursively.
    fn parse_import(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;

        self.expect_peek(TokenKind::Identifier)?;
        let mut segments = vec![self.cur().literal.clone()];
        while self.peek_is(TokenKind::Dot) {
            self.advance();
            self.expect_peek(TokenKind::Identifier)?;
            segments.push(self.cur().literal.clone());
        }
        let path = segments.join("/");

        let program = self.load_import(&path, pos.line)?;

        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }

        Ok(Statement::Import(ImportStatement { path,
                                               program: Rc::new(program),
                                               pos }))
    }

    fn load_import(&mut self, path: &str, line: usize) -> ParseResult<Program> {
        let base = if self.filename().is_empty() {
            std::env::current_dir().unwrap_or_default()
        } else {
            PathBuf::from(self.filename()).parent()
                                          .map(std::path::Path::to_path_buf)
                                          .unwrap_or_default()
        };

        let mut file = base.join(format!("{path}.mp"));
        let source = match std::fs::read_to_string(&file) {
            Ok(source) => source,
            Err(_) => {
                let root = std::env::var("MAGPIE_ROOT").unwrap_or_default();
                if root.is_empty() {
                    return Err(ParseError::ImportNotFound { path: path.to_string(), line });
                }
                file = PathBuf::from(root).join(format!("{path}.mp"));
                std::fs::read_to_string(&file).map_err(|_| {
                                                  ParseError::ImportNotFound { path:
                                                                                   path.to_string(),
                                                                               line }
                                              })?
            },
        };

        let canonical = file.canonicalize().unwrap_or_else(|_| file.clone());
        if self.import_stack.contains(&canonical) {
            return Err(ParseError::CircularImport { path: path.to_string(), line });
        }

        let lexer = Lexer::with_filename(&source, &file.to_string_lossy());
        let mut sub = Parser::new(lexer);
        sub.import_stack = self.import_stack.clone();
        sub.import_stack.push(canonical);

        let program = sub.parse_program();
        let (errors, lines) = sub.take_errors();
        self.append_errors(errors, lines);
        Ok(program)
    }

    /// `@d fn name(p) { … }` desugars to `let name = d(fn(p) { … })`;
    /// a stack of decorators applies bottom-up.
    fn parse_decorator(&mut self) -> ParseResult<Statement> {
        let pos = self.cur().pos;
        let mut decorators = Vec::new();

        loop {
            // current token is '@'
            self.advance();
            decorators.push(self.parse_expression(Precedence::Lowest)?);
            if self.peek_is(TokenKind::Semicolon) {
                self.advance();
            }
            self.advance();
            if !self.cur_is(TokenKind::At) {
                break;
            }
        }

        if !self.cur_is(TokenKind::Function) {
            return Err(ParseError::DecoratorTarget { line: self.cur().pos.line });
        }

        let function = self.parse_function_literal()?;
        let Expr::Function(literal) = &function else {
            return Err(ParseError::DecoratorTarget { line: self.cur().pos.line });
        };
        let Some(name) = literal.name.clone() else {
            return Err(ParseError::DecoratorTarget { line: literal.pos.line });
        };

        // The bound name comes from the `let`; the inner literal stays
        // anonymous so evaluating it does not rebind the raw function.
        let inner = FunctionLiteral { name:       None,
                                      parameters: literal.parameters.clone(),
                                      variadic:   literal.variadic,
                                      body:       literal.body.clone(),
                                      pos:        literal.pos, };

        let mut value = Expr::Function(Rc::new(inner));
        for decorator in decorators.into_iter().rev() {
            let call_pos = decorator.pos();
            value = Expr::Call { function:  Box::new(decorator),
                                 arguments: vec![value],
                                 variadic:  false,
                                 pos:       call_pos, };
        }

        if self.peek_is(TokenKind::Semicolon) {
            self.advance();
        }

        Ok(Statement::Let { names: vec![name],
                            values: vec![value],
                            pos })
    }
}
