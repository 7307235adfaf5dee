use std::{collections::HashSet, path::PathBuf};

use crate::{ast::{Block, Program, Statement},
            error::ParseError,
            interpreter::lexer::{Lexer, Token, TokenKind}};

pub type ParseResult<T> = Result<T, ParseError>;

/// Binding strength of an operator, lowest first.
///
/// The ladder realizes the language's precedence table:
/// `= < .. < || < && < ==/!= < comparisons/in < +- < */%** <
/// =~/!~ < prefix < ++/-- < call/dot/index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Assign,
    Range,
    CondOr,
    CondAnd,
    Equals,
    LessGreater,
    Sum,
    Product,
    RegexMatch,
    Prefix,
    Increment,
    Call,
}

/// The precedence a token has when it appears in infix position.
#[must_use]
pub const fn precedence_of(kind: TokenKind) -> Precedence {
    match kind {
        TokenKind::Assign
        | TokenKind::PlusAssign
        | TokenKind::MinusAssign
        | TokenKind::AsteriskAssign
        | TokenKind::SlashAssign
        | TokenKind::PercentAssign
        | TokenKind::FatArrow => Precedence::Assign,
        TokenKind::DotDot => Precedence::Range,
        TokenKind::Or => Precedence::CondOr,
        TokenKind::And => Precedence::CondAnd,
        TokenKind::Eq | TokenKind::NotEq => Precedence::Equals,
        TokenKind::Lt | TokenKind::Le | TokenKind::Gt | TokenKind::Ge | TokenKind::In => {
            Precedence::LessGreater
        },
        TokenKind::Plus | TokenKind::Minus => Precedence::Sum,
        TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent | TokenKind::Power => {
            Precedence::Product
        },
        TokenKind::Match | TokenKind::NotMatch => Precedence::RegexMatch,
        TokenKind::Increment | TokenKind::Decrement => Precedence::Increment,
        TokenKind::LParen | TokenKind::Dot | TokenKind::LBracket => Precedence::Call,
        _ => Precedence::Lowest,
    }
}

/// A Pratt parser over a pre-lexed token stream.
///
/// Syntax errors are accumulated (together with the offending source
/// line) and parsing continues best-effort at the next statement
/// boundary, so a single pass reports as much as possible. The caller
/// decides what to do with a partial program.
///
/// # Example
/// ```
/// use magpie::interpreter::{lexer::Lexer, parser::core::Parser};
///
/// let mut parser = Parser::new(Lexer::new("a ** b ** c"));
/// let program = parser.parse_program();
/// assert!(parser.errors().is_empty());
/// // ** is right-associative.
/// assert_eq!(program.to_string(), "(a ** (b ** c))");
/// ```
pub struct Parser {
    tokens:       Vec<Token>,
    pos:          usize,
    errors:       Vec<ParseError>,
    error_lines:  Vec<String>,
    source_lines: Vec<String>,
    filename:     String,
    pub(super) loop_depth:   usize,
    pub(super) switch_depth: usize,
    pub(super) import_stack: Vec<PathBuf>,
}

impl Parser {
    /// Creates a parser by draining `lexer`.
    #[must_use]
    pub fn new(mut lexer: Lexer) -> Self {
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        let filename = lexer.filename().to_string();
        let mut import_stack = Vec::new();
        if !filename.is_empty() {
            let path = PathBuf::from(&filename);
            import_stack.push(path.canonicalize().unwrap_or(path));
        }

        Self { tokens,
               pos: 0,
               errors: Vec::new(),
               error_lines: Vec::new(),
               source_lines: lexer.source().lines().map(str::to_string).collect(),
               filename,
               loop_depth: 0,
               switch_depth: 0,
               import_stack }
    }

    /// Parses the whole token stream into a [`Program`]. Top-level
    /// imports are hoisted and de-duplicated by path; errors are
    /// recorded and parsing resumes at the next statement boundary.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        let mut seen = HashSet::new();

        while !self.cur_is(TokenKind::Eof) {
            match self.parse_statement() {
                Ok(Statement::Import(import)) => {
                    if seen.insert(import.path.clone()) {
                        program.imports.push(import);
                    }
                },
                Ok(statement) => program.statements.push(statement),
                Err(error) => {
                    self.record_error(error);
                    self.synchronize();
                },
            }
            self.advance();
        }

        program
    }

    /// The accumulated syntax errors.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The source line text for each accumulated error, in the same
    /// order as [`Parser::errors`].
    #[must_use]
    pub fn error_lines(&self) -> &[String] {
        &self.error_lines
    }

    /// The name of the file being parsed, or the empty string.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub(super) fn record_error(&mut self, error: ParseError) {
        let line = error.line();
        let text = line.checked_sub(1)
                       .and_then(|idx| self.source_lines.get(idx))
                       .cloned()
                       .unwrap_or_default();
        self.errors.push(error);
        self.error_lines.push(text);
    }

    pub(super) fn append_errors(&mut self, errors: Vec<ParseError>, lines: Vec<String>) {
        self.errors.extend(errors);
        self.error_lines.extend(lines);
    }

    pub(super) fn take_errors(&mut self) -> (Vec<ParseError>, Vec<String>) {
        (std::mem::take(&mut self.errors), std::mem::take(&mut self.error_lines))
    }

    /// Skips ahead to the next statement boundary after an error.
    fn synchronize(&mut self) {
        while !matches!(self.cur().kind,
                        TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof)
        {
            self.advance();
        }
    }

    pub(super) fn cur(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(super) fn peek(&self) -> &Token {
        &self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
    }

    pub(super) fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    pub(super) fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur().kind == kind
    }

    pub(super) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    pub(super) fn cur_precedence(&self) -> Precedence {
        precedence_of(self.cur().kind)
    }

    pub(super) fn peek_precedence(&self) -> Precedence {
        precedence_of(self.peek().kind)
    }

    /// Advances when the next token matches, errors otherwise.
    pub(super) fn expect_peek(&mut self, kind: TokenKind) -> ParseResult<()> {
        if self.peek_is(kind) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken { expected: kind.to_string(),
                                              found:    self.peek().kind.to_string(),
                                              line:     self.cur().pos.line, })
        }
    }

    /// Parses a `{ … }` block. On entry the current token is the
    /// opening brace; on exit it is the closing brace.
    pub(super) fn parse_block(&mut self) -> ParseResult<Block> {
        let pos = self.cur().pos;
        self.advance();

        let mut statements = Vec::new();
        while !self.cur_is(TokenKind::RBrace) {
            if self.cur_is(TokenKind::Eof) {
                return Err(ParseError::UnexpectedToken { expected: "}".to_string(),
                                                         found:    "EOF".to_string(),
                                                         line:     self.cur().pos.line, });
            }
            statements.push(self.parse_statement()?);
            self.advance();
        }

        Ok(Block { statements,
                   pos,
                   end_pos: self.cur().pos })
    }
}
