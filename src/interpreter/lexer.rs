use logos::Logos;

/// A location in the source text.
///
/// Lines and columns are 1-based; `offset` is the byte offset into the
/// source. Positions are attached to every token and carried through the
/// AST for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// 1-based source line.
    pub line:   usize,
    /// 1-based column within the line.
    pub col:    usize,
    /// Byte offset from the start of the source.
    pub offset: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// The kind of a lexed token.
///
/// This is the closed token set consumed by the parser: punctuation and
/// operators, keywords, and the literal classes (`Number`, `Identifier`,
/// `Str`, `Regex`, `Cmd`), plus the `Illegal` and `Eof` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Power,
    Increment,
    Decrement,
    Assign,
    PlusAssign,
    MinusAssign,
    AsteriskAssign,
    SlashAssign,
    PercentAssign,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Bang,
    Match,
    NotMatch,
    FatArrow,
    DotDot,
    Ellipsis,
    Dot,
    // punctuation
    Comma,
    Colon,
    Semicolon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    At,
    // literal classes
    Number,
    Identifier,
    Str,
    Regex,
    Cmd,
    // keywords
    Let,
    Return,
    Function,
    If,
    Else,
    While,
    Do,
    For,
    In,
    Break,
    Continue,
    Import,
    Struct,
    Switch,
    Case,
    Default,
    Fallthrough,
    Try,
    Catch,
    Finally,
    Throw,
    TailCall,
    True,
    False,
    Nil,
    // markers
    Illegal,
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Power => "**",
            Self::Increment => "++",
            Self::Decrement => "--",
            Self::Assign => "=",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::AsteriskAssign => "*=",
            Self::SlashAssign => "/=",
            Self::PercentAssign => "%=",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Bang => "!",
            Self::Match => "=~",
            Self::NotMatch => "!~",
            Self::FatArrow => "=>",
            Self::DotDot => "..",
            Self::Ellipsis => "...",
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::At => "@",
            Self::Number => "NUMBER",
            Self::Identifier => "IDENTIFIER",
            Self::Str => "STRING",
            Self::Regex => "REGEX",
            Self::Cmd => "CMD",
            Self::Let => "let",
            Self::Return => "return",
            Self::Function => "fn",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Do => "do",
            Self::For => "for",
            Self::In => "in",
            Self::Break => "break",
            Self::Continue => "continue",
            Self::Import => "import",
            Self::Struct => "struct",
            Self::Switch => "switch",
            Self::Case => "case",
            Self::Default => "default",
            Self::Fallthrough => "fallthrough",
            Self::Try => "try",
            Self::Catch => "catch",
            Self::Finally => "finally",
            Self::Throw => "throw",
            Self::TailCall => "tailcall",
            Self::True => "true",
            Self::False => "false",
            Self::Nil => "nil",
            Self::Illegal => "ILLEGAL",
            Self::Eof => "EOF",
        };
        write!(f, "{text}")
    }
}

/// A single lexeme: its kind, its literal text and where it starts.
///
/// For `Str` tokens the literal is the unescaped content, for `Regex`
/// tokens it is the pattern with any `(?flags)` prefix already applied,
/// and for `Illegal` tokens it is a human-readable description of what
/// went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:    TokenKind,
    pub literal: String,
    pub pos:     Position,
}

/// The raw lexeme table.
///
/// Whitespace, line comments (`//` and `#`) and well-formed `/* */`
/// comments are skipped here. Everything context-sensitive (regex
/// literals, unterminated constructs, end-of-file) is layered on top by
/// [`Lexer`].
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"/\*([^*]|\*[^/])*\*/")]
enum RawToken {
    #[token("**")]
    Power,
    #[token("++")]
    Increment,
    #[token("--")]
    Decrement,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    AsteriskAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token("==")]
    Eq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    Le,
    #[token(">=")]
    Ge,
    #[token("&&")]
    And,
    #[token("||")]
    Or,
    #[token("=~")]
    Match,
    #[token("!~")]
    NotMatch,
    #[token("=>")]
    FatArrow,
    #[token("...")]
    Ellipsis,
    #[token("..")]
    DotDot,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("=")]
    Assign,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("@")]
    At,
    /// Numeric literals such as `42` or `10.5`. A `.` not followed by a
    /// digit terminates the number, which is what makes `10.floor()`
    /// lex as a method call instead of a malformed literal.
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,
    /// Identifiers start with a letter, `_` or `$` and continue with
    /// letters, digits, `_` or `$`.
    #[regex(r"[\p{L}_$][\p{L}\p{N}_$]*")]
    Identifier,
    /// Double-quoted strings with `\b \f \r \n \t` escapes; any other
    /// escaped character stands for itself. A raw newline inside the
    /// literal fails the match and surfaces as an ILLEGAL token.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, lex_string)]
    Str(String),
    /// Backtick command literals.
    #[regex(r"`[^`]*`", lex_cmd)]
    Cmd(String),
    #[token("let")]
    Let,
    #[token("return")]
    Return,
    #[token("fn")]
    Function,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("import")]
    Import,
    #[token("struct")]
    Struct,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("fallthrough")]
    Fallthrough,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("tailcall")]
    TailCall,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("nil")]
    Nil,
}

fn lex_string(lex: &mut logos::Lexer<RawToken>) -> String {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

fn lex_cmd(lex: &mut logos::Lexer<RawToken>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].to_string()
}

/// Resolves the `\b \f \r \n \t` escapes; any other escaped character
/// stands for itself (so `\"` is `"` and `\\` is `\`).
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{0008}'),
            Some('f') => out.push('\u{000C}'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => {},
        }
    }
    out
}

/// Produces [`Token`]s on demand from a source string.
///
/// The lexer wraps the raw [`logos`] automaton with the pieces the
/// language needs on top of plain tokenization:
///
/// - source positions computed from a line-start table,
/// - a previous-token memory, so that `/` starts a regular-expression
///   literal unless the preceding token was `)`, `]`, an identifier or
///   a number (in which case it is division),
/// - ILLEGAL tokens for unterminated strings, regexes, command
///   literals and multiline comments,
/// - an explicit EOF token once the input is exhausted.
///
/// # Example
/// ```
/// use magpie::interpreter::lexer::{Lexer, TokenKind};
///
/// let mut lexer = Lexer::new("let x = 10.floor()");
/// let mut kinds = Vec::new();
/// loop {
///     let token = lexer.next_token();
///     if token.kind == TokenKind::Eof {
///         break;
///     }
///     kinds.push(token.kind);
/// }
/// assert_eq!(kinds,
///            vec![TokenKind::Let,
///                 TokenKind::Identifier,
///                 TokenKind::Assign,
///                 TokenKind::Number,
///                 TokenKind::Dot,
///                 TokenKind::Identifier,
///                 TokenKind::LParen,
///                 TokenKind::RParen]);
/// ```
pub struct Lexer<'a> {
    source:      &'a str,
    filename:    String,
    inner:       logos::Lexer<'a, RawToken>,
    line_starts: Vec<usize>,
    prev:        Option<TokenKind>,
}

/// Regex flags recognized after the closing `/` of a regex literal.
const REGEX_FLAGS: &str = "imsU";

impl<'a> Lexer<'a> {
    /// Creates a lexer over `source`. A leading byte-order mark is
    /// consumed silently.
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut line_starts = vec![0];
        for (idx, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { source,
               filename: String::new(),
               inner: RawToken::lexer(source),
               line_starts,
               prev: None }
    }

    /// Creates a lexer that remembers the name of the file it reads
    /// from, used by parser diagnostics and import resolution.
    #[must_use]
    pub fn with_filename(source: &'a str, filename: &str) -> Self {
        let mut lexer = Self::new(source);
        lexer.filename = filename.to_string();
        lexer
    }

    /// The filename given at construction, or the empty string.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The source text being lexed (with any BOM already stripped).
    #[must_use]
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Returns the next token, producing `Eof` forever once the input
    /// is exhausted. Lexical problems are reported in-band as `Illegal`
    /// tokens whose literal describes the problem.
    pub fn next_token(&mut self) -> Token {
        let Some(raw) = self.inner.next() else {
            return Token { kind:    TokenKind::Eof,
                           literal: "<EOF>".to_string(),
                           pos:     self.position_at(self.source.len()), };
        };

        let span = self.inner.span();
        let pos = self.position_at(span.start);

        let token = match raw {
            Err(()) => {
                let literal = self.describe_illegal(span.start);
                // An unterminated string gives up on the rest of the
                // line, an unterminated command literal on the rest of
                // the input; a stray character consumes only itself.
                match self.source[span.start..].chars().next() {
                    Some('"') => {
                        let rest = self.inner.remainder();
                        let stop = rest.find('\n').unwrap_or(rest.len());
                        self.inner.bump(stop);
                    },
                    Some('`') => {
                        let rest = self.inner.remainder().len();
                        self.inner.bump(rest);
                    },
                    _ => {},
                }
                Token { kind: TokenKind::Illegal, literal, pos }
            },
            // A '/' immediately followed by '*' can only be an
            // unterminated multiline comment: terminated ones were
            // already skipped by the raw automaton.
            Ok(RawToken::Slash) if self.inner.remainder().starts_with('*') => {
                let trailing = self.inner.remainder().len();
                self.inner.bump(trailing);
                Token { kind:    TokenKind::Illegal,
                        literal: "unterminated multiline comment".to_string(),
                        pos }
            },
            Ok(RawToken::Slash | RawToken::SlashAssign) if self.regex_allowed() => {
                self.read_regex(span.start, span.end, pos)
            },
            Ok(raw) => {
                let kind = kind_of(&raw);
                let literal = match raw {
                    RawToken::Str(text) | RawToken::Cmd(text) => text,
                    _ => self.inner.slice().to_string(),
                };
                Token { kind, literal, pos }
            },
        };

        self.prev = Some(token.kind);
        token
    }

    /// Division is only possible after an operand; everywhere else a
    /// `/` opens a regex literal.
    fn regex_allowed(&self) -> bool {
        !matches!(self.prev,
                  Some(TokenKind::RParen
                       | TokenKind::RBracket
                       | TokenKind::Identifier
                       | TokenKind::Number))
    }

    /// Reads a regex literal whose opening `/` sits at byte `start`.
    /// Collects trailing `i m s U` flags and prepends them to the
    /// pattern as `(?flags)`. The raw automaton has already consumed up
    /// to `matched_end`; the difference is bumped off its input.
    fn read_regex(&mut self, start: usize, matched_end: usize, pos: Position) -> Token {
        let mut body = String::new();
        let mut closing = None;

        let mut chars = self.source[start + 1..].char_indices();
        while let Some((idx, ch)) = chars.next() {
            match ch {
                '\\' => {
                    body.push(ch);
                    if let Some((_, escaped)) = chars.next() {
                        body.push(escaped);
                    }
                },
                '/' => {
                    closing = Some(start + 1 + idx);
                    break;
                },
                _ => body.push(ch),
            }
        }

        let Some(closing) = closing else {
            let trailing = self.source.len() - matched_end;
            self.inner.bump(trailing);
            return Token { kind:    TokenKind::Illegal,
                           literal: "unterminated regular expression".to_string(),
                           pos };
        };

        let mut end = closing + 1;
        let mut flags = String::new();
        for ch in self.source[end..].chars() {
            if !REGEX_FLAGS.contains(ch) {
                break;
            }
            if !flags.contains(ch) {
                flags.push(ch);
            }
            end += ch.len_utf8();
        }

        let literal = if flags.is_empty() {
            body
        } else {
            format!("(?{flags}){body}")
        };

        self.inner.bump(end - matched_end);
        Token { kind: TokenKind::Regex, literal, pos }
    }

    /// Builds the message carried by an `Illegal` token, looking at the
    /// source to tell unterminated literals from stray characters.
    fn describe_illegal(&self, offset: usize) -> String {
        match self.source[offset..].chars().next() {
            Some('"') => "unterminated string".to_string(),
            Some('`') => "unterminated command literal".to_string(),
            Some(ch) => format!("unexpected character '{ch}'"),
            None => "unexpected end of input".to_string(),
        }
    }

    fn position_at(&self, offset: usize) -> Position {
        let idx = self.line_starts.partition_point(|start| *start <= offset) - 1;
        Position { line: idx + 1,
                   col: offset - self.line_starts[idx] + 1,
                   offset }
    }
}

const fn kind_of(raw: &RawToken) -> TokenKind {
    match raw {
        RawToken::Power => TokenKind::Power,
        RawToken::Increment => TokenKind::Increment,
        RawToken::Decrement => TokenKind::Decrement,
        RawToken::PlusAssign => TokenKind::PlusAssign,
        RawToken::MinusAssign => TokenKind::MinusAssign,
        RawToken::AsteriskAssign => TokenKind::AsteriskAssign,
        RawToken::SlashAssign => TokenKind::SlashAssign,
        RawToken::PercentAssign => TokenKind::PercentAssign,
        RawToken::Eq => TokenKind::Eq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::Le => TokenKind::Le,
        RawToken::Ge => TokenKind::Ge,
        RawToken::And => TokenKind::And,
        RawToken::Or => TokenKind::Or,
        RawToken::Match => TokenKind::Match,
        RawToken::NotMatch => TokenKind::NotMatch,
        RawToken::FatArrow => TokenKind::FatArrow,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::DotDot => TokenKind::DotDot,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Asterisk => TokenKind::Asterisk,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Assign => TokenKind::Assign,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Bang => TokenKind::Bang,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Semicolon => TokenKind::Semicolon,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::At => TokenKind::At,
        RawToken::Number => TokenKind::Number,
        RawToken::Identifier => TokenKind::Identifier,
        RawToken::Str(_) => TokenKind::Str,
        RawToken::Cmd(_) => TokenKind::Cmd,
        RawToken::Let => TokenKind::Let,
        RawToken::Return => TokenKind::Return,
        RawToken::Function => TokenKind::Function,
        RawToken::If => TokenKind::If,
        RawToken::Else => TokenKind::Else,
        RawToken::While => TokenKind::While,
        RawToken::Do => TokenKind::Do,
        RawToken::For => TokenKind::For,
        RawToken::In => TokenKind::In,
        RawToken::Break => TokenKind::Break,
        RawToken::Continue => TokenKind::Continue,
        RawToken::Import => TokenKind::Import,
        RawToken::Struct => TokenKind::Struct,
        RawToken::Switch => TokenKind::Switch,
        RawToken::Case => TokenKind::Case,
        RawToken::Default => TokenKind::Default,
        RawToken::Fallthrough => TokenKind::Fallthrough,
        RawToken::Try => TokenKind::Try,
        RawToken::Catch => TokenKind::Catch,
        RawToken::Finally => TokenKind::Finally,
        RawToken::Throw => TokenKind::Throw,
        RawToken::TailCall => TokenKind::TailCall,
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Nil => TokenKind::Nil,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push(token.kind);
        }
    }

    fn literals(source: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(source);
        let mut out = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                return out;
            }
            out.push((token.kind, token.literal));
        }
    }

    #[test]
    fn operators_and_keywords() {
        assert_eq!(kinds("let x = 1 ** 2 ++ --"),
                   vec![TokenKind::Let,
                        TokenKind::Identifier,
                        TokenKind::Assign,
                        TokenKind::Number,
                        TokenKind::Power,
                        TokenKind::Number,
                        TokenKind::Increment,
                        TokenKind::Decrement]);
    }

    #[test]
    fn slash_is_division_after_operands() {
        assert_eq!(kinds("a / b"),
                   vec![TokenKind::Identifier, TokenKind::Slash, TokenKind::Identifier]);
        assert_eq!(kinds("(a) / b"),
                   vec![TokenKind::LParen,
                        TokenKind::Identifier,
                        TokenKind::RParen,
                        TokenKind::Slash,
                        TokenKind::Identifier]);
    }

    #[test]
    fn slash_is_regex_elsewhere() {
        let tokens = literals(r"x = /\d+/i");
        assert_eq!(tokens[2].0, TokenKind::Regex);
        assert_eq!(tokens[2].1, r"(?i)\d+");
    }

    #[test]
    fn number_stops_before_method_call() {
        assert_eq!(kinds("10.5.floor()"),
                   vec![TokenKind::Number,
                        TokenKind::Dot,
                        TokenKind::Identifier,
                        TokenKind::LParen,
                        TokenKind::RParen]);
    }

    #[test]
    fn string_escapes() {
        let tokens = literals(r#""a\tb\"c""#);
        assert_eq!(tokens[0].1, "a\tb\"c");
    }

    #[test]
    fn unterminated_constructs_are_illegal() {
        assert_eq!(kinds("\"abc"), vec![TokenKind::Illegal]);
        assert_eq!(kinds("/* never closed"), vec![TokenKind::Illegal]);
        assert_eq!(kinds("= /abc"), vec![TokenKind::Assign, TokenKind::Illegal]);
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let mut lexer = Lexer::new("let x\nx + 1");
        let _let = lexer.next_token();
        let x = lexer.next_token();
        assert_eq!((x.pos.line, x.pos.col), (1, 5));
        let x2 = lexer.next_token();
        assert_eq!((x2.pos.line, x2.pos.col), (2, 1));
    }

    #[test]
    fn bom_is_skipped() {
        assert_eq!(kinds("\u{feff}let"), vec![TokenKind::Let]);
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(kinds("1 // c\n# d\n/* e */ 2"),
                   vec![TokenKind::Number, TokenKind::Number]);
    }
}
