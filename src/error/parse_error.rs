#[derive(Debug, Clone)]
/// Represents all errors that can occur during lexing or parsing.
pub enum ParseError {
    /// The lexer produced an ILLEGAL token (unterminated string, regex
    /// or multiline comment, or a stray character).
    IllegalToken {
        /// Description carried by the token.
        literal: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Found a different token than the grammar expected.
    UnexpectedToken {
        /// What the parser expected.
        expected: String,
        /// The token actually found.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// No prefix parse rule exists for this token.
    NoPrefixParse {
        /// The offending token.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A numeric literal could not be parsed as a float.
    NumberLiteral {
        /// The offending literal text.
        literal: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Tried to assign to `self`.
    SelfAssignment {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `break` appeared outside of a loop.
    BreakOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `continue` appeared outside of a loop.
    ContinueOutsideLoop {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `fallthrough` appeared outside of a switch case.
    FallthroughOutsideSwitch {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `fallthrough` was not the last statement of its case block.
    FallthroughNotLast {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `fallthrough` appeared in the final case of a switch.
    FallthroughFinalCase {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A switch carried more than one `default` arm.
    MultipleDefaults {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A comparison chain used more than two comparison operators.
    TooManyComparisons {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An arrow function's left-hand side was not a parameter list.
    ArrowParameters {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A decorator was not followed by a named function or another
    /// decorator.
    DecoratorTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `...` was attached to something other than the last
    /// parameter/argument.
    EllipsisPosition {
        /// The source line where the error occurred.
        line: usize,
    },
    /// `tailcall` was not followed by a function call.
    TailCallTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Both names of a `for key, value in …` loop were `_`.
    ForLoopVariables {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An imported `.mp` file could not be located.
    ImportNotFound {
        /// The import path as written.
        path: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// An import cycle was detected.
    CircularImport {
        /// The import path that closed the cycle.
        path: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A switch statement was not closed before end of input.
    UnterminatedSwitch {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Some other kind of parse error, with a custom message.
    Other {
        /// Details about the parse error.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl ParseError {
    /// The source line the error points at.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::IllegalToken { line, .. }
            | Self::UnexpectedToken { line, .. }
            | Self::NoPrefixParse { line, .. }
            | Self::NumberLiteral { line, .. }
            | Self::SelfAssignment { line }
            | Self::BreakOutsideLoop { line }
            | Self::ContinueOutsideLoop { line }
            | Self::FallthroughOutsideSwitch { line }
            | Self::FallthroughNotLast { line }
            | Self::FallthroughFinalCase { line }
            | Self::MultipleDefaults { line }
            | Self::TooManyComparisons { line }
            | Self::ArrowParameters { line }
            | Self::DecoratorTarget { line }
            | Self::EllipsisPosition { line }
            | Self::TailCallTarget { line }
            | Self::ForLoopVariables { line }
            | Self::ImportNotFound { line, .. }
            | Self::CircularImport { line, .. }
            | Self::UnterminatedSwitch { line }
            | Self::Other { line, .. } => *line,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalToken { literal, line } => {
                write!(f, "Error on line {line}: Illegal token: {literal}.")
            },
            Self::UnexpectedToken { expected, found, line } => write!(f,
                "Error on line {line}: Expected next token to be {expected}, got {found} instead."),
            Self::NoPrefixParse { token, line } => {
                write!(f, "Error on line {line}: No prefix parse rule for '{token}'.")
            },
            Self::NumberLiteral { literal, line } => {
                write!(f, "Error on line {line}: Could not parse '{literal}' as a number.")
            },
            Self::SelfAssignment { line } => {
                write!(f, "Error on line {line}: 'self' can not be assigned.")
            },
            Self::BreakOutsideLoop { line } => {
                write!(f, "Error on line {line}: 'break' outside of loop context.")
            },
            Self::ContinueOutsideLoop { line } => {
                write!(f, "Error on line {line}: 'continue' outside of loop context.")
            },
            Self::FallthroughOutsideSwitch { line } => {
                write!(f, "Error on line {line}: 'fallthrough' outside of switch context.")
            },
            Self::FallthroughNotLast { line } => write!(f,
                "Error on line {line}: 'fallthrough' is only allowed as the last statement of a case block."),
            Self::FallthroughFinalCase { line } => {
                write!(f, "Error on line {line}: Cannot fallthrough the final case of a switch.")
            },
            Self::MultipleDefaults { line } => {
                write!(f, "Error on line {line}: More than one default case is not allowed.")
            },
            Self::TooManyComparisons { line } => {
                write!(f, "Error on line {line}: Too many chained comparison operators.")
            },
            Self::ArrowParameters { line } => write!(f,
                "Error on line {line}: Arrow function expects a list of identifiers as arguments."),
            Self::DecoratorTarget { line } => write!(f,
                "Error on line {line}: A decorator must be followed by a named function or another decorator."),
            Self::EllipsisPosition { line } => {
                write!(f, "Error on line {line}: Can only have '...' after the last parameter.")
            },
            Self::TailCallTarget { line } => {
                write!(f, "Error on line {line}: 'tailcall' must be followed by a function call.")
            },
            Self::ForLoopVariables { line } => {
                write!(f, "Error on line {line}: For loop's key and value are both '_'.")
            },
            Self::ImportNotFound { path, line } => {
                write!(f, "Error on line {line}: No file or directory: {path}.mp.")
            },
            Self::CircularImport { path, line } => {
                write!(f, "Error on line {line}: Circular import of '{path}'.")
            },
            Self::UnterminatedSwitch { line } => {
                write!(f, "Error on line {line}: Unterminated switch statement.")
            },
            Self::Other { message, line } => write!(f, "Error on line {line}: {message}"),
        }
    }
}

impl std::error::Error for ParseError {}
