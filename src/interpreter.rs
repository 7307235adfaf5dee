/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST, evaluates expressions and statements,
/// dispatches operators and calls, manages control flow (loops,
/// `switch`, `try`/`throw`) and produces runtime values. It is the
/// core execution engine of the interpreter.
///
/// # Responsibilities
/// - Evaluates AST nodes, performing all supported operations.
/// - Hosts the builtin functions and the global table.
/// - Reports runtime errors such as division by zero or unknown
///   identifiers.
pub mod evaluator;
/// The host integration surface.
///
/// Lets an embedding program register functions and variables that
/// become visible inside the language, and supply embedded program
/// sources. The evaluator only ever sees the small `HostCallable`
/// trait, so hosts without reflection write plain closures.
///
/// # Responsibilities
/// - Defines `HostCallable`, `HostValue` and `ResourceProvider`.
/// - Registers host namespaces as globals.
/// - Captures host-side panics as runtime errors.
pub mod host;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of
/// tokens, each corresponding to meaningful language elements such as
/// numbers, identifiers, operators, delimiters, and keywords. This is
/// the first stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with type and
///   source location.
/// - Handles numeric, string, regex and command literals.
/// - Reports lexical errors in-band as ILLEGAL tokens.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from
/// tokens.
///
/// The parser processes the token stream produced by the lexer and
/// constructs an AST that represents the syntactic structure of
/// expressions and statements. This enables later phases to analyze
/// and execute user code.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions,
///   statements).
/// - Validates grammar and syntax, accumulating errors with location
///   info.
/// - Resolves imports and desugars decorators.
pub mod parser;
/// Lexical scopes.
///
/// Defines the scope chain: nested name→value environments with a
/// parallel struct-declaration map and the inherited output writer.
/// Closures keep their defining scope alive; `import` copies a
/// module's exported names between scopes.
pub mod scope;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares all the value types used during interpretation
/// and execution, such as numbers, booleans, strings, arrays, tuples,
/// hashes, closures, structs, regular expressions and file handles. It
/// also provides inspection, truthiness, equality and the intrinsic
/// method tables.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported value variants.
/// - Implements inspect rendering, truthiness and equality.
/// - Provides hash keys and per-kind intrinsic methods.
pub mod value;
