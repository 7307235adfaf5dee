//! # magpie
//!
//! magpie is a small dynamically-typed expression/statement language
//! implemented as a tree-walking interpreter. The pipeline is a lexer
//! producing positioned tokens, a Pratt parser producing an AST, and a
//! recursive evaluator over lexically nested scopes with first-class
//! closures, arrays, tuples, hashes, structs with method dispatch,
//! regular expressions, `try`/`catch`/`finally` and host-function
//! registration.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use std::{path::Path, rc::Rc};

use crate::{error::ParseError,
            interpreter::{evaluator::core::Evaluator,
                          host::ResourceProvider,
                          lexer::Lexer,
                          parser::core::Parser,
                          scope::{OutputWriter, Scope},
                          value::core::Value}};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` and `Statement` enums and related
/// types that represent the syntactic structure of source code as a
/// tree. The AST is built by the parser and walked by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language
///   constructs.
/// - Attaches source positions to AST nodes for error reporting.
/// - Renders nodes back to source-equivalent text.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing,
/// parsing, or evaluating code. It standardizes error reporting and
/// carries detailed information about failures, including error kinds,
/// descriptions, and source locations for debugging and user feedback.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser,
///   evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Supports integration with standard error handling traits and
///   reporting utilities.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, scopes, error handling and the host-integration
/// surface to provide a complete runtime for source code evaluation.
/// It exposes the public API for interpreting and executing programs.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, and
///   value types.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities shared across the interpreter.
///
/// Currently this is the `%`-style format interpreter used by the
/// `printf` builtin.
pub mod util;

/// Evaluates a source string against a fresh root scope and returns
/// the program's value.
///
/// Parser errors abort evaluation; the first one is returned (the full
/// list is available by driving [`Parser`] directly). Output produced
/// by `print` and friends goes to `writer`.
///
/// # Errors
/// Returns an error if parsing or evaluation fails.
///
/// # Examples
/// ```
/// use std::{cell::RefCell, rc::Rc};
///
/// let writer = Rc::new(RefCell::new(Vec::<u8>::new()));
/// let value = magpie::run_source("2 + 2 ** 2 ** 3", writer.clone()).unwrap();
/// assert_eq!(value.to_string(), "258");
///
/// // Runtime failures are reported as errors.
/// assert!(magpie::run_source("1 / 0", writer).is_err());
/// ```
pub fn run_source(source: &str,
                  writer: OutputWriter)
                  -> Result<Value, Box<dyn std::error::Error>> {
    run(Lexer::new(source), writer)
}

/// Evaluates a `.mp` file; imports resolve relative to it.
///
/// # Errors
/// Returns an error if the file cannot be read, or if parsing or
/// evaluation fails.
pub fn run_file(path: &Path, writer: OutputWriter) -> Result<Value, Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    run(Lexer::with_filename(&source, &path.to_string_lossy()), writer)
}

/// Runs the `main` resource supplied by an attachment provider, if
/// there is one. Returns `None` when the provider has no `main`
/// resource, in which case the caller falls back to its normal input.
pub fn run_with_resources(provider: &dyn ResourceProvider,
                          writer: OutputWriter)
                          -> Option<Result<Value, Box<dyn std::error::Error>>> {
    if !provider.list().iter().any(|name| name == "main") {
        return None;
    }
    let bytes = provider.get_resource("main")?;
    let source = String::from_utf8_lossy(&bytes).into_owned();
    Some(run_source(&source, writer))
}

fn run(lexer: Lexer, writer: OutputWriter) -> Result<Value, Box<dyn std::error::Error>> {
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();
    if let Some(error) = parser.errors().first() {
        return Err(Box::new(error.clone()));
    }

    let evaluator = Evaluator::new();
    let scope = Scope::root(writer);
    evaluator.eval_program(&program, &scope).map_err(|err| {
                                                let boxed: Box<dyn std::error::Error> =
                                                    Box::new(err);
                                                boxed
                                            })
}

/// Collects every parse error of a source string, used by drivers that
/// want to report all diagnostics at once.
#[must_use]
pub fn check_source(source: &str) -> Vec<ParseError> {
    let mut parser = Parser::new(Lexer::new(source));
    let _ = parser.parse_program();
    parser.errors().to_vec()
}
