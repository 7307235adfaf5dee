/// The parser core: token cursor, precedence table and Pratt loop.
///
/// Contains the `Parser` type, the precedence ladder, expression
/// dispatch and the shared token-window helpers used by the statement
/// and expression submodules.
pub mod core;

/// Statement parsing.
///
/// Handles `let`, multi-assignment, `return`, `tailcall`, blocks,
/// `struct`, `try`/`catch`/`finally`, `throw`, `import` resolution and
/// decorator desugaring.
pub mod statement;

/// Expression parsing.
///
/// Implements the prefix and infix rules: literals, prefix and infix
/// operators, chained comparisons, grouping and tuples, arrays, hashes,
/// functions and arrow functions, calls, indexing, method calls,
/// `if`/`switch` and assignment.
pub mod expression;

/// Loop parsing.
///
/// Covers the C-style `for`, `for … in`, `for key, value in …`, the
/// bare `for { … }` forever loop, `while` and `do`, together with the
/// loop-depth bookkeeping that validates `break` and `continue`.
pub mod loops;
