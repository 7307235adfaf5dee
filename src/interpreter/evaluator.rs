/// Core evaluation logic.
///
/// Contains the `Evaluator`, the `Control` flow type threaded through
/// every evaluation, program/import/block evaluation, `let` and
/// multi-assignment, `if`/`switch`, `try`/`catch`/`finally` and
/// identifier resolution.
pub mod core;

/// Prefix and postfix operator evaluation.
///
/// Handles `+x`, `-x`, `!x` and the postfix `++`/`--` which mutate a
/// binding and return the pre-mutation value.
pub mod unary;

/// Infix operator evaluation.
///
/// Implements arithmetic and comparisons on numbers and strings,
/// chained comparisons, short-circuit `&&`/`||`, membership `in`,
/// integer ranges `..`, regex matching `=~`/`!~` and indexing.
pub mod binary;

/// Assignment evaluation.
///
/// Covers plain assignment to identifiers, element assignment with
/// array auto-grow, string codepoint replacement, hash insertion,
/// struct fields, and the compound operators.
pub mod assign;

/// Call evaluation.
///
/// Applies closures, builtins and host functions; unboxes variadic
/// call sites and boxes variadic parameters; instantiates structs and
/// dispatches method calls.
pub mod call;

/// Loop evaluation.
///
/// Runs the C-style `for`, `for … in`, `for key, value in …`, the
/// forever loop, `while` and `do`, with `break`/`continue`/`return`
/// handling.
pub mod loops;

/// Builtin functions.
///
/// `print`, `println`, `printf`, `say`, `len`, `open` and `type`,
/// plus the command-literal runner.
pub mod builtin;
