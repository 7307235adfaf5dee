/// `%`-style format rendering.
///
/// This module implements the small format interpreter behind the
/// `printf` builtin: flags, width and precision, and the verbs
/// `%v %s %t %d %g %f %_ %%`. It is deliberately independent of the
/// evaluator so it can be tested (and reused) on plain values.
pub mod format;
