/// Methods on `Number` values.
pub mod number;
/// Methods on `String` values.
pub mod string;
/// Methods on `Array` values.
pub mod array;
/// Methods on `Hash` values.
pub mod hash;
/// Methods on `Tuple` values.
pub mod tuple;
/// Methods on `Boolean` values.
pub mod boolean;
/// Methods on `RegEx` values.
pub mod regex;
/// Methods on `File` values.
pub mod file;
/// Methods on the `os` facade.
pub mod os;

use std::rc::Rc;

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult, value::core::Value}};

/// Dispatches `receiver.method(args)` to the intrinsic method table of
/// the receiver's kind. Struct receivers are handled by the evaluator
/// (their methods live in the instance scope, not here).
pub fn call_method(line: usize, receiver: &Value, method: &str, args: Vec<Value>)
                   -> EvalResult<Value> {
    match receiver {
        Value::Number(n) => number::call(line, *n, method, &args),
        Value::Str(s) => string::call(line, s, method, &args),
        Value::Array(members) => array::call(line, members, method, &args),
        Value::Hash(pairs) => hash::call(line, pairs, method, &args),
        Value::Tuple(members) => tuple::call(line, members, method, &args),
        Value::Boolean(b) => boolean::call(line, *b, method, &args),
        Value::Regex(re) => regex::call(line, re, method, &args),
        Value::File(file) => file::call(line, file, method, &args),
        Value::Os => os::call(line, method, &args),
        _ => Err(no_method(line, method, receiver)),
    }
}

pub(crate) fn no_method(line: usize, method: &str, receiver: &Value) -> RuntimeError {
    RuntimeError::NoMethod { method:    method.to_string(),
                             type_name: receiver.type_name().to_string(),
                             line }
}

/// Checks an exact argument count.
pub(crate) fn want_arity(line: usize, expected: usize, args: &[Value]) -> EvalResult<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::WrongArgumentCount { expected: expected.to_string(),
                                               got:      args.len(),
                                               line })
    }
}

/// Extracts a number argument or reports its position and type.
pub(crate) fn want_number(line: usize, method: &str, position: &str, value: &Value)
                          -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(RuntimeError::ArgumentType { position: position.to_string(),
                                                  method:   method.to_string(),
                                                  expected: "number".to_string(),
                                                  got:      other.type_name().to_string(),
                                                  line }),
    }
}

/// Extracts a string argument or reports its position and type.
pub(crate) fn want_string(line: usize, method: &str, position: &str, value: &Value)
                          -> EvalResult<Rc<str>> {
    match value {
        Value::Str(s) => Ok(Rc::clone(s)),
        other => Err(RuntimeError::ArgumentType { position: position.to_string(),
                                                  method:   method.to_string(),
                                                  expected: "string".to_string(),
                                                  got:      other.type_name().to_string(),
                                                  line }),
    }
}
