use std::rc::Rc;

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult,
                          value::{core::{TupleValue, Value},
                                  methods::{no_method, want_arity, want_number}}}};

/// `Tuple` methods: `get`, `empty` and `len`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn call(line: usize, receiver: &Rc<TupleValue>, method: &str, args: &[Value])
            -> EvalResult<Value> {
    match method {
        "get" => {
            want_arity(line, 1, args)?;
            let idx = want_number(line, "get", "first", &args[0])? as i64;
            if idx < 0 || idx >= receiver.members.len() as i64 {
                return Err(RuntimeError::IndexOutOfRange { index: idx, line });
            }
            Ok(receiver.members[idx as usize].clone())
        },
        "empty" => {
            want_arity(line, 0, args)?;
            Ok(Value::Boolean(receiver.members.is_empty()))
        },
        "len" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.members.len() as f64))
        },
        _ => Err(no_method(line, method, &Value::Tuple(Rc::clone(receiver)))),
    }
}
