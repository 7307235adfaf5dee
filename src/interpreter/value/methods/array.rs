use std::{cell::RefCell, rc::Rc};

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult,
                          value::{core::Value,
                                  methods::{no_method, want_arity, want_number}}}};

/// `Array` methods: `len`, `push` and `pop`. `pop` takes an optional
/// index (negative counts from the end) and defaults to the last
/// element.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn call(line: usize, receiver: &Rc<RefCell<Vec<Value>>>, method: &str, args: &[Value])
            -> EvalResult<Value> {
    match method {
        "len" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.borrow().len() as f64))
        },
        "push" => {
            want_arity(line, 1, args)?;
            receiver.borrow_mut().push(args[0].clone());
            Ok(Value::Array(Rc::clone(receiver)))
        },
        "pop" => {
            let mut members = receiver.borrow_mut();
            let last = members.len() as i64 - 1;
            if args.is_empty() {
                return members.pop()
                              .ok_or(RuntimeError::IndexOutOfRange { index: last, line });
            }
            want_arity(line, 1, args)?;
            let mut idx = want_number(line, "pop", "first", &args[0])? as i64;
            if idx < 0 {
                idx += last + 1;
            }
            if idx < 0 || idx > last {
                return Err(RuntimeError::IndexOutOfRange { index: idx, line });
            }
            Ok(members.remove(idx as usize))
        },
        _ => Err(no_method(line, method, &Value::Array(Rc::clone(receiver)))),
    }
}
