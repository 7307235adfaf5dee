use std::rc::Rc;

use crate::interpreter::{evaluator::core::EvalResult,
                         value::{core::Value,
                                 methods::{no_method, want_arity, want_string}}};

/// `String` methods: `lower`, `upper`, `len`, `trim`, `contains`,
/// `replace` and `split`.
#[allow(clippy::cast_precision_loss)]
pub fn call(line: usize, receiver: &Rc<str>, method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "lower" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(receiver.to_lowercase()))
        },
        "upper" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(receiver.to_uppercase()))
        },
        "len" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.chars().count() as f64))
        },
        "trim" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(receiver.trim()))
        },
        "contains" => {
            want_arity(line, 1, args)?;
            let needle = want_string(line, "contains", "first", &args[0])?;
            Ok(Value::Boolean(receiver.contains(needle.as_ref())))
        },
        "replace" => {
            want_arity(line, 2, args)?;
            let from = want_string(line, "replace", "first", &args[0])?;
            let to = want_string(line, "replace", "second", &args[1])?;
            Ok(Value::from(receiver.replace(from.as_ref(), to.as_ref())))
        },
        "split" => {
            want_arity(line, 1, args)?;
            let separator = want_string(line, "split", "first", &args[0])?;
            let parts: Vec<Value> = receiver.split(separator.as_ref()).map(Value::from).collect();
            Ok(Value::from(parts))
        },
        _ => Err(no_method(line, method, &Value::Str(Rc::clone(receiver)))),
    }
}
