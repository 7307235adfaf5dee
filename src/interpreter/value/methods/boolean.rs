use crate::interpreter::{evaluator::core::EvalResult,
                         value::{core::Value,
                                 methods::{no_method, want_arity}}};

/// `Boolean` methods: `toYesNo` and `toTrueFalse`.
pub fn call(line: usize, receiver: bool, method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "toYesNo" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(if receiver { "yes" } else { "no" }))
        },
        "toTrueFalse" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(if receiver { "true" } else { "false" }))
        },
        _ => Err(no_method(line, method, &Value::Boolean(receiver))),
    }
}
