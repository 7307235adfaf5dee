use std::rc::Rc;

use crate::interpreter::{evaluator::core::EvalResult,
                         value::{core::{RegexValue, Value},
                                 methods::{no_method, want_arity, want_string}}};

/// `RegEx` methods: `match`, `replace` and `split`.
pub fn call(line: usize, receiver: &Rc<RegexValue>, method: &str, args: &[Value])
            -> EvalResult<Value> {
    match method {
        "match" => {
            want_arity(line, 1, args)?;
            let text = want_string(line, "match", "first", &args[0])?;
            Ok(Value::Boolean(receiver.regex.is_match(&text)))
        },
        "replace" => {
            want_arity(line, 2, args)?;
            let text = want_string(line, "replace", "first", &args[0])?;
            let replacement = want_string(line, "replace", "second", &args[1])?;
            let result = receiver.regex.replace_all(&text, replacement.as_ref());
            Ok(Value::from(result.into_owned()))
        },
        "split" => {
            want_arity(line, 1, args)?;
            let text = want_string(line, "split", "first", &args[0])?;
            let parts: Vec<Value> = receiver.regex.split(&text).map(Value::from).collect();
            Ok(Value::from(parts))
        },
        _ => Err(no_method(line, method, &Value::Regex(Rc::clone(receiver)))),
    }
}
