use crate::{interpreter::{evaluator::core::EvalResult,
                          value::{core::Value,
                                  methods::{no_method, want_arity, want_number}}}};

/// `Number` methods: `ceil`, `floor`, `trunc`, `sqrt`, `pow`, `round`
/// and `str`.
pub fn call(line: usize, receiver: f64, method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "ceil" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.ceil()))
        },
        "floor" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.floor()))
        },
        "trunc" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.trunc()))
        },
        "sqrt" => {
            want_arity(line, 0, args)?;
            Ok(Value::Number(receiver.sqrt()))
        },
        "pow" => {
            want_arity(line, 1, args)?;
            let exponent = want_number(line, "pow", "first", &args[0])?;
            Ok(Value::Number(receiver.powf(exponent)))
        },
        "round" => {
            want_arity(line, 1, args)?;
            let precision = want_number(line, "round", "first", &args[0])?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let digits = precision.max(0.0) as usize;
            let rendered = format!("{receiver:.digits$}");
            Ok(Value::Number(rendered.parse().unwrap_or(f64::NAN)))
        },
        "str" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(receiver.to_string()))
        },
        _ => Err(no_method(line, method, &Value::Number(receiver))),
    }
}
