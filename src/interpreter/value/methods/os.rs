use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult,
                          value::{core::Value,
                                  methods::{no_method, want_arity, want_number, want_string}}}};

/// Methods on the `os` facade: `getenv`, `setenv`, `chdir`, `mkdir`
/// and `exit`. The mutating operations report success as a boolean
/// instead of raising.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn call(line: usize, method: &str, args: &[Value]) -> EvalResult<Value> {
    match method {
        "getenv" => {
            want_arity(line, 1, args)?;
            let key = want_string(line, "getenv", "first", &args[0])?;
            Ok(Value::from(std::env::var(key.as_ref()).unwrap_or_default()))
        },
        "setenv" => {
            want_arity(line, 2, args)?;
            let key = want_string(line, "setenv", "first", &args[0])?;
            let value = want_string(line, "setenv", "second", &args[1])?;
            // SAFETY: evaluation is single-threaded (see the
            // concurrency model); no other thread reads the
            // environment concurrently.
            unsafe {
                std::env::set_var(key.as_ref(), value.as_ref());
            }
            Ok(Value::Boolean(true))
        },
        "chdir" => {
            want_arity(line, 1, args)?;
            let dir = want_string(line, "chdir", "first", &args[0])?;
            Ok(Value::Boolean(std::env::set_current_dir(dir.as_ref()).is_ok()))
        },
        "mkdir" => {
            want_arity(line, 2, args)?;
            let name = want_string(line, "mkdir", "first", &args[0])?;
            let perm = want_number(line, "mkdir", "second", &args[1])? as u32;
            let mut builder = std::fs::DirBuilder::new();
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(perm);
            }
            #[cfg(not(unix))]
            let _ = perm;
            Ok(Value::Boolean(builder.create(name.as_ref()).is_ok()))
        },
        "exit" => {
            if args.len() > 1 {
                return Err(RuntimeError::WrongArgumentCount { expected: "0|1".to_string(),
                                                              got:      args.len(),
                                                              line });
            }
            let code = match args.first() {
                Some(value) => want_number(line, "exit", "first", value)? as i32,
                None => 0,
            };
            std::process::exit(code);
        },
        _ => Err(no_method(line, method, &Value::Os)),
    }
}
