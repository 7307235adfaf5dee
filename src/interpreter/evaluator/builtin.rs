use std::{cell::RefCell,
          io::Write,
          process::Command,
          rc::Rc};

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult,
                          scope::Scope,
                          value::core::{BuiltinFn, BuiltinValue, FileStream, FileValue,
                                        Value}},
            util::format::sprintf};

/// Resolves a builtin by name. `say` is an alias of `println`.
#[must_use]
pub fn lookup(name: &str) -> Option<BuiltinValue> {
    let (name, func): (&'static str, BuiltinFn) = match name {
        "print" => ("print", builtin_print),
        "println" => ("println", builtin_println),
        "say" => ("say", builtin_println),
        "printf" => ("printf", builtin_printf),
        "len" => ("len", builtin_len),
        "open" => ("open", builtin_open),
        "type" => ("type", builtin_type),
        _ => return None,
    };
    Some(BuiltinValue { name, func })
}

fn write_output(line: usize, scope: &Rc<Scope>, text: &str) -> EvalResult<Value> {
    let writer = scope.writer();
    writer.borrow_mut()
          .write_all(text.as_bytes())
          .map_err(|err| RuntimeError::Io { message: err.to_string(), line })?;
    Ok(Value::Nil)
}

fn joined(args: &[Value]) -> String {
    args.iter().map(ToString::to_string).collect()
}

/// `print(args…)` - concatenated inspect forms, no separator, no
/// newline.
fn builtin_print(line: usize, scope: &Rc<Scope>, args: Vec<Value>) -> EvalResult<Value> {
    write_output(line, scope, &joined(&args))
}

/// `println(args…)` / `say(args…)`.
fn builtin_println(line: usize, scope: &Rc<Scope>, args: Vec<Value>) -> EvalResult<Value> {
    write_output(line, scope, &format!("{}\n", joined(&args)))
}

/// `printf(format, args…)` with `%`-style verbs.
fn builtin_printf(line: usize, scope: &Rc<Scope>, args: Vec<Value>) -> EvalResult<Value> {
    if args.is_empty() {
        return Err(RuntimeError::WrongArgumentCount { expected: "at least one".to_string(),
                                                      got:      0,
                                                      line });
    }
    let Value::Str(format) = &args[0] else {
        return Err(RuntimeError::ArgumentType { position: "first".to_string(),
                                                method:   "printf".to_string(),
                                                expected: "string".to_string(),
                                                got:      args[0].type_name().to_string(),
                                                line });
    };
    let rendered = sprintf(line, format, &args[1..])?;
    write_output(line, scope, &rendered)
}

/// `len(x)` for strings (codepoints), arrays, tuples and hashes.
#[allow(clippy::cast_precision_loss)]
fn builtin_len(line: usize, _scope: &Rc<Scope>, args: Vec<Value>) -> EvalResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeError::WrongArgumentCount { expected: "1".to_string(),
                                                      got:      args.len(),
                                                      line });
    }
    match &args[0] {
        Value::Str(s) => Ok(Value::Number(s.chars().count() as f64)),
        Value::Array(members) => Ok(Value::Number(members.borrow().len() as f64)),
        Value::Tuple(tuple) => Ok(Value::Number(tuple.members.len() as f64)),
        Value::Hash(pairs) => Ok(Value::Number(pairs.borrow().len() as f64)),
        other => Err(RuntimeError::ArgumentType { position: "first".to_string(),
                                                  method:   "len".to_string(),
                                                  expected: "string, array, tuple or hash"
                                                                .to_string(),
                                                  got:      other.type_name().to_string(),
                                                  line }),
    }
}

/// `type(x)` - the name of the value's kind.
fn builtin_type(line: usize, _scope: &Rc<Scope>, args: Vec<Value>) -> EvalResult<Value> {
    if args.len() != 1 {
        return Err(RuntimeError::WrongArgumentCount { expected: "1".to_string(),
                                                      got:      args.len(),
                                                      line });
    }
    Ok(Value::from(args[0].type_name()))
}

/// `open(path[, mode[, perm]])`.
///
/// Returns a multi-value pair `(file, error)` so scripts can check
/// failure without exceptions: on success the error slot is `nil`, on
/// failure the file slot is.
///
/// Modes: `r <` read, `w >` write-truncate, `a >>` append, `r+ +<`
/// read-write, `w+ +>` read-write-truncate, `a+ +>>` read-append.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn builtin_open(line: usize, _scope: &Rc<Scope>, args: Vec<Value>) -> EvalResult<Value> {
    let failure = |error: RuntimeError| {
        Value::tuple(vec![Value::Nil, Value::Error(Rc::from(error.to_string().as_str()))],
                     true)
    };

    if args.is_empty() {
        return Ok(failure(RuntimeError::WrongArgumentCount { expected:
                                                                 "at least one".to_string(),
                                                             got: 0,
                                                             line }));
    }

    let Value::Str(path) = &args[0] else {
        return Ok(failure(RuntimeError::ArgumentType { position: "first".to_string(),
                                                       method:   "open".to_string(),
                                                       expected: "string".to_string(),
                                                       got:      args[0].type_name()
                                                                        .to_string(),
                                                       line }));
    };

    let mode = match args.get(1) {
        None => "r".to_string(),
        Some(Value::Str(mode)) => mode.to_string(),
        Some(other) => {
            return Ok(failure(RuntimeError::ArgumentType { position: "second".to_string(),
                                                           method:   "open".to_string(),
                                                           expected: "string".to_string(),
                                                           got:      other.type_name()
                                                                          .to_string(),
                                                           line }));
        },
    };

    let mut options = std::fs::OpenOptions::new();
    match mode.as_str() {
        "r" | "<" => options.read(true),
        "w" | ">" => options.write(true).create(true).truncate(true),
        "a" | ">>" => options.append(true).create(true),
        "r+" | "+<" => options.read(true).write(true),
        "w+" | "+>" => options.read(true).write(true).create(true).truncate(true),
        "a+" | "+>>" => options.read(true).append(true).create(true),
        _ => return Ok(failure(RuntimeError::UnknownFileMode { line })),
    };

    if let Some(perm) = args.get(2) {
        let Value::Number(perm) = perm else {
            return Ok(failure(RuntimeError::ArgumentType { position: "third".to_string(),
                                                           method:   "open".to_string(),
                                                           expected: "number".to_string(),
                                                           got:      perm.type_name()
                                                                         .to_string(),
                                                           line }));
        };
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(*perm as u32);
        }
        #[cfg(not(unix))]
        let _ = perm;
    }

    match options.open(path.as_ref()) {
        Ok(handle) => {
            let file = FileValue { stream: FileStream::Disk(handle),
                                   name:   path.to_string(),
                                   reader: None, };
            Ok(Value::tuple(vec![Value::File(Rc::new(RefCell::new(file))), Value::Nil],
                            true))
        },
        Err(err) => Ok(failure(RuntimeError::FileOperation { operation: "open".to_string(),
                                                             reason:    err.to_string(),
                                                             line })),
    }
}

/// Runs a backtick command literal through the platform shell and
/// yields its stdout (with the trailing newline trimmed). A spawn
/// failure or non-zero exit is a runtime error.
pub(crate) fn run_command(line: usize, command: &str) -> EvalResult<Value> {
    let output = if cfg!(windows) {
        Command::new("cmd").args(["/C", command]).output()
    } else {
        Command::new("sh").args(["-c", command]).output()
    };

    let output = output.map_err(|err| RuntimeError::CommandFailed { message:
                                                                        err.to_string(),
                                                                    line })?;

    if !output.status.success() {
        let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(RuntimeError::CommandFailed { message, line });
    }

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    while text.ends_with('\n') || text.ends_with('\r') {
        text.pop();
    }
    Ok(Value::from(text))
}
