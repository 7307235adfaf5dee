use std::{cell::RefCell,
          io::{BufRead, BufReader, Read, Write},
          rc::Rc};

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult,
                          value::{core::{FileStream, FileValue, Value},
                                  methods::{no_method, want_arity, want_number, want_string}}}};

/// `File` methods: `close`, `read`, `readLine`, `write`,
/// `writeString`, `writeLine` and `name`.
///
/// `read(n)` returns up to `n` bytes as a string, or `nil` at end of
/// file. `readLine` returns the next line without its terminator, or
/// `nil` at end of file.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn call(line: usize, receiver: &Rc<RefCell<FileValue>>, method: &str, args: &[Value])
            -> EvalResult<Value> {
    let mut guard = receiver.borrow_mut();
    let file = &mut *guard;
    match method {
        "close" => {
            want_arity(line, 0, args)?;
            if matches!(file.stream, FileStream::Closed) {
                return Err(file_error(line, "close", "file already closed"));
            }
            file.stream = FileStream::Closed;
            file.reader = None;
            Ok(Value::Boolean(true))
        },
        "read" => {
            want_arity(line, 1, args)?;
            let count = want_number(line, "read", "first", &args[0])?.max(0.0) as usize;
            let mut buffer = vec![0u8; count];
            let read = match &mut file.stream {
                FileStream::Disk(handle) => handle.read(&mut buffer),
                FileStream::Stdin => std::io::stdin().lock().read(&mut buffer),
                _ => return Err(file_error(line, "read", "file is not readable")),
            };
            let read = read.map_err(|err| file_error(line, "read", &err.to_string()))?;
            if read == 0 {
                return Ok(Value::Nil);
            }
            Ok(Value::from(String::from_utf8_lossy(&buffer[..read]).into_owned()))
        },
        "readLine" => {
            want_arity(line, 0, args)?;
            let mut text = String::new();
            let read = match &mut file.stream {
                FileStream::Disk(handle) => {
                    if file.reader.is_none() {
                        let clone = handle.try_clone()
                                          .map_err(|err| {
                                              file_error(line, "readLine", &err.to_string())
                                          })?;
                        file.reader = Some(BufReader::new(clone));
                    }
                    file.reader
                        .as_mut()
                        .expect("reader was just created")
                        .read_line(&mut text)
                },
                FileStream::Stdin => std::io::stdin().read_line(&mut text),
                _ => return Err(file_error(line, "readLine", "file is not readable")),
            };
            let read = read.map_err(|err| file_error(line, "readLine", &err.to_string()))?;
            if read == 0 {
                return Ok(Value::Nil);
            }
            while text.ends_with('\n') || text.ends_with('\r') {
                text.pop();
            }
            Ok(Value::from(text))
        },
        "write" | "writeString" | "writeLine" => {
            want_arity(line, 1, args)?;
            let content = want_string(line, method, "first", &args[0])?;
            let mut bytes = content.as_bytes().to_vec();
            if method == "writeLine" {
                bytes.push(b'\n');
            }
            let written = match &mut file.stream {
                FileStream::Disk(handle) => handle.write(&bytes),
                FileStream::Stdout => std::io::stdout().write(&bytes),
                FileStream::Stderr => std::io::stderr().write(&bytes),
                _ => return Err(file_error(line, method, "file is not writable")),
            };
            let written = written.map_err(|err| file_error(line, method, &err.to_string()))?;
            Ok(Value::Number(written as f64))
        },
        "name" => {
            want_arity(line, 0, args)?;
            Ok(Value::from(file.name.clone()))
        },
        _ => Err(no_method(line, method, &Value::File(Rc::clone(receiver)))),
    }
}

fn file_error(line: usize, operation: &str, reason: &str) -> RuntimeError {
    RuntimeError::FileOperation { operation: operation.to_string(),
                                  reason: reason.to_string(),
                                  line }
}
