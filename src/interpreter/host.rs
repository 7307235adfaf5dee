use std::{panic::{AssertUnwindSafe, catch_unwind},
          rc::Rc};

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::{EvalResult, Evaluator},
                          value::core::{HashData, HashPair, Value}}};

/// A callable supplied by the embedding host.
///
/// The evaluator depends only on this trait; hosts provide plain
/// closures or hand-written wrapper types. Errors are reported as
/// strings and surface in the language as runtime errors annotated
/// with the call site's source line. Panics inside the callable are
/// caught and reported the same way.
pub trait HostCallable {
    /// Invokes the host function with already-evaluated arguments.
    fn call(&self, args: &[Value]) -> Result<Value, String>;
}

impl<F> HostCallable for F where F: Fn(&[Value]) -> Result<Value, String>
{
    fn call(&self, args: &[Value]) -> Result<Value, String> {
        self(args)
    }
}

/// A named host callable, stored inside the hash that backs a
/// registered function namespace.
pub struct HostFunction {
    pub name:     String,
    pub callable: Rc<dyn HostCallable>,
}

impl std::fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFunction").field("name", &self.name).finish_non_exhaustive()
    }
}

/// A plain host datum registered as a global variable.
///
/// Hosts without reflection hand over data in this small closed shape;
/// the evaluator converts it to language values at the use site, so
/// host lists iterate and compare like arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Unit,
    Number(f64),
    Bool(bool),
    Str(String),
    List(Vec<HostValue>),
}

impl HostValue {
    /// The truthiness of the wrapped datum: `Unit`, zero, the empty
    /// string and the empty list are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Unit => false,
            Self::Number(n) => *n != 0.0,
            Self::Bool(b) => *b,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Converts the host datum into a language value (lists become
    /// arrays).
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            Self::Unit => Value::Nil,
            Self::Number(n) => Value::Number(*n),
            Self::Bool(b) => Value::Boolean(*b),
            Self::Str(s) => Value::from(s.as_str()),
            Self::List(items) => {
                Value::from(items.iter().map(Self::to_value).collect::<Vec<_>>())
            },
        }
    }
}

impl std::fmt::Display for HostValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unit => write!(f, "nil"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            },
        }
    }
}

/// Supplies embedded resources, typically attached to the executable.
/// When a `main` resource exists, the interpreter treats it as the
/// program source (see `run_with_resources`).
pub trait ResourceProvider {
    /// Names of the available resources.
    fn list(&self) -> Vec<String>;
    /// The bytes of one resource, if present.
    fn get_resource(&self, name: &str) -> Option<Vec<u8>>;
}

/// Calls a host function, converting string errors and panics into
/// runtime errors carrying the call site's line.
pub fn call_host_function(line: usize, func: &HostFunction, args: &[Value]) -> EvalResult<Value> {
    let outcome = catch_unwind(AssertUnwindSafe(|| func.callable.call(args)));
    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(message)) => Err(RuntimeError::HostCall { message, line }),
        Err(panic) => {
            let message = panic.downcast_ref::<&str>().map_or_else(
                || {
                    panic.downcast_ref::<String>()
                         .cloned()
                         .unwrap_or_else(|| "host function panicked".to_string())
                },
                |s| (*s).to_string(),
            );
            Err(RuntimeError::HostCall { message, line })
        },
    }
}

impl Evaluator {
    /// Registers a namespace of host functions. The namespace becomes
    /// a hash-valued global; member calls (`ns.func(args)`) dispatch
    /// to the registered callables. Names containing `.` are rejected.
    /// Slashes in the namespace are replaced with underscores.
    pub fn register_functions(&self,
                              namespace: &str,
                              functions: Vec<(&str, Rc<dyn HostCallable>)>)
                              -> Result<(), RuntimeError> {
        let mut table = HashData::new();
        for (name, callable) in functions {
            if name.contains('.') {
                return Err(RuntimeError::DottedHostName { name: name.to_string() });
            }
            let key = Value::from(name);
            let func = Value::HostFunction(Rc::new(HostFunction { name: name.to_string(),
                                                                  callable }));
            table.insert(key.hash_key(0).expect("string keys are hashable"),
                         HashPair { key, value: func });
        }
        self.set_global(&namespace.replace('/', "_"),
                        Value::Hash(Rc::new(std::cell::RefCell::new(table))));
        Ok(())
    }

    /// Registers a namespace of host variables; each entry becomes a
    /// global named `namespace.name`. Names containing `.` are
    /// rejected.
    pub fn register_vars(&self,
                         namespace: &str,
                         vars: Vec<(&str, HostValue)>)
                         -> Result<(), RuntimeError> {
        for (name, value) in vars {
            if name.contains('.') {
                return Err(RuntimeError::DottedHostName { name: name.to_string() });
            }
            self.set_global(&format!("{namespace}.{name}"),
                            Value::HostObject(Rc::new(value)));
        }
        Ok(())
    }
}
