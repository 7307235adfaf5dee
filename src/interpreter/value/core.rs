use std::{cell::RefCell,
          collections::HashMap,
          io::BufReader,
          rc::Rc};

use crate::{ast::FunctionLiteral,
            interpreter::{evaluator::core::EvalResult,
                          host::{HostFunction, HostValue},
                          scope::Scope,
                          value::hash_key::HashKey}};

/// An immutable tuple. `is_multi` marks tuples that carry multiple
/// return values, so `let a, b = f()` unpacks them instead of binding
/// the tuple itself.
#[derive(Debug, Clone)]
pub struct TupleValue {
    pub members:  Vec<Value>,
    pub is_multi: bool,
}

/// One entry of a hash: the original key value plus the stored value.
#[derive(Debug, Clone)]
pub struct HashPair {
    pub key:   Value,
    pub value: Value,
}

/// The backing map of a hash value.
pub type HashData = HashMap<HashKey, HashPair>;

/// A closure: the function literal plus the scope it captured.
#[derive(Debug, Clone)]
pub struct FunctionValue {
    pub literal: Rc<FunctionLiteral>,
    pub scope:   Rc<Scope>,
}

/// A struct instance. All state lives in the instance's own scope;
/// method dispatch reads names from it.
#[derive(Debug)]
pub struct StructValue {
    pub scope: Rc<Scope>,
}

/// A compiled regular expression together with its source pattern.
#[derive(Debug)]
pub struct RegexValue {
    pub regex:  regex::Regex,
    pub source: String,
}

/// What a file value is backed by.
#[derive(Debug)]
pub enum FileStream {
    /// The handle has been closed.
    Closed,
    Stdin,
    Stdout,
    Stderr,
    Disk(std::fs::File),
}

/// An open file handle. The line reader is created lazily on the first
/// `readLine` call.
#[derive(Debug)]
pub struct FileValue {
    pub stream: FileStream,
    pub name:   String,
    pub reader: Option<BufReader<std::fs::File>>,
}

/// Signature of a builtin function: source line, calling scope and the
/// evaluated arguments.
pub type BuiltinFn = fn(usize, &Rc<Scope>, Vec<Value>) -> EvalResult<Value>;

/// A named builtin.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinValue {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// Represents a runtime value in the interpreter.
///
/// This enum models every type that can appear in expressions,
/// assignments, function returns and conditions. Compound values
/// (arrays, hashes, struct instances, files) are shared by reference:
/// cloning a `Value` clones the handle, not the contents.
#[derive(Debug, Clone)]
pub enum Value {
    /// A numeric value (double precision floating-point).
    Number(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// The absent value.
    Nil,
    /// An immutable string, iterable over codepoints.
    Str(Rc<str>),
    /// A mutable ordered sequence.
    Array(Rc<RefCell<Vec<Value>>>),
    /// An immutable sequence, hashable when its members are.
    Tuple(Rc<TupleValue>),
    /// A mutable keyed map.
    Hash(Rc<RefCell<HashData>>),
    /// A user-defined function with its captured scope.
    Function(Rc<FunctionValue>),
    /// A host-provided builtin.
    Builtin(BuiltinValue),
    /// A struct instance.
    Struct(Rc<StructValue>),
    /// A compiled regular expression.
    Regex(Rc<RegexValue>),
    /// An open (or closed) file handle.
    File(Rc<RefCell<FileValue>>),
    /// The process facade exposing `getenv`, `setenv`, `chdir`,
    /// `mkdir` and `exit`.
    Os,
    /// A host value registered through the embedding interface.
    HostObject(Rc<HostValue>),
    /// A host callable registered through the embedding interface.
    HostFunction(Rc<HostFunction>),
    /// A runtime failure handed to user code (the second slot of
    /// `open`'s return tuple). Faults inside the evaluator itself
    /// travel on the error channel instead.
    Error(Rc<str>),
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(Rc::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(Rc::from(value.as_str()))
    }
}

impl From<Vec<Self>> for Value {
    fn from(members: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(members)))
    }
}

impl Value {
    /// Builds a tuple value.
    #[must_use]
    pub fn tuple(members: Vec<Self>, is_multi: bool) -> Self {
        Self::Tuple(Rc::new(TupleValue { members, is_multi }))
    }

    /// Builds an empty hash value.
    #[must_use]
    pub fn empty_hash() -> Self {
        Self::Hash(Rc::new(RefCell::new(HashData::new())))
    }

    /// The name of the value's kind, as reported by `type(x)` and used
    /// in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Boolean(_) => "bool",
            Self::Nil => "nil",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
            Self::Hash(_) => "hash",
            Self::Function(_) => "function",
            Self::Builtin(_) => "builtin",
            Self::Struct(_) => "struct",
            Self::Regex(_) => "regex",
            Self::File(_) => "file",
            Self::Os => "os",
            Self::HostObject(_) => "hostobject",
            Self::HostFunction(_) => "hostfunction",
            Self::Error(_) => "error",
        }
    }

    /// The boolean projection used by `!`, `&&`, `||`, `if` and loop
    /// conditions: `false`, `nil`, zero and empty collections are
    /// false, everything else is true.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Nil => false,
            Self::Number(n) => *n != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Array(members) => !members.borrow().is_empty(),
            Self::Tuple(tuple) => !tuple.members.is_empty(),
            Self::Hash(pairs) => !pairs.borrow().is_empty(),
            Self::Regex(regex) => !regex.source.is_empty(),
            Self::HostObject(host) => host.is_truthy(),
            _ => true,
        }
    }

    /// Structural equality: same kind and equal contents. Arrays and
    /// tuples compare element-wise; reference kinds (hashes, functions,
    /// structs, files) compare by identity.
    #[must_use]
    pub fn eq_value(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Nil, Self::Nil) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eq_value(y))
            },
            (Self::Tuple(a), Self::Tuple(b)) => {
                a.members.len() == b.members.len()
                && a.members.iter().zip(b.members.iter()).all(|(x, y)| x.eq_value(y))
            },
            _ => self.identity_eq(other),
        }
    }

    /// Identity equality, used by `==`/`!=` on kinds that have no
    /// value comparison: reference kinds are equal when they are the
    /// same object.
    #[must_use]
    pub fn identity_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Nil, Self::Nil) | (Self::Os, Self::Os) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Tuple(a), Self::Tuple(b)) => Rc::ptr_eq(a, b),
            (Self::Hash(a), Self::Hash(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Struct(a), Self::Struct(b)) => Rc::ptr_eq(a, b),
            (Self::Regex(a), Self::Regex(b)) => Rc::ptr_eq(a, b),
            (Self::File(a), Self::File(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Renders the value the way containers display it: strings are
    /// quoted, everything else uses its inspect form.
    #[must_use]
    pub fn quoted(&self) -> String {
        match self {
            Self::Str(s) => format!("\"{s}\""),
            _ => self.to_string(),
        }
    }

    /// True for values `for … in` can iterate: strings, arrays,
    /// tuples, hashes and host lists.
    #[must_use]
    pub fn is_iterable(&self) -> bool {
        match self {
            Self::Str(_) | Self::Array(_) | Self::Tuple(_) | Self::Hash(_) => true,
            Self::HostObject(host) => matches!(host.as_ref(), HostValue::List(_)),
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Nil => write!(f, "nil"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Array(members) => {
                let rendered: Vec<String> =
                    members.borrow().iter().map(Value::quoted).collect();
                write!(f, "[{}]", rendered.join(", "))
            },
            Self::Tuple(tuple) => {
                let rendered: Vec<String> =
                    tuple.members.iter().map(Value::quoted).collect();
                if rendered.len() == 1 {
                    write!(f, "({},)", rendered[0])
                } else {
                    write!(f, "({})", rendered.join(", "))
                }
            },
            Self::Hash(pairs) => {
                let rendered: Vec<String> = pairs.borrow()
                                                 .values()
                                                 .map(|pair| {
                                                     format!("{}:{}",
                                                             pair.key.quoted(),
                                                             pair.value.quoted())
                                                 })
                                                 .collect();
                write!(f, "{{{}}}", rendered.join(", "))
            },
            Self::Function(func) => write!(f, "{}", func.literal),
            Self::Builtin(_) => write!(f, "<builtin function>"),
            Self::Struct(instance) => {
                write!(f, "( ")?;
                for (name, value) in instance.scope.entries() {
                    write!(f, "{name}->{value} ")?;
                }
                write!(f, ")")
            },
            Self::Regex(regex) => write!(f, "{}", regex.source),
            Self::File(file) => write!(f, "<file object: {}>", file.borrow().name),
            Self::Os => write!(f, "<os>"),
            Self::HostObject(host) => write!(f, "{host}"),
            Self::HostFunction(func) => write!(f, "{}", func.name),
            Self::Error(message) => write!(f, "{message}"),
        }
    }
}
