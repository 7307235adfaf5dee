use std::rc::Rc;

use ordered_float::OrderedFloat;

use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult, value::core::Value}};

/// The equality key for hash storage and lookup.
///
/// Only numbers, booleans, strings and tuples of hashable values are
/// hashable. Numbers key on the full float value (via
/// [`OrderedFloat`]), so `1.5` and `1.7` are distinct keys and integers
/// behave the way users expect.
///
/// # Example
/// ```
/// use magpie::interpreter::value::{core::Value, hash_key::HashKey};
///
/// let key = Value::Number(1.5).hash_key(1).unwrap();
/// assert_ne!(key, Value::Number(1.7).hash_key(1).unwrap());
/// assert!(Value::Nil.hash_key(1).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Number(OrderedFloat<f64>),
    Boolean(bool),
    Str(Rc<str>),
    Tuple(Vec<HashKey>),
}

impl Value {
    /// Derives the hash key for this value, or a `KeyNotHashable`
    /// error for kinds that cannot be hash keys.
    pub fn hash_key(&self, line: usize) -> EvalResult<HashKey> {
        match self {
            Self::Number(n) => Ok(HashKey::Number(OrderedFloat(*n))),
            Self::Boolean(b) => Ok(HashKey::Boolean(*b)),
            Self::Str(s) => Ok(HashKey::Str(Rc::clone(s))),
            Self::Tuple(tuple) => {
                let members = tuple.members
                                   .iter()
                                   .map(|member| member.hash_key(line))
                                   .collect::<EvalResult<Vec<_>>>()?;
                Ok(HashKey::Tuple(members))
            },
            _ => Err(RuntimeError::KeyNotHashable { type_name: self.type_name().to_string(),
                                                    line }),
        }
    }
}
