use std::{cell::RefCell, rc::Rc};

use crate::interpreter::{evaluator::core::EvalResult,
                         value::{core::{HashData, HashPair, Value},
                                 methods::{no_method, want_arity}}};

/// `Hash` methods: `keys`, `values`, `pop` (aliases `delete`,
/// `remove`) and `push` (alias `set`). Pair order is unspecified.
pub fn call(line: usize, receiver: &Rc<RefCell<HashData>>, method: &str, args: &[Value])
            -> EvalResult<Value> {
    match method {
        "keys" => {
            want_arity(line, 0, args)?;
            let keys: Vec<Value> =
                receiver.borrow().values().map(|pair| pair.key.clone()).collect();
            Ok(Value::from(keys))
        },
        "values" => {
            want_arity(line, 0, args)?;
            let values: Vec<Value> =
                receiver.borrow().values().map(|pair| pair.value.clone()).collect();
            Ok(Value::from(values))
        },
        "pop" | "delete" | "remove" => {
            want_arity(line, 1, args)?;
            let key = args[0].hash_key(line)?;
            Ok(receiver.borrow_mut()
                       .remove(&key)
                       .map_or(Value::Nil, |pair| pair.value))
        },
        "push" | "set" => {
            want_arity(line, 2, args)?;
            let key = args[0].hash_key(line)?;
            receiver.borrow_mut().insert(key,
                                         HashPair { key:   args[0].clone(),
                                                    value: args[1].clone(), });
            Ok(Value::Hash(Rc::clone(receiver)))
        },
        _ => Err(no_method(line, method, &Value::Hash(Rc::clone(receiver)))),
    }
}
