use std::rc::Rc;

use crate::{ast::{AssignOp, Expr},
            error::RuntimeError,
            interpreter::{evaluator::{binary::index_number,
                                      core::{Control, EvalResult, Evaluator, value_of}},
                          scope::Scope,
                          value::core::{HashPair, Value}}};

impl Evaluator {
    /// Evaluates an assignment expression.
    ///
    /// Plain `=` accepts an identifier, an element (`a[i]`, with array
    /// auto-grow and string codepoint replacement) or a member
    /// (`obj.field` on structs and hashes). The compound operators
    /// rebind an identifier with the operator applied to its current
    /// value.
    pub(crate) fn eval_assign(&self,
                              operator: AssignOp,
                              target: &Expr,
                              value_expr: &Expr,
                              line: usize,
                              scope: &Rc<Scope>)
                              -> EvalResult<Control> {
        let value = value_of!(self.eval_expr(value_expr, scope)?);

        if operator != AssignOp::Assign {
            return Self::eval_compound(operator, target, value, line, scope);
        }

        match target {
            Expr::Identifier { name, .. } => {
                scope.assign(name, value.clone());
                Ok(Control::Value(value))
            },
            Expr::Index { left, index, .. } => {
                self.eval_index_assign(left, index, value, line, scope)
            },
            Expr::MethodCall { object, call, .. } => {
                self.eval_member_assign(object, call, value, line, scope)
            },
            _ => Err(RuntimeError::AssignTarget { line }),
        }
    }

    fn eval_index_assign(&self,
                         left: &Expr,
                         index: &Expr,
                         value: Value,
                         line: usize,
                         scope: &Rc<Scope>)
                         -> EvalResult<Control> {
        let container = value_of!(self.eval_expr(left, scope)?);
        let index_value = value_of!(self.eval_expr(index, scope)?);
        if matches!(index_value, Value::Nil) {
            return Ok(Control::Value(Value::Nil));
        }

        match &container {
            Value::Array(members) => {
                let idx = index_number(&index_value, line)?;
                if idx < 0 {
                    return Err(RuntimeError::IndexOutOfRange { index: idx, line });
                }
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let idx = idx as usize;
                let mut members = members.borrow_mut();
                if idx < members.len() {
                    members[idx] = value;
                } else {
                    // Out-of-range writes auto-grow the array with nil
                    // padding.
                    while members.len() < idx {
                        members.push(Value::Nil);
                    }
                    members.push(value);
                }
                drop(members);
                Ok(Control::Value(container.clone()))
            },
            Value::Hash(pairs) => {
                let key = index_value.hash_key(line)?;
                pairs.borrow_mut().insert(key,
                                          HashPair { key:   index_value,
                                                     value });
                Ok(Control::Value(container.clone()))
            },
            Value::Str(text) => {
                // Strings are immutable values; replacing a codepoint
                // rebinds the named variable with the new string.
                let Expr::Identifier { name, .. } = left else {
                    return Err(RuntimeError::AssignTarget { line });
                };
                let idx = index_number(&index_value, line)?;
                #[allow(clippy::cast_possible_wrap)]
                let len = text.chars().count() as i64;
                if idx < 0 || idx >= len {
                    return Err(RuntimeError::IndexOutOfRange { index: idx, line });
                }
                #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
                let idx = idx as usize;
                let replaced: String = text.chars()
                                           .enumerate()
                                           .map(|(pos, ch)| {
                                               if pos == idx {
                                                   value.to_string()
                                               } else {
                                                   ch.to_string()
                                               }
                                           })
                                           .collect();
                let replaced = Value::from(replaced);
                scope.assign(name, replaced.clone());
                Ok(Control::Value(replaced))
            },
            Value::Tuple(_) => Err(RuntimeError::TupleAssignment { line }),
            other => Err(RuntimeError::NotIndexable { type_name:
                                                          other.type_name().to_string(),
                                                      line }),
        }
    }

    /// `obj.field = value` sets a struct field or inserts a
    /// string-keyed hash entry.
    fn eval_member_assign(&self,
                          object: &Expr,
                          call: &Expr,
                          value: Value,
                          line: usize,
                          scope: &Rc<Scope>)
                          -> EvalResult<Control> {
        let Expr::Identifier { name: field, .. } = call else {
            return Err(RuntimeError::AssignTarget { line });
        };

        let receiver = value_of!(self.eval_expr(object, scope)?);
        match &receiver {
            Value::Struct(instance) => {
                instance.scope.define(field, value.clone());
                Ok(Control::Value(value))
            },
            Value::Hash(pairs) => {
                let key = Value::from(field.as_str());
                pairs.borrow_mut().insert(key.hash_key(line)?,
                                          HashPair { key, value });
                Ok(Control::Value(receiver.clone()))
            },
            _ => Err(RuntimeError::AssignTarget { line }),
        }
    }

    /// `x += v` and friends: apply the operator to the current
    /// binding and the right-hand side, then rebind. Numbers support
    /// all five operators; strings support `+=`.
    fn eval_compound(operator: AssignOp,
                     target: &Expr,
                     value: Value,
                     line: usize,
                     scope: &Rc<Scope>)
                     -> EvalResult<Control> {
        let Expr::Identifier { name, .. } = target else {
            return Err(RuntimeError::AssignTarget { line });
        };
        let Some(current) = scope.get(name) else {
            return Err(RuntimeError::UnknownIdentifier { name: name.clone(), line });
        };

        let result = match (&current, &value) {
            (Value::Number(left), Value::Number(right)) => match operator {
                AssignOp::Plus => Value::Number(left + right),
                AssignOp::Minus => Value::Number(left - right),
                AssignOp::Asterisk => Value::Number(left * right),
                AssignOp::Slash => {
                    if *right == 0.0 {
                        return Err(RuntimeError::DivideByZero { line });
                    }
                    Value::Number(left / right)
                },
                _ => Value::Number(left % right),
            },
            (Value::Str(left), Value::Str(right)) if operator == AssignOp::Plus => {
                Value::from(format!("{left}{right}"))
            },
            (left, right) => {
                return Err(RuntimeError::InfixOperator { left:     left.type_name()
                                                                       .to_string(),
                                                         operator: operator.to_string(),
                                                         right:    right.type_name()
                                                                        .to_string(),
                                                         line });
            },
        };

        scope.assign(name, result.clone());
        Ok(Control::Value(result))
    }
}
