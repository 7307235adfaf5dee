use std::rc::Rc;

use crate::{ast::{Block, Expr},
            interpreter::{evaluator::core::{Control, EvalResult, Evaluator,
                                            iterable_members, value_of},
                          scope::Scope,
                          value::core::Value}};

impl Evaluator {
    /// `for (init; cond; update) { body }`. The loop gets its own
    /// child scope so the counters vanish on exit; `continue` still
    /// runs the update expression.
    pub(crate) fn eval_c_for(&self,
                             init: Option<&Expr>,
                             cond: Option<&Expr>,
                             update: Option<&Expr>,
                             body: &Block,
                             scope: &Rc<Scope>)
                             -> EvalResult<Control> {
        let loop_scope = Scope::child(scope);

        if let Some(init) = init {
            let _ = value_of!(self.eval_expr(init, &loop_scope)?);
        }

        let mut result = Value::Nil;
        loop {
            if let Some(cond) = cond {
                let condition = value_of!(self.eval_expr(cond, &loop_scope)?);
                if !condition.is_truthy() {
                    break;
                }
            }

            match self.eval_block(body, &loop_scope)? {
                Control::Value(value) => result = value,
                Control::Break => {
                    result = Value::Nil;
                    break;
                },
                Control::Continue => result = Value::Nil,
                other => return Ok(other),
            }

            if let Some(update) = update {
                let _ = value_of!(self.eval_expr(update, &loop_scope)?);
            }
        }

        Ok(Control::Value(result))
    }

    /// `for { body }` and `do { body }`: loop until `break` or
    /// `return`; the loop's value is the last body value.
    pub(crate) fn eval_forever(&self, body: &Block, scope: &Rc<Scope>) -> EvalResult<Control> {
        let loop_scope = Scope::child(scope);
        let mut result = Value::Nil;
        loop {
            match self.eval_block(body, &loop_scope)? {
                Control::Value(value) => result = value,
                Control::Break => {
                    result = Value::Nil;
                    break;
                },
                Control::Continue => result = Value::Nil,
                other => return Ok(other),
            }
        }
        Ok(Control::Value(result))
    }

    /// `while cond { body }` - yields `nil` however it terminates
    /// (other than an explicit `return`).
    pub(crate) fn eval_while(&self, condition: &Expr, body: &Block, scope: &Rc<Scope>)
                             -> EvalResult<Control> {
        let loop_scope = Scope::child(scope);
        loop {
            let value = value_of!(self.eval_expr(condition, &loop_scope)?);
            if !value.is_truthy() {
                return Ok(Control::Value(Value::Nil));
            }

            match self.eval_block(body, &loop_scope)? {
                Control::Value(_) | Control::Continue => {},
                Control::Break => return Ok(Control::Value(Value::Nil)),
                other => return Ok(other),
            }
        }
    }

    /// `for item in sequence { body }` - iterates string codepoints,
    /// arrays, tuples or host lists, collecting each body value into
    /// the resulting array. Iterating `nil` yields an empty array.
    pub(crate) fn eval_foreach(&self,
                               var: &str,
                               iterable: &Expr,
                               body: &Block,
                               line: usize,
                               scope: &Rc<Scope>)
                               -> EvalResult<Control> {
        let subject = value_of!(self.eval_expr(iterable, scope)?);
        if matches!(subject, Value::Nil) {
            return Ok(Control::Value(Value::from(Vec::new())));
        }

        let members = iterable_members(&subject, line)?;
        let loop_scope = Scope::child(scope);
        let mut out = Vec::new();

        for member in members {
            loop_scope.define(var, member);
            match self.eval_block(body, &loop_scope)? {
                Control::Value(value) => out.push(value),
                Control::Break => break,
                Control::Continue => {},
                other => return Ok(other),
            }
        }

        Ok(Control::Value(Value::from(out)))
    }

    /// `for key, value in collection { body }` - hash pairs (order
    /// unspecified), or `(index, element)` for sequences. `_` skips a
    /// binding.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn eval_foreach_pair(&self,
                                    key: &str,
                                    value: &str,
                                    iterable: &Expr,
                                    body: &Block,
                                    line: usize,
                                    scope: &Rc<Scope>)
                                    -> EvalResult<Control> {
        let subject = value_of!(self.eval_expr(iterable, scope)?);
        if matches!(subject, Value::Nil) {
            return Ok(Control::Value(Value::from(Vec::new())));
        }

        let pairs: Vec<(Value, Value)> = match &subject {
            Value::Hash(data) => data.borrow()
                                     .values()
                                     .map(|pair| (pair.key.clone(), pair.value.clone()))
                                     .collect(),
            _ => iterable_members(&subject, line)?.into_iter()
                                                  .enumerate()
                                                  .map(|(idx, member)| {
                                                      (Value::Number(idx as f64), member)
                                                  })
                                                  .collect(),
        };

        let loop_scope = Scope::child(scope);
        let mut out = Vec::new();

        for (key_value, member) in pairs {
            if key != "_" {
                loop_scope.define(key, key_value);
            }
            if value != "_" {
                loop_scope.define(value, member);
            }
            match self.eval_block(body, &loop_scope)? {
                Control::Value(result) => out.push(result),
                Control::Break => break,
                Control::Continue => {},
                other => return Ok(other),
            }
        }

        Ok(Control::Value(Value::from(out)))
    }
}
