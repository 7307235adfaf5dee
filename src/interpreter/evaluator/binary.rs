use std::rc::Rc;

use crate::{ast::{Expr, InfixOp},
            error::RuntimeError,
            interpreter::{evaluator::core::{Control, EvalResult, Evaluator, value_of},
                          scope::Scope,
                          value::core::Value}};

impl Evaluator {
    /// Evaluates an infix expression.
    ///
    /// `&&` and `||` short-circuit on the truthiness of the left
    /// operand; every other operator evaluates both sides
    /// left-to-right. Host objects are unwrapped to language values
    /// before dispatch.
    pub(crate) fn eval_infix(&self,
                             operator: InfixOp,
                             left: &Expr,
                             right: &Expr,
                             next: Option<&(InfixOp, Box<Expr>)>,
                             line: usize,
                             scope: &Rc<Scope>)
                             -> EvalResult<Control> {
        if matches!(operator, InfixOp::And | InfixOp::Or) {
            return self.eval_logical(operator, left, right, scope);
        }

        let lhs = unwrap_host(value_of!(self.eval_expr(left, scope)?));
        let rhs = unwrap_host(value_of!(self.eval_expr(right, scope)?));

        match operator {
            InfixOp::In => Self::eval_in(&lhs, &rhs, line).map(Control::Value),
            InfixOp::Range => Self::eval_range(&lhs, &rhs, line).map(Control::Value),
            InfixOp::Match | InfixOp::NotMatch => {
                let Value::Regex(re) = &rhs else {
                    return Err(RuntimeError::NotRegex { type_name:
                                                            rhs.type_name().to_string(),
                                                        line });
                };
                let matched = re.regex.is_match(&lhs.to_string());
                let result = if operator == InfixOp::Match { matched } else { !matched };
                Ok(Control::Value(Value::Boolean(result)))
            },
            _ => match (&lhs, &rhs) {
                (Value::Number(a), Value::Number(b)) => {
                    self.eval_number_infix(operator, *a, *b, next, line, scope)
                },
                (Value::Str(a), Value::Str(b)) => {
                    self.eval_string_infix(operator, a, b, next, line, scope)
                },
                _ => match operator {
                    InfixOp::Eq => Ok(Control::Value(Value::Boolean(lhs.identity_eq(&rhs)))),
                    InfixOp::NotEq => {
                        Ok(Control::Value(Value::Boolean(!lhs.identity_eq(&rhs))))
                    },
                    _ => Err(infix_error(&lhs, operator, &rhs, line)),
                },
            },
        }
    }

    fn eval_logical(&self, operator: InfixOp, left: &Expr, right: &Expr, scope: &Rc<Scope>)
                    -> EvalResult<Control> {
        let lhs = value_of!(self.eval_expr(left, scope)?);
        let left_true = lhs.is_truthy();

        if operator == InfixOp::And && !left_true {
            return Ok(Control::Value(Value::Boolean(false)));
        }
        if operator == InfixOp::Or && left_true {
            return Ok(Control::Value(Value::Boolean(true)));
        }

        let rhs = value_of!(self.eval_expr(right, scope)?);
        Ok(Control::Value(Value::Boolean(rhs.is_truthy())))
    }

    /// Arithmetic and comparisons on two numbers, including the
    /// chained-comparison step: `a < b < c` succeeds iff `a < b` and
    /// `b < c`, with the second comparison skipped when the first is
    /// already false.
    fn eval_number_infix(&self,
                         operator: InfixOp,
                         left: f64,
                         right: f64,
                         next: Option<&(InfixOp, Box<Expr>)>,
                         line: usize,
                         scope: &Rc<Scope>)
                         -> EvalResult<Control> {
        if operator.is_comparison() {
            let first = number_compare(operator, left, right);
            let Some((next_op, next_expr)) = next else {
                return Ok(Control::Value(Value::Boolean(first)));
            };
            if !first {
                return Ok(Control::Value(Value::Boolean(false)));
            }
            let chained = unwrap_host(value_of!(self.eval_expr(next_expr, scope)?));
            return match chained {
                Value::Number(n) => {
                    Ok(Control::Value(Value::Boolean(number_compare(*next_op, right, n))))
                },
                other => Err(infix_error(&Value::Number(right), *next_op, &other, line)),
            };
        }

        let value = number_arithmetic(operator, left, right, line)?;
        let Some((next_op, next_expr)) = next else {
            return Ok(Control::Value(Value::Number(value)));
        };

        // An arithmetic result followed by a chained comparison
        // compares the computed value with the trailing operand.
        let chained = unwrap_host(value_of!(self.eval_expr(next_expr, scope)?));
        match chained {
            Value::Number(n) => {
                Ok(Control::Value(Value::Boolean(number_compare(*next_op, value, n))))
            },
            other => Err(infix_error(&Value::Number(value), *next_op, &other, line)),
        }
    }

    /// Concatenation and comparisons on two strings, with the same
    /// chaining rule as numbers.
    fn eval_string_infix(&self,
                         operator: InfixOp,
                         left: &Rc<str>,
                         right: &Rc<str>,
                         next: Option<&(InfixOp, Box<Expr>)>,
                         line: usize,
                         scope: &Rc<Scope>)
                         -> EvalResult<Control> {
        if operator == InfixOp::Plus {
            let value = format!("{left}{right}");
            let Some((next_op, next_expr)) = next else {
                return Ok(Control::Value(Value::from(value)));
            };
            let chained = unwrap_host(value_of!(self.eval_expr(next_expr, scope)?));
            return match chained {
                Value::Str(s) => {
                    Ok(Control::Value(Value::Boolean(string_compare(*next_op, &value, &s))))
                },
                other => Err(infix_error(&Value::from(value), *next_op, &other, line)),
            };
        }

        if !operator.is_comparison() {
            return Err(infix_error(&Value::Str(Rc::clone(left)),
                                   operator,
                                   &Value::Str(Rc::clone(right)),
                                   line));
        }

        let first = string_compare(operator, left, right);
        let Some((next_op, next_expr)) = next else {
            return Ok(Control::Value(Value::Boolean(first)));
        };
        if !first {
            return Ok(Control::Value(Value::Boolean(false)));
        }
        let chained = unwrap_host(value_of!(self.eval_expr(next_expr, scope)?));
        match chained {
            Value::Str(s) => {
                Ok(Control::Value(Value::Boolean(string_compare(*next_op, right, &s))))
            },
            other => Err(infix_error(&Value::Str(Rc::clone(right)), *next_op, &other, line)),
        }
    }

    /// `x in y`: substring for strings, element equality for arrays
    /// and tuples, key membership for hashes.
    fn eval_in(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
        match right {
            Value::Str(haystack) => match left {
                Value::Str(needle) => Ok(Value::Boolean(haystack.contains(needle.as_ref()))),
                other => Err(infix_error(other, InfixOp::In, right, line)),
            },
            Value::Array(members) => {
                Ok(Value::Boolean(members.borrow().iter().any(|m| m.eq_value(left))))
            },
            Value::Tuple(tuple) => {
                Ok(Value::Boolean(tuple.members.iter().any(|m| m.eq_value(left))))
            },
            Value::Hash(pairs) => {
                let key = left.hash_key(line)?;
                Ok(Value::Boolean(pairs.borrow().contains_key(&key)))
            },
            _ => Err(infix_error(left, InfixOp::In, right, line)),
        }
    }

    /// `a .. b` yields the inclusive integer range as an array,
    /// descending when `a >= b`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn eval_range(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
        let Value::Number(start) = left else {
            return Err(RuntimeError::RangeOperand { type_name:
                                                        left.type_name().to_string(),
                                                    line });
        };
        let Value::Number(end) = right else {
            return Err(RuntimeError::RangeOperand { type_name:
                                                        right.type_name().to_string(),
                                                    line });
        };

        let (start, end) = (*start as i64, *end as i64);
        let members: Vec<Value> = if start >= end {
            (end..=start).rev().map(|n| Value::Number(n as f64)).collect()
        } else {
            (start..=end).map(|n| Value::Number(n as f64)).collect()
        };
        Ok(Value::from(members))
    }

    /// Indexing: string codepoints, array and tuple elements by
    /// integer, hash entries by hashable key (missing keys yield
    /// `nil`).
    #[allow(clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::cast_sign_loss)]
    pub(crate) fn eval_index(container: &Value, index: &Value, line: usize)
                             -> EvalResult<Value> {
        match container {
            Value::Str(s) => {
                let idx = index_number(index, line)?;
                let max = s.chars().count() as i64 - 1;
                if idx < 0 || idx > max {
                    return Err(RuntimeError::IndexOutOfRange { index: idx, line });
                }
                let ch = s.chars().nth(idx as usize).expect("index was range checked");
                Ok(Value::from(ch.to_string()))
            },
            Value::Array(members) => {
                let idx = index_number(index, line)?;
                let members = members.borrow();
                let max = members.len() as i64 - 1;
                if idx < 0 || idx > max {
                    return Err(RuntimeError::IndexOutOfRange { index: idx, line });
                }
                Ok(members[idx as usize].clone())
            },
            Value::Tuple(tuple) => {
                let idx = index_number(index, line)?;
                let max = tuple.members.len() as i64 - 1;
                if idx < 0 || idx > max {
                    return Err(RuntimeError::IndexOutOfRange { index: idx, line });
                }
                Ok(tuple.members[idx as usize].clone())
            },
            Value::Hash(pairs) => {
                let key = index.hash_key(line)?;
                Ok(pairs.borrow().get(&key).map_or(Value::Nil, |pair| pair.value.clone()))
            },
            other => Err(RuntimeError::NotIndexable { type_name:
                                                          other.type_name().to_string(),
                                                      line }),
        }
    }
}

/// Registered host data participates in operators as its language
/// projection.
pub(crate) fn unwrap_host(value: Value) -> Value {
    match value {
        Value::HostObject(host) => host.to_value(),
        other => other,
    }
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn index_number(index: &Value, line: usize) -> EvalResult<i64> {
    match index {
        Value::Number(n) => Ok(*n as i64),
        other => Err(RuntimeError::ArgumentType { position: "index".to_string(),
                                                  method:   "[]".to_string(),
                                                  expected: "number".to_string(),
                                                  got:      other.type_name().to_string(),
                                                  line }),
    }
}

fn number_compare(operator: InfixOp, left: f64, right: f64) -> bool {
    match operator {
        InfixOp::Lt => left < right,
        InfixOp::Le => left <= right,
        InfixOp::Gt => left > right,
        InfixOp::Ge => left >= right,
        InfixOp::Eq => left == right,
        _ => left != right,
    }
}

fn string_compare(operator: InfixOp, left: &str, right: &str) -> bool {
    match operator {
        InfixOp::Lt => left < right,
        InfixOp::Le => left <= right,
        InfixOp::Gt => left > right,
        InfixOp::Ge => left >= right,
        InfixOp::Eq => left == right,
        _ => left != right,
    }
}

fn number_arithmetic(operator: InfixOp, left: f64, right: f64, line: usize) -> EvalResult<f64> {
    match operator {
        InfixOp::Plus => Ok(left + right),
        InfixOp::Minus => Ok(left - right),
        InfixOp::Asterisk => Ok(left * right),
        InfixOp::Slash => {
            if right == 0.0 {
                return Err(RuntimeError::DivideByZero { line });
            }
            Ok(left / right)
        },
        InfixOp::Percent => Ok(left % right),
        InfixOp::Power => Ok(left.powf(right)),
        other => Err(infix_error(&Value::Number(left), other, &Value::Number(right), line)),
    }
}

pub(crate) fn infix_error(left: &Value, operator: InfixOp, right: &Value, line: usize)
                          -> RuntimeError {
    RuntimeError::InfixOperator { left:     left.type_name().to_string(),
                                  operator: operator.to_string(),
                                  right:    right.type_name().to_string(),
                                  line }
}
