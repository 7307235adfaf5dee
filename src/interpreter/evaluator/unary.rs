use std::rc::Rc;

use crate::{ast::{Expr, PostfixOp, PrefixOp},
            error::RuntimeError,
            interpreter::{evaluator::core::{Control, EvalResult, Evaluator, value_of},
                          scope::Scope,
                          value::core::Value}};

impl Evaluator {
    /// Prefix `+` and `-` require a number; `!` negates the operand's
    /// truthiness.
    pub(crate) fn eval_prefix(operator: PrefixOp, value: &Value, line: usize)
                              -> EvalResult<Value> {
        match (operator, value) {
            (PrefixOp::Plus, Value::Number(n)) => Ok(Value::Number(*n)),
            (PrefixOp::Minus, Value::Number(n)) => Ok(Value::Number(-n)),
            (PrefixOp::Bang, operand) => Ok(Value::Boolean(!operand.is_truthy())),
            (op, operand) => {
                Err(RuntimeError::PrefixOperator { operator:  op.to_string(),
                                                   type_name: operand.type_name().to_string(),
                                                   line })
            },
        }
    }

    /// Postfix `++`/`--` mutates the named binding and yields the
    /// pre-mutation value. The operand must be an identifier naming a
    /// number.
    pub(crate) fn eval_postfix(&self,
                               operator: PostfixOp,
                               operand: &Expr,
                               line: usize,
                               scope: &Rc<Scope>)
                               -> EvalResult<Control> {
        let current = value_of!(self.eval_expr(operand, scope)?);
        let type_name = current.type_name();

        let Value::Number(n) = current else {
            return Err(RuntimeError::PostfixOperator { operator: operator.to_string(),
                                                       type_name: type_name.to_string(),
                                                       line });
        };
        let Expr::Identifier { name, .. } = operand else {
            return Err(RuntimeError::PostfixOperator { operator: operator.to_string(),
                                                       type_name: type_name.to_string(),
                                                       line });
        };

        let delta = match operator {
            PostfixOp::Increment => 1.0,
            PostfixOp::Decrement => -1.0,
        };
        scope.assign(name, Value::Number(n + delta));
        Ok(Control::Value(Value::Number(n)))
    }
}
