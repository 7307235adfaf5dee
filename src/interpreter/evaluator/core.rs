use std::{cell::RefCell,
          collections::HashMap,
          rc::Rc};

use crate::{ast::{Block, Expr, ImportStatement, Program, Statement},
            error::RuntimeError,
            interpreter::{evaluator::builtin,
                          scope::Scope,
                          value::{core::{FileStream, FileValue, FunctionValue, HashData,
                                         HashPair, RegexValue, Value},
                                  hash_key::HashKey}}};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure. Runtime faults always travel
/// on the error channel; user-visible control flow travels inside
/// [`Control`].
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The outcome of evaluating a node.
///
/// `Value` is the ordinary case. The remaining variants are the
/// control-flow sentinels that bubble up through enclosing blocks:
/// `return` (with its value list), `break`/`continue` (consumed by
/// loops), `fallthrough` (consumed by `switch`) and `throw` (consumed
/// by `try`, or converted to a runtime error at the program top
/// level).
#[derive(Debug, Clone)]
pub enum Control {
    Value(Value),
    Return(Vec<Value>),
    Break,
    Continue,
    Fallthrough,
    Throw { value: Value, line: usize },
}

/// Extracts the value from a [`Control`], propagating any other
/// control flow to the caller.
macro_rules! value_of {
    ($control:expr) => {
        match $control {
            $crate::interpreter::evaluator::core::Control::Value(value) => value,
            other => return Ok(other),
        }
    };
}
pub(crate) use value_of;

/// The tree-walking evaluator.
///
/// Owns the process-wide pieces of interpreter state: the global table
/// holding `stdin`/`stdout`/`stderr`, the `os` facade and host
/// registrations, plus the cache of evaluated imports. All lexical
/// state lives in [`Scope`]s, so one evaluator can run many programs.
///
/// # Example
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use magpie::interpreter::{evaluator::core::Evaluator,
///                           lexer::Lexer,
///                           parser::core::Parser,
///                           scope::Scope};
///
/// let mut parser = Parser::new(Lexer::new("let add = fn(x, y) { x + y }; add(1, 2)"));
/// let program = parser.parse_program();
/// assert!(parser.errors().is_empty());
///
/// let evaluator = Evaluator::new();
/// let scope = Scope::root(Rc::new(RefCell::new(Vec::<u8>::new())));
/// let result = evaluator.eval_program(&program, &scope).unwrap();
/// assert_eq!(result.to_string(), "3");
/// ```
pub struct Evaluator {
    globals: RefCell<HashMap<String, Value>>,
    imports: RefCell<HashMap<String, Rc<Scope>>>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator with the standard globals registered:
    /// `stdin`, `stdout` and `stderr` as file values, and `os`.
    #[must_use]
    pub fn new() -> Self {
        let evaluator = Self { globals: RefCell::new(HashMap::new()),
                               imports: RefCell::new(HashMap::new()), };
        evaluator.set_global("stdin", std_file(FileStream::Stdin, "<stdin>"));
        evaluator.set_global("stdout", std_file(FileStream::Stdout, "<stdout>"));
        evaluator.set_global("stderr", std_file(FileStream::Stderr, "<stderr>"));
        evaluator.set_global("os", Value::Os);
        evaluator
    }

    /// Installs or replaces a global.
    pub fn set_global(&self, name: &str, value: Value) {
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    /// Looks up a global by name.
    #[must_use]
    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.globals.borrow().get(name).cloned()
    }

    /// Evaluates a program in `scope`: imports first, then statements
    /// in order. A top-level `return` collapses to its first value; an
    /// uncaught `throw` becomes a runtime error.
    pub fn eval_program(&self, program: &Program, scope: &Rc<Scope>) -> EvalResult<Value> {
        for import in &program.imports {
            self.eval_import(import, scope)?;
        }

        let mut result = Value::Nil;
        for statement in &program.statements {
            match self.eval_statement(statement, scope)? {
                Control::Value(value) => result = value,
                Control::Return(values) => {
                    return Ok(values.into_iter().next().unwrap_or(Value::Nil));
                },
                Control::Throw { value, line } => {
                    return Err(RuntimeError::ThrowNotHandled { value: value.to_string(),
                                                               line });
                },
                Control::Break | Control::Continue | Control::Fallthrough => {
                    result = Value::Nil;
                },
            }
        }
        Ok(result)
    }

    /// Evaluates an import: the module program runs once in a fresh
    /// root scope (cached per path), then its uppercase-initial names
    /// and structs are copied into `scope`.
    fn eval_import(&self, import: &ImportStatement, scope: &Rc<Scope>) -> EvalResult<()> {
        let cached = self.imports.borrow().get(&import.path).cloned();
        if let Some(module_scope) = cached {
            module_scope.get_all_exported(scope);
            return Ok(());
        }

        let module_scope = Scope::root(scope.writer());
        self.eval_program(&import.program, &module_scope).map_err(|_| {
            RuntimeError::ImportFailed { path: import.path.clone(),
                                         line: import.pos.line, }
        })?;

        self.imports
            .borrow_mut()
            .insert(import.path.clone(), Rc::clone(&module_scope));
        module_scope.get_all_exported(scope);
        Ok(())
    }

    /// Evaluates a single statement.
    pub(crate) fn eval_statement(&self, statement: &Statement, scope: &Rc<Scope>)
                                 -> EvalResult<Control> {
        match statement {
            Statement::Let { names, values, .. } => self.eval_let(names, values, scope),
            Statement::MultiAssign { names, values, .. } => {
                self.eval_multi_assign(names, values, scope)
            },
            Statement::Return { values, .. } => {
                let mut out = Vec::with_capacity(values.len());
                for value in values {
                    out.push(value_of!(self.eval_expr(value, scope)?));
                }
                Ok(Control::Return(out))
            },
            Statement::TailCall { call, .. } => {
                let value = value_of!(self.eval_expr(call, scope)?);
                Ok(Control::Return(vec![value]))
            },
            Statement::Block(block) => {
                let child = Scope::child(scope);
                self.eval_block(block, &child)
            },
            Statement::Import(import) => {
                self.eval_import(import, scope)?;
                Ok(Control::Value(Value::Nil))
            },
            Statement::Struct(decl) => {
                scope.define_struct(Rc::clone(decl));
                Ok(Control::Value(Value::Nil))
            },
            Statement::Try { body, catch, finally, .. } => {
                self.eval_try(body, catch.as_ref(), finally.as_ref(), scope)
            },
            Statement::Throw { value, pos } => {
                let thrown = value_of!(self.eval_expr(value, scope)?);
                Ok(Control::Throw { value: thrown,
                                    line:  pos.line, })
            },
            Statement::Expression(expr) => self.eval_expr(expr, scope),
        }
    }

    /// Evaluates the statements of a block in `scope`, stopping early
    /// on any control-flow sentinel. The block's value is the value of
    /// its last statement.
    pub(crate) fn eval_block(&self, block: &Block, scope: &Rc<Scope>) -> EvalResult<Control> {
        let mut result = Value::Nil;
        for statement in &block.statements {
            match self.eval_statement(statement, scope)? {
                Control::Value(value) => result = value,
                other => return Ok(other),
            }
        }
        Ok(Control::Value(result))
    }

    fn eval_let(&self, names: &[String], values: &[Expr], scope: &Rc<Scope>)
                -> EvalResult<Control> {
        let flattened = match self.eval_unpacked(values, scope)? {
            Ok(values) => values,
            Err(control) => return Ok(control),
        };
        let mut result = Value::Nil;
        for (idx, name) in names.iter().enumerate() {
            if name == "_" {
                continue;
            }
            let value = flattened.get(idx).cloned().unwrap_or(Value::Nil);
            scope.define(name, value.clone());
            result = value;
        }
        Ok(Control::Value(result))
    }

    fn eval_multi_assign(&self, names: &[Expr], values: &[Expr], scope: &Rc<Scope>)
                         -> EvalResult<Control> {
        let flattened = match self.eval_unpacked(values, scope)? {
            Ok(values) => values,
            Err(control) => return Ok(control),
        };
        let mut result = Value::Nil;
        for (idx, name) in names.iter().enumerate() {
            let Expr::Identifier { name, .. } = name else {
                continue;
            };
            if name == "_" {
                continue;
            }
            let value = flattened.get(idx).cloned().unwrap_or(Value::Nil);
            scope.assign(name, value.clone());
            result = value;
        }
        Ok(Control::Value(result))
    }

    /// Evaluates a value list, unpacking any multi-tuple (a function's
    /// multiple return values) into individual values. Control flow
    /// raised by a value expression comes back through the outer
    /// `Err`-less channel.
    fn eval_unpacked(&self, values: &[Expr], scope: &Rc<Scope>)
                     -> EvalResult<Result<Vec<Value>, Control>> {
        let mut out = Vec::with_capacity(values.len());
        for expr in values {
            match self.eval_expr(expr, scope)? {
                Control::Value(Value::Tuple(tuple)) if tuple.is_multi => {
                    out.extend(tuple.members.iter().cloned());
                },
                Control::Value(value) => out.push(value),
                other => return Ok(Err(other)),
            }
        }
        Ok(Ok(out))
    }

    fn eval_try(&self,
                body: &Block,
                catch: Option<&crate::ast::CatchClause>,
                finally: Option<&Block>,
                scope: &Rc<Scope>)
                -> EvalResult<Control> {
        let (outcome, unhandled) = match self.eval_block(body, scope)? {
            Control::Throw { value, line } => match catch {
                Some(clause) => {
                    if let Some(var) = &clause.var {
                        scope.define(var, value);
                    }
                    let handled = self.eval_block(&clause.body, scope)?;
                    if let Some(var) = &clause.var {
                        scope.delete(var);
                    }
                    (handled, None)
                },
                None => (Control::Value(Value::Nil),
                         Some(Control::Throw { value, line })),
            },
            other => (other, None),
        };

        if let Some(finally_block) = finally {
            // finally always runs and its value becomes the result,
            // replacing even an uncaught throw.
            return self.eval_block(finally_block, scope);
        }

        if let Some(throw) = unhandled {
            return Ok(throw);
        }
        Ok(outcome)
    }

    /// Evaluates an expression.
    #[allow(clippy::too_many_lines)]
    pub(crate) fn eval_expr(&self, expr: &Expr, scope: &Rc<Scope>) -> EvalResult<Control> {
        match expr {
            Expr::Number { value, .. } => Ok(Control::Value(Value::Number(*value))),
            Expr::Str { value, .. } => Ok(Control::Value(Value::from(value.as_str()))),
            Expr::Boolean { value, .. } => Ok(Control::Value(Value::Boolean(*value))),
            Expr::Nil { .. } => Ok(Control::Value(Value::Nil)),
            Expr::Identifier { name, pos } => {
                self.eval_identifier(name, pos.line, scope).map(Control::Value)
            },
            Expr::Regex { pattern, pos } => {
                let regex = regex::Regex::new(pattern).map_err(|err| {
                                RuntimeError::InvalidRegex { message: err.to_string(),
                                                             line:    pos.line, }
                            })?;
                Ok(Control::Value(Value::Regex(Rc::new(RegexValue { regex,
                                                                    source:
                                                                        pattern.clone() }))))
            },
            Expr::Cmd { command, pos } => {
                builtin::run_command(pos.line, command).map(Control::Value)
            },
            Expr::Prefix { operator, right, pos } => {
                let value = value_of!(self.eval_expr(right, scope)?);
                Self::eval_prefix(*operator, &value, pos.line).map(Control::Value)
            },
            Expr::Infix { operator, left, right, next, pos } => {
                self.eval_infix(*operator, left, right, next.as_ref(), pos.line, scope)
            },
            Expr::Postfix { operator, left, pos } => {
                self.eval_postfix(*operator, left, pos.line, scope)
            },
            Expr::Assign { operator, target, value, pos } => {
                self.eval_assign(*operator, target, value, pos.line, scope)
            },
            Expr::If { conditions, alternative, .. } => {
                self.eval_if(conditions, alternative.as_ref(), scope)
            },
            Expr::Switch { scrutinee, cases, .. } => self.eval_switch(scrutinee, cases, scope),
            Expr::Fallthrough { .. } => Ok(Control::Fallthrough),
            Expr::Break { .. } => Ok(Control::Break),
            Expr::Continue { .. } => Ok(Control::Continue),
            Expr::Function(literal) => {
                let function =
                    Value::Function(Rc::new(FunctionValue { literal: Rc::clone(literal),
                                                            scope:   Rc::clone(scope), }));
                // A named literal installs itself in the defining
                // scope, which is what makes recursion work.
                if let Some(name) = &literal.name {
                    scope.define(name, function.clone());
                }
                Ok(Control::Value(function))
            },
            Expr::Call { function, arguments, variadic, pos } => {
                self.eval_call(function, arguments, *variadic, pos.line, scope)
            },
            Expr::MethodCall { object, call, pos } => {
                self.eval_method_call(object, call, pos.line, scope)
            },
            Expr::Index { left, index, pos } => {
                let container = value_of!(self.eval_expr(left, scope)?);
                let index = value_of!(self.eval_expr(index, scope)?);
                Self::eval_index(&container, &index, pos.line).map(Control::Value)
            },
            Expr::Array { members, .. } => {
                let values = value_of!(self.eval_members(members, scope)?);
                Ok(Control::Value(values))
            },
            Expr::Tuple { members, .. } => {
                let Value::Array(values) = value_of!(self.eval_members(members, scope)?)
                else {
                    unreachable!("eval_members always yields an array");
                };
                let members = values.borrow().clone();
                Ok(Control::Value(Value::tuple(members, false)))
            },
            Expr::Hash { pairs, pos } => self.eval_hash(pairs, pos.line, scope),
            Expr::CFor { init, cond, update, body, .. } => {
                self.eval_c_for(init.as_deref(), cond.as_deref(), update.as_deref(), body, scope)
            },
            Expr::ForEach { var, iterable, body, pos } => {
                self.eval_foreach(var, iterable, body, pos.line, scope)
            },
            Expr::ForEachPair { key, value, iterable, body, pos } => {
                self.eval_foreach_pair(key, value, iterable, body, pos.line, scope)
            },
            Expr::Forever { body, .. } => self.eval_forever(body, scope),
            Expr::While { condition, body, .. } => self.eval_while(condition, body, scope),
            Expr::DoLoop { body, .. } => self.eval_forever(body, scope),
        }
    }

    /// Resolves an identifier: globals first, then the scope chain,
    /// then the builtin table.
    fn eval_identifier(&self, name: &str, line: usize, scope: &Rc<Scope>) -> EvalResult<Value> {
        if let Some(value) = self.get_global(name) {
            return Ok(value);
        }
        if let Some(value) = scope.get(name) {
            return Ok(value);
        }
        if let Some(builtin) = builtin::lookup(name) {
            return Ok(Value::Builtin(builtin));
        }
        Err(RuntimeError::UnknownIdentifier { name: name.to_string(), line })
    }

    fn eval_members(&self, members: &[Expr], scope: &Rc<Scope>) -> EvalResult<Control> {
        let mut values = Vec::with_capacity(members.len());
        for member in members {
            values.push(value_of!(self.eval_expr(member, scope)?));
        }
        Ok(Control::Value(Value::from(values)))
    }

    fn eval_hash(&self, pairs: &[(Expr, Expr)], line: usize, scope: &Rc<Scope>)
                 -> EvalResult<Control> {
        let mut data = HashData::new();
        for (key_expr, value_expr) in pairs {
            let key = value_of!(self.eval_expr(key_expr, scope)?);
            let hashed = key.hash_key(line)?;
            let value = value_of!(self.eval_expr(value_expr, scope)?);
            data.insert(hashed, HashPair { key, value });
        }
        Ok(Control::Value(Value::Hash(Rc::new(RefCell::new(data)))))
    }

    fn eval_if(&self,
               conditions: &[crate::ast::IfCondition],
               alternative: Option<&Block>,
               scope: &Rc<Scope>)
               -> EvalResult<Control> {
        for condition in conditions {
            let value = value_of!(self.eval_expr(&condition.cond, scope)?);
            if value.is_truthy() {
                return self.eval_block(&condition.body, scope);
            }
        }
        if let Some(alternative) = alternative {
            return self.eval_block(alternative, scope);
        }
        Ok(Control::Value(Value::Nil))
    }

    /// Evaluates a `switch`. A case matches when its value has the
    /// same type tag and equal value as the scrutinee, or when a regex
    /// case matches the scrutinee's inspect form. A case block ending
    /// in `fallthrough` continues with the next case's block
    /// unconditionally.
    fn eval_switch(&self,
                   scrutinee: &Expr,
                   cases: &[crate::ast::SwitchCase],
                   scope: &Rc<Scope>)
                   -> EvalResult<Control> {
        let subject = value_of!(self.eval_expr(scrutinee, scope)?);

        let mut default_block = None;
        let mut matched_any = false;
        let mut through = false;

        for case in cases {
            if case.default {
                default_block = Some(&case.block);
                continue;
            }

            let mut matched = through;
            if !through {
                for expr in &case.exprs {
                    let candidate = value_of!(self.eval_expr(expr, scope)?);
                    let hit = match &candidate {
                        Value::Regex(re) => re.regex.is_match(&subject.to_string()),
                        other => {
                            other.type_name() == subject.type_name()
                            && other.eq_value(&subject)
                        },
                    };
                    if hit {
                        matched = true;
                        break;
                    }
                }
            }

            if matched {
                matched_any = true;
                through = false;
                match self.eval_block(&case.block, scope)? {
                    Control::Fallthrough => {
                        through = true;
                    },
                    Control::Value(_) => return Ok(Control::Value(Value::Nil)),
                    other => return Ok(other),
                }
            }
        }

        if !matched_any && let Some(block) = default_block {
            return match self.eval_block(block, scope)? {
                Control::Value(_) | Control::Fallthrough => Ok(Control::Value(Value::Nil)),
                other => Ok(other),
            };
        }

        Ok(Control::Value(Value::Nil))
    }
}

fn std_file(stream: FileStream, name: &str) -> Value {
    Value::File(Rc::new(RefCell::new(FileValue { stream,
                                                 name: name.to_string(),
                                                 reader: None })))
}

/// The members a value yields to `for … in`, variadic spreading and
/// indexed iteration: string codepoints, array members, tuple members
/// or a host list.
pub(crate) fn iterable_members(value: &Value, line: usize) -> EvalResult<Vec<Value>> {
    match value {
        Value::Str(s) => Ok(s.chars().map(|ch| Value::from(ch.to_string())).collect()),
        Value::Array(members) => Ok(members.borrow().clone()),
        Value::Tuple(tuple) => Ok(tuple.members.clone()),
        Value::HostObject(host) => match host.to_value() {
            Value::Array(members) => Ok(members.borrow().clone()),
            _ => Err(RuntimeError::NotIterable { line }),
        },
        _ => Err(RuntimeError::NotIterable { line }),
    }
}

/// Looks up a string key in a hash without consing a full value.
pub(crate) fn hash_get_str(data: &HashData, key: &str) -> Option<Value> {
    data.get(&HashKey::Str(Rc::from(key))).map(|pair| pair.value.clone())
}
