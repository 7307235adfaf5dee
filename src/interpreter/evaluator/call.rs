use std::rc::Rc;

use crate::{ast::{Expr, StructDecl},
            error::RuntimeError,
            interpreter::{evaluator::core::{Control, EvalResult, Evaluator, hash_get_str,
                                            iterable_members, value_of},
                          host::call_host_function,
                          scope::Scope,
                          value::{core::{FunctionValue, StructValue, Value},
                                  methods}}};

impl Evaluator {
    /// Evaluates a call expression: arguments left-to-right, variadic
    /// unboxing, struct instantiation when the callee names a struct
    /// declaration, otherwise ordinary application.
    pub(crate) fn eval_call(&self,
                            function: &Expr,
                            arguments: &[Expr],
                            variadic: bool,
                            line: usize,
                            scope: &Rc<Scope>)
                            -> EvalResult<Control> {
        let args = match self.eval_arguments(arguments, variadic, line, scope)? {
            Ok(args) => args,
            Err(control) => return Ok(control),
        };

        if let Expr::Identifier { name, .. } = function
           && let Some(decl) = scope.get_struct(name)
        {
            return self.instantiate_struct(&decl, args, line, scope);
        }

        let callee = value_of!(self.eval_expr(function, scope)?);
        self.apply_function(callee, args, line, scope)
    }

    /// Evaluates an argument list; a variadic call site spreads its
    /// final iterable into positional arguments.
    fn eval_arguments(&self,
                      arguments: &[Expr],
                      variadic: bool,
                      line: usize,
                      scope: &Rc<Scope>)
                      -> EvalResult<Result<Vec<Value>, Control>> {
        let mut args = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match self.eval_expr(argument, scope)? {
                Control::Value(value) => args.push(value),
                other => return Ok(Err(other)),
            }
        }
        if variadic && let Some(last) = args.pop() {
            args.extend(iterable_members(&last, line)?);
        }
        Ok(Ok(args))
    }

    /// Applies a callable value to evaluated arguments.
    pub(crate) fn apply_function(&self,
                                 callee: Value,
                                 args: Vec<Value>,
                                 line: usize,
                                 scope: &Rc<Scope>)
                                 -> EvalResult<Control> {
        match callee {
            Value::Function(func) => self.invoke(&func, args, None, line),
            Value::Builtin(builtin) => (builtin.func)(line, scope, args).map(Control::Value),
            Value::HostFunction(host) => {
                call_host_function(line, &host, &args).map(Control::Value)
            },
            other => Err(RuntimeError::NotAFunction { type_name:
                                                          other.type_name().to_string(),
                                                      line }),
        }
    }

    /// Calls a closure: extends its captured scope with parameter
    /// bindings (a variadic parameter gathers the tail into an array),
    /// evaluates the body and unwraps `return`.
    fn invoke(&self,
              func: &Rc<FunctionValue>,
              args: Vec<Value>,
              self_value: Option<Value>,
              line: usize)
              -> EvalResult<Control> {
        let literal = &func.literal;
        let parameters = &literal.parameters;
        let fn_scope = Scope::child(&func.scope);

        if literal.variadic {
            let fixed = parameters.len().saturating_sub(1);
            if args.len() < fixed {
                return Err(RuntimeError::WrongArgumentCount { expected:
                                                                  format!("at least {fixed}"),
                                                              got: args.len(),
                                                              line });
            }
            let mut args = args;
            let rest = args.split_off(fixed);
            for (parameter, arg) in parameters[..fixed].iter().zip(args) {
                fn_scope.define(parameter, arg);
            }
            if let Some(last) = parameters.last() {
                fn_scope.define(last, Value::from(rest));
            }
        } else {
            if args.len() != parameters.len() {
                return Err(RuntimeError::WrongArgumentCount { expected:
                                                                  parameters.len().to_string(),
                                                              got: args.len(),
                                                              line });
            }
            for (parameter, arg) in parameters.iter().zip(args) {
                fn_scope.define(parameter, arg);
            }
        }

        if let Some(self_value) = self_value {
            fn_scope.define("self", self_value);
        }

        let outcome = self.eval_block(&literal.body, &fn_scope)?;
        Ok(unwrap_return(outcome))
    }

    /// Instantiates a struct declaration: evaluate the body in a fresh
    /// child scope, then run `init` with the arguments when present.
    /// Passing arguments to a struct without `init` is an error.
    fn instantiate_struct(&self,
                          decl: &Rc<StructDecl>,
                          args: Vec<Value>,
                          line: usize,
                          scope: &Rc<Scope>)
                          -> EvalResult<Control> {
        let instance_scope = Scope::child(scope);
        let _ = value_of!(self.eval_block(&decl.body, &instance_scope)?);

        let has_init = instance_scope.get("init").is_some();
        let instance = Value::Struct(Rc::new(StructValue { scope: instance_scope }));

        if !has_init {
            if !args.is_empty() {
                return Err(RuntimeError::NoConstructor { count: args.len(), line });
            }
            return Ok(Control::Value(instance));
        }

        match self.call_struct_method(&instance, "init", args, line)? {
            Control::Value(_) => Ok(Control::Value(instance)),
            other => Ok(other),
        }
    }

    /// Looks a method up in a struct's scope and calls it with `self`
    /// bound to the instance.
    fn call_struct_method(&self,
                          struct_value: &Value,
                          method: &str,
                          args: Vec<Value>,
                          line: usize)
                          -> EvalResult<Control> {
        let Value::Struct(instance) = struct_value else {
            return Err(RuntimeError::NotAFunction { type_name:
                                                        struct_value.type_name().to_string(),
                                                    line });
        };
        let Some(entry) = instance.scope.get(method) else {
            return Err(RuntimeError::NoMethod { method:    method.to_string(),
                                                type_name: "struct".to_string(),
                                                line });
        };
        let Value::Function(func) = entry else {
            return Err(RuntimeError::NotAFunction { type_name: entry.type_name().to_string(),
                                                    line });
        };
        self.invoke(&func, args, Some(struct_value.clone()), line)
    }

    /// Evaluates `obj.m` / `obj.m(args)`.
    ///
    /// Dispatch order: registered host namespaces (functions and
    /// variables) keyed by the raw identifier, then struct members
    /// with the uppercase export rule, then the intrinsic method table
    /// of the receiver's kind.
    pub(crate) fn eval_method_call(&self,
                                   object: &Expr,
                                   call: &Expr,
                                   line: usize,
                                   scope: &Rc<Scope>)
                                   -> EvalResult<Control> {
        if let Expr::Identifier { name: namespace, .. } = object {
            if let Some(global) = self.get_global(namespace) {
                match call {
                    Expr::Identifier { name, .. } => {
                        if let Some(value) = self.get_global(&format!("{namespace}.{name}")) {
                            return Ok(Control::Value(value));
                        }
                    },
                    Expr::Call { function, arguments, variadic, pos } => {
                        let method = call_name(function, line)?;
                        let args =
                            match self.eval_arguments(arguments, *variadic, pos.line, scope)? {
                                Ok(args) => args,
                                Err(control) => return Ok(control),
                            };

                        if let Value::Hash(table) = &global {
                            // A registered function namespace.
                            let entry = hash_get_str(&table.borrow(), &method);
                            return match entry {
                                Some(Value::HostFunction(host)) => {
                                    call_host_function(line, &host, &args).map(Control::Value)
                                },
                                Some(other) => self.apply_function(other, args, line, scope),
                                None => Err(RuntimeError::NoMethodSuggestion {
                                    namespace:  namespace.clone(),
                                    suggestion: capitalize(&method),
                                    method,
                                    line,
                                }),
                            };
                        }
                        return methods::call_method(line, &global, &method, args)
                            .map(Control::Value);
                    },
                    _ => {},
                }
            } else if let Expr::Identifier { name, .. } = call
                      && let Some(value) = self.get_global(&format!("{namespace}.{name}"))
            {
                return Ok(Control::Value(value));
            }
        }

        let receiver = value_of!(self.eval_expr(object, scope)?);

        if let Value::Struct(instance) = &receiver {
            return match call {
                Expr::Identifier { name, .. } => {
                    instance.scope.get(name).map(Control::Value).ok_or_else(|| {
                        RuntimeError::NoMethod { method:    name.clone(),
                                                 type_name: "struct".to_string(),
                                                 line }
                    })
                },
                Expr::Call { function, arguments, variadic, pos } => {
                    let method = call_name(function, line)?;
                    // Only uppercase-initial methods are callable from
                    // outside; `self.…` reaches everything.
                    if !method.chars().next().is_some_and(char::is_uppercase)
                       && object.to_string() != "self"
                    {
                        return Err(RuntimeError::NameNotExported { object:
                                                                       object.to_string(),
                                                                   name: method,
                                                                   line });
                    }
                    let args =
                        match self.eval_arguments(arguments, *variadic, pos.line, scope)? {
                            Ok(args) => args,
                            Err(control) => return Ok(control),
                        };
                    self.call_struct_method(&receiver, &method, args, line)
                },
                // e.g. `instance.member[idx]` - evaluated inside the
                // instance's scope.
                Expr::Index { .. } => self.eval_expr(call, &instance.scope),
                other => Err(RuntimeError::NoMethod { method:    other.to_string(),
                                                      type_name: "struct".to_string(),
                                                      line }),
            };
        }

        match call {
            Expr::Call { function, arguments, variadic, pos } => {
                let method = call_name(function, line)?;
                let args = match self.eval_arguments(arguments, *variadic, pos.line, scope)? {
                    Ok(args) => args,
                    Err(control) => return Ok(control),
                };
                methods::call_method(line, &receiver, &method, args).map(Control::Value)
            },
            other => Err(RuntimeError::NoMethod { method:    other.to_string(),
                                                  type_name: receiver.type_name()
                                                                     .to_string(),
                                                  line }),
        }
    }
}

fn call_name(function: &Expr, line: usize) -> EvalResult<String> {
    match function {
        Expr::Identifier { name, .. } => Ok(name.clone()),
        other => Err(RuntimeError::NoMethod { method:    other.to_string(),
                                              type_name: "expression".to_string(),
                                              line }),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                })
}

fn unwrap_return(outcome: Control) -> Control {
    match outcome {
        Control::Return(mut values) => match values.len() {
            0 => Control::Value(Value::Nil),
            1 => Control::Value(values.remove(0)),
            _ => Control::Value(Value::tuple(values, true)),
        },
        other => other,
    }
}
