use std::rc::Rc;

use crate::interpreter::lexer::Position;

/// A parsed source unit.
///
/// Top-level `import` statements are hoisted into `imports` (one entry
/// per distinct import path, in source order); everything else stays in
/// `statements`.
#[derive(Debug, Clone, Default)]
pub struct Program {
    /// Statements in source order.
    pub statements: Vec<Statement>,
    /// Hoisted imports, de-duplicated by path.
    pub imports:    Vec<ImportStatement>,
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.statements.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(" "))
    }
}

/// An `import a.b.c` statement together with the program parsed from
/// the resolved `.mp` file.
#[derive(Debug, Clone)]
pub struct ImportStatement {
    /// Slash-joined import path (`a/b/c`), without the `.mp` suffix.
    pub path:    String,
    /// The program parsed from the imported file.
    pub program: Rc<Program>,
    pub pos:     Position,
}

/// A block `{ … }` of statements.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub pos:        Position,
    /// Position of the closing brace.
    pub end_pos:    Position,
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.statements.iter().map(ToString::to_string).collect();
        write!(f, "{{ {} }}", rendered.join("; "))
    }
}

/// The `catch` arm of a `try` statement.
#[derive(Debug, Clone)]
pub struct CatchClause {
    /// Name bound to the thrown value, if any.
    pub var:  Option<String>,
    pub body: Block,
}

/// A `struct Name { … }` declaration. Declarations are recorded in the
/// scope and instantiated on call, so they are shared behind `Rc`.
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: String,
    pub body: Block,
    pub pos:  Position,
}

/// Statement variants.
#[derive(Debug, Clone)]
pub enum Statement {
    /// `let a, b = 1, 2` - missing values bind to `nil`, `_` discards.
    Let {
        names:  Vec<String>,
        values: Vec<Expr>,
        pos:    Position,
    },
    /// `a, b = f()` - assignment without declaration.
    MultiAssign {
        names:  Vec<Expr>,
        values: Vec<Expr>,
        pos:    Position,
    },
    /// `return`, `return x` or `return x, y`.
    Return {
        values: Vec<Expr>,
        pos:    Position,
    },
    /// `tailcall f(args)` - a tail-position return of the call result.
    TailCall {
        call: Expr,
        pos:  Position,
    },
    /// A standalone `{ … }` block.
    Block(Block),
    /// `import a.b.c` appearing in a nested position (top-level imports
    /// are hoisted into [`Program::imports`]).
    Import(ImportStatement),
    /// A struct declaration.
    Struct(Rc<StructDecl>),
    /// `try { … } catch v { … } finally { … }`.
    Try {
        body:    Block,
        catch:   Option<CatchClause>,
        finally: Option<Block>,
        pos:     Position,
    },
    /// `throw expr`.
    Throw {
        value: Expr,
        pos:   Position,
    },
    /// A bare expression.
    Expression(Expr),
}

impl Statement {
    /// Starting position of the statement.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Let { pos, .. }
            | Self::MultiAssign { pos, .. }
            | Self::Return { pos, .. }
            | Self::TailCall { pos, .. }
            | Self::Try { pos, .. }
            | Self::Throw { pos, .. } => *pos,
            Self::Block(block) => block.pos,
            Self::Import(import) => import.pos,
            Self::Struct(decl) => decl.pos,
            Self::Expression(expr) => expr.pos(),
        }
    }

    /// Position just past the statement.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            Self::Let { values, names: _, pos } => values.last().map_or(*pos, Expr::end),
            Self::MultiAssign { values, pos, .. } => values.last().map_or(*pos, Expr::end),
            Self::Return { values, pos } => values.last().map_or(*pos, Expr::end),
            Self::TailCall { call, .. } => call.end(),
            Self::Block(block) => block.end_pos,
            Self::Import(import) => import.pos,
            Self::Struct(decl) => decl.body.end_pos,
            Self::Try { finally, catch, body, .. } => finally.as_ref().map_or_else(
                || catch.as_ref().map_or(body.end_pos, |c| c.body.end_pos),
                |f| f.end_pos,
            ),
            Self::Throw { value, .. } => value.end(),
            Self::Expression(expr) => expr.end(),
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Let { names, values, .. } => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                if rendered.is_empty() {
                    write!(f, "let {};", names.join(", "))
                } else {
                    write!(f, "let {} = {}", names.join(", "), rendered.join(", "))
                }
            },
            Self::MultiAssign { names, values, .. } => {
                let lhs: Vec<String> = names.iter().map(ToString::to_string).collect();
                let rhs: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{} = {}", lhs.join(", "), rhs.join(", "))
            },
            Self::Return { values, .. } => {
                let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                if rendered.is_empty() {
                    write!(f, "return")
                } else {
                    write!(f, "return {}", rendered.join(", "))
                }
            },
            Self::TailCall { call, .. } => write!(f, "tailcall {call}"),
            Self::Block(block) => write!(f, "{block}"),
            Self::Import(import) => write!(f, "import {}", import.path.replace('/', ".")),
            Self::Struct(decl) => write!(f, "struct {} {}", decl.name, decl.body),
            Self::Try { body, catch, finally, .. } => {
                write!(f, "try {body}")?;
                if let Some(catch) = catch {
                    match &catch.var {
                        Some(var) => write!(f, " catch {var} {}", catch.body)?,
                        None => write!(f, " catch {}", catch.body)?,
                    }
                }
                if let Some(finally) = finally {
                    write!(f, " finally {finally}")?;
                }
                Ok(())
            },
            Self::Throw { value, .. } => write!(f, "throw {value}"),
            Self::Expression(expr) => write!(f, "{expr}"),
        }
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Plus,
    Minus,
    Bang,
}

impl std::fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Bang => "!",
        };
        write!(f, "{text}")
    }
}

/// Infix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
    Power,
    Eq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Match,
    NotMatch,
    Range,
    In,
}

impl InfixOp {
    /// True for the six comparison operators that may participate in a
    /// chained comparison (`a < b < c`).
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(self,
                 Self::Eq | Self::NotEq | Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }
}

impl std::fmt::Display for InfixOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Asterisk => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Power => "**",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Match => "=~",
            Self::NotMatch => "!~",
            Self::Range => "..",
            Self::In => "in",
        };
        write!(f, "{text}")
    }
}

/// Postfix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Increment,
    Decrement,
}

impl std::fmt::Display for PostfixOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Increment => "++",
            Self::Decrement => "--",
        };
        write!(f, "{text}")
    }
}

/// Assignment operators (`=` and the compound forms).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Plus,
    Minus,
    Asterisk,
    Slash,
    Percent,
}

impl std::fmt::Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Assign => "=",
            Self::Plus => "+=",
            Self::Minus => "-=",
            Self::Asterisk => "*=",
            Self::Slash => "/=",
            Self::Percent => "%=",
        };
        write!(f, "{text}")
    }
}

/// A function literal: `fn name(a, b) { … }`, `fn(a) { … }` or the
/// desugared form of an arrow function. Shared behind `Rc` so closures
/// can hold on to their defining literal without cloning the body.
#[derive(Debug, Clone)]
pub struct FunctionLiteral {
    /// Present for `fn name(…)`, absent for anonymous literals.
    pub name:       Option<String>,
    pub parameters: Vec<String>,
    /// When set, the last parameter collects the remaining arguments
    /// into an array.
    pub variadic:   bool,
    pub body:       Block,
    pub pos:        Position,
}

impl std::fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut params = self.parameters.join(", ");
        if self.variadic {
            params.push_str("...");
        }
        match &self.name {
            Some(name) => write!(f, "fn {name}({params}) {}", self.body),
            None => write!(f, "fn({params}) {}", self.body),
        }
    }
}

/// One `cond { body }` arm of an `if`/`else if` chain.
#[derive(Debug, Clone)]
pub struct IfCondition {
    pub cond: Expr,
    pub body: Block,
}

/// One arm of a `switch` expression.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// Case expressions; empty for the `default` arm.
    pub exprs:   Vec<Expr>,
    pub default: bool,
    pub block:   Block,
    pub pos:     Position,
}

/// Expression variants.
#[derive(Debug, Clone)]
pub enum Expr {
    Number {
        value: f64,
        pos:   Position,
    },
    Str {
        value: String,
        pos:   Position,
    },
    Boolean {
        value: bool,
        pos:   Position,
    },
    Nil {
        pos: Position,
    },
    Identifier {
        name: String,
        pos:  Position,
    },
    /// A regex literal; the pattern already carries its `(?flags)`.
    Regex {
        pattern: String,
        pos:     Position,
    },
    /// A backtick command literal.
    Cmd {
        command: String,
        pos:     Position,
    },
    Prefix {
        operator: PrefixOp,
        right:    Box<Expr>,
        pos:      Position,
    },
    /// An infix expression. `next` realizes chained comparisons: for
    /// `a < b < c` the node holds `a < b` plus `(<, c)`, and the
    /// evaluator short-circuits the chain like `a < b && b < c`.
    Infix {
        operator: InfixOp,
        left:     Box<Expr>,
        right:    Box<Expr>,
        next:     Option<(InfixOp, Box<Expr>)>,
        pos:      Position,
    },
    Postfix {
        operator: PostfixOp,
        left:     Box<Expr>,
        pos:      Position,
    },
    Assign {
        operator: AssignOp,
        target:   Box<Expr>,
        value:    Box<Expr>,
        pos:      Position,
    },
    If {
        conditions:  Vec<IfCondition>,
        alternative: Option<Block>,
        pos:         Position,
    },
    Switch {
        scrutinee: Box<Expr>,
        cases:     Vec<SwitchCase>,
        pos:       Position,
    },
    Fallthrough {
        pos: Position,
    },
    Function(Rc<FunctionLiteral>),
    Call {
        function:  Box<Expr>,
        arguments: Vec<Expr>,
        /// True when the call site spreads its last argument (`f(xs...)`).
        variadic:  bool,
        pos:       Position,
    },
    /// `object.name`, `object.method(args)` or `object.member[index]`.
    MethodCall {
        object: Box<Expr>,
        call:   Box<Expr>,
        pos:    Position,
    },
    Index {
        left:  Box<Expr>,
        index: Box<Expr>,
        pos:   Position,
    },
    Array {
        members: Vec<Expr>,
        pos:     Position,
    },
    Tuple {
        members: Vec<Expr>,
        pos:     Position,
    },
    /// A hash literal as an order-preserving pair list.
    Hash {
        pairs: Vec<(Expr, Expr)>,
        pos:   Position,
    },
    /// `for (init; cond; update) { body }` - any part may be absent.
    CFor {
        init:   Option<Box<Expr>>,
        cond:   Option<Box<Expr>>,
        update: Option<Box<Expr>>,
        body:   Block,
        pos:    Position,
    },
    /// `for item in sequence { body }`.
    ForEach {
        var:      String,
        iterable: Box<Expr>,
        body:     Block,
        pos:      Position,
    },
    /// `for key, value in collection { body }`; either name may be `_`.
    ForEachPair {
        key:      String,
        value:    String,
        iterable: Box<Expr>,
        body:     Block,
        pos:      Position,
    },
    /// `for { body }`.
    Forever {
        body: Block,
        pos:  Position,
    },
    While {
        condition: Box<Expr>,
        body:      Block,
        pos:       Position,
    },
    /// `do { body }` - loops until `break` or `return`.
    DoLoop {
        body: Block,
        pos:  Position,
    },
    Break {
        pos: Position,
    },
    Continue {
        pos: Position,
    },
}

impl Expr {
    /// Starting position of the expression.
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Self::Number { pos, .. }
            | Self::Str { pos, .. }
            | Self::Boolean { pos, .. }
            | Self::Nil { pos }
            | Self::Identifier { pos, .. }
            | Self::Regex { pos, .. }
            | Self::Cmd { pos, .. }
            | Self::Prefix { pos, .. }
            | Self::Infix { pos, .. }
            | Self::Postfix { pos, .. }
            | Self::Assign { pos, .. }
            | Self::If { pos, .. }
            | Self::Switch { pos, .. }
            | Self::Fallthrough { pos }
            | Self::Call { pos, .. }
            | Self::MethodCall { pos, .. }
            | Self::Index { pos, .. }
            | Self::Array { pos, .. }
            | Self::Tuple { pos, .. }
            | Self::Hash { pos, .. }
            | Self::CFor { pos, .. }
            | Self::ForEach { pos, .. }
            | Self::ForEachPair { pos, .. }
            | Self::Forever { pos, .. }
            | Self::While { pos, .. }
            | Self::DoLoop { pos, .. }
            | Self::Break { pos }
            | Self::Continue { pos } => *pos,
            Self::Function(literal) => literal.pos,
        }
    }

    /// Position just past the expression. Atoms report their starting
    /// position; composites recurse into their rightmost child.
    #[must_use]
    pub fn end(&self) -> Position {
        match self {
            Self::Prefix { right, .. } => right.end(),
            Self::Infix { right, next, .. } => {
                next.as_ref().map_or_else(|| right.end(), |(_, expr)| expr.end())
            },
            Self::Postfix { left, .. } => left.end(),
            Self::Assign { value, .. } => value.end(),
            Self::If { conditions, alternative, pos } => alternative.as_ref().map_or_else(
                || conditions.last().map_or(*pos, |c| c.body.end_pos),
                |alt| alt.end_pos,
            ),
            Self::Switch { cases, pos, .. } => cases.last().map_or(*pos, |c| c.block.end_pos),
            Self::Function(literal) => literal.body.end_pos,
            Self::Call { arguments, function, .. } => {
                arguments.last().map_or_else(|| function.end(), Self::end)
            },
            Self::MethodCall { call, .. } => call.end(),
            Self::Index { index, .. } => index.end(),
            Self::Array { members, pos } | Self::Tuple { members, pos } => {
                members.last().map_or(*pos, Self::end)
            },
            Self::Hash { pairs, pos } => pairs.last().map_or(*pos, |(_, value)| value.end()),
            Self::CFor { body, .. }
            | Self::ForEach { body, .. }
            | Self::ForEachPair { body, .. }
            | Self::Forever { body, .. }
            | Self::While { body, .. }
            | Self::DoLoop { body, .. } => body.end_pos,
            _ => self.pos(),
        }
    }

    /// Source line of the expression's starting position.
    #[must_use]
    pub fn line(&self) -> usize {
        self.pos().line
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number { value, .. } => write!(f, "{value}"),
            Self::Str { value, .. } => write!(f, "\"{value}\""),
            Self::Boolean { value, .. } => write!(f, "{value}"),
            Self::Nil { .. } => write!(f, "nil"),
            Self::Identifier { name, .. } => write!(f, "{name}"),
            Self::Regex { pattern, .. } => write!(f, "/{pattern}/"),
            Self::Cmd { command, .. } => write!(f, "`{command}`"),
            Self::Prefix { operator, right, .. } => write!(f, "({operator}{right})"),
            Self::Infix { operator, left, right, next, .. } => match next {
                Some((next_op, next_expr)) => {
                    write!(f, "({left} {operator} {right} {next_op} {next_expr})")
                },
                None => write!(f, "({left} {operator} {right})"),
            },
            Self::Postfix { operator, left, .. } => write!(f, "({left}{operator})"),
            Self::Assign { operator, target, value, .. } => {
                write!(f, "{target} {operator} {value}")
            },
            Self::If { conditions, alternative, .. } => {
                for (idx, cond) in conditions.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " else ")?;
                    }
                    write!(f, "if {} {}", cond.cond, cond.body)?;
                }
                if let Some(alt) = alternative {
                    write!(f, " else {alt}")?;
                }
                Ok(())
            },
            Self::Switch { scrutinee, cases, .. } => {
                write!(f, "switch {scrutinee} {{ ")?;
                for case in cases {
                    if case.default {
                        write!(f, "default {} ", case.block)?;
                    } else {
                        let exprs: Vec<String> = case.exprs.iter().map(ToString::to_string).collect();
                        write!(f, "case {} {} ", exprs.join(", "), case.block)?;
                    }
                }
                write!(f, "}}")
            },
            Self::Fallthrough { .. } => write!(f, "fallthrough"),
            Self::Function(literal) => write!(f, "{literal}"),
            Self::Call { function, arguments, variadic, .. } => {
                let mut args: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                if *variadic && let Some(last) = args.last_mut() {
                    last.push_str("...");
                }
                write!(f, "{function}({})", args.join(", "))
            },
            Self::MethodCall { object, call, .. } => write!(f, "{object}.{call}"),
            Self::Index { left, index, .. } => write!(f, "({left}[{index}])"),
            Self::Array { members, .. } => {
                let rendered: Vec<String> = members.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", rendered.join(", "))
            },
            Self::Tuple { members, .. } => {
                let rendered: Vec<String> = members.iter().map(ToString::to_string).collect();
                if rendered.len() == 1 {
                    write!(f, "({},)", rendered[0])
                } else {
                    write!(f, "({})", rendered.join(", "))
                }
            },
            Self::Hash { pairs, .. } => {
                let rendered: Vec<String> =
                    pairs.iter().map(|(key, value)| format!("{key}:{value}")).collect();
                write!(f, "{{{}}}", rendered.join(", "))
            },
            Self::CFor { init, cond, update, body, .. } => {
                let part = |expr: &Option<Box<Self>>| {
                    expr.as_ref().map_or_else(String::new, ToString::to_string)
                };
                write!(f,
                       "for ({}; {}; {}) {body}",
                       part(init),
                       part(cond),
                       part(update))
            },
            Self::ForEach { var, iterable, body, .. } => {
                write!(f, "for {var} in {iterable} {body}")
            },
            Self::ForEachPair { key, value, iterable, body, .. } => {
                write!(f, "for {key}, {value} in {iterable} {body}")
            },
            Self::Forever { body, .. } => write!(f, "for {body}"),
            Self::While { condition, body, .. } => write!(f, "while {condition} {body}"),
            Self::DoLoop { body, .. } => write!(f, "do {body}"),
            Self::Break { .. } => write!(f, "break"),
            Self::Continue { .. } => write!(f, "continue"),
        }
    }
}
