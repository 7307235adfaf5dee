#[derive(Debug, Clone)]
/// Represents all errors that can occur during evaluation and runtime.
pub enum RuntimeError {
    /// Division (or modulo) by zero.
    DivideByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An index was outside the valid range.
    IndexOutOfRange {
        /// The index that was requested.
        index: i64,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A value of this type cannot be used as a hash key.
    KeyNotHashable {
        /// Type of the offending key.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// Tried to use an undefined name.
    UnknownIdentifier {
        /// The name that failed to resolve.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A prefix operator was applied to an unsupported operand.
    PrefixOperator {
        /// The operator.
        operator:  String,
        /// Type of the operand.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// An infix operator was applied to unsupported operands.
    InfixOperator {
        /// Type of the left operand.
        left:     String,
        /// The operator.
        operator: String,
        /// Type of the right operand.
        right:    String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A postfix operator was applied to an unsupported operand.
    PostfixOperator {
        /// The operator.
        operator:  String,
        /// Type of the operand.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// Tried to call a value that is not callable.
    NotAFunction {
        /// Type of the called value.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A thrown value escaped to the program top level.
    ThrowNotHandled {
        /// Inspect form of the thrown value.
        value: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The wrong number of arguments was supplied.
    WrongArgumentCount {
        /// Expected arity, as text ("1", "at least one", …).
        expected: String,
        /// How many arguments arrived.
        got:      usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// An argument had the wrong type.
    ArgumentType {
        /// Which argument ("first", "second", …).
        position: String,
        /// The method or builtin being called.
        method:   String,
        /// The expected type.
        expected: String,
        /// The type actually supplied.
        got:      String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// No such method for this value kind.
    NoMethod {
        /// The method name.
        method:    String,
        /// Type of the receiver.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// No such method on a registered host namespace; suggests the
    /// capitalized spelling.
    NoMethodSuggestion {
        /// The namespace.
        namespace:  String,
        /// The missing method.
        method:     String,
        /// The suggested spelling.
        suggestion: String,
        /// The source line where the error occurred.
        line:       usize,
    },
    /// The for loop's operand cannot be iterated.
    NotIterable {
        /// The source line where the error occurred.
        line: usize,
    },
    /// An imported program failed to evaluate.
    ImportFailed {
        /// The import path.
        path: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Referred to a lowercase (unexported) name from outside.
    NameNotExported {
        /// The receiver expression.
        object: String,
        /// The unexported name.
        name:   String,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// Indexing applied to a value that is not indexable.
    NotIndexable {
        /// Type of the value.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// The right-hand side of `=~`/`!~` was not a regex.
    NotRegex {
        /// Type of the right operand.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// Arguments were passed to a struct without an `init` method.
    NoConstructor {
        /// How many arguments were passed.
        count: usize,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A `..` operand was not a number.
    RangeOperand {
        /// Type of the offending operand.
        type_name: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A regex literal failed to compile.
    InvalidRegex {
        /// The compiler's message.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Tuples are immutable; an element assignment was attempted.
    TupleAssignment {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The left-hand side of an assignment was not assignable.
    AssignTarget {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A file operation failed.
    FileOperation {
        /// The operation ("read", "close", …).
        operation: String,
        /// The underlying reason.
        reason:    String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// `open` was given a mode outside the mode table.
    UnknownFileMode {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A registered host function failed or panicked.
    HostCall {
        /// The host-side message.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A host name contained a '.' during registration.
    DottedHostName {
        /// The offending name.
        name: String,
    },
    /// A command literal failed to run.
    CommandFailed {
        /// Captured stderr or the spawn error.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// Writing to the output sink failed.
    Io {
        /// The underlying I/O error.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A `printf` format string was malformed.
    InvalidFormat {
        /// Details about the problem.
        message: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DivideByZero { line } => write!(f, "Error on line {line}: Divide by zero."),
            Self::IndexOutOfRange { index, line } => {
                write!(f, "Error on line {line}: Index error: '{index}' out of range.")
            },
            Self::KeyNotHashable { type_name, line } => {
                write!(f, "Error on line {line}: Key error: type {type_name} is not hashable.")
            },
            Self::UnknownIdentifier { name, line } => {
                write!(f, "Error on line {line}: Unknown identifier: '{name}' is not defined.")
            },
            Self::PrefixOperator { operator, type_name, line } => write!(f,
                "Error on line {line}: Unsupported operator for prefix expression: '{operator}' and type {type_name}."),
            Self::InfixOperator { left, operator, right, line } => write!(f,
                "Error on line {line}: Unsupported operator for infix expression: {left} '{operator}' {right}."),
            Self::PostfixOperator { operator, type_name, line } => write!(f,
                "Error on line {line}: Unsupported operator for postfix expression: '{operator}' and type {type_name}."),
            Self::NotAFunction { type_name, line } => {
                write!(f, "Error on line {line}: Expect a function, got {type_name}.")
            },
            Self::ThrowNotHandled { value, line } => {
                write!(f, "Error on line {line}: Throw object '{value}' not handled.")
            },
            Self::WrongArgumentCount { expected, got, line } => write!(f,
                "Error on line {line}: Wrong number of arguments. expected={expected}, got={got}."),
            Self::ArgumentType { position, method, expected, got, line } => write!(f,
                "Error on line {line}: {position} argument for '{method}' should be type {expected}, got {got}."),
            Self::NoMethod { method, type_name, line } => write!(f,
                "Error on line {line}: Undefined method '{method}' for object {type_name}."),
            Self::NoMethodSuggestion { namespace, method, suggestion, line } => write!(f,
                "Error on line {line}: Undefined method '{namespace}.{method}'. Did you mean '{namespace}.{suggestion}'?"),
            Self::NotIterable { line } => {
                write!(f, "Error on line {line}: For loop's operating type must be iterable.")
            },
            Self::ImportFailed { path, line } => {
                write!(f, "Error on line {line}: Import error: {path}.")
            },
            Self::NameNotExported { object, name, line } => write!(f,
                "Error on line {line}: Cannot refer to unexported name {object}.{name}."),
            Self::NotIndexable { type_name, line } => {
                write!(f, "Error on line {line}: Index error: type {type_name} is not indexable.")
            },
            Self::NotRegex { type_name, line } => write!(f,
                "Error on line {line}: Right hand side is not a regexp object, got {type_name}."),
            Self::NoConstructor { count, line } => write!(f,
                "Error on line {line}: Got {count} arguments, but the struct has no 'init' method."),
            Self::RangeOperand { type_name, line } => write!(f,
                "Error on line {line}: Range (..) operands should be numbers, got {type_name}."),
            Self::InvalidRegex { message, line } => {
                write!(f, "Error on line {line}: Invalid regular expression: {message}.")
            },
            Self::TupleAssignment { line } => {
                write!(f, "Error on line {line}: Tuple element can not be assigned.")
            },
            Self::AssignTarget { line } => {
                write!(f, "Error on line {line}: Cannot assign to this expression.")
            },
            Self::FileOperation { operation, reason, line } => {
                write!(f, "Error on line {line}: '{operation}' failed. reason: {reason}.")
            },
            Self::UnknownFileMode { line } => {
                write!(f, "Error on line {line}: Unknown file mode supplied.")
            },
            Self::HostCall { message, line } => {
                write!(f, "Error on line {line}: Error calling host function: {message}.")
            },
            Self::DottedHostName { name } => {
                write!(f, "Host registration error: name '{name}' contains '.'.")
            },
            Self::CommandFailed { message, line } => {
                write!(f, "Error on line {line}: Command failed: {message}.")
            },
            Self::Io { message, line } => {
                write!(f, "Error on line {line}: I/O error: {message}.")
            },
            Self::InvalidFormat { message, line } => {
                write!(f, "Error on line {line}: Invalid format string: {message}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
