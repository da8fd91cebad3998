use binding_accessor_value::{HostError, Kind, Type};
use thiserror::Error;

/// A failure to turn expression text into a program. Positions are byte
/// offsets into the expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected end of expression at position {position}")]
    UnexpectedEnd { position: usize },

    #[error("unmatched '{bracket}' at position {position}")]
    UnmatchedBracket { bracket: char, position: usize },

    #[error("empty brackets at position {position}")]
    EmptyBracket { position: usize },

    #[error("invalid bracket contents at position {position}: expected an integer or a quoted string")]
    InvalidBracket { position: usize },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("invalid pipe at position {position}: {reason}")]
    InvalidPipe { reason: &'static str, position: usize },

    #[error("call arguments nested deeper than {limit} levels at position {position}")]
    NestingTooDeep { limit: usize, position: usize },

    #[error("unknown transform '{name}'")]
    UnknownTransform { name: String },

    #[error("syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },
}

/// A failure while evaluating a compiled program against a context value.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    /// The traversal went deeper than the configured limit.
    #[error("maximum execution depth exceeded")]
    MaxExecutionDepth,

    #[error("nil dereference on {operation}")]
    NilDereference { operation: &'static str },

    #[error("unknown field '{name}' in a value of type {type_name}")]
    UnknownField { name: String, type_name: Type },

    #[error("field '{name}' of {type_name} is not accessible")]
    InaccessibleField { name: String, type_name: Type },

    #[error("'{name}' of {type_name} is only available through a pointer")]
    ReferenceBehavior { name: String, type_name: Type },

    #[error("field access on a {kind} value")]
    NotAStruct { kind: Kind },

    #[error("cannot index a {kind} value")]
    NotIndexable { kind: Kind },

    #[error("sequence index must be a non-negative integer, got {index}")]
    InvalidIndex { index: String },

    #[error("index {index} out of range for a sequence of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("map key of type {found} is not assignable to the key type {expected}")]
    KeyType { expected: Type, found: Type },

    #[error("cannot call a {kind} value")]
    NotCallable { kind: Kind },

    #[error("unexpected argument count: expected {expected}, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("unexpected argument type at position {position}: expected {expected}, got {found}")]
    ArgumentType { position: usize, expected: Type, found: Type },

    #[error(transparent)]
    Host(#[from] HostError),
}

impl ExecutionError {
    pub fn is_max_depth(&self) -> bool {
        matches!(self, ExecutionError::MaxExecutionDepth)
    }
}

/// Either side of the two error taxonomies, for callers that compile and
/// evaluate in one go.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("compilation failed: {0}")]
    Compile(#[from] CompileError),

    #[error("evaluation failed: {0}")]
    Execution(#[from] ExecutionError),
}
