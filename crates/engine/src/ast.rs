//! Defines the Abstract Syntax Tree (AST) for binding accessor expressions.
//!
//! The grammar is a single chain, so an expression is a root followed by a
//! flat list of steps and an optional trailing transform.

/// A parsed expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub root: Root,
    pub steps: Vec<Step>,
    /// The transform named after a trailing `|`, still unresolved.
    pub transform: Option<String>,
}

/// Where the chain starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Root {
    /// The context value (`#`).
    Context,
    /// A string literal (`'text'`).
    Literal(String),
    /// `nil`.
    Nil,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Member or zero-argument behavior access (`.name`).
    Field(String),
    /// Bracket access (`[2]`, `['key']`).
    Index(Literal),
    /// Invocation of the current value (`(#.A, 'b')`).
    Call(Vec<Expression>),
}

/// A bracket key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    Str(String),
}
