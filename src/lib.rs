//! Binding accessors: compiled path expressions over dynamic host values.
//!
//! This crate bundles the value model and the expression engine behind one
//! import:
//!
//! ```
//! use binding_accessor::{Record, Value, compile};
//!
//! let context = Value::from(Record::builder("Ctx").field("Method", "GET"));
//! let program = compile("#.Method").unwrap();
//! assert_eq!(program.evaluate(&context).unwrap(), Value::from("GET"));
//! ```

pub use binding_accessor_engine::{
    CompileError, Compiler, Error, EvaluationConfig, ExecutionError, Expression, Literal, MAX_EXECUTION_DEPTH, Program,
    Root, Step, Transform, compile, evaluate, evaluate_expression, flat_keys, flat_values, parse_expression,
};
pub use binding_accessor_value::{
    Function, HostError, Kind, Map, Member, Pointer, Receiver, Record, RecordBuilder, Sequence, Signature, Structure,
    Type, Typed, Value, Visibility,
};
