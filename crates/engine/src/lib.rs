//! Binding accessor expressions: a tiny path language for reaching into a
//! host value graph.
//!
//! An expression such as `#.Request.Header['User-Agent']` or
//! `#.Request.Helper | flat_keys` is compiled once into a [`Program`] and can
//! then be evaluated any number of times, from any thread, against a context
//! [`Value`](binding_accessor_value::Value).

pub mod ast;
pub mod compiler;
pub mod config;
pub mod error;
pub mod evaluator;
mod parser;
pub mod transform;

// --- Public API ---
pub use ast::{Expression, Literal, Root, Step};
pub use compiler::{Compiler, Program, compile};
pub use config::{EvaluationConfig, MAX_EXECUTION_DEPTH};
pub use error::{CompileError, Error, ExecutionError};
pub use evaluator::{evaluate, evaluate_expression};
pub use parser::parse_expression;
pub use transform::{Transform, flat_keys, flat_values};

#[cfg(test)]
mod tests {
    use super::*;
    use binding_accessor_value::{Record, Type, Value};

    #[test]
    fn test_compile_and_evaluate() {
        let context = Value::from(Record::builder("Ctx").field("A", Record::builder("Inner").field("B", "Hello World")));
        let program = compile("#.A.B").unwrap();
        assert_eq!(evaluate(&program, &context).unwrap(), Value::from("Hello World"));
        // Programs are reusable.
        assert_eq!(program.evaluate(&context).unwrap(), Value::from("Hello World"));
    }

    #[test]
    fn test_parse_then_lower() {
        let ast = parse_expression("#[0] | flat_values").unwrap();
        assert_eq!(ast.transform.as_deref(), Some("flat_values"));
        let program = Compiler::new().lower(&ast).unwrap();
        let context = Value::from(vec![Value::seq(Type::Any, [1, 2])]);
        let result = program.evaluate(&context).unwrap();
        assert_eq!(result.as_seq().unwrap().len(), 2);
    }
}
