#![allow(dead_code)]

pub mod fixtures;

use binding_accessor::{Value, compile};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Installs a test logger once per test binary; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Compiles and evaluates, panicking on a compile error so that tests only
/// have to deal with execution results.
pub fn eval(expression: &str, context: &Value) -> Result<Value, binding_accessor::ExecutionError> {
    init_logging();
    let program = compile(expression).unwrap_or_else(|e| panic!("'{}' failed to compile: {}", expression, e));
    program.evaluate(context)
}

/// Asserts that a flattening result holds exactly `expected`, ignoring order.
pub fn assert_elements_match(actual: &Value, expected: &[Value]) {
    let mut remaining: Vec<Value> = actual
        .as_seq()
        .unwrap_or_else(|| panic!("expected a sequence, got {:?}", actual))
        .as_slice()
        .to_vec();
    assert_eq!(
        remaining.len(),
        expected.len(),
        "element count differs: {:?} vs {:?}",
        remaining,
        expected
    );
    for value in expected {
        match remaining.iter().position(|v| v == value) {
            Some(i) => {
                remaining.swap_remove(i);
            }
            None => panic!("{:?} not found in {:?}", value, actual),
        }
    }
}

/// Shorthand for building an expected list of string values.
pub fn strings(values: &[&str]) -> Vec<Value> {
    values.iter().map(|s| Value::from(*s)).collect()
}
