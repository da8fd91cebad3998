//! The fixed set of flattening transforms a program may end with.
//!
//! Both transforms walk the same shapes: pointers are followed, sequences
//! yield their elements, maps their entries and structures their public data
//! members. They differ in what they collect along the way.

use crate::config::MAX_EXECUTION_DEPTH;
use crate::error::ExecutionError;
use binding_accessor_value::{Type, Value};
use std::fmt;
use std::str::FromStr;

/// A named post-processing stage, selected with `| name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Every terminal value reachable from the input.
    FlatValues,
    /// Every map key and structure member name reachable from the input.
    FlatKeys,
}

impl Transform {
    pub const ALL: [Transform; 2] = [Transform::FlatValues, Transform::FlatKeys];

    /// Looks up a transform by its expression name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Transform::FlatValues => "flat_values",
            Transform::FlatKeys => "flat_keys",
        }
    }

    /// Applies the transform with the default nesting limit.
    pub fn apply(self, value: &Value) -> Result<Value, ExecutionError> {
        self.apply_with_limit(value, MAX_EXECUTION_DEPTH)
    }

    /// Applies the transform, failing with [`ExecutionError::MaxExecutionDepth`]
    /// once the walk nests deeper than `max_depth` composite levels.
    ///
    /// The result is a `[any]` sequence whose order carries no meaning.
    pub fn apply_with_limit(self, value: &Value, max_depth: usize) -> Result<Value, ExecutionError> {
        let mut flattener = Flattener {
            transform: self,
            max_depth,
            out: Vec::new(),
        };
        flattener.visit(value, 0)?;
        Ok(Value::seq(Type::Any, flattener.out))
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown transform '{}'", s))
    }
}

struct Flattener {
    transform: Transform,
    max_depth: usize,
    out: Vec<Value>,
}

impl Flattener {
    fn visit(&mut self, value: &Value, level: usize) -> Result<(), ExecutionError> {
        if level > self.max_depth {
            return Err(ExecutionError::MaxExecutionDepth);
        }
        let Some((value, _)) = value.resolve() else {
            return Ok(());
        };
        if !value.kind().is_composite() {
            if self.transform == Transform::FlatValues {
                self.out.push(value.clone());
            }
            return Ok(());
        }

        match value {
            Value::Seq(seq) => {
                for item in seq.iter() {
                    self.visit(item, level + 1)?;
                }
            }
            Value::Map(map) => {
                for (key, item) in map.iter() {
                    // Keys are reported as they are, pointers included.
                    if self.transform == Transform::FlatKeys {
                        self.out.push(key.clone());
                    }
                    self.visit(item, level + 1)?;
                }
            }
            Value::Struct(structure) => {
                for member in structure.members().filter(|m| m.is_public()) {
                    if self.transform == Transform::FlatKeys {
                        self.out.push(Value::from(member.name));
                    }
                    self.visit(&member.value, level + 1)?;
                }
            }
            // Resolved values are never pointers.
            _ => {}
        }
        Ok(())
    }
}

/// Collects every terminal value reachable from `value`.
pub fn flat_values(value: &Value) -> Result<Value, ExecutionError> {
    Transform::FlatValues.apply(value)
}

/// Collects every map key and structure member name reachable from `value`.
pub fn flat_keys(value: &Value) -> Result<Value, ExecutionError> {
    Transform::FlatKeys.apply(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use binding_accessor_value::Record;
    use std::collections::HashMap;

    /// Order-insensitive comparison of a flattening result.
    fn assert_multiset(actual: &Value, expected: &[Value]) {
        let mut actual: Vec<Value> = actual.as_seq().expect("sequence result").as_slice().to_vec();
        assert_eq!(actual.len(), expected.len(), "{:?} vs {:?}", actual, expected);
        for value in expected {
            let position = actual
                .iter()
                .position(|v| v == value)
                .unwrap_or_else(|| panic!("{:?} missing from {:?}", value, actual));
            actual.swap_remove(position);
        }
    }

    fn nested() -> Value {
        Value::from(
            Record::builder("Outer").field("A", 33).field(
                "B",
                Record::builder("Inner").field(
                    "C",
                    Value::seq(
                        Type::Any,
                        [
                            Value::from(1),
                            Value::from(Record::builder("WithD").field("D", 2)),
                            Value::ptr(Record::builder("WithE").field("E", "Sqreen")),
                            Value::map(
                                Type::Any,
                                Type::Any,
                                [
                                    (Value::from("One"), Value::from(1)),
                                    (Value::from(2), Value::from("Two")),
                                    (Value::from("Three"), Value::from(vec![27, 28])),
                                ],
                            ),
                        ],
                    ),
                ),
            ),
        )
    }

    #[test]
    fn test_names() {
        assert_eq!(Transform::from_name("flat_values"), Some(Transform::FlatValues));
        assert_eq!(Transform::from_name("flat_keys"), Some(Transform::FlatKeys));
        assert_eq!(Transform::from_name("flat"), None);
        assert_eq!("flat_keys".parse::<Transform>(), Ok(Transform::FlatKeys));
        assert_eq!(Transform::FlatValues.to_string(), "flat_values");
    }

    #[test]
    fn test_flat_values() {
        let result = flat_values(&nested()).unwrap();
        assert_eq!(result.as_seq().unwrap().elem_type(), &Type::Any);
        let expected = vec![
            Value::from(33),
            Value::from(1),
            Value::from(2),
            Value::from("Sqreen"),
            Value::from(1),
            Value::from("Two"),
            Value::from(27),
            Value::from(28),
        ];
        assert_multiset(&result, &expected);
    }

    #[test]
    fn test_flat_keys() {
        let result = flat_keys(&nested()).unwrap();
        let mut expected: Vec<Value> = ["A", "B", "C", "D", "E", "One", "Three"].map(Value::from).to_vec();
        expected.push(Value::from(2));
        assert_multiset(&result, &expected);
    }

    #[test]
    fn test_nil_contributes_nothing() {
        let value = Value::seq(
            Type::Any,
            [
                Value::from(HashMap::from([("k1", "hello")])),
                Value::Nil,
                Value::null_ptr(Type::String),
            ],
        );
        assert_multiset(&flat_values(&value).unwrap(), &[Value::from("hello")]);
        assert_multiset(&flat_values(&Value::Nil).unwrap(), &[]);
    }

    #[test]
    fn test_pointer_keys_are_terminal() {
        let key = Value::ptr("");
        let null = Value::null_ptr(Type::String);
        let map = Value::map(
            Type::ptr(Type::String),
            Type::Any,
            [(key.clone(), Value::from("hello")), (null.clone(), Value::from("hello nil"))],
        );
        let value = Value::seq(Type::Any, [map, Value::Nil]);
        assert_multiset(&flat_keys(&value).unwrap(), &[key, null]);
    }

    #[test]
    fn test_private_members_are_skipped() {
        let value = Value::from(Record::builder("R").field("Shown", 1).private_field("hidden", 2));
        assert_multiset(&flat_values(&value).unwrap(), &[Value::from(1)]);
        assert_multiset(&flat_keys(&value).unwrap(), &[Value::from("Shown")]);
    }

    #[test]
    fn test_scalar_input() {
        assert_multiset(&flat_values(&Value::from("x")).unwrap(), &[Value::from("x")]);
        assert_multiset(&flat_keys(&Value::from("x")).unwrap(), &[]);
    }

    #[test]
    fn test_callables_are_terminal() {
        let func = Value::func([], Type::Int, |_| Ok(Value::from(1)));
        assert!(!func.kind().is_composite());
        let value = Value::seq(Type::Any, [func.clone(), Value::ptr(true)]);
        assert_multiset(&flat_values(&value).unwrap(), &[func, Value::from(true)]);
        assert_multiset(&flat_keys(&value).unwrap(), &[]);
    }

    #[test]
    fn test_nesting_limit() {
        let mut value = Value::from("deep");
        for _ in 0..3 {
            value = Value::seq(Type::Any, [value]);
        }
        // The terminal sits three levels below the input.
        assert!(Transform::FlatValues.apply_with_limit(&value, 3).is_ok());
        let err = Transform::FlatValues.apply_with_limit(&value, 2).unwrap_err();
        assert!(err.is_max_depth());
    }
}
