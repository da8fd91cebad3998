//! The evaluation engine for executing a compiled [`Program`] against a context value.
//!
//! Each evaluation threads the running value through the program's stages and
//! counts traversal steps against the configured depth limit. Any failure
//! aborts the chain; there are no partial results.

use crate::compiler::{Program, compile};
use crate::error::{Error, ExecutionError};
use binding_accessor_value::{Structure, Type, Value};
use log::{debug, trace};

/// The per-evaluation state: the context value and the depth counter.
/// Created fresh for every call to [`Program::evaluate`].
pub(crate) struct Execution<'c> {
    context: &'c Value,
    depth: usize,
    max_depth: usize,
}

impl<'c> Execution<'c> {
    fn new(context: &'c Value, max_depth: usize) -> Self {
        Self {
            context,
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn context(&self) -> &'c Value {
        self.context
    }

    /// Counts one traversal step.
    fn descend(&mut self) -> Result<(), ExecutionError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ExecutionError::MaxExecutionDepth);
        }
        Ok(())
    }
}

impl Program {
    /// Evaluates the program against `context`.
    pub fn evaluate(&self, context: &Value) -> Result<Value, ExecutionError> {
        let mut execution = Execution::new(context, self.config.max_execution_depth);
        let result = self.run(&mut execution);
        if let Err(e) = &result {
            debug!("Binding accessor evaluation failed after {} steps: {}", execution.depth, e);
        }
        result
    }

    /// Runs the stages, then the transform, within an existing execution.
    /// Call arguments go through here so they share the caller's depth counter.
    fn run(&self, execution: &mut Execution<'_>) -> Result<Value, ExecutionError> {
        let mut current = Value::Nil;
        for stage in &self.stages {
            current = stage(execution, current)?;
        }
        match self.transform {
            Some(transform) => transform.apply_with_limit(&current, execution.max_depth),
            None => Ok(current),
        }
    }
}

/// Evaluates `program` against `context`.
pub fn evaluate(program: &Program, context: &Value) -> Result<Value, ExecutionError> {
    program.evaluate(context)
}

/// Compiles and evaluates `expression` in one go. Prefer compiling once and
/// reusing the [`Program`] when the same expression runs repeatedly.
pub fn evaluate_expression(expression: &str, context: &Value) -> Result<Value, Error> {
    Ok(compile(expression)?.evaluate(context)?)
}

// --- Step Implementations ---

/// `.name`: a public data member, else a visible zero-argument behavior, else
/// a member or behavior promoted from an embedded member.
pub(crate) fn field(execution: &mut Execution<'_>, current: &Value, name: &str) -> Result<Value, ExecutionError> {
    execution.descend()?;
    trace!("Field '{}' on a {} value", name, current.kind());

    let (target, through_pointer) = current.resolve().ok_or(ExecutionError::NilDereference {
        operation: "field access",
    })?;
    let structure = target
        .as_struct()
        .ok_or_else(|| ExecutionError::NotAStruct { kind: target.kind() })?;

    let mut promotion = Promotion {
        name,
        max_depth: execution.max_depth,
        seen: Vec::new(),
        held: Vec::new(),
    };
    promotion.lookup(structure, through_pointer, 0)?.ok_or_else(|| ExecutionError::UnknownField {
        name: name.to_string(),
        type_name: target.type_of(),
    })
}

/// Member lookup through a structure and, recursively, its embedded members.
///
/// Each structure is searched once, so an embedding cycle ends the search.
/// Embedding chains nested deeper than the execution depth fail.
struct Promotion<'n> {
    name: &'n str,
    max_depth: usize,
    seen: Vec<*const ()>,
    // Keeps visited embedded values alive so their addresses stay unique.
    held: Vec<Value>,
}

impl Promotion<'_> {
    fn lookup(
        &mut self,
        structure: &dyn Structure,
        through_pointer: bool,
        level: usize,
    ) -> Result<Option<Value>, ExecutionError> {
        if level > self.max_depth {
            return Err(ExecutionError::MaxExecutionDepth);
        }
        let address = structure as *const dyn Structure as *const ();
        if self.seen.contains(&address) {
            return Ok(None);
        }
        self.seen.push(address);

        let name = self.name;
        if let Some(member) = structure.member(name) {
            if !member.is_public() {
                return Err(ExecutionError::InaccessibleField {
                    name: name.to_string(),
                    type_name: Type::structure(structure.type_name()),
                });
            }
            return Ok(Some(member.value));
        }

        if let Some(receiver) = structure.behavior(name) {
            if !receiver.is_visible(through_pointer) {
                return Err(ExecutionError::ReferenceBehavior {
                    name: name.to_string(),
                    type_name: Type::structure(structure.type_name()),
                });
            }
            return Ok(Some(structure.invoke(name)?));
        }

        // Nil embedded pointers promote nothing.
        for member in structure.members().filter(|m| m.embedded) {
            let Some((inner, inner_pointer)) = member.value.resolve() else {
                continue;
            };
            if let Some(inner) = inner.as_struct() {
                if let Some(value) = self.lookup(inner, through_pointer || inner_pointer, level + 1)? {
                    return Ok(Some(value));
                }
            }
            self.held.push(member.value);
        }
        Ok(None)
    }
}

/// `[key]`: an element of a sequence or an entry of a map. A well-typed key
/// missing from a map yields `nil`; a badly typed one is an error.
pub(crate) fn index(execution: &mut Execution<'_>, current: &Value, key: &Value) -> Result<Value, ExecutionError> {
    execution.descend()?;
    trace!("Index {:?} on a {} value", key, current.kind());

    let (target, _) = current.resolve().ok_or(ExecutionError::NilDereference {
        operation: "index access",
    })?;
    match target {
        Value::Seq(seq) => {
            let index = key
                .as_int()
                .filter(|i| *i >= 0)
                .ok_or_else(|| ExecutionError::InvalidIndex {
                    index: format!("{:?}", key),
                })?;
            usize::try_from(index)
                .ok()
                .and_then(|i| seq.get(i))
                .cloned()
                .ok_or(ExecutionError::IndexOutOfRange { index, len: seq.len() })
        }
        Value::Map(map) => {
            if !map.key_type().accepts(key) {
                return Err(ExecutionError::KeyType {
                    expected: map.key_type().clone(),
                    found: key.type_of(),
                });
            }
            Ok(map.get(key).cloned().unwrap_or(Value::Nil))
        }
        other => Err(ExecutionError::NotIndexable { kind: other.kind() }),
    }
}

/// `(args...)`: invokes the current value. Arguments are evaluated against the
/// original context value, then checked against the declared parameters.
pub(crate) fn call(execution: &mut Execution<'_>, current: &Value, args: &[Program]) -> Result<Value, ExecutionError> {
    execution.descend()?;
    trace!("Call with {} arguments on a {} value", args.len(), current.kind());

    let function = current
        .as_func()
        .ok_or_else(|| ExecutionError::NotCallable { kind: current.kind() })?;

    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(arg.run(execution)?);
    }

    let params = &function.signature().params;
    if params.len() != values.len() {
        return Err(ExecutionError::ArgumentCount {
            expected: params.len(),
            found: values.len(),
        });
    }
    let values = values
        .into_iter()
        .zip(params)
        .enumerate()
        .map(|(position, (value, param))| convert_argument(position, value, param))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(function.call(&values)?)
}

/// `any` parameters take every value; pointer parameters take `nil` as a nil
/// pointer; everything else must match exactly.
fn convert_argument(position: usize, value: Value, param: &Type) -> Result<Value, ExecutionError> {
    match (param, &value) {
        (Type::Ptr(elem), Value::Nil) => Ok(Value::null_ptr(elem.as_ref().clone())),
        _ if param.accepts(&value) => Ok(value),
        _ => Err(ExecutionError::ArgumentType {
            position,
            expected: param.clone(),
            found: value.type_of(),
        }),
    }
}
