//! Lowers a parsed [`Expression`] into an executable [`Program`].
//!
//! Lowering is purely structural: no context value is available yet, so every
//! step becomes a closure that resolves its operation against whatever value
//! reaches it at evaluation time.
use crate::ast::{Expression, Literal, Root, Step};
use crate::config::EvaluationConfig;
use crate::error::{CompileError, ExecutionError};
use crate::evaluator::{self, Execution};
use crate::parser::parse_with_nesting_limit;
use crate::transform::Transform;
use binding_accessor_value::Value;
use log::debug;
use std::fmt;

/// One compiled stage: takes the running value and produces the next one.
pub(crate) type Stage = Box<dyn Fn(&mut Execution<'_>, Value) -> Result<Value, ExecutionError> + Send + Sync>;

/// A compiled binding accessor.
///
/// A program is immutable and holds no per-evaluation state, so one instance
/// can be shared across threads and evaluated concurrently.
pub struct Program {
    pub(crate) stages: Vec<Stage>,
    pub(crate) transform: Option<Transform>,
    pub(crate) config: EvaluationConfig,
}

impl Program {
    /// The number of compiled stages, the root included.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn transform(&self) -> Option<Transform> {
        self.transform
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("stages", &self.stages.len())
            .field("transform", &self.transform)
            .field("config", &self.config)
            .finish()
    }
}

/// Builds programs bound to an [`EvaluationConfig`].
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: EvaluationConfig,
}

impl Compiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Parses and lowers `expression`. Call arguments may nest no deeper than
    /// the configured execution depth, since deeper ones could never run.
    pub fn compile(&self, expression: &str) -> Result<Program, CompileError> {
        let ast = parse_with_nesting_limit(expression, self.config.max_execution_depth)?;
        let program = self.lower(&ast)?;
        debug!(
            "Compiled binding accessor with {} stages (transform: {:?})",
            program.stages.len(),
            program.transform
        );
        Ok(program)
    }

    /// Lowers an already parsed expression.
    pub fn lower(&self, expression: &Expression) -> Result<Program, CompileError> {
        let transform = match &expression.transform {
            Some(name) => Some(
                Transform::from_name(name).ok_or_else(|| CompileError::UnknownTransform { name: name.clone() })?,
            ),
            None => None,
        };

        let mut stages = Vec::with_capacity(expression.steps.len() + 1);
        stages.push(lower_root(&expression.root));
        for step in &expression.steps {
            stages.push(self.lower_step(step)?);
        }

        Ok(Program {
            stages,
            transform,
            config: self.config,
        })
    }

    fn lower_step(&self, step: &Step) -> Result<Stage, CompileError> {
        let stage: Stage = match step {
            Step::Field(name) => {
                let name = name.clone();
                Box::new(move |execution, current| evaluator::field(execution, &current, &name))
            }
            Step::Index(literal) => {
                let key = match literal {
                    Literal::Int(i) => Value::Int(*i),
                    Literal::Str(s) => Value::from(s.as_str()),
                };
                Box::new(move |execution, current| evaluator::index(execution, &current, &key))
            }
            Step::Call(args) => {
                let args = args
                    .iter()
                    .map(|arg| self.lower(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                Box::new(move |execution, current| evaluator::call(execution, &current, &args))
            }
        };
        Ok(stage)
    }
}

fn lower_root(root: &Root) -> Stage {
    match root {
        Root::Context => Box::new(|execution, _| Ok(execution.context().clone())),
        Root::Literal(text) => {
            let constant = Value::from(text.as_str());
            Box::new(move |_, _| Ok(constant.clone()))
        }
        Root::Nil => Box::new(|_, _| Ok(Value::Nil)),
    }
}

/// Compiles `expression` with the default [`EvaluationConfig`].
pub fn compile(expression: &str) -> Result<Program, CompileError> {
    Compiler::new().compile(expression)
}
