//! Host callables.
use crate::types::Type;
use crate::value::Value;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// An error raised by host code: a callable invoked by a call step, or a
/// behavior invoked by a field step.
#[derive(Error, Debug, Clone)]
#[error(transparent)]
pub struct HostError(Arc<dyn StdError + Send + Sync + 'static>);

impl HostError {
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self(Arc::from(err.into()))
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::new(message.to_string())
    }

    /// Attempts to view the underlying host error as a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

/// The declared parameter and result types of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<Type>,
    pub result: Type,
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("fn(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") -> {}", self.result)
    }
}

type Body = dyn Fn(&[Value]) -> Result<Value, HostError> + Send + Sync;

/// A typed host callable.
///
/// Arguments handed to [`Function::call`] are expected to already match the
/// signature; checking them is the caller's job. Whether the body is safe to
/// run concurrently, or blocks, is up to whoever supplies it.
pub struct Function {
    signature: Arc<Signature>,
    body: Box<Body>,
}

impl Function {
    pub fn new<F>(params: impl IntoIterator<Item = Type>, result: Type, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        Self {
            signature: Arc::new(Signature {
                params: params.into_iter().collect(),
                result,
            }),
            body: Box::new(body),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn shared_signature(&self) -> Arc<Signature> {
        Arc::clone(&self.signature)
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, HostError> {
        (self.body)(args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.signature)
    }
}
