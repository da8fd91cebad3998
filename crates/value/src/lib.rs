//! The dynamic value model binding accessors are evaluated against.
//!
//! Rust has no runtime reflection, so a host application describes the values
//! it hands to the engine with [`Value`]: scalars, typed sequences and maps,
//! typed pointers, typed callables and structured values exposed through the
//! [`Structure`] trait. The engine only ever reads these values; the one
//! exception is invoking behaviors and callables the host itself supplied.

pub mod function;
pub mod json;
pub mod structure;
pub mod types;
pub mod value;

pub use function::{Function, HostError, Signature};
pub use structure::{Member, Receiver, Record, RecordBuilder, Structure, Visibility};
pub use types::{Kind, Type, Typed};
pub use value::{Map, Pointer, Sequence, Value};
