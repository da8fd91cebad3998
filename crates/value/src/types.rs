//! Static type descriptions and value kinds.
use crate::function::Signature;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The coarse shape of a value, used to pick how a traversal step applies to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Nil,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Sequence,
    Map,
    Struct,
    Pointer,
    Func,
}

impl Kind {
    /// Composite kinds are the ones the flattening transforms descend into.
    pub fn is_composite(self) -> bool {
        matches!(self, Kind::Sequence | Kind::Map | Kind::Struct | Kind::Pointer)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Nil => "nil",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Sequence => "sequence",
            Kind::Map => "map",
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Func => "func",
        };
        f.write_str(name)
    }
}

/// A declared type: the element type of a sequence, the key and value types
/// of a map, the target of a pointer or a callable's parameter and result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// The untyped, dynamic type. Every value is assignable to it.
    Any,
    Bool,
    Int,
    Uint,
    Float,
    String,
    Seq(Box<Type>),
    Map(Box<Type>, Box<Type>),
    Ptr(Box<Type>),
    /// A structured type, identified by its name.
    Struct(Arc<str>),
    Func(Arc<Signature>),
}

impl Type {
    pub fn seq(elem: Type) -> Self {
        Type::Seq(Box::new(elem))
    }

    pub fn map(key: Type, value: Type) -> Self {
        Type::Map(Box::new(key), Box::new(value))
    }

    pub fn ptr(elem: Type) -> Self {
        Type::Ptr(Box::new(elem))
    }

    pub fn structure(name: impl Into<Arc<str>>) -> Self {
        Type::Struct(name.into())
    }

    /// Whether `value` can be stored in a slot of this type.
    ///
    /// `any` accepts everything, a pointer type also accepts `nil`, and all
    /// other types require the value's own type to match exactly.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Type::Any, _) => true,
            (Type::Ptr(_), Value::Nil) => true,
            _ => value.type_of() == *self,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Any => f.write_str("any"),
            Type::Bool => f.write_str("bool"),
            Type::Int => f.write_str("int"),
            Type::Uint => f.write_str("uint"),
            Type::Float => f.write_str("float"),
            Type::String => f.write_str("string"),
            Type::Seq(elem) => write!(f, "[{}]", elem),
            Type::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            Type::Ptr(elem) => write!(f, "*{}", elem),
            Type::Struct(name) => f.write_str(name),
            Type::Func(signature) => write!(f, "{}", signature),
        }
    }
}

/// Maps a Rust type to the [`Type`] its converted values carry.
pub trait Typed {
    fn static_type() -> Type;
}

macro_rules! impl_typed {
    ($variant:ident: $($ty:ty),+) => {
        $(impl Typed for $ty {
            fn static_type() -> Type {
                Type::$variant
            }
        })+
    };
}

impl_typed!(Bool: bool);
impl_typed!(Int: i8, i16, i32, i64, isize);
impl_typed!(Uint: u8, u16, u32, u64, usize);
impl_typed!(Float: f32, f64);
impl_typed!(String: String, Arc<str>);

impl Typed for &str {
    fn static_type() -> Type {
        Type::String
    }
}

impl Typed for Value {
    fn static_type() -> Type {
        Type::Any
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn static_type() -> Type {
        Type::seq(T::static_type())
    }
}

impl<K: Typed, V: Typed, S> Typed for HashMap<K, V, S> {
    fn static_type() -> Type {
        Type::map(K::static_type(), V::static_type())
    }
}

impl<T: Typed> Typed for Option<T> {
    fn static_type() -> Type {
        Type::ptr(T::static_type())
    }
}
