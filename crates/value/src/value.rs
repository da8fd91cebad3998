//! The dynamic [`Value`] and its container payloads.
use crate::function::{Function, HostError};
use crate::structure::Structure;
use crate::types::{Kind, Type, Typed};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A dynamically-typed host value.
///
/// Composite payloads are reference counted, so cloning a value never copies
/// the graph behind it.
#[derive(Clone, Default)]
pub enum Value {
    /// The absent value: a nil interface, or a missing map entry.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(Arc<str>),
    Seq(Arc<Sequence>),
    Map(Arc<Map>),
    Struct(Arc<dyn Structure>),
    Ptr(Pointer),
    Func(Arc<Function>),
}

/// An ordered, indexable sequence with a declared element type.
#[derive(Debug)]
pub struct Sequence {
    elem: Type,
    items: Vec<Value>,
}

impl Sequence {
    pub fn new(elem: Type, items: Vec<Value>) -> Self {
        Self { elem, items }
    }

    pub fn elem_type(&self) -> &Type {
        &self.elem
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

/// A keyed container with declared key and value types. Iteration order is
/// unspecified.
#[derive(Debug)]
pub struct Map {
    key: Type,
    value: Type,
    entries: HashMap<Value, Value>,
}

impl Map {
    pub fn new(key: Type, value: Type, entries: HashMap<Value, Value>) -> Self {
        Self { key, value, entries }
    }

    pub fn key_type(&self) -> &Type {
        &self.key
    }

    pub fn value_type(&self) -> &Type {
        &self.value
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter()
    }
}

/// A typed pointer. A pointer without a target is a nil pointer.
#[derive(Debug, Clone)]
pub struct Pointer {
    elem: Type,
    target: Option<Arc<Value>>,
}

impl Pointer {
    pub fn elem_type(&self) -> &Type {
        &self.elem
    }

    pub fn target(&self) -> Option<&Value> {
        self.target.as_deref()
    }

    pub fn is_null(&self) -> bool {
        self.target.is_none()
    }
}

impl Value {
    pub fn seq<T: Into<Value>>(elem: Type, items: impl IntoIterator<Item = T>) -> Self {
        Value::Seq(Arc::new(Sequence::new(elem, items.into_iter().map(Into::into).collect())))
    }

    pub fn map<K, V>(key: Type, value: Type, entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Value::Map(Arc::new(Map::new(key, value, entries)))
    }

    /// A pointer to `target`, typed after the target's own type.
    pub fn ptr(target: impl Into<Value>) -> Self {
        let target = target.into();
        Value::Ptr(Pointer {
            elem: target.type_of(),
            target: Some(Arc::new(target)),
        })
    }

    pub fn null_ptr(elem: Type) -> Self {
        Value::Ptr(Pointer { elem, target: None })
    }

    pub fn structure(structure: impl Structure + 'static) -> Self {
        Value::Struct(Arc::new(structure))
    }

    pub fn func<F>(params: impl IntoIterator<Item = Type>, result: Type, body: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        Value::Func(Arc::new(Function::new(params, result, body)))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::String,
            Value::Seq(_) => Kind::Sequence,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
            Value::Ptr(_) => Kind::Pointer,
            Value::Func(_) => Kind::Func,
        }
    }

    /// The dynamic type of the value. `nil` has no type of its own and
    /// reports `any`.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Nil => Type::Any,
            Value::Bool(_) => Type::Bool,
            Value::Int(_) => Type::Int,
            Value::Uint(_) => Type::Uint,
            Value::Float(_) => Type::Float,
            Value::Str(_) => Type::String,
            Value::Seq(seq) => Type::seq(seq.elem.clone()),
            Value::Map(map) => Type::map(map.key.clone(), map.value.clone()),
            Value::Struct(s) => Type::structure(s.type_name()),
            Value::Ptr(ptr) => Type::ptr(ptr.elem.clone()),
            Value::Func(func) => Type::Func(func.shared_signature()),
        }
    }

    /// True for `nil` and for nil pointers.
    pub fn is_nil(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Ptr(ptr) => ptr.is_null(),
            _ => false,
        }
    }

    /// Follows pointers until a non-pointer value is reached.
    ///
    /// Returns the value together with whether at least one pointer was
    /// followed, or `None` when a nil pointer or `nil` itself is met.
    pub fn resolve(&self) -> Option<(&Value, bool)> {
        let mut current = self;
        let mut through_pointer = false;
        loop {
            match current {
                Value::Nil => return None,
                Value::Ptr(ptr) => {
                    current = ptr.target()?;
                    through_pointer = true;
                }
                other => return Some((other, through_pointer)),
            }
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Sequence> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&dyn Structure> {
        match self {
            Value::Struct(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_ptr(&self) -> Option<&Pointer> {
        match self {
            Value::Ptr(ptr) => Some(ptr),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<&Function> {
        match self {
            Value::Func(func) => Some(func),
            _ => None,
        }
    }
}

// Scalars and containers compare by content; structures, pointers and
// callables compare by identity. Floats compare by bit pattern so that the
// relation stays an equivalence and values can key a map.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Uint(a), Value::Uint(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a.elem == b.elem && a.items == b.items,
            (Value::Map(a), Value::Map(b)) => a.key == b.key && a.value == b.value && a.entries == b.entries,
            (Value::Struct(a), Value::Struct(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (Value::Ptr(a), Value::Ptr(b)) => match (&a.target, &b.target) {
                (None, None) => a.elem == b.elem,
                (Some(x), Some(y)) => Arc::ptr_eq(x, y),
                _ => false,
            },
            (Value::Func(a), Value::Func(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Uint(u) => u.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Str(s) => s.hash(state),
            Value::Seq(seq) => seq.items.hash(state),
            // Entry order is unspecified, so only the size takes part.
            Value::Map(map) => map.entries.len().hash(state),
            Value::Struct(s) => (Arc::as_ptr(s) as *const ()).hash(state),
            Value::Ptr(ptr) => match &ptr.target {
                Some(target) => Arc::as_ptr(target).hash(state),
                None => ptr.elem.hash(state),
            },
            Value::Func(func) => Arc::as_ptr(func).hash(state),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{:?}", b),
            Value::Int(i) => write!(f, "{:?}", i),
            Value::Uint(u) => write!(f, "{:?}u", u),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Seq(seq) => f.debug_list().entries(seq.items.iter()).finish(),
            Value::Map(map) => f.debug_map().entries(map.entries.iter()).finish(),
            Value::Struct(s) => write!(f, "{:?}", s),
            Value::Ptr(ptr) => match ptr.target() {
                Some(target) => write!(f, "&{:?}", target),
                None => write!(f, "nil *{}", ptr.elem),
            },
            Value::Func(func) => write!(f, "{:?}", func),
        }
    }
}

macro_rules! impl_from_scalar {
    ($variant:ident($target:ty): $($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v as $target)
            }
        })+
    };
}

impl_from_scalar!(Int(i64): i8, i16, i32, i64, isize);
impl_from_scalar!(Uint(u64): u8, u16, u32, u64, usize);
impl_from_scalar!(Float(f64): f32, f64);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<Arc<str>> for Value {
    fn from(s: Arc<str>) -> Self {
        Value::Str(s)
    }
}

impl From<Function> for Value {
    fn from(func: Function) -> Self {
        Value::Func(Arc::new(func))
    }
}

impl From<Sequence> for Value {
    fn from(seq: Sequence) -> Self {
        Value::Seq(Arc::new(seq))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Arc::new(map))
    }
}

impl<T: Into<Value> + Typed> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::seq(T::static_type(), items)
    }
}

impl<K, V, S> From<HashMap<K, V, S>> for Value
where
    K: Into<Value> + Typed,
    V: Into<Value> + Typed,
{
    fn from(entries: HashMap<K, V, S>) -> Self {
        Value::map(K::static_type(), V::static_type(), entries)
    }
}

/// `Some` becomes a pointer to the value, `None` a nil pointer.
impl<T: Into<Value> + Typed> From<Option<T>> for Value {
    fn from(target: Option<T>) -> Self {
        Value::Ptr(Pointer {
            elem: T::static_type(),
            target: target.map(|t| Arc::new(t.into())),
        })
    }
}
