//! Structured values: named data members and zero-argument behaviors.
use crate::function::HostError;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Whether a data member may be reached from an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Private,
}

/// The form a behavior is defined on.
///
/// A behavior defined on the reference form is only visible when the
/// structure was reached through a pointer. A behavior defined on the value
/// form is visible either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    Value,
    Reference,
}

impl Receiver {
    /// Whether a behavior with this receiver can be seen from a structure
    /// that was, or was not, reached through a pointer.
    pub fn is_visible(self, through_pointer: bool) -> bool {
        match self {
            Receiver::Value => true,
            Receiver::Reference => through_pointer,
        }
    }
}

/// A data member of a structured value.
#[derive(Debug, Clone)]
pub struct Member<'a> {
    pub name: &'a str,
    pub value: Value,
    pub visibility: Visibility,
    /// Embedded members promote their own members and behaviors to the
    /// embedding structure.
    pub embedded: bool,
}

impl Member<'_> {
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// The contract a host implements to expose a structured value.
///
/// The engine looks up members by exact, case-sensitive name and invokes
/// behaviors by name; it never mutates the structure.
pub trait Structure: fmt::Debug + Send + Sync {
    /// The name of the structure's type, used for type identity.
    fn type_name(&self) -> &str;

    /// All data members, public and private, in declaration order.
    fn members(&self) -> Box<dyn Iterator<Item = Member<'_>> + '_>;

    fn member(&self, name: &str) -> Option<Member<'_>> {
        self.members().find(|member| member.name == name)
    }

    /// The receiver form of the zero-argument behavior named `name`, if the
    /// structure defines one.
    fn behavior(&self, _name: &str) -> Option<Receiver> {
        None
    }

    /// Runs the zero-argument behavior named `name`.
    fn invoke(&self, name: &str) -> Result<Value, HostError> {
        Err(HostError::msg(format!(
            "`{}` has no behavior named `{}`",
            self.type_name(),
            name
        )))
    }
}

type BehaviorBody = dyn Fn(&Record) -> Result<Value, HostError> + Send + Sync;

struct Slot {
    name: String,
    value: Value,
    visibility: Visibility,
    embedded: bool,
}

struct Behavior {
    name: String,
    receiver: Receiver,
    body: Arc<BehaviorBody>,
}

/// The stock [`Structure`] implementation, assembled with a [`RecordBuilder`].
///
/// ```
/// use binding_accessor_value::{Receiver, Record, Value};
///
/// let request = Record::builder("Request")
///     .field("Method", "GET")
///     .private_field("body", "...")
///     .method("IsSafe", Receiver::Value, |r| {
///         Ok(Value::from(r.get("Method").and_then(Value::as_str) == Some("GET")))
///     })
///     .build();
/// assert_eq!(request.get("Method"), Some(&Value::from("GET")));
/// ```
pub struct Record {
    type_name: Arc<str>,
    slots: Vec<Slot>,
    behaviors: Vec<Behavior>,
}

impl Record {
    pub fn builder(type_name: impl Into<Arc<str>>) -> RecordBuilder {
        RecordBuilder {
            record: Record {
                type_name: type_name.into(),
                slots: Vec::new(),
                behaviors: Vec::new(),
            },
        }
    }

    /// Reads a member directly, regardless of its visibility.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.iter().find(|slot| slot.name == name).map(|slot| &slot.value)
    }
}

impl Slot {
    fn to_member(&self) -> Member<'_> {
        Member {
            name: &self.name,
            value: self.value.clone(),
            visibility: self.visibility,
            embedded: self.embedded,
        }
    }
}

impl Structure for Record {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn members(&self) -> Box<dyn Iterator<Item = Member<'_>> + '_> {
        Box::new(self.slots.iter().map(Slot::to_member))
    }

    fn member(&self, name: &str) -> Option<Member<'_>> {
        self.slots.iter().find(|slot| slot.name == name).map(Slot::to_member)
    }

    fn behavior(&self, name: &str) -> Option<Receiver> {
        self.behaviors.iter().find(|b| b.name == name).map(|b| b.receiver)
    }

    fn invoke(&self, name: &str) -> Result<Value, HostError> {
        match self.behaviors.iter().find(|b| b.name == name) {
            Some(behavior) => (behavior.body)(self),
            None => Err(HostError::msg(format!(
                "`{}` has no behavior named `{}`",
                self.type_name, name
            ))),
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(&self.type_name);
        for slot in &self.slots {
            s.field(&slot.name, &slot.value);
        }
        s.finish()
    }
}

/// Builds a [`Record`] member by member.
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    fn push(mut self, name: &str, value: Value, visibility: Visibility, embedded: bool) -> Self {
        self.record.slots.push(Slot {
            name: name.to_string(),
            value,
            visibility,
            embedded,
        });
        self
    }

    pub fn field(self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value.into(), Visibility::Public, false)
    }

    pub fn private_field(self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value.into(), Visibility::Private, false)
    }

    /// Embeds `value`, usually a structure or a pointer to one, under `name`.
    pub fn embed(self, name: &str, value: impl Into<Value>) -> Self {
        self.push(name, value.into(), Visibility::Public, true)
    }

    pub fn method<F>(mut self, name: &str, receiver: Receiver, body: F) -> Self
    where
        F: Fn(&Record) -> Result<Value, HostError> + Send + Sync + 'static,
    {
        self.record.behaviors.push(Behavior {
            name: name.to_string(),
            receiver,
            body: Arc::new(body),
        });
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Struct(Arc::new(record))
    }
}

impl From<RecordBuilder> for Value {
    fn from(builder: RecordBuilder) -> Self {
        builder.build().into()
    }
}
