//! Conversion from `serde_json` documents.
use crate::types::Type;
use crate::value::Value;
use serde_json::Value as Json;

/// JSON arrays become `[any]` sequences and objects `map<string, any>` maps.
/// Integral numbers keep their signedness; everything else is a float.
impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Nil,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::from(s),
            Json::Array(items) => Value::seq(Type::Any, items),
            Json::Object(fields) => Value::map(Type::String, Type::Any, fields),
        }
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        Value::from(json.clone())
    }
}
