//! Context values shared by the integration tests and mirrored by the benches.

use binding_accessor::{HostError, Receiver, Record, Type, Value};
use std::collections::HashMap;

pub const USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 7.0; SM-G930VC Build/NRD90M; wv) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Version/4.0 Chrome/58.0.3029.83 Mobile Safari/537.36";

/// A structure with value and reference behaviors.
pub fn with_methods() -> Record {
    Record::builder("contextWithMethods")
        .method("MyMethodField1", Receiver::Value, |_| Ok(Value::from(33)))
        .method("MyMethodField2", Receiver::Reference, |_| Ok(Value::from("Sqreen")))
        .method("MyMethodField3", Receiver::Value, |_| Ok(Value::from(vec![true, true, false])))
        .build()
}

/// `depth` sequences nested around a single `[33]`.
pub fn nested_sequences(depth: usize) -> Value {
    let mut value = Value::from(vec![33]);
    for _ in 0..depth {
        value = Value::seq(value.type_of(), [value]);
    }
    value
}

/// Structures nested along the field names `A`, `B`, ... with an integer at
/// the bottom.
pub fn nested_fields(names: &[&str]) -> Value {
    let mut value = Value::from(0);
    for name in names.iter().rev() {
        value = Value::from(Record::builder(format!("Level{}", name)).field(name, value));
    }
    value
}

/// A heterogeneous graph of structures, sequences, pointers and maps.
pub fn heterogeneous() -> Value {
    let c = Value::seq(
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
    );
    Value::from(
        Record::builder("Outer")
            .field("A", 33)
            .field("B", Record::builder("Inner").field("C", c)),
    )
}

fn values(pairs: Vec<(&str, Vec<&str>)>) -> HashMap<String, Vec<String>> {
    pairs
        .into_iter()
        .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
        .collect()
}

/// An HTTP request for `https://sqreen.com/a/b/c?user=root&password=root`,
/// wrapped the way a web framework would hand it to a protection rule.
///
/// The wrapper embeds a pointer to the request, so the request's members and
/// behaviors are reachable directly from it.
pub fn request_context() -> Value {
    let query = values(vec![("user", vec!["root"]), ("password", vec!["root"])]);
    let header = values(vec![
        ("User-Agent", vec![USER_AGENT]),
        ("My-Header", vec!["my value", "my second value", "my third value"]),
        ("Accept-Encoding", vec!["gzip, deflate, br"]),
    ]);

    let url = Record::builder("url.URL")
        .field("Scheme", "https")
        .field("Host", "sqreen.com")
        .field("Path", "/a/b/c")
        .field("RawQuery", "user=root&password=root")
        .method("Query", Receiver::Reference, move |_| Ok(Value::from(query.clone())))
        .method("RequestURI", Receiver::Reference, |url| {
            let path = url.get("Path").and_then(Value::as_str).ok_or_else(|| HostError::msg("no path"))?;
            match url.get("RawQuery").and_then(Value::as_str) {
                Some(query) if !query.is_empty() => Ok(Value::from(format!("{}?{}", path, query))),
                _ => Ok(Value::from(path)),
            }
        });

    let request = Record::builder("http.Request")
        .field("Method", "GET")
        .field("URL", Value::ptr(url))
        .field("Proto", "HTTP/1.1")
        .field("Header", header)
        .field("Host", "sqreen.com")
        .private_field("ctx", Value::Nil);

    let helper_query = values(vec![("user", vec!["root"]), ("password", vec!["root"])]);
    let wrapper = Record::builder("MyRequestWrapper")
        .embed("Request", Value::ptr(request))
        .field("ClientIP", "1.2.3.4")
        .field("Helper", Record::builder("Helper").field("Query", helper_query));

    Value::from(Record::builder("Context").field("Request", wrapper))
}
