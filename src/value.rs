use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

/// A compound: string keys mapped to values, in insertion order.
///
/// `IndexMap` keeps the source order for faithful re-serialization while
/// comparing order-independently, so two compounds with the same entries
/// are equal no matter how their keys are arranged.
pub type Compound = IndexMap<String, Value>;

/// One node of a parsed command payload.
///
/// Scalars are opaque tokens: numbers keep their type-suffix letter and
/// quoted strings keep their surrounding quotes. The tree never interprets
/// them beyond what the rewrite rules need.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Compound(Compound),
    List(Vec<Value>),
    Scalar(String),
}

impl Value {
    pub fn scalar(token: impl Into<String>) -> Value {
        Value::Scalar(token.into())
    }

    pub fn empty_compound() -> Value {
        Value::Compound(Compound::new())
    }

    pub fn as_compound(&self) -> Option<&Compound> {
        match self {
            Value::Compound(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

// ── Serialization ───────────────────────────────────────────────────

/// Writer over the value tree. `leaf` is applied to every scalar token and
/// every compound key; the flag is true in key position.
struct Writer<'a> {
    buf: String,
    leaf: &'a dyn Fn(&str, bool) -> String,
}

impl<'a> Writer<'a> {
    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Compound(map) => self.write_compound(map),
            Value::List(items) => self.write_list(items),
            Value::Scalar(token) => self.buf.push_str(&(self.leaf)(token, false)),
        }
    }

    fn write_compound(&mut self, map: &Compound) {
        self.buf.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.buf.push_str(&(self.leaf)(key, true));
            self.buf.push(':');
            self.write_value(value);
        }
        self.buf.push('}');
    }

    fn write_list(&mut self, items: &[Value]) {
        self.buf.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.write_value(item);
        }
        self.buf.push(']');
    }
}

/// Serialize a value, passing every leaf token through `leaf`.
pub fn serialize_with(value: &Value, leaf: &dyn Fn(&str, bool) -> String) -> String {
    let mut writer = Writer {
        buf: String::new(),
        leaf,
    };
    writer.write_value(value);
    writer.buf
}

/// Serialize a value with leaf tokens emitted verbatim.
pub fn value_string(value: &Value) -> String {
    serialize_with(value, &|token, _| token.to_string())
}

/// Serialize a compound with leaf tokens emitted verbatim.
pub fn compound_string(map: &Compound) -> String {
    value_string(&Value::Compound(map.clone()))
}

// ── JSON dialect ────────────────────────────────────────────────────

/// Tokens that stand on their own in JSON and must not be quoted.
static JSON_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:true|false|-?\d+(?:\.\d*)?)$").unwrap());

/// Quote a token unless it is already quoted, or it is a bare JSON literal
/// in value position. Keys are always quoted.
fn place_quotes(token: &str, is_key: bool) -> String {
    if !is_key && JSON_LITERAL.is_match(token) {
        return token.to_string();
    }
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        return token.to_string();
    }
    format!("\"{}\"", token)
}

/// Serialize a value as strict JSON, force-quoting keys and conditionally
/// quoting values. The untyped tree doubles as the JSON representation.
pub fn json_string(value: &Value) -> String {
    serialize_with(value, &place_quotes)
}
