//! Log records and field values

use serde::{Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A single field value.
///
/// Scalars keep their native type so they can be rendered exactly; anything
/// composite is carried as JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Absent value, renders as an empty string.
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    F32(f32),
    F64(f64),
    Str(String),
    /// Raw bytes, rendered as (lossy) UTF-8 text.
    Bytes(Vec<u8>),
    /// Message of an error value.
    Error(String),
    Json(serde_json::Value),
}

impl FieldValue {
    /// Capture an error by its message text.
    pub fn error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::Error(err.to_string())
    }

    /// Encode any serializable value as JSON. A value that fails to serialize
    /// is kept as the serialization error.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(v) => Self::Json(v),
            Err(e) => Self::Error(e.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(serde_json::Value::Null))
    }

    /// Text form used inside a log line.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Self::Null => Cow::Borrowed(""),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::Uint(u) => Cow::Owned(u.to_string()),
            // Display for floats is the shortest exact decimal and never uses
            // exponent notation.
            Self::F32(f) => Cow::Owned(f.to_string()),
            Self::F64(f) => Cow::Owned(f.to_string()),
            Self::Str(s) => Cow::Borrowed(s.as_str()),
            Self::Bytes(b) => String::from_utf8_lossy(b),
            Self::Error(msg) => Cow::Borrowed(msg.as_str()),
            Self::Json(value) => json_text(value),
        }
    }
}

fn json_text(value: &serde_json::Value) -> Cow<'_, str> {
    use serde_json::Value;
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_string()),
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Uint(u) => serializer.serialize_u64(*u),
            Self::F32(f) => serializer.serialize_f32(*f),
            Self::F64(f) => serializer.serialize_f64(*f),
            Self::Str(s) | Self::Error(s) => serializer.serialize_str(s),
            Self::Bytes(b) => serializer.serialize_str(&String::from_utf8_lossy(b)),
            Self::Json(v) => v.serialize(serializer),
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                Self::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                Self::Uint(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        Self::F32(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::F64(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<Cow<'_, str>> for FieldValue {
    fn from(v: Cow<'_, str>) -> Self {
        Self::Str(v.into_owned())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

/// Field mapping for one log record.
///
/// Callers may put any field name in a record; only the allow-listed names
/// make it into the rendered line (see [`crate::service::ALLOWED_FIELDS`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record carrying only a `msg` field.
    pub fn msg(text: impl Into<String>) -> Self {
        Self::new().field("msg", text.into())
    }

    /// Builder-style insert.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// JSON encoding of every field, allow-listed or not.
    pub fn to_json(&self) -> String {
        // BTreeMap<String, FieldValue> serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<FieldValue>> From<std::collections::HashMap<K, V>> for Record {
    fn from(map: std::collections::HashMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl From<&str> for Record {
    fn from(msg: &str) -> Self {
        Self::msg(msg)
    }
}

impl From<String> for Record {
    fn from(msg: String) -> Self {
        Self::msg(msg)
    }
}
