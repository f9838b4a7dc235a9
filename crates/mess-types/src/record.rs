use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// A record as it crosses the transport boundary
pub type Document = Map<String, Value>;

/// Field carrying a persisted record's identity
pub const IDENTITY_FIELD: &str = "_id";

/// Render an instant the way the backend expects dates on the wire.
///
/// Millisecond precision unless the instant carries finer digits, which are
/// kept so a value read and written back names the same instant.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    let format = if instant.timestamp_subsec_nanos() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::AutoSi
    };
    instant.to_rfc3339_opts(format, true)
}

/// One in-memory field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Parsed date; serialized back to text at the transport boundary
    Date(DateTime<Utc>),
    /// Anything else, kept as the transport delivered it
    Json(Value),
}

impl FieldValue {
    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            FieldValue::Date(instant) => Some(instant),
            FieldValue::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            FieldValue::Json(value) => Some(value),
            FieldValue::Date(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Json(Value::Null))
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Date(instant) => Value::String(format_instant(instant)),
            FieldValue::Json(value) => value.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Date(instant) => f.write_str(&format_instant(instant)),
            FieldValue::Json(Value::Null) => Ok(()),
            FieldValue::Json(Value::String(s)) => f.write_str(s),
            FieldValue::Json(other) => write!(f, "{}", other),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Date(instant) => serializer.serialize_str(&format_instant(instant)),
            FieldValue::Json(value) => value.serialize(serializer),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Json(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(instant: DateTime<Utc>) -> Self {
        FieldValue::Date(instant)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Json(Value::String(s.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Json(Value::String(s))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Json(Value::Bool(b))
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Json(Value::from(n))
    }
}

/// One stored entity, keyed by field name
///
/// Cloning a record is a deep copy; edit sessions rely on that to keep
/// their working copy apart from the grid row it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a transport document without any type coercion.
    pub fn from_document(document: Document) -> Self {
        document
            .into_iter()
            .map(|(name, value)| (name, FieldValue::Json(value)))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Identity of a persisted record; `None` before creation.
    pub fn identity(&self) -> Option<String> {
        match self.fields.get(IDENTITY_FIELD)? {
            FieldValue::Json(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            FieldValue::Json(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.identity().is_some()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
