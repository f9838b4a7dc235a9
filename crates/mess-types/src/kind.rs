use serde::{Deserialize, Serialize};
use std::fmt;

/// Field type classification derived from a schema path
///
/// The set is closed: any source type that is not recognized lands in
/// `Object`, which editing surfaces treat as raw JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Boolean,
    Number,
    Date,
    /// Identifies a record of another model (see `FieldSpec::reference`)
    Reference,
    /// Anything else: mixed, arrays, embedded documents, unknown types
    Object,
}

impl FieldKind {
    /// Map a source `instance` type name onto a kind.
    ///
    /// Reference detection needs the path options as well, so it happens
    /// in schema decoding; here an object id without a target is `Object`.
    pub fn from_instance(instance: &str) -> Self {
        match instance {
            "String" => FieldKind::String,
            "Boolean" => FieldKind::Boolean,
            "Number" => FieldKind::Number,
            "Date" => FieldKind::Date,
            _ => FieldKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Reference => "reference",
            FieldKind::Object => "object",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
